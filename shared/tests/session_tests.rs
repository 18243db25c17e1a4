use shared::preview::DataUrlEncoder;
use shared::{
    Category, ClientConfig, DetectionSession, ErrorKind, Failure, HttpReply, RejectReason,
    SessionError, SubmissionState, Timer, Transport, TransportFailure, UploadCandidate,
    ValidatedFile,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

struct TokioTimer;

impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

/// Replies after a delay and remembers what was uploaded.
struct FakeService {
    delay: Duration,
    reply: Result<HttpReply, TransportFailure>,
    uploads: Rc<RefCell<Vec<String>>>,
}

impl Transport for FakeService {
    async fn send(&self, file: &ValidatedFile) -> Result<HttpReply, TransportFailure> {
        self.uploads
            .borrow_mut()
            .push(file.candidate().file_name().to_string());
        tokio::time::sleep(self.delay).await;
        self.reply.clone()
    }
}

type Session = DetectionSession<FakeService, TokioTimer, DataUrlEncoder>;

fn session(
    delay: Duration,
    reply: Result<HttpReply, TransportFailure>,
) -> (Session, Rc<RefCell<Vec<String>>>) {
    let uploads = Rc::new(RefCell::new(Vec::new()));
    let service = FakeService {
        delay,
        reply,
        uploads: uploads.clone(),
    };
    (
        DetectionSession::new(ClientConfig::default(), service, TokioTimer, DataUrlEncoder),
        uploads,
    )
}

fn ok(body: &str) -> Result<HttpReply, TransportFailure> {
    Ok(HttpReply {
        status: 200,
        body: body.to_string(),
    })
}

fn jpeg(name: &str) -> UploadCandidate {
    UploadCandidate::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}

const DEFICIENCY: &str = r#"{
    "success": true,
    "prediction": {"nutrient_deficiency": "Nitrogen Deficiency", "confidence": 0.77,
                   "is_healthy": false, "symptoms": ["Yellowing of older leaves"]},
    "recommendations": {"remedies": ["Apply urea (46% N)"], "prevention": ["Regular soil testing"],
                        "nutrients": ["Nitrogen"]},
    "top_predictions": [
        {"nutrient_deficiency": "Nitrogen Deficiency", "confidence": 0.77},
        {"disease": "Healthy", "confidence": 0.05},
        {"disease": "Anthracnose", "confidence": 0.18}
    ]
}"#;

#[tokio::test(start_paused = true)]
async fn unsupported_type_never_reaches_the_network() {
    let (session, uploads) = session(Duration::ZERO, ok(DEFICIENCY));

    let err = session
        .select_file(UploadCandidate::new("notes.pdf", "application/pdf", vec![1, 2, 3]))
        .err();
    assert_eq!(err, Some(SessionError::Rejected(RejectReason::UnsupportedType)));
    assert!(matches!(
        session.state(),
        SubmissionState::Failed(Failure { kind: ErrorKind::InvalidInput, .. })
    ));
    assert!(!session.can_submit());

    assert_eq!(session.trigger_submit().await, Err(SessionError::NoFile));
    assert!(uploads.borrow().is_empty());
}

#[tokio::test(start_paused = true)]
async fn oversize_file_is_rejected() {
    let (session, _) = session(Duration::ZERO, ok(DEFICIENCY));
    let huge = UploadCandidate::new("huge.png", "image/png", vec![0u8; 10 * 1024 * 1024 + 1]);

    let err = session.select_file(huge).err();
    assert!(matches!(err, Some(SessionError::Rejected(RejectReason::TooLarge { .. }))));
    assert!(matches!(
        session.state(),
        SubmissionState::Failed(Failure { kind: ErrorKind::PayloadTooLarge, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn rejection_keeps_previous_candidate() {
    let (session, _) = session(Duration::ZERO, ok(DEFICIENCY));
    session.select_file(jpeg("first.jpg")).unwrap();
    assert!(session.select_file(UploadCandidate::new("a.gif", "image/gif", vec![1])).is_err());
    assert_eq!(
        session.candidate().map(|c| c.file_name().to_string()),
        Some("first.jpg".to_string())
    );
    assert!(session.can_submit());
}

#[tokio::test(start_paused = true)]
async fn newer_preview_supersedes_older() {
    let (session, _) = session(Duration::ZERO, ok(DEFICIENCY));

    let first = session.select_file(jpeg("first.jpg")).unwrap();
    let second = session
        .drop_file(UploadCandidate::new("second.png", "image/png", vec![0x89, b'P', b'N', b'G']))
        .unwrap();

    assert!(second.run().await);
    assert!(!first.run().await);
    assert_eq!(
        session.preview().map(|p| p.to_string()),
        Some("data:image/png;base64,iVBORw==".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn success_releases_candidate_and_preview() {
    let (session, uploads) = session(Duration::from_millis(700), ok(DEFICIENCY));
    let states = Rc::new(RefCell::new(Vec::new()));
    let sink = states.clone();
    session.subscribe(move |state| sink.borrow_mut().push(state.clone()));

    session.select_file(jpeg("leaf.jpg")).unwrap().run().await;
    assert!(session.preview().is_some());

    let result = session.trigger_submit().await.unwrap();
    assert_eq!(result.category, Category::NutrientDeficiency);
    assert_eq!(result.class_name, "Nitrogen Deficiency");
    assert_eq!(result.confidence_percent, 77);
    assert_eq!(result.treatment, vec!["Apply urea (46% N)"]);
    assert_eq!(result.nutrients, vec!["Nitrogen"]);

    let ranking: Vec<_> = result
        .top_predictions
        .iter()
        .map(|p| (p.class_name.as_str(), p.confidence_percent))
        .collect();
    assert_eq!(
        ranking,
        [("Nitrogen Deficiency", 77), ("Healthy", 5), ("Anthracnose", 18)]
    );

    assert_eq!(*uploads.borrow(), ["leaf.jpg"]);
    assert!(session.candidate().is_none());
    assert!(session.preview().is_none());
    assert_eq!(
        states.borrow().last(),
        Some(&SubmissionState::Succeeded(result))
    );
}

#[tokio::test(start_paused = true)]
async fn failure_keeps_candidate_for_retry() {
    let (session, uploads) = session(
        Duration::from_millis(20),
        Err(TransportFailure::NoResponse("connection refused".into())),
    );
    session.select_file(jpeg("leaf.jpg")).unwrap();

    let err = session.trigger_submit().await.unwrap_err();
    let SessionError::Failed(failure) = err else {
        panic!("expected classified failure, got {:?}", err);
    };
    assert_eq!(failure.kind, ErrorKind::Unreachable);
    assert!(session.can_submit());

    assert!(session.trigger_submit().await.is_err());
    assert_eq!(uploads.borrow().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn in_flight_submission_blocks_other_inputs() {
    let (session, uploads) = session(Duration::from_secs(2), ok(DEFICIENCY));
    session.select_file(jpeg("leaf.jpg")).unwrap();
    let probes = Cell::new(0);

    let (outcome, ()) = futures::join!(session.trigger_submit(), async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let before = session.state();
        assert!(before.is_submitting());

        assert_eq!(session.trigger_submit().await, Err(SessionError::Busy));
        assert_eq!(session.reset(), Err(SessionError::Busy));
        assert!(matches!(
            session.select_file(jpeg("other.jpg")),
            Err(SessionError::Busy)
        ));
        assert_eq!(session.state(), before);
        probes.set(probes.get() + 1);
    });

    assert!(outcome.is_ok());
    assert_eq!(probes.get(), 1);
    assert_eq!(*uploads.borrow(), ["leaf.jpg"]);
}

#[tokio::test(start_paused = true)]
async fn reset_returns_to_idle() {
    let (session, _) = session(Duration::ZERO, ok(DEFICIENCY));
    let task = session.select_file(jpeg("leaf.jpg")).unwrap();

    assert_eq!(session.reset(), Ok(()));
    assert!(!task.run().await);
    assert_eq!(session.state(), SubmissionState::Idle);
    assert!(session.candidate().is_none());
    assert!(session.preview().is_none());
}

#[tokio::test(start_paused = true)]
async fn submit_without_file_reports_invalid_input() {
    let (session, _) = session(Duration::ZERO, ok(DEFICIENCY));
    assert_eq!(session.trigger_submit().await, Err(SessionError::NoFile));
    assert_eq!(
        session.state(),
        SubmissionState::Failed(Failure::new(
            ErrorKind::InvalidInput,
            "Please select an image first"
        ))
    );
}

#[tokio::test(start_paused = true)]
async fn failed_preview_does_not_block_submission() {
    let (session, uploads) = session(Duration::from_millis(50), ok(DEFICIENCY));

    let task = session
        .select_file(UploadCandidate::new("blank.jpg", "image/jpeg", Vec::new()))
        .unwrap();
    assert!(!task.run().await);
    assert!(session.preview().is_none());
    assert!(session.can_submit());

    let result = session.trigger_submit().await.unwrap();
    assert_eq!(result.class_name, "Nitrogen Deficiency");
    assert_eq!(*uploads.borrow(), ["blank.jpg"]);
}

#[tokio::test(start_paused = true)]
async fn rejected_file_keeps_displayed_result() {
    let (session, _) = session(Duration::from_millis(50), ok(DEFICIENCY));
    session.select_file(jpeg("leaf.jpg")).unwrap();
    let result = session.trigger_submit().await.unwrap();

    let err = session
        .select_file(UploadCandidate::new("notes.pdf", "application/pdf", vec![1, 2, 3]))
        .err();
    assert_eq!(err, Some(SessionError::Rejected(RejectReason::UnsupportedType)));
    assert_eq!(session.state(), SubmissionState::Succeeded(result));

    session.select_file(jpeg("next.jpg")).unwrap();
    assert_eq!(session.state(), SubmissionState::Idle);
}

mod api;
mod components;

use api::{BrowserPreviewEncoder, GlooTimer, GlooTransport};
use components::header::render_header;
use components::preview_area::render_preview_area;
use components::results::render_results;
use components::upload_section::render_upload_section;
use components::utils::{first_file, render_error_message};
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use shared::{
    ClientConfig, DetectionResult, DetectionSession, PreviewHandle, SessionError,
    SubmissionState, UploadCandidate,
};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

type Session = DetectionSession<GlooTransport, GlooTimer, BrowserPreviewEncoder>;

pub struct FileInfo {
    pub name: String,
    pub size: u64,
}

pub enum Msg {
    // File operations
    FileChosen(GlooFile),
    CandidateLoaded(UploadCandidate),
    PreviewSettled,
    Reset,

    // Analysis operations
    Analyze,
    AnalysisFinished(Result<DetectionResult, SessionError>),
    StateChanged(SubmissionState),
    CopyReport,

    // UI states
    SetError(Option<String>),
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

pub struct Model {
    session: Rc<Session>,
    state: SubmissionState,
    preview: Option<PreviewHandle>,
    preview_loading: bool,
    file_info: Option<FileInfo>,
    error: Option<String>,
    is_dragging: bool,
    paste_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = ClientConfig::default();
        let transport = GlooTransport::new(&config.submission);
        let session = Rc::new(DetectionSession::new(
            config,
            transport,
            GlooTimer,
            BrowserPreviewEncoder,
        ));

        let link = ctx.link().clone();
        session.subscribe(move |state| link.send_message(Msg::StateChanged(state.clone())));

        let mut model = Self {
            state: session.state(),
            session,
            preview: None,
            preview_loading: false,
            file_info: None,
            error: None,
            is_dragging: false,
            paste_listener: None,
        };

        if let Some(window) = web_sys::window() {
            let link = ctx.link().clone();
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FileChosen(file) => self.handle_file_chosen(ctx, file),
            Msg::CandidateLoaded(candidate) => self.handle_candidate_loaded(ctx, candidate),
            Msg::PreviewSettled => {
                self.preview = self.session.preview();
                self.preview_loading = false;
                true
            }
            Msg::Reset => self.handle_reset(),

            Msg::Analyze => self.handle_analyze(ctx),
            Msg::AnalysisFinished(outcome) => self.handle_analysis_finished(outcome),
            Msg::StateChanged(state) => self.handle_state_changed(state),
            Msg::CopyReport => self.handle_copy_report(),

            Msg::SetError(error) => {
                self.error = error;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            Msg::HandleDrop(event) => self.handle_drop(ctx, event),
            Msg::HandlePaste(event) => self.handle_paste(ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header() }

                <main class="main-content">
                { render_upload_section(self, ctx) }
                { render_preview_area(self, ctx) }
                { render_error_message(self) }
                { render_results(self, ctx) }
                </main>

                <footer class="app-footer">
                    <p>{"Mango Leaf Analysis | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

// Handler methods
impl Model {
    fn busy(&self) -> bool {
        self.state.is_submitting()
    }

    /// Checks declared type and size before the file is read into memory.
    fn handle_file_chosen(&mut self, ctx: &Context<Self>, file: GlooFile) -> bool {
        if self.busy() {
            log::warn!("Ignoring {} while an analysis is running", file.name());
            return false;
        }
        if let Err(reason) = self
            .session
            .validator()
            .check(&file.raw_mime_type(), file.size())
        {
            log::info!("Rejected {}: {}", file.name(), reason);
            self.error = Some(reason.to_string());
            return true;
        }

        let link = ctx.link().clone();
        spawn_local(async move {
            match gloo_file::futures::read_as_bytes(&file).await {
                Ok(bytes) => link.send_message(Msg::CandidateLoaded(UploadCandidate::new(
                    file.name(),
                    file.raw_mime_type(),
                    bytes,
                ))),
                Err(e) => link.send_message(Msg::SetError(Some(format!(
                    "Failed to read {}: {}",
                    file.name(),
                    e
                )))),
            }
        });
        false
    }

    fn handle_candidate_loaded(&mut self, ctx: &Context<Self>, candidate: UploadCandidate) -> bool {
        let info = FileInfo {
            name: candidate.file_name().to_string(),
            size: candidate.size(),
        };
        match self.session.select_file(candidate) {
            Ok(task) => {
                self.file_info = Some(info);
                self.preview = None;
                self.preview_loading = true;
                self.error = None;
                let link = ctx.link().clone();
                spawn_local(async move {
                    task.run().await;
                    link.send_message(Msg::PreviewSettled);
                });
                true
            }
            Err(SessionError::Busy) => false,
            Err(e) => {
                self.error = Some(e.to_string());
                true
            }
        }
    }

    fn handle_reset(&mut self) -> bool {
        match self.session.reset() {
            Ok(()) => {
                self.preview = None;
                self.preview_loading = false;
                self.file_info = None;
                self.error = None;
                true
            }
            Err(_) => false,
        }
    }

    fn handle_analyze(&mut self, ctx: &Context<Self>) -> bool {
        if self.busy() {
            return false;
        }
        self.error = None;
        let session = Rc::clone(&self.session);
        let link = ctx.link().clone();
        spawn_local(async move {
            let outcome = session.trigger_submit().await;
            link.send_message(Msg::AnalysisFinished(outcome));
        });
        true
    }

    fn handle_analysis_finished(&mut self, outcome: Result<DetectionResult, SessionError>) -> bool {
        match outcome {
            Ok(result) => {
                log::info!("Analysis finished: {} ({}%)", result.class_name, result.confidence_percent);
                self.preview = None;
                self.file_info = None;
                true
            }
            Err(SessionError::Busy) => false,
            Err(e) => {
                self.error = Some(e.to_string());
                true
            }
        }
    }

    fn handle_state_changed(&mut self, state: SubmissionState) -> bool {
        if let SubmissionState::Failed(failure) = &state {
            self.error = Some(failure.message.clone());
        }
        self.state = state;
        true
    }

    fn handle_copy_report(&mut self) -> bool {
        let SubmissionState::Succeeded(result) = &self.state else {
            return false;
        };
        let Some(window) = web_sys::window() else {
            return false;
        };
        let promise = window.navigator().clipboard().write_text(&result.to_report());
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Clipboard write failed: {:?}", e);
            }
        });
        false
    }

    fn handle_drop(&mut self, ctx: &Context<Self>, event: DragEvent) -> bool {
        event.prevent_default();
        self.is_dragging = false;

        if let Some(file) = event
            .data_transfer()
            .and_then(|data_transfer| data_transfer.files())
            .and_then(|file_list| first_file(&file_list))
        {
            ctx.link().send_message(Msg::FileChosen(file));
        }

        true
    }

    fn handle_paste(&mut self, ctx: &Context<Self>, event: ClipboardEvent) -> bool {
        if let Some(file) = event
            .clipboard_data()
            .and_then(|data_transfer| data_transfer.files())
            .and_then(|file_list| first_file(&file_list))
        {
            event.prevent_default();
            ctx.link().send_message(Msg::FileChosen(file));
            return true;
        }
        false
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}

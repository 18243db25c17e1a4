use shared::{FileValidator, RejectReason, UploadCandidate};
use std::path::Path;

use crate::error::CliError;

/// Reads an image from disk. The size ceiling is checked against file metadata
/// before the bytes are loaded.
pub async fn load_candidate(
    path: &Path,
    validator: &FileValidator,
) -> Result<UploadCandidate, CliError> {
    let io_error = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = tokio::fs::metadata(path).await.map_err(io_error)?.len();
    if size > validator.max_bytes() {
        return Err(RejectReason::TooLarge {
            max_bytes: validator.max_bytes(),
        }
        .into());
    }

    let bytes = tokio::fs::read(path).await.map_err(io_error)?;
    let mime_type = sniff_mime(&bytes, path);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    log::debug!("Loaded {} ({} bytes, {})", file_name, bytes.len(), mime_type);
    Ok(UploadCandidate::new(file_name, mime_type, bytes))
}

/// Content sniffing first, then the file extension.
pub fn sniff_mime(bytes: &[u8], path: &Path) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
    .to_string()
}

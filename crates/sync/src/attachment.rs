//! File transfer around attachment saves.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quickorder_store::{Attachment, AttachmentOwner, NewAttachment, OrderRepository};

use crate::api::{AttachmentUpload, QuickOrderApi, StoredFile};
use crate::coordinator::{SaveOutcome, SyncCoordinator};
use crate::error::{SyncError, TransportError};

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

macro_rules! mime_types {
    ($(($ext:literal, $mime:literal)),* $(,)?) => {
        /// MIME type for a file extension; case and a leading dot are ignored.
        pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
            let extension = extension.trim_start_matches('.').to_ascii_lowercase();
            match extension.as_str() {
                $($ext => Some($mime),)*
                _ => None,
            }
        }
    };
}

mime_types![
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("csv", "text/csv"),
    ("txt", "text/plain"),
    ("xml", "application/xml"),
    ("json", "application/json"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
    ("zip", "application/zip"),
    ("msg", "application/vnd.ms-outlook"),
    ("eml", "message/rfc822"),
];

/// MIME type of a file by its name; unknown or missing extensions fall back
/// to `application/octet-stream`.
pub fn mime_type_for(file_name: &str) -> &'static str {
    file_name
        .rsplit_once('.')
        .and_then(|(_, ext)| mime_type_for_extension(ext))
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// Decoded attachment body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl<R, A> SyncCoordinator<R, A>
where
    R: OrderRepository,
    A: QuickOrderApi,
{
    /// Upload a file, then stage and submit the attachment that points at it.
    pub async fn upload_attachment(
        &self,
        owner: AttachmentOwner,
        file_name: &str,
        category: &str,
        content: Vec<u8>,
        remarks: Option<String>,
    ) -> Result<SaveOutcome, SyncError> {
        let upload = AttachmentUpload {
            file_name: file_name.to_string(),
            category: category.to_string(),
            mime_type: mime_type_for(file_name).to_string(),
            content,
        };
        let size = upload.content.len();
        let envelope = self.api().upload_attachment(upload).await?;
        if envelope.reported_failure() {
            return Err(SyncError::BusinessRejection {
                message: envelope.message.unwrap_or_else(|| format!("upload of {file_name} refused")),
            });
        }
        let stored = stored_file(&envelope.response_data)?;
        tracing::info!(%owner, file_name, size, unique_name = %stored.unique_name, "attachment uploaded");

        let mut attachment = NewAttachment::new(category, file_name).stored_as(stored.unique_name, stored.rel_path);
        if let Some(remarks) = remarks {
            attachment = attachment.remarks(remarks);
        }
        self.save_attachment(owner, attachment).await
    }

    pub async fn download_attachment(&self, attachment: &Attachment) -> Result<DownloadedFile, SyncError> {
        let unique_name = attachment
            .unique_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| TransportError::parse(format!("attachment '{}' has no stored file", attachment.name)))?;
        let envelope = self.api().download_attachment(unique_name).await?;
        if envelope.reported_failure() {
            return Err(SyncError::BusinessRejection {
                message: envelope.message.unwrap_or_else(|| format!("download of {unique_name} refused")),
            });
        }
        let bytes = decode_body(&envelope.response_data)?;
        tracing::debug!(unique_name, size = bytes.len(), "attachment downloaded");
        Ok(DownloadedFile {
            file_name: attachment.name.clone(),
            mime_type: mime_type_for(&attachment.name),
            bytes,
        })
    }
}

/// The upload result is a one-row array; a bare object is accepted too.
fn stored_file(response_data: &str) -> Result<StoredFile, TransportError> {
    if let Ok(rows) = serde_json::from_str::<Vec<StoredFile>>(response_data) {
        return rows
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::parse("upload result is empty"));
    }
    serde_json::from_str(response_data).map_err(|e| TransportError::parse(format!("upload result: {e}")))
}

/// Base64 body, possibly JSON-quoted or carrying a data-URI prefix.
fn decode_body(response_data: &str) -> Result<Vec<u8>, TransportError> {
    let trimmed = response_data.trim();
    let unquoted = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed).map_err(|e| TransportError::parse(e.to_string()))?
    } else {
        trimmed.to_string()
    };
    let payload = match unquoted.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => unquoted.as_str(),
    };
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| TransportError::parse(format!("attachment body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_lookup_ignores_case_and_leading_dot() {
        assert_eq!(mime_type_for_extension(".PDF"), Some("application/pdf"));
        assert_eq!(mime_type_for("Waybill.Scan.JPG"), "image/jpeg");
        assert_eq!(mime_type_for("README"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for("archive.rar"), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn body_decodes_from_plain_quoted_and_data_uri_forms() {
        let encoded = STANDARD.encode(b"wagon list");
        assert_eq!(decode_body(&encoded).unwrap(), b"wagon list");
        assert_eq!(decode_body(&format!("\"{encoded}\"")).unwrap(), b"wagon list");
        assert_eq!(
            decode_body(&format!("data:text/plain;base64,{encoded}")).unwrap(),
            b"wagon list"
        );
        assert!(matches!(decode_body("***"), Err(TransportError::Parse(_))));
    }

    #[test]
    fn upload_result_accepts_row_or_object() {
        let row = stored_file(r#"[{"AttachUniqueName": "u-1.pdf", "AttachRelPath": "2024/06"}]"#).unwrap();
        assert_eq!(row.unique_name, "u-1.pdf");
        let object = stored_file(r#"{"AttachUniqueName": "u-2.pdf"}"#).unwrap();
        assert_eq!(object.rel_path, "");
        assert!(stored_file("[]").is_err());
    }
}

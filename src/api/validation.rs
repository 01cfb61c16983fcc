use crate::api::errors::ApiError;
use std::path::Path;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;
const MAX_USERNAME_LEN: usize = 64;

pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    let valid = (3..=MAX_USERNAME_LEN).contains(&username.len())
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid username format".to_string()))
    }
}

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

pub(crate) fn validate_document_upload(
    filename: &str,
    content_type: &str,
    allowed_extensions: &[String],
) -> Result<(), ApiError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ApiError::BadRequest("File must have an extension".to_string()))?;

    if !allowed_extensions.iter().any(|allowed| allowed == &extension) {
        return Err(ApiError::BadRequest(format!("File extension '{extension}' is not allowed")));
    }

    let mime = content_type.trim().to_ascii_lowercase();
    if mime_allowed_for_extension(&mime, &extension) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "MIME type '{mime}' does not match extension '.{extension}'"
        )))
    }
}

fn mime_allowed_for_extension(mime: &str, extension: &str) -> bool {
    match extension {
        "pdf" => mime == "application/pdf",
        "doc" => mime == "application/msword",
        "docx" => {
            mime == "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        "ppt" => mime == "application/vnd.ms-powerpoint",
        "pptx" => {
            mime == "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        "odt" => mime == "application/vnd.oasis.opendocument.text",
        "rtf" => matches!(mime, "application/rtf" | "text/rtf"),
        _ => false,
    }
}

pub(crate) fn sanitized_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_' || *c == '-')
        .collect();

    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_format() {
        assert!(validate_username("jdoe").is_ok());
        assert!(validate_username("j.doe_2025").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("cyrillic\u{0438}").is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password_len("12345678").is_ok());
        assert!(validate_password_len("1234567").is_err());
    }

    #[test]
    fn document_upload_checks_extension_and_mime() {
        let allowed = vec!["pdf".to_string(), "docx".to_string()];
        assert!(validate_document_upload("thesis.pdf", "application/pdf", &allowed).is_ok());
        assert!(validate_document_upload(
            "thesis.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            &allowed
        )
        .is_ok());
        assert!(validate_document_upload("thesis.exe", "application/pdf", &allowed).is_err());
        assert!(validate_document_upload("thesis.pdf", "image/png", &allowed).is_err());
        assert!(validate_document_upload("noextension", "application/pdf", &allowed).is_err());
    }

    #[test]
    fn sanitized_filename_filters_disallowed_chars() {
        assert_eq!(sanitized_filename("chapter one (draft)!.pdf"), "chapteronedraft.pdf");
    }

    #[test]
    fn sanitized_filename_falls_back_on_empty() {
        assert_eq!(sanitized_filename("###"), "upload");
    }
}

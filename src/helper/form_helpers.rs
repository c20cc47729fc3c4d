use actix_multipart::Multipart;
use actix_web::{web, web::BytesMut, HttpResponse};
use futures_util::StreamExt;
use std::collections::HashMap;

/// Upper bound on the total size of a single multipart submission.
const MAX_MULTIPART_BYTES: usize = 10 * 1024 * 1024;

/// Parses URL-encoded form data from bytes, handling potential UTF-8 errors gracefully.
pub fn parse_form(form_bytes: &web::Bytes) -> Result<HashMap<String, String>, HttpResponse> {
    let body = match String::from_utf8(form_bytes.to_vec()) {
        Ok(s) => s,
        Err(_) => return Err(HttpResponse::BadRequest().body("Invalid UTF-8 in request body.")),
    };
    Ok(url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect())
}

pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Text fields and file parts of a multipart form, buffered in memory.
/// Admin forms here carry at most one small image plus a handful of text
/// inputs, so streaming to disk mid-parse is not worth the complexity.
#[derive(Default)]
pub struct ParsedForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl ParsedForm {
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", |s| s.trim())
    }

    /// Checkbox semantics: present with "on"/"true"/"1" means checked.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.text(name), "on" | "true" | "1")
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name).filter(|f| !f.bytes.is_empty())
    }
}

/// Drains a multipart payload into a `ParsedForm`. A field with a filename in
/// its content disposition is treated as a file, everything else as text.
pub async fn collect_multipart(mut payload: Multipart) -> Result<ParsedForm, HttpResponse> {
    let mut parsed = ParsedForm::default();
    let mut total: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(f) => f,
            Err(e) => {
                return Err(HttpResponse::BadRequest().body(format!("Malformed multipart: {}", e)))
            }
        };
        let disposition = field.content_disposition();
        let field_name = disposition.get_name().unwrap_or_default().to_string();
        let filename = disposition.get_filename().map(|s| s.to_string());

        let mut data = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    return Err(
                        HttpResponse::BadRequest().body(format!("Upload interrupted: {}", e))
                    )
                }
            };
            total += chunk.len();
            if total > MAX_MULTIPART_BYTES {
                return Err(HttpResponse::PayloadTooLarge()
                    .body("Submission exceeds the 10MB upload limit."));
            }
            data.extend_from_slice(&chunk);
        }

        match filename {
            Some(filename) => {
                parsed.files.insert(
                    field_name,
                    UploadedFile {
                        filename,
                        bytes: data.to_vec(),
                    },
                );
            }
            None => {
                let value = String::from_utf8(data.to_vec())
                    .map_err(|_| HttpResponse::BadRequest().body("Invalid UTF-8 in form field."))?;
                parsed.fields.insert(field_name, value);
            }
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_form_decodes_url_encoding() {
        let bytes = web::Bytes::from_static(b"title=Formatura+2026&summary=a%20b");
        let parsed = parse_form(&bytes).unwrap();
        assert_eq!(parsed.get("title").unwrap(), "Formatura 2026");
        assert_eq!(parsed.get("summary").unwrap(), "a b");
    }

    #[test]
    fn flag_accepts_checkbox_values() {
        let mut form = ParsedForm::default();
        form.fields.insert("published".into(), "on".into());
        form.fields.insert("featured".into(), "false".into());
        assert!(form.flag("published"));
        assert!(!form.flag("featured"));
        assert!(!form.flag("missing"));
    }

    #[test]
    fn empty_file_part_is_treated_as_absent() {
        let mut form = ParsedForm::default();
        form.files.insert(
            "cover_image".into(),
            UploadedFile {
                filename: "a.png".into(),
                bytes: Vec::new(),
            },
        );
        assert!(form.file("cover_image").is_none());
    }
}

//! Create/update note body: `title`, `content` and an optional `media` file.
//!
//! Accepts `multipart/form-data` (the only way to attach an image) and plain
//! `application/x-www-form-urlencoded`.

use std::future::Future;
use std::pin::Pin;

use actix_multipart::{Field, Multipart};
use actix_web::dev::{Payload, UrlEncoded};
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use serde::Deserialize;

use crate::assets::{UploadedFile, MAX_UPLOAD_BYTES};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::services::notes::NoteDraft;

const MEDIA_FIELD: &str = "media";
const URLENCODED_LIMIT_BYTES: usize = 1024 * 1024;
const TEXT_FIELD_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub draft: NoteDraft,
    pub media: Option<UploadedFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NoteFields {
    title: String,
    content: String,
}

fn malformed(e: impl std::fmt::Display) -> AppError {
    AppError::bad_request(ErrorCode::BadRequest, format!("Malformed form body: {e}"))
}

/// Collect a field's bytes, failing once more than `limit` arrive.
async fn read_field(field: &mut Field, limit: usize) -> Result<Bytes, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(malformed)?;
        if buf.len() + chunk.len() > limit {
            return Err(too_large(&name));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

fn too_large(field: &str) -> AppError {
    if field == MEDIA_FIELD {
        AppError::invalid(
            ErrorCode::UploadTooLarge,
            "Uploaded file exceeds the 5 MiB limit",
        )
    } else {
        AppError::invalid(
            ErrorCode::ValidationError,
            format!("Form field '{field}' exceeds the 1 MiB limit"),
        )
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<NoteForm, AppError> {
    let mut fields = NoteFields::default();
    let mut media = None;

    while let Some(field) = multipart.next().await {
        let mut field = field.map_err(malformed)?;
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" | "content" => {
                let bytes = read_field(&mut field, TEXT_FIELD_LIMIT_BYTES).await?;
                let text = String::from_utf8(bytes.to_vec()).map_err(malformed)?;
                if name == "title" {
                    fields.title = text;
                } else {
                    fields.content = text;
                }
            }
            MEDIA_FIELD => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_string);
                let content_type = field.content_type().map(|mime| mime.to_string());
                let bytes = read_field(&mut field, MAX_UPLOAD_BYTES).await?;
                // Browsers send an empty part when no file was chosen
                if !bytes.is_empty() {
                    media = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {
                read_field(&mut field, TEXT_FIELD_LIMIT_BYTES).await?;
            }
        }
    }

    Ok(NoteForm {
        draft: NoteDraft::new(fields.title, fields.content),
        media,
    })
}

impl FromRequest for NoteForm {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            let multipart = Multipart::new(req.headers(), payload.take());
            return Box::pin(read_multipart(multipart));
        }

        let body = UrlEncoded::<NoteFields>::new(req, payload).limit(URLENCODED_LIMIT_BYTES);
        Box::pin(async move {
            let fields = body.await.map_err(malformed)?;
            Ok(NoteForm {
                draft: NoteDraft::new(fields.title, fields.content),
                media: None,
            })
        })
    }
}

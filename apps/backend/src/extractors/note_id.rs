use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::error::AppError;
use crate::errors::ErrorCode;

/// `{id}` path segment of the single-note routes.
///
/// Anything that is not a positive integer is answered like a missing note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteId(pub i64);

fn parse_note_id(raw: Option<&str>) -> Result<NoteId, AppError> {
    raw.and_then(|s| s.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .map(NoteId)
        .ok_or_else(|| AppError::not_found(ErrorCode::NoteNotFound, "Note not found"))
}

impl FromRequest for NoteId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse_note_id(req.match_info().get("id")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids_only() {
        assert_eq!(parse_note_id(Some("42")).unwrap(), NoteId(42));
        for bad in [None, Some("0"), Some("-1"), Some("abc"), Some("")] {
            let err = parse_note_id(bad).unwrap_err();
            assert_eq!(err.code(), ErrorCode::NoteNotFound);
        }
    }
}

//! Note access control.
//!
//! Every single-note operation resolves in the same order: no caller is
//! `Unauthenticated`, a missing row is `NotFound`, someone else's row is
//! `Forbidden`. Listing never errors for anonymous callers; it is scoped to
//! the caller by construction and empty without one.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::{info, warn};

use crate::assets::{AssetStore, UploadedFile};
use crate::auth::SessionClaims;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::notes::{self, Note, NoteListFilter};

pub const PAGE_SIZE: u64 = 8;

pub const MISSING_FIELDS: &str = "Title & Content required";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    /// `oldest` sorts ascending; anything else is newest first
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("oldest") => SortOrder::Oldest,
            _ => SortOrder::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        }
    }
}

/// Normalized listing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based
    pub page: u32,
    pub sort: SortOrder,
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            sort: SortOrder::Newest,
            search: None,
        }
    }
}

impl ListQuery {
    /// Lenient parse of query-string values; junk falls back to defaults.
    pub fn from_params(page: Option<&str>, sort: Option<&str>, search: Option<&str>) -> Self {
        let page = page.and_then(leading_number).filter(|p| *p >= 1).unwrap_or(1);
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            page,
            sort: SortOrder::parse(sort),
            search,
        }
    }
}

/// Leading decimal digits after optional whitespace, so `2abc` is page 2.
fn leading_number(raw: &str) -> Option<u32> {
    let raw = raw.trim_start();
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotePage {
    pub notes: Vec<Note>,
    pub current_page: u32,
    pub total_pages: u64,
    pub total: u64,
}

/// Title and content as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Title is trimmed; both must be non-blank.
    fn validated(self) -> Result<Self, DomainError> {
        let title = self.title.trim().to_string();
        if title.is_empty() || self.content.trim().is_empty() {
            return Err(DomainError::validation(MISSING_FIELDS));
        }
        Ok(Self {
            title,
            content: self.content,
        })
    }
}

pub fn total_pages(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE).max(1)
}

fn caller_id(caller: Option<&SessionClaims>) -> Result<i64, DomainError> {
    caller
        .map(|claims| claims.user_id)
        .ok_or(DomainError::Unauthenticated)
}

fn note_not_found(note_id: i64) -> DomainError {
    DomainError::not_found(NotFoundKind::Note, format!("Note {note_id} not found"))
}

async fn load_owned<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    caller_id: i64,
    note_id: i64,
) -> Result<Note, DomainError> {
    let note = notes::find_note(conn, note_id)
        .await?
        .ok_or_else(|| note_not_found(note_id))?;

    if note.owner_id != caller_id {
        warn!(note_id, caller_id, "note access denied: not the owner");
        return Err(DomainError::forbidden("Note belongs to another user"));
    }
    Ok(note)
}

/// Hand the file to the asset store. Failures are logged and the note is
/// written without an image.
async fn store_media(assets: &dyn AssetStore, media: Option<&UploadedFile>) -> Option<String> {
    let file = media?;
    match assets.upload(file).await {
        Ok(reference) => Some(reference),
        Err(e) => {
            warn!(store = assets.name(), error = %e, "image upload failed; saving note without image");
            None
        }
    }
}

pub async fn list_notes<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    caller: Option<&SessionClaims>,
    query: &ListQuery,
) -> Result<NotePage, DomainError> {
    let Some(owner_id) = caller.map(|c| c.user_id) else {
        return Ok(NotePage {
            notes: Vec::new(),
            current_page: query.page,
            total_pages: 1,
            total: 0,
        });
    };

    let filter = NoteListFilter {
        owner_id,
        search: query.search.clone(),
        newest_first: query.sort == SortOrder::Newest,
    };

    let total = notes::count_notes(conn, &filter).await?;
    let offset = u64::from(query.page - 1) * PAGE_SIZE;
    let page = notes::find_note_page(conn, &filter, offset, PAGE_SIZE).await?;

    Ok(NotePage {
        notes: page,
        current_page: query.page,
        total_pages: total_pages(total),
        total,
    })
}

pub async fn get_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    caller: Option<&SessionClaims>,
    note_id: i64,
) -> Result<Note, DomainError> {
    let caller_id = caller_id(caller)?;
    load_owned(conn, caller_id, note_id).await
}

/// Validation happens before any upload so a rejected draft stores nothing.
pub async fn create_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    assets: &dyn AssetStore,
    caller: Option<&SessionClaims>,
    draft: NoteDraft,
    media: Option<UploadedFile>,
) -> Result<Note, DomainError> {
    let owner_id = caller_id(caller)?;
    let draft = draft.validated()?;
    let image_ref = store_media(assets, media.as_ref()).await;

    let note = notes::create_note(conn, owner_id, draft.title, draft.content, image_ref).await?;
    info!(note_id = note.id, owner_id, has_image = note.image_ref.is_some(), "note created");
    Ok(note)
}

/// Without a new (or with a failed) upload the current image is kept.
pub async fn update_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    assets: &dyn AssetStore,
    caller: Option<&SessionClaims>,
    note_id: i64,
    draft: NoteDraft,
    media: Option<UploadedFile>,
) -> Result<Note, DomainError> {
    let caller_id = caller_id(caller)?;
    let existing = load_owned(conn, caller_id, note_id).await?;
    let draft = draft.validated()?;

    let image_ref = store_media(assets, media.as_ref())
        .await
        .or(existing.image_ref);

    let note = notes::update_note(conn, note_id, draft.title, draft.content, image_ref).await?;
    info!(note_id, owner_id = caller_id, "note updated");
    Ok(note)
}

pub async fn delete_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    caller: Option<&SessionClaims>,
    note_id: i64,
) -> Result<(), DomainError> {
    let caller_id = caller_id(caller)?;
    load_owned(conn, caller_id, note_id).await?;

    if !notes::delete_note(conn, note_id).await? {
        return Err(note_not_found(note_id));
    }
    info!(note_id, owner_id = caller_id, "note deleted");
    Ok(())
}

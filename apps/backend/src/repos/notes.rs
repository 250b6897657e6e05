//! Note repository functions for domain layer (generic over ConnectionTrait).
//!
//! Nothing here checks ownership; `services::notes` does that before calling in.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::notes_sea as notes_adapter;
use crate::errors::domain::DomainError;

pub use notes_adapter::NoteListFilter;

/// Note domain model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub image_ref: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
}

pub async fn find_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    note_id: i64,
) -> Result<Option<Note>, DomainError> {
    let note = notes_adapter::find_note_by_id(conn, note_id).await?;
    Ok(note.map(Note::from))
}

pub async fn create_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner_id: i64,
    title: String,
    content: String,
    image_ref: Option<String>,
) -> Result<Note, DomainError> {
    let dto = notes_adapter::NoteCreate {
        owner_id,
        title,
        content,
        image_ref,
    };
    let note = notes_adapter::create_note(conn, dto).await?;
    Ok(Note::from(note))
}

pub async fn update_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    note_id: i64,
    title: String,
    content: String,
    image_ref: Option<String>,
) -> Result<Note, DomainError> {
    let dto = notes_adapter::NoteUpdate {
        id: note_id,
        title,
        content,
        image_ref,
    };
    let note = notes_adapter::update_note(conn, dto).await?;
    Ok(Note::from(note))
}

/// `true` if a row was removed.
pub async fn delete_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    note_id: i64,
) -> Result<bool, DomainError> {
    Ok(notes_adapter::delete_note(conn, note_id).await? > 0)
}

pub async fn count_notes<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: &NoteListFilter,
) -> Result<u64, DomainError> {
    Ok(notes_adapter::count_notes(conn, filter).await?)
}

pub async fn find_note_page<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: &NoteListFilter,
    offset: u64,
    limit: u64,
) -> Result<Vec<Note>, DomainError> {
    let notes = notes_adapter::find_note_page(conn, filter, offset, limit).await?;
    Ok(notes.into_iter().map(Note::from).collect())
}

impl From<crate::entities::notes::Model> for Note {
    fn from(model: crate::entities::notes::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            content: model.content,
            image_ref: model.image_ref,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

//! DTOs for notes_sea adapter.

#[derive(Debug, Clone)]
pub struct NoteCreate {
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub image_ref: Option<String>,
}

/// Full replacement of the mutable note fields; `image_ref` is the value to store.
#[derive(Debug, Clone)]
pub struct NoteUpdate {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_ref: Option<String>,
}

/// Owner-scoped listing filter.
#[derive(Debug, Clone)]
pub struct NoteListFilter {
    pub owner_id: i64,
    /// Case-insensitive title substring; `None` lists everything
    pub search: Option<String>,
    pub newest_first: bool,
}

pub mod current_user;
pub mod note_form;
pub mod note_id;

pub use current_user::{CurrentUser, MaybeUser};
pub use note_form::NoteForm;
pub use note_id::NoteId;

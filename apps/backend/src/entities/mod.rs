pub mod notes;
pub mod users;

pub use notes::Entity as Notes;
pub use notes::Model as Note;
pub use users::Entity as Users;
pub use users::Model as User;

pub mod claims;
pub mod cookie;
pub mod jwt;
pub mod password;
pub mod session;

pub use claims::{SessionClaims, SessionIdentity};
pub use session::{build_session_backend, SessionBackend, TokenRejection};

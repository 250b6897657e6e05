//! View models handed to the template layer.
//!
//! Handlers call [`render`] with a view name and its data; the response is a
//! JSON document `{ "view": ..., "data": ... }` that an HTML renderer (or a
//! test) consumes.

use actix_web::HttpResponse;
use serde::Serialize;

use crate::auth::SessionClaims;
use crate::flash::FlashMessage;
use crate::repos::notes::Note;

pub const INDEX: &str = "index";
pub const LOGIN: &str = "login";
pub const REGISTER: &str = "register";
pub const VIEW: &str = "view";
pub const EDIT: &str = "edit";

#[derive(Debug, Serialize)]
pub struct ViewModel<'a, T: Serialize> {
    pub view: &'a str,
    pub data: &'a T,
}

pub fn render<T: Serialize>(view: &str, data: &T) -> HttpResponse {
    HttpResponse::Ok().json(ViewModel { view, data })
}

/// Who is browsing; absent for anonymous visitors
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ViewUser {
    pub id: i64,
    pub username: String,
}

impl From<&SessionClaims> for ViewUser {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexView {
    pub notes: Vec<Note>,
    pub current_page: u32,
    pub total_pages: u64,
    pub current_sort: &'static str,
    pub search_query: String,
    pub messages: Vec<FlashMessage>,
    pub user: Option<ViewUser>,
}

#[derive(Debug, Serialize)]
pub struct NoteView {
    pub note: Note,
    pub user: ViewUser,
}

#[derive(Debug, Serialize, Default)]
pub struct LoginView {
    pub error: bool,
}

#[derive(Debug, Serialize, Default)]
pub struct RegisterView {}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[actix_web::test]
    async fn render_wraps_data_with_view_name() {
        let res = render(LOGIN, &LoginView { error: true });
        assert_eq!(res.status().as_u16(), 200);

        let body = to_bytes(res.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "view": "login", "data": { "error": true } }));
    }
}

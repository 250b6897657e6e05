use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::see_other;
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::errors::ErrorCode;
use crate::extractors::{CurrentUser, MaybeUser, NoteForm, NoteId};
use crate::flash::{self, FlashMessage};
use crate::middleware::RequireAuth;
use crate::services::notes::{self, ListQuery};
use crate::state::app_state::AppState;
use crate::views::{render, IndexView, NoteView, ViewUser, EDIT, INDEX, VIEW};

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    page: Option<String>,
    sort: Option<String>,
    search: Option<String>,
}

/// Someone else's note is reported exactly like a missing one.
fn conceal(err: DomainError) -> AppError {
    match err {
        DomainError::Forbidden(_) | DomainError::NotFound(NotFoundKind::Note, _) => {
            AppError::not_found(ErrorCode::NoteNotFound, "Note not found")
        }
        other => other.into(),
    }
}

fn back_home_with(message: FlashMessage) -> HttpResponse {
    see_other("/")
        .cookie(flash::flash_cookie(&[message]))
        .finish()
}

/// Validation failures become an error flash on `/`; everything else is a problem response.
fn finish_mutation<T>(
    result: Result<T, DomainError>,
    success: &str,
) -> Result<HttpResponse, AppError> {
    match result {
        Ok(_) => Ok(back_home_with(FlashMessage::success(success))),
        Err(DomainError::Validation(detail)) => Ok(back_home_with(FlashMessage::error(detail))),
        Err(e) => Err(conceal(e)),
    }
}

async fn index(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    user: MaybeUser,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let query = ListQuery::from_params(
        params.page.as_deref(),
        params.sort.as_deref(),
        params.search.as_deref(),
    );
    let db = app_state.require_db()?;
    let page = notes::list_notes(db, user.claims(), &query).await?;

    let pending = flash::take(&req);
    let had_flash = pending.is_some();

    let view = IndexView {
        notes: page.notes,
        current_page: page.current_page,
        total_pages: page.total_pages,
        current_sort: query.sort.as_str(),
        search_query: query.search.unwrap_or_default(),
        messages: pending.unwrap_or_default(),
        user: user.claims().map(ViewUser::from),
    };

    let mut res = render(INDEX, &view);
    if had_flash {
        res.add_cookie(&flash::clear_flash_cookie())
            .map_err(|e| AppError::internal(format!("Failed to clear flash cookie: {e}")))?;
    }
    Ok(res)
}

async fn add_note(
    app_state: web::Data<AppState>,
    user: CurrentUser,
    form: NoteForm,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let result = notes::create_note(
        db,
        app_state.assets.as_ref(),
        Some(user.claims()),
        form.draft,
        form.media,
    )
    .await;
    finish_mutation(result, "Note created successfully!")
}

async fn view_note(
    app_state: web::Data<AppState>,
    user: CurrentUser,
    note_id: NoteId,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let note = notes::get_note(db, Some(user.claims()), note_id.0)
        .await
        .map_err(conceal)?;
    Ok(render(
        VIEW,
        &NoteView {
            note,
            user: ViewUser::from(user.claims()),
        },
    ))
}

async fn edit_note(
    app_state: web::Data<AppState>,
    user: CurrentUser,
    note_id: NoteId,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let note = notes::get_note(db, Some(user.claims()), note_id.0)
        .await
        .map_err(conceal)?;
    Ok(render(
        EDIT,
        &NoteView {
            note,
            user: ViewUser::from(user.claims()),
        },
    ))
}

async fn update_note(
    app_state: web::Data<AppState>,
    user: CurrentUser,
    note_id: NoteId,
    form: NoteForm,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let result = notes::update_note(
        db,
        app_state.assets.as_ref(),
        Some(user.claims()),
        note_id.0,
        form.draft,
        form.media,
    )
    .await;
    finish_mutation(result, "Note updated successfully!")
}

async fn delete_note(
    app_state: web::Data<AppState>,
    user: CurrentUser,
    note_id: NoteId,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let result = notes::delete_note(db, Some(user.claims()), note_id.0).await;
    finish_mutation(result, "Note deleted successfully!")
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .service(
            web::resource("/add-note")
                .wrap(RequireAuth)
                .route(web::post().to(add_note)),
        )
        .service(
            web::resource("/view-note/{id}")
                .wrap(RequireAuth)
                .route(web::get().to(view_note)),
        )
        .service(
            web::resource("/edit-note/{id}")
                .wrap(RequireAuth)
                .route(web::get().to(edit_note)),
        )
        .service(
            web::resource("/update-note/{id}")
                .wrap(RequireAuth)
                .route(web::post().to(update_note)),
        )
        .service(
            web::resource("/delete-note/{id}")
                .wrap(RequireAuth)
                .route(web::post().to(delete_note)),
        );
}

//! SeaORM adapter for note repository.

use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, NotSet, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::entities::notes;

pub mod dto;

pub use dto::{NoteCreate, NoteListFilter, NoteUpdate};

const LIKE_ESCAPE: char = '\\';

pub async fn find_note_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    note_id: i64,
) -> Result<Option<notes::Model>, sea_orm::DbErr> {
    notes::Entity::find_by_id(note_id).one(conn).await
}

pub async fn create_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: NoteCreate,
) -> Result<notes::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let note_active = notes::ActiveModel {
        id: NotSet,
        owner_id: Set(dto.owner_id),
        title_folded: Set(fold_title(&dto.title)),
        title: Set(dto.title),
        content: Set(dto.content),
        image_ref: Set(dto.image_ref),
        created_at: Set(now),
        updated_at: Set(now),
    };

    note_active.insert(conn).await
}

pub async fn update_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: NoteUpdate,
) -> Result<notes::Model, sea_orm::DbErr> {
    let existing = notes::Entity::find_by_id(dto.id)
        .one(conn)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("note {} not found", dto.id)))?;

    let mut note_active = existing.into_active_model();
    note_active.title_folded = Set(fold_title(&dto.title));
    note_active.title = Set(dto.title);
    note_active.content = Set(dto.content);
    note_active.image_ref = Set(dto.image_ref);
    note_active.updated_at = Set(time::OffsetDateTime::now_utc());

    note_active.update(conn).await
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete_note<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    note_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = notes::Entity::delete_by_id(note_id).exec(conn).await?;
    Ok(result.rows_affected)
}

pub async fn count_notes<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: &NoteListFilter,
) -> Result<u64, sea_orm::DbErr> {
    scoped(filter).count(conn).await
}

/// One page of the owner's notes. With a search term, rows are ranked
/// exact title (3) > title prefix (2) > substring (1) before creation order.
pub async fn find_note_page<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: &NoteListFilter,
    offset: u64,
    limit: u64,
) -> Result<Vec<notes::Model>, sea_orm::DbErr> {
    let mut query = scoped(filter);

    if let Some(term) = filter.search.as_deref() {
        let term = fold_title(term);
        let prefix = format!("{}%", escape_like(&term));
        let relevance = Expr::case(notes::Column::TitleFolded.eq(term), Expr::val(3))
            .case(
                Expr::col(notes::Column::TitleFolded)
                    .like(LikeExpr::new(prefix).escape(LIKE_ESCAPE)),
                Expr::val(2),
            )
            .finally(Expr::val(1));
        query = query.order_by(SimpleExpr::Case(Box::new(relevance)), Order::Desc);
    }

    let order = if filter.newest_first {
        Order::Desc
    } else {
        Order::Asc
    };

    query
        .order_by(notes::Column::CreatedAt, order.clone())
        .order_by(notes::Column::Id, order)
        .offset(offset)
        .limit(limit)
        .all(conn)
        .await
}

fn scoped(filter: &NoteListFilter) -> Select<notes::Entity> {
    let query = notes::Entity::find().filter(notes::Column::OwnerId.eq(filter.owner_id));
    match filter.search.as_deref() {
        Some(term) => {
            let pattern = format!("%{}%", escape_like(&fold_title(term)));
            query.filter(
                Expr::col(notes::Column::TitleFolded)
                    .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            )
        }
        None => query,
    }
}

/// Case folding for search, done here rather than with SQL `LOWER()`, which
/// only folds ASCII on SQLite.
pub fn fold_title(title: &str) -> String {
    title.to_lowercase()
}

/// Escape LIKE wildcards so user input only ever matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

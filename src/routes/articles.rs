use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, put};
use axum::{Json, Router};
use validator::Validate;

use crate::articles::wall::WallRequest;
use crate::articles::{
    listing_query, Article, ArticlePatch, ArticleStore, NewArticle, WallEntry,
};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::filter::ArticleFilter;
use crate::kinds::ArticleKind;
use crate::pagination::{PageQuery, PaginatedResult};
use crate::state::AppState;

pub fn router<K: ArticleKind>() -> Router<AppState> {
    let base = format!("/{}", K::PATH);
    Router::new()
        .route(&base, get(list::<K>).post(create::<K>))
        .route(&format!("{}/{{id}}/{{slug}}", base), get(show::<K>))
        .route(
            &format!("{}/{{id}}", base),
            patch(update::<K>).delete(remove::<K>),
        )
        .route(
            &format!("{}/wall/{{id}}", base),
            put(set_wall::<K>).delete(remove_wall::<K>),
        )
}

/// True when `id` is a draft the viewer may not see. Unknown ids are left for
/// the caller's store to report.
pub(super) fn draft_hidden<K: ArticleKind>(
    state: &AppState,
    id: &str,
    can_curate: bool,
) -> AppResult<bool> {
    if can_curate {
        return Ok(false);
    }
    let draft = ArticleStore::<K>::new(state.db.clone()).is_draft(id)?;
    Ok(draft == Some(true))
}

pub(super) fn hidden_article<K: ArticleKind>(id: &str) -> AppError {
    AppError::NotFound(format!("{} {} not found", K::PATH, id))
}

async fn list<K: ArticleKind>(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(page): Query<PageQuery>,
    Query(common): Query<ArticleFilter>,
    Query(extra): Query<K::Filter>,
) -> AppResult<Json<PaginatedResult<Article<K::Details>>>> {
    page.validate()?;
    common.validate()?;
    let request = page.to_request()?;

    let query = listing_query::<K>(&common, &extra, viewer.can_curate());
    let store = ArticleStore::<K>::new(state.db.clone());
    let total_count = store.count_matching(&query)?;
    let data = store.list(&query, &request, viewer.username())?;

    Ok(Json(PaginatedResult::new(
        &request,
        total_count,
        data,
        &state.links,
        K::PATH,
    )))
}

async fn show<K: ArticleKind>(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((id, slug)): Path<(String, String)>,
) -> AppResult<Json<Article<K::Details>>> {
    let article =
        ArticleStore::<K>::new(state.db.clone()).get_by_id_and_slug(&id, &slug, viewer.username())?;
    if article.draft && !viewer.can_curate() {
        return Err(hidden_article::<K>(&id));
    }
    Ok(Json(article))
}

async fn create<K: ArticleKind>(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<NewArticle<K::Details>>,
) -> AppResult<(StatusCode, Json<Article<K::Details>>)> {
    user.require_curator()?;
    new.validate()?;
    let article = ArticleStore::<K>::new(state.db.clone()).create(new)?;
    Ok((StatusCode::CREATED, Json(article)))
}

async fn update<K: ArticleKind>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<ArticlePatch<K::DetailsPatch>>,
) -> AppResult<Json<Article<K::Details>>> {
    user.require_curator()?;
    patch.validate()?;
    let article = ArticleStore::<K>::new(state.db.clone()).update(&id, patch)?;
    Ok(Json(article))
}

async fn remove<K: ArticleKind>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    user.require_curator()?;
    ArticleStore::<K>::new(state.db.clone()).delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_wall<K: ArticleKind>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<WallRequest>,
) -> AppResult<Json<WallEntry>> {
    if draft_hidden::<K>(&state, &id, user.role.can_curate())? {
        return Err(hidden_article::<K>(&id));
    }
    let entry = ArticleStore::<K>::new(state.db.clone()).set_wall(&id, &user.username, req.status)?;
    Ok(Json(entry))
}

async fn remove_wall<K: ArticleKind>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    ArticleStore::<K>::new(state.db.clone()).remove_wall(&id, &user.username)?;
    Ok(StatusCode::NO_CONTENT)
}

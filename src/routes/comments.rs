use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use validator::Validate;

use crate::comments::{Comment, CommentStore, NewComment};
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::pagination::{PageQuery, PaginatedResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/comments/{username}", get(list).post(create))
        .route("/comments/id/{id}", delete(remove))
}

async fn list(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResult<Comment>>> {
    page.validate()?;
    let request = page.to_request()?;
    let result = CommentStore::new(state.db.clone()).list_for_user(&username, &request, &state.links)?;
    Ok(Json(result))
}

async fn create(
    State(state): State<AppState>,
    author: CurrentUser,
    Path(username): Path<String>,
    Json(new): Json<NewComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    new.validate()?;
    let comment =
        CommentStore::new(state.db.clone()).create_comment(&username, new, &author.requester())?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    CommentStore::new(state.db.clone()).delete_comment(&id, &user.requester())?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::kinds::ArticleKind;
use crate::pagination::{PageQuery, PaginatedResult};
use crate::reviews::{NewReview, Review, ReviewPatch, ReviewScope, ReviewStore, SubScores};
use crate::state::AppState;

use super::articles::{draft_hidden, hidden_article};

pub fn router<K: ArticleKind>() -> Router<AppState> {
    let base = format!("/{}/reviews", K::PATH);
    Router::new()
        .route(
            &format!("{}/article/{{id}}", base),
            get(list_for_article::<K>).post(create::<K>),
        )
        .route(&format!("{}/user/{{username}}", base), get(list_for_user::<K>))
        .route(
            &format!("{}/{{review_id}}", base),
            patch(update::<K>).delete(remove::<K>),
        )
}

fn reject_unsupported<K: ArticleKind>(scores: &SubScores) -> AppResult<()> {
    let unsupported = scores.unsupported::<K>();
    if unsupported.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "{} reviews do not take: {}",
            K::PATH,
            unsupported.join(", ")
        )))
    }
}

async fn list<K: ArticleKind>(
    state: &AppState,
    page: PageQuery,
    scope: ReviewScope,
) -> AppResult<Json<PaginatedResult<Review>>> {
    page.validate()?;
    let request = page.to_request()?;
    let result =
        ReviewStore::<K>::new(state.db.clone()).list_reviews(&request, &scope, &state.links)?;
    Ok(Json(result))
}

async fn list_for_article<K: ArticleKind>(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResult<Review>>> {
    let hidden = draft_hidden::<K>(&state, &id, viewer.can_curate())?;
    let scope = ReviewScope::Article(id);
    if hidden {
        // same page an unknown article gets
        page.validate()?;
        let request = page.to_request()?;
        return Ok(Json(PaginatedResult::new(
            &request,
            0,
            Vec::new(),
            &state.links,
            &scope.resource_path::<K>(),
        )));
    }
    list::<K>(&state, page, scope).await
}

async fn list_for_user<K: ArticleKind>(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResult<Review>>> {
    list::<K>(&state, page, ReviewScope::User(username)).await
}

async fn create<K: ArticleKind>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(new): Json<NewReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    new.validate()?;
    reject_unsupported::<K>(&new.scores)?;
    if draft_hidden::<K>(&state, &id, user.role.can_curate())? {
        return Err(hidden_article::<K>(&id));
    }
    let review =
        ReviewStore::<K>::new(state.db.clone()).create_review(&id, new, &user.requester())?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn update<K: ArticleKind>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(review_id): Path<String>,
    Json(patch): Json<ReviewPatch>,
) -> AppResult<Json<Review>> {
    patch.validate()?;
    reject_unsupported::<K>(&patch.scores)?;
    let review = ReviewStore::<K>::new(state.db.clone()).update_review(
        &review_id,
        patch,
        &user.requester(),
    )?;
    Ok(Json(review))
}

async fn remove<K: ArticleKind>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(review_id): Path<String>,
) -> AppResult<StatusCode> {
    ReviewStore::<K>::new(state.db.clone()).delete_review(&review_id, &user.requester())?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{Book, Game};

    #[test]
    fn unsupported_scores_are_named() {
        let scores = SubScores {
            art: Some(4),
            ..Default::default()
        };
        match reject_unsupported::<Book>(&scores) {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "books reviews do not take: art"),
            other => panic!("unexpected {:?}", other),
        }
        let scores = SubScores {
            music: Some(9),
            ..Default::default()
        };
        assert!(reject_unsupported::<Game>(&scores).is_ok());
    }
}

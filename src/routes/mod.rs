pub mod articles;
pub mod auth;
pub mod comments;
pub mod reviews;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::kinds::{ArticleKind, Book, Comic, Game, Manga};
use crate::state::AppState;

/// Article and review routes for one kind.
fn kind<K: ArticleKind>() -> Router<AppState> {
    articles::router::<K>().merge(reviews::router::<K>())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(kind::<Book>())
        .merge(kind::<Comic>())
        .merge(kind::<Game>())
        .merge(kind::<Manga>())
        .merge(comments::router())
        .merge(auth::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

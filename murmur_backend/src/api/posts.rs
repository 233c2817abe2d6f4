use super::{ApiError, ApiResult, AppState};
use crate::feed::{FeedEntry, FeedService, DEFAULT_FEED_LIMIT};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct FeedParams {
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedResponse {
    posts: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePostRequest {
    body: String,
}

pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> ApiResult<FeedResponse> {
    let service = FeedService::new(state.database.clone());
    let limit = params.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    let posts = service.list_recent(limit)?;
    Ok(Json(FeedResponse { posts }))
}

pub(crate) async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<FeedEntry>), ApiError> {
    let (user, _) = state.authorize(&headers)?;
    let service = FeedService::new(state.database.clone());
    let entry = service.create_post(&user.id, &request.body)?;

    tracing::info!(post_id = %entry.post.id, author = %entry.author.handle, "post created");
    Ok((StatusCode::CREATED, Json(entry)))
}

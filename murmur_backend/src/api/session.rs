use super::{ApiError, ApiResult, AppState};
use crate::accounts::{AccountService, SignInProfile};
use crate::feed::AuthorView;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct SignInRequest {
    handle: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    token: String,
    user: AuthorView,
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    version: &'static str,
    api_port: u16,
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        api_port: state.config.api_port,
    })
}

pub(crate) async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let service = AccountService::new(state.database.clone());
    let user = service.sign_in(SignInProfile {
        handle: request.handle,
        display_name: request.display_name,
        avatar_url: request.avatar_url,
    })?;
    let token = state.sessions.issue(&user.id)?;

    tracing::info!(handle = %user.handle, "session issued");
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token,
            user: AuthorView::from_record(user),
        }),
    ))
}

pub(crate) async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<AuthorView> {
    let (user, _) = state.authorize(&headers)?;
    Ok(Json(AuthorView::from_record(user)))
}

pub(crate) async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let (_, session_id) = state.authorize(&headers)?;
    state.sessions.revoke(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

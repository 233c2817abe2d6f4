use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::models::{
    AuthorView, CreatePostInput, FeedEntry, FeedResponse, SessionResponse, SignInInput,
};

/// Failures the UI distinguishes: a structured error body from the server
/// (possibly naming the offending field) vs. a transport problem.
#[derive(Debug, thiserror::Error)]
pub enum ApiFailure {
    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        field: Option<String>,
    },
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl ApiFailure {
    /// Returns the server's message when it names the given field.
    pub fn field_message(&self, field: &str) -> Option<&str> {
        match self {
            ApiFailure::Api {
                field: Some(f),
                message,
                ..
            } if f == field => Some(message),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiFailure::Api { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    field: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base = sanitize_base_url(base_url.into())?;
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base,
            token: None,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<()> {
        self.base_url = sanitize_base_url(base_url.into())?;
        Ok(())
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn sign_in(&self, input: &SignInInput) -> Result<SessionResponse, ApiFailure> {
        let url = self.url("/session")?;
        let response = self.execute(self.client.post(url).json(input))?;
        decode(response)
    }

    pub fn current_user(&self) -> Result<AuthorView, ApiFailure> {
        let url = self.url("/session/me")?;
        let response = self.execute(self.client.get(url))?;
        decode(response)
    }

    pub fn sign_out(&self) -> Result<(), ApiFailure> {
        let url = self.url("/session")?;
        let response = self.execute(self.client.delete(url))?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(error_from(response))
    }

    pub fn fetch_feed(&self) -> Result<Vec<FeedEntry>, ApiFailure> {
        let url = self.url("/posts")?;
        let response = self.execute(self.client.get(url))?;
        let feed: FeedResponse = decode(response)?;
        Ok(feed.posts)
    }

    pub fn create_post(&self, input: &CreatePostInput) -> Result<FeedEntry, ApiFailure> {
        let url = self.url("/posts")?;
        let response = self.execute(self.client.post(url).json(input))?;
        decode(response)
    }

    fn execute(&self, request: RequestBuilder) -> Result<Response, ApiFailure> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        request
            .send()
            .map_err(|err| ApiFailure::Transport(anyhow::Error::new(err)))
    }

    fn url(&self, path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).context("invalid base URL")?;
        url.set_path(path.trim_start_matches('/'));
        Ok(url)
    }
}

fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiFailure> {
    if response.status().is_success() {
        return response
            .json::<T>()
            .map_err(|err| ApiFailure::Transport(anyhow::Error::new(err)));
    }
    Err(error_from(response))
}

fn error_from(response: Response) -> ApiFailure {
    let status = response.status();
    match response.json::<ErrorBody>() {
        Ok(body) => ApiFailure::Api {
            status,
            message: body.message,
            field: body.field,
        },
        Err(_) => ApiFailure::Api {
            status,
            message: format!("request failed with status {status}"),
            field: None,
        },
    }
}

/// Shared client for one-off downloads (avatars) that may point at hosts
/// other than the API.
pub fn shared_client() -> Result<Client> {
    static SHARED: OnceLock<Client> = OnceLock::new();
    if let Some(client) = SHARED.get() {
        return Ok(client.clone());
    }
    let client = Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .context("failed to build HTTP client")?;
    let _ = SHARED.set(client.clone());
    Ok(client)
}

fn sanitize_base_url(mut base: String) -> Result<String> {
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{base}");
    }
    // Remove trailing slash for consistency
    while base.ends_with('/') {
        base.pop();
    }
    // Validate once
    let _ = Url::parse(&base).context("invalid base URL")?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitize_base_url_adds_scheme_and_trims_slashes() {
        assert_eq!(
            sanitize_base_url("127.0.0.1:8080".into()).unwrap(),
            "http://127.0.0.1:8080"
        );
        assert_eq!(
            sanitize_base_url("https://murmur.example/".into()).unwrap(),
            "https://murmur.example"
        );
        assert!(sanitize_base_url("http://".into()).is_err());
    }

    #[test]
    fn error_bodies_decode_field_names() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"posts may not be empty","field":"content"}"#)
                .unwrap();
        assert_eq!(body.field.as_deref(), Some("content"));

        let body: ErrorBody = serde_json::from_str(r#"{"message":"internal server error"}"#).unwrap();
        assert_eq!(body.field, None);
    }

    #[test]
    fn field_message_matches_only_the_named_field() {
        let failure = ApiFailure::Api {
            status: StatusCode::BAD_REQUEST,
            message: "posts may not be empty".into(),
            field: Some("content".into()),
        };
        assert_eq!(
            failure.field_message("content"),
            Some("posts may not be empty")
        );
        assert_eq!(failure.field_message("handle"), None);

        let generic = ApiFailure::Api {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".into(),
            field: None,
        };
        assert_eq!(generic.field_message("content"), None);
        assert!(!generic.is_unauthorized());
    }
}

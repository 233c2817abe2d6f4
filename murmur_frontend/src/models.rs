use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub post: PostView,
    pub author: AuthorView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<FeedEntry>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct SignInInput {
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct CreatePostInput {
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: AuthorView,
}

use crate::models::{AuthorView, FeedEntry};

#[derive(Default)]
pub struct SessionState {
    pub user: Option<AuthorView>,
    /// True while a cached token is being checked against the server.
    pub is_loading: bool,
}

#[derive(Default)]
pub struct SignInState {
    pub handle_input: String,
    pub display_name_input: String,
    pub submitting: bool,
    pub error: Option<String>,
}

#[derive(Default)]
pub struct ComposerState {
    pub input: String,
    pub sending: bool,
}

#[derive(Default)]
pub struct FeedState {
    pub entries: Vec<FeedEntry>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct LoadedImage {
    pub size: [usize; 2],
    pub pixels: Vec<u8>,
}

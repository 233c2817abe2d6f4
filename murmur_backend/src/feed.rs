use crate::database::models::{PostRecord, UserRecord};
use crate::database::repositories::{PostRepository, UserRepository};
use crate::database::Database;
use crate::utils::now_utc_iso;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub const MAX_POST_CHARS: usize = 280;
pub const DEFAULT_FEED_LIMIT: usize = 50;
pub const MAX_FEED_LIMIT: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct FeedService {
    database: Database,
}

impl FeedService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Validates and stores a new post, returning it joined with its author.
    pub fn create_post(&self, author_id: &str, body: &str) -> Result<FeedEntry, FeedError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(FeedError::Validation {
                field: "content",
                message: "posts may not be empty".into(),
            });
        }
        if body.chars().count() > MAX_POST_CHARS {
            return Err(FeedError::Validation {
                field: "content",
                message: format!("posts are limited to {MAX_POST_CHARS} characters"),
            });
        }

        let record = PostRecord {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            body: body.to_string(),
            created_at: now_utc_iso(),
        };

        let entry = self.database.with_repositories(|repos| {
            let author = repos
                .users()
                .get(author_id)?
                .ok_or_else(|| anyhow!("unknown author {author_id}"))?;
            repos.posts().create(&record)?;
            Ok(FeedEntry {
                post: PostView::from_record(record),
                author: AuthorView::from_record(author),
            })
        })?;
        Ok(entry)
    }

    /// Newest-first feed, each post joined with its author record.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<FeedEntry>, FeedError> {
        let limit = limit.min(MAX_FEED_LIMIT);
        let entries = self.database.with_repositories(|repos| {
            let posts = repos.posts().list_recent(limit)?;
            let mut authors: HashMap<String, AuthorView> = HashMap::new();
            let mut entries = Vec::with_capacity(posts.len());
            for post in posts {
                let author = match authors.get(&post.author_id) {
                    Some(author) => author.clone(),
                    None => {
                        let record = repos.users().get(&post.author_id)?.ok_or_else(|| {
                            anyhow!("post {} references missing author {}", post.id, post.author_id)
                        })?;
                        let author = AuthorView::from_record(record);
                        authors.insert(post.author_id.clone(), author.clone());
                        author
                    }
                };
                entries.push(FeedEntry {
                    post: PostView::from_record(post),
                    author,
                });
            }
            Ok(entries)
        })?;
        Ok(entries)
    }
}

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
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl PostView {
    fn from_record(record: PostRecord) -> Self {
        Self {
            id: record.id,
            author_id: record.author_id,
            body: record.body,
            created_at: record.created_at,
        }
    }
}

impl AuthorView {
    pub fn from_record(record: UserRecord) -> Self {
        Self {
            id: record.id,
            handle: record.handle,
            display_name: record.display_name,
            avatar_url: record.avatar_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountService, SignInProfile};
    use rusqlite::Connection;

    fn setup_services() -> (FeedService, AccountService) {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        (FeedService::new(db.clone()), AccountService::new(db))
    }

    fn sign_in(accounts: &AccountService, handle: &str) -> String {
        accounts
            .sign_in(SignInProfile {
                handle: handle.into(),
                display_name: None,
                avatar_url: None,
            })
            .expect("sign in")
            .id
    }

    #[test]
    fn create_post_rejects_empty_body() {
        let (feed, accounts) = setup_services();
        let author = sign_in(&accounts, "alice");
        let err = feed.create_post(&author, "   ").expect_err("empty accepted");
        match err {
            FeedError::Validation { field, .. } => assert_eq!(field, "content"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn create_post_rejects_oversized_body() {
        let (feed, accounts) = setup_services();
        let author = sign_in(&accounts, "alice");
        let body = "x".repeat(MAX_POST_CHARS + 1);
        let err = feed.create_post(&author, &body).expect_err("oversize accepted");
        match err {
            FeedError::Validation { field, message } => {
                assert_eq!(field, "content");
                assert!(message.contains("280"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn feed_lists_posts_newest_first_with_authors() {
        let (feed, accounts) = setup_services();
        let alice = sign_in(&accounts, "alice");
        let bob = sign_in(&accounts, "bob");

        feed.create_post(&alice, "first").expect("first post");
        feed.create_post(&bob, "second").expect("second post");

        let entries = feed.list_recent(10).expect("list feed");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].post.body, "second");
        assert_eq!(entries[0].author.handle, "bob");
        assert_eq!(entries[1].post.body, "first");
        assert_eq!(entries[1].author.handle, "alice");
    }

    #[test]
    fn feed_limit_is_capped() {
        let (feed, accounts) = setup_services();
        let alice = sign_in(&accounts, "alice");
        for i in 0..5 {
            feed.create_post(&alice, &format!("post {i}")).expect("post");
        }
        let entries = feed.list_recent(2).expect("list feed");
        assert_eq!(entries.len(), 2);

        // asking beyond the cap never errors
        let entries = feed.list_recent(100_000).expect("list feed");
        assert_eq!(entries.len(), 5);
    }
}

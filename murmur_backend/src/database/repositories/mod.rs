mod posts;
mod sessions;
mod users;

use super::models::{PostRecord, SessionRecord, UserRecord};
use anyhow::Result;
use rusqlite::Connection;

pub trait UserRepository {
    fn upsert(&self, record: &UserRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<UserRecord>>;
    fn get_by_handle(&self, handle: &str) -> Result<Option<UserRecord>>;
}

pub trait PostRepository {
    fn create(&self, record: &PostRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<PostRecord>>;
    fn list_recent(&self, limit: usize) -> Result<Vec<PostRecord>>;
}

pub trait SessionRepository {
    fn create(&self, record: &SessionRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<SessionRecord>>;
    fn revoke(&self, id: &str) -> Result<()>;
}

/// Thin wrapper handing out rusqlite-backed repository implementations
/// scoped to one borrowed connection.
pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn users(&self) -> impl UserRepository + '_ {
        users::SqliteUserRepository { conn: self.conn }
    }

    pub fn posts(&self) -> impl PostRepository + '_ {
        posts::SqlitePostRepository { conn: self.conn }
    }

    pub fn sessions(&self) -> impl SessionRepository + '_ {
        sessions::SqliteSessionRepository { conn: self.conn }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MIGRATIONS;

    fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        conn.execute_batch(MIGRATIONS).expect("migrations");
        conn
    }

    fn sample_user(id: &str, handle: &str) -> UserRecord {
        UserRecord {
            id: id.into(),
            handle: handle.into(),
            display_name: Some("Alice".into()),
            avatar_url: None,
            created_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn user_and_post_repositories_work() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);

        let user = sample_user("user-1", "alice");
        repos.users().upsert(&user).unwrap();

        let fetched = repos.users().get("user-1").unwrap().unwrap();
        assert_eq!(fetched.handle, "alice");
        let by_handle = repos.users().get_by_handle("alice").unwrap().unwrap();
        assert_eq!(by_handle.id, "user-1");

        let post = PostRecord {
            id: "post-1".into(),
            author_id: user.id.clone(),
            body: "Hello".into(),
            created_at: "2024-01-01T00:00:01Z".into(),
        };
        repos.posts().create(&post).unwrap();

        let posts = repos.posts().list_recent(10).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].body, "Hello");
        assert!(repos.posts().get("post-1").unwrap().is_some());
    }

    #[test]
    fn user_upsert_updates_profile_fields() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);

        let mut user = sample_user("user-1", "alice");
        repos.users().upsert(&user).unwrap();

        user.display_name = Some("Alice A.".into());
        user.avatar_url = Some("https://example.com/alice.png".into());
        repos.users().upsert(&user).unwrap();

        let fetched = repos.users().get("user-1").unwrap().unwrap();
        assert_eq!(fetched.display_name.as_deref(), Some("Alice A."));
        assert_eq!(
            fetched.avatar_url.as_deref(),
            Some("https://example.com/alice.png")
        );
    }

    #[test]
    fn session_repository_round_trips_and_revokes() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);

        repos.users().upsert(&sample_user("user-1", "alice")).unwrap();

        let session = SessionRecord {
            id: "session-1".into(),
            user_id: "user-1".into(),
            issued_at: "2024-01-01T00:00:00Z".into(),
            expires_at: "2024-01-31T00:00:00Z".into(),
            revoked: false,
        };
        repos.sessions().create(&session).unwrap();

        let fetched = repos.sessions().get("session-1").unwrap().unwrap();
        assert!(!fetched.revoked);

        repos.sessions().revoke("session-1").unwrap();
        let fetched = repos.sessions().get("session-1").unwrap().unwrap();
        assert!(fetched.revoked);
    }
}

use crate::database::models::UserRecord;
use crate::database::repositories::UserRepository;
use crate::database::Database;
use crate::utils::now_utc_iso;
use anyhow::Result;
use uuid::Uuid;

pub const MAX_HANDLE_CHARS: usize = 32;

/// Identity asserted at sign-in. Credential verification happens upstream of
/// this service; murmur only records who the provider says the user is.
#[derive(Debug, Clone)]
pub struct SignInProfile {
    pub handle: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct AccountService {
    database: Database,
}

impl AccountService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Resolves a sign-in to a user record, creating it on first sight and
    /// refreshing display name / avatar when the provider supplies them.
    pub fn sign_in(&self, profile: SignInProfile) -> Result<UserRecord, AccountError> {
        let handle = normalize_handle(&profile.handle)?;
        let user = self.database.with_repositories(|repos| {
            let users = repos.users();
            if let Some(mut existing) = users.get_by_handle(&handle)? {
                if profile.display_name.is_some() {
                    existing.display_name = profile.display_name.clone();
                }
                if profile.avatar_url.is_some() {
                    existing.avatar_url = profile.avatar_url.clone();
                }
                users.upsert(&existing)?;
                return Ok(existing);
            }

            let record = UserRecord {
                id: Uuid::new_v4().to_string(),
                handle: handle.clone(),
                display_name: profile.display_name.clone(),
                avatar_url: profile.avatar_url.clone(),
                created_at: now_utc_iso(),
            };
            users.upsert(&record)?;
            Ok(record)
        })?;
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        self.database.with_repositories(|repos| repos.users().get(id))
    }
}

fn normalize_handle(raw: &str) -> Result<String, AccountError> {
    let handle = raw.trim().to_lowercase();
    if handle.is_empty() {
        return Err(AccountError::Validation {
            field: "handle",
            message: "handle may not be empty".into(),
        });
    }
    if handle.chars().count() > MAX_HANDLE_CHARS {
        return Err(AccountError::Validation {
            field: "handle",
            message: format!("handles are limited to {MAX_HANDLE_CHARS} characters"),
        });
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(AccountError::Validation {
            field: "handle",
            message: "handles may only contain letters, numbers, and underscores".into(),
        });
    }
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup_service() -> AccountService {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        AccountService::new(db)
    }

    fn profile(handle: &str) -> SignInProfile {
        SignInProfile {
            handle: handle.into(),
            display_name: None,
            avatar_url: None,
        }
    }

    #[test]
    fn sign_in_creates_user_once() {
        let service = setup_service();
        let first = service.sign_in(profile("Alice")).expect("first sign-in");
        assert_eq!(first.handle, "alice");

        let second = service
            .sign_in(SignInProfile {
                handle: "alice".into(),
                display_name: Some("Alice A.".into()),
                avatar_url: None,
            })
            .expect("second sign-in");
        assert_eq!(second.id, first.id);
        assert_eq!(second.display_name.as_deref(), Some("Alice A."));
    }

    #[test]
    fn sign_in_rejects_invalid_handles() {
        let service = setup_service();
        let too_long = "x".repeat(33);
        for bad in ["", "   ", "not a handle", "way@off", too_long.as_str()] {
            let err = service.sign_in(profile(bad)).expect_err("handle accepted");
            match err {
                AccountError::Validation { field, .. } => assert_eq!(field, "handle"),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }
}

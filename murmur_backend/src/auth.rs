use crate::config::MurmurPaths;
use crate::database::models::SessionRecord;
use crate::database::repositories::SessionRepository;
use crate::database::Database;
use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use uuid::Uuid;

pub const SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Session row id, so individual tokens can be revoked.
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user_id: String,
    pub session_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct SessionService {
    database: Database,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionService {
    pub fn new(database: Database, secret: &[u8]) -> Self {
        Self {
            database,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mints a signed bearer token backed by a session row.
    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let expires = now + Duration::days(SESSION_TTL_DAYS);
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            issued_at: now.to_rfc3339(),
            expires_at: expires.to_rfc3339(),
            revoked: false,
        };
        self.database
            .with_repositories(|repos| repos.sessions().create(&record))?;

        let claims = Claims {
            sub: record.user_id.clone(),
            sid: record.id.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("failed to sign session token")
    }

    /// Verifies a bearer token and checks the backing session is still live.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedSession, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|err| AuthError::Unauthorized(format!("invalid session token: {err}")))?;
        let claims = data.claims;

        let session = self
            .database
            .with_repositories(|repos| repos.sessions().get(&claims.sid))?;
        let session = session.ok_or_else(|| AuthError::Unauthorized("unknown session".into()))?;
        if session.revoked {
            return Err(AuthError::Unauthorized("session has been revoked".into()));
        }
        if session.user_id != claims.sub {
            return Err(AuthError::Unauthorized(
                "session does not match token subject".into(),
            ));
        }
        Ok(AuthenticatedSession {
            user_id: session.user_id,
            session_id: session.id,
        })
    }

    pub fn revoke(&self, session_id: &str) -> Result<()> {
        self.database
            .with_repositories(|repos| repos.sessions().revoke(session_id))
    }
}

/// Resolves the HS256 signing secret: configured value first, then the
/// persisted key file, else a fresh secret written for future runs.
pub fn load_or_create_secret(paths: &MurmurPaths, configured: Option<&str>) -> Result<Vec<u8>> {
    if let Some(secret) = configured {
        return Ok(secret.as_bytes().to_vec());
    }
    if paths.session_secret_path.exists() {
        let hex = fs::read_to_string(&paths.session_secret_path)
            .context("failed to read session secret file")?;
        return decode_hex(hex.trim());
    }

    let mut secret = [0u8; 32];
    rand::rng().fill(&mut secret[..]);
    fs::write(&paths.session_secret_path, encode_hex(&secret))
        .context("failed to persist session secret")?;
    Ok(secret.to_vec())
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_hex(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(anyhow!("session secret file is corrupt"));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| anyhow!("session secret file is corrupt"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountService, SignInProfile};
    use rusqlite::Connection;

    fn setup() -> (SessionService, String) {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        let user = AccountService::new(db.clone())
            .sign_in(SignInProfile {
                handle: "alice".into(),
                display_name: None,
                avatar_url: None,
            })
            .expect("sign in");
        (SessionService::new(db, b"test-secret"), user.id)
    }

    #[test]
    fn issued_tokens_verify() {
        let (sessions, user_id) = setup();
        let token = sessions.issue(&user_id).expect("issue token");
        let auth = sessions.verify(&token).expect("verify token");
        assert_eq!(auth.user_id, user_id);
    }

    #[test]
    fn revoked_sessions_are_rejected() {
        let (sessions, user_id) = setup();
        let token = sessions.issue(&user_id).expect("issue token");
        let auth = sessions.verify(&token).expect("verify token");

        sessions.revoke(&auth.session_id).expect("revoke");
        let err = sessions.verify(&token).expect_err("revoked token accepted");
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let (sessions, user_id) = setup();
        let token = sessions.issue(&user_id).expect("issue token");

        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        let other = SessionService::new(db, b"different-secret");
        let err = other.verify(&token).expect_err("foreign token accepted");
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[test]
    fn hex_round_trip() {
        let bytes = [0u8, 1, 0xab, 0xff];
        assert_eq!(decode_hex(&encode_hex(&bytes)).unwrap(), bytes.to_vec());
        assert!(decode_hex("abc").is_err());
        assert!(decode_hex("zz").is_err());
    }
}

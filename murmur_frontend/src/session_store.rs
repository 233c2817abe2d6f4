//! Caches the session token under the user's home directory so a restart
//! does not sign the user out.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

fn session_file() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not resolve home directory")?;
    Ok(home.join(".murmur").join("session"))
}

pub fn load_token() -> Option<String> {
    let path = session_file().ok()?;
    let raw = fs::read_to_string(path).ok()?;
    let token = raw.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub fn save_token(token: &str) -> Result<()> {
    let path = session_file()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create session directory")?;
    }
    fs::write(&path, token).context("failed to write session file")?;
    Ok(())
}

pub fn clear_token() -> Result<()> {
    let path = session_file()?;
    if path.exists() {
        fs::remove_file(&path).context("failed to remove session file")?;
    }
    Ok(())
}

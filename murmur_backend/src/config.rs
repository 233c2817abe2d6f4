use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct MurmurConfig {
    pub api_port: u16,
    pub paths: MurmurPaths,
    /// Session signing secret. When unset, one is generated and persisted
    /// under `keys/` on first run.
    pub session_secret: Option<String>,
}

impl MurmurConfig {
    pub fn from_env() -> Result<Self> {
        let paths = match env::var("MURMUR_BASE_DIR") {
            Ok(base) if !base.trim().is_empty() => MurmurPaths::from_base_dir(base)?,
            _ => MurmurPaths::discover()?,
        };
        let api_port = env::var("MURMUR_API_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8080);
        let session_secret = env::var("MURMUR_SESSION_SECRET")
            .ok()
            .filter(|raw| !raw.trim().is_empty());
        Ok(Self {
            api_port,
            paths,
            session_secret,
        })
    }

    pub fn new(api_port: u16, paths: MurmurPaths) -> Self {
        Self {
            api_port,
            paths,
            session_secret: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MurmurPaths {
    pub base: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub keys_dir: PathBuf,
    pub session_secret_path: PathBuf,
    pub logs_dir: PathBuf,
}

impl MurmurPaths {
    pub fn discover() -> Result<Self> {
        let exe_path = std::env::current_exe()
            .map_err(|err| anyhow!("failed to resolve current executable: {err}"))?;
        let base = exe_path
            .parent()
            .ok_or_else(|| anyhow!("executable path missing parent"))?
            .to_path_buf();
        Self::from_base_dir(base)
    }

    pub fn from_base_dir<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("data");
        let db_path = data_dir.join("murmur.db");
        let keys_dir = base.join("keys");
        let session_secret_path = keys_dir.join("session.secret");
        let logs_dir = base.join("logs");

        Ok(Self {
            base,
            data_dir,
            db_path,
            keys_dir,
            session_secret_path,
            logs_dir,
        })
    }
}

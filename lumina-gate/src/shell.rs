//! Shell-side login state.
//!
//! The admission core hands out sessions but never stores them. The
//! shell keeps the current session and an optionally remembered key in
//! `shell.json` next to the device identity. Logout clears the session
//! and leaves the remembered key alone.

use anyhow::{Context, Result};
use lumina_license::Session;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the shell state inside the state directory.
pub const SHELL_FILE: &str = "shell.json";

/// What the shell remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellState {
    /// Present while signed in.
    pub session: Option<Session>,
    /// Key pre-filled on the next key login.
    pub remembered_key: Option<String>,
}

impl ShellState {
    /// Records a successful key login. `remember` keeps the key for next
    /// time; otherwise any previously remembered key is forgotten.
    pub fn key_login(&mut self, session: Session, key: &str, remember: bool) {
        self.session = Some(session);
        self.remembered_key = remember.then(|| key.trim().to_string());
    }

    /// Records a successful credential login.
    pub fn credential_login(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Signs out. Returns true if a session was open.
    pub fn logout(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Returns true if the current session is an admin session.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_admin)
    }
}

/// Reads and writes [`ShellState`].
#[derive(Debug, Clone)]
pub struct ShellStore {
    path: PathBuf,
}

impl ShellStore {
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SHELL_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state; a missing file is the signed-out default.
    pub fn load(&self) -> Result<ShellState> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("corrupt shell state {}", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ShellState::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }

    /// Persists the state atomically.
    pub fn save(&self, state: &ShellState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(state)?)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

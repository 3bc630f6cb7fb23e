//! Process-wide authentication state.
//!
//! [`SessionStore`] is a single-writer, multi-reader cell: sign-in and
//! sign-out replace the whole [`Session`], readers take a snapshot or
//! [`subscribe`](SessionStore::subscribe) to changes. The last write wins.
//! When a path is configured every write is mirrored to a JSON file so the
//! session survives restarts.

use std::{
    fs,
    path::{Path, PathBuf},
};

use api_types::auth::{Role, SignedIn};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{AppError, Result};

/// Signed-out is `{access_token: null, role: null, is_logged_in: false}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub role: Option<Role>,
    #[serde(default)]
    pub name: String,
    pub is_logged_in: bool,
}

impl Session {
    fn signed_in(data: SignedIn) -> Self {
        Self {
            access_token: Some(data.access_token),
            role: Some(data.role),
            name: data.name,
            is_logged_in: true,
        }
    }

    /// Bearer token, when there is one to send.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| self.is_logged_in && !token.is_empty())
    }

    /// `admin`, `user`, or `signed out` when there is no role.
    pub fn role_label(&self) -> &'static str {
        self.role.map_or("signed out", Role::as_str)
    }

    pub fn is_admin(&self) -> bool {
        self.is_logged_in && self.role.is_some_and(Role::is_admin)
    }
}

/// Receives the session-invalidated event published by the gateway.
pub trait SessionObserver: Send + Sync {
    fn on_session_invalidated(&self);
}

#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    cell: watch::Sender<Session>,
}

impl SessionStore {
    /// A store that is never written to disk.
    pub fn in_memory(session: Session) -> Self {
        Self {
            path: None,
            cell: watch::Sender::new(session),
        }
    }

    /// Restore the session kept at `path`, or start signed out.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let session = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Session::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path: Some(path),
            cell: watch::Sender::new(session),
        })
    }

    pub fn snapshot(&self) -> Session {
        self.cell.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.cell.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.cell.borrow().token().map(str::to_string)
    }

    pub fn sign_in(&self, data: SignedIn) -> Result<Session> {
        let session = Session::signed_in(data);
        self.replace(session.clone())?;
        tracing::info!(name = %session.name, role = ?session.role, "signed in");
        Ok(session)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.replace(Session::default())?;
        tracing::info!("signed out");
        Ok(())
    }

    /// The current session, or [`AppError::NotSignedIn`].
    pub fn require_signed_in(&self) -> Result<Session> {
        let session = self.snapshot();
        if session.token().is_none() {
            return Err(AppError::NotSignedIn);
        }
        Ok(session)
    }

    /// The current session if it belongs to an administrator.
    pub fn require_admin(&self) -> Result<Session> {
        let session = self.require_signed_in()?;
        if !session.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(session)
    }

    fn replace(&self, session: Session) -> Result<()> {
        self.cell.send_replace(session.clone());
        if let Some(path) = &self.path {
            write_json_file(path, &session)?;
        }
        Ok(())
    }
}

impl SessionObserver for SessionStore {
    fn on_session_invalidated(&self) {
        if let Err(err) = self.replace(Session::default()) {
            tracing::error!("failed to persist cleared session: {err}");
        }
    }
}

fn write_json_file(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(session)?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> SignedIn {
        SignedIn {
            access_token: "t0k".to_string(),
            role: Role::Admin,
            name: "Anu".to_string(),
        }
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("leadbook_session_{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn starts_signed_out() {
        let store = SessionStore::in_memory(Session::default());
        assert!(store.token().is_none());
        assert!(matches!(store.require_signed_in(), Err(AppError::NotSignedIn)));
    }

    #[test]
    fn role_checks() {
        let store = SessionStore::in_memory(Session::default());
        store.sign_in(admin()).unwrap();
        assert!(store.require_admin().is_ok());

        store
            .sign_in(SignedIn {
                role: Role::User,
                ..admin()
            })
            .unwrap();
        assert!(store.require_signed_in().is_ok());
        assert!(matches!(store.require_admin(), Err(AppError::Forbidden)));
    }

    #[test]
    fn invalidation_clears_everything() {
        let store = SessionStore::in_memory(Session::default());
        let mut watcher = store.subscribe();
        store.sign_in(admin()).unwrap();
        assert!(watcher.has_changed().unwrap());
        assert_eq!(watcher.borrow_and_update().name, "Anu");

        store.on_session_invalidated();
        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), Session::default());
        assert_eq!(
            serde_json::to_value(store.snapshot()).unwrap(),
            serde_json::json!({
                "access_token": null,
                "role": null,
                "name": "",
                "is_logged_in": false
            })
        );
        assert_eq!(store.snapshot().role_label(), "signed out");
    }

    #[test]
    fn cleared_session_is_persisted_without_a_role() {
        let path = temp_path();
        let store = SessionStore::load(&path).unwrap();
        store.sign_in(admin()).unwrap();
        store.on_session_invalidated();

        let stored: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored["role"], serde_json::Value::Null);
        assert_eq!(stored["access_token"], serde_json::Value::Null);
        assert_eq!(stored["is_logged_in"], false);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn persists_between_loads() {
        let path = temp_path();
        let store = SessionStore::load(&path).unwrap();
        store.sign_in(admin()).unwrap();

        let restored = SessionStore::load(&path).unwrap();
        assert_eq!(restored.token().as_deref(), Some("t0k"));

        restored.sign_out().unwrap();
        let cleared = SessionStore::load(&path).unwrap();
        assert_eq!(cleared.snapshot(), Session::default());
        let _ = fs::remove_file(path);
    }
}

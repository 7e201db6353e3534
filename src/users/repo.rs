use std::path::Path;

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, warn};

use super::dto::{User, UserDraft, UserPatch};
use super::id::{format_id, parse_id};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Required keys absent from a create/replace body.
    #[error("Missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error("User not found")]
    NotFound,
}

/// In-memory user records plus the counter that mints their IDs.
///
/// Invariant: every assigned ID parses below `next_seq`, and `next_seq` only
/// grows, so IDs of deleted records are never handed out again.
#[derive(Debug, Clone)]
pub struct UserStore {
    users: Vec<User>,
    next_seq: u64,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::init(Vec::new())
    }
}

impl UserStore {
    pub fn init(seed: Vec<User>) -> Self {
        let next_seq = seed
            .iter()
            .map(|u| parse_id(&u.id))
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        Self { users: seed, next_seq }
    }

    /// Reads the seed file once. A missing file yields an empty store.
    pub async fn load_seed(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "seed file not found; starting empty");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read seed file {}", path.display()))
            }
        };
        let seed: Vec<User> = serde_json::from_str(&raw)
            .with_context(|| format!("parse seed file {}", path.display()))?;
        if let Some(user) = seed.iter().find(|u| parse_id(&u.id) == u64::MAX) {
            anyhow::bail!(
                "seed file {} holds id {} which leaves no room for new ids",
                path.display(),
                user.id
            );
        }
        debug!(count = seed.len(), path = %path.display(), "seed loaded");
        Ok(Self::init(seed))
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn list(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: &str) -> Result<&User, StoreError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)
    }

    /// Stores the fields exactly as sent.
    pub fn create(&mut self, draft: UserDraft) -> Result<User, StoreError> {
        let (name, email, status) = require_all(draft)?;
        let user = User {
            id: format_id(self.next_seq),
            name,
            email,
            status,
        };
        self.next_seq = self.next_seq.saturating_add(1);
        self.users.push(user.clone());
        debug!(id = %user.id, next_seq = self.next_seq, "user created");
        Ok(user)
    }

    /// Full overwrite of name/email/status; ID and position are kept. Only
    /// the name is trimmed.
    pub fn replace(&mut self, id: &str, draft: UserDraft) -> Result<User, StoreError> {
        let (name, email, status) = require_all(draft)?;
        let user = self.find_mut(id)?;
        user.name = name.trim().to_string();
        user.email = email;
        user.status = status;
        Ok(user.clone())
    }

    pub fn patch(&mut self, id: &str, patch: UserPatch) -> Result<User, StoreError> {
        let user = self.find_mut(id)?;
        if let Some(name) = patch.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            user.email = email.trim().to_string();
        }
        if let Some(status) = patch.status {
            user.status = status.trim().to_string();
        }
        Ok(user.clone())
    }

    pub fn remove(&mut self, id: &str) -> Result<User, StoreError> {
        let idx = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        let removed = self.users.remove(idx);
        debug!(id = %removed.id, "user removed");
        Ok(removed)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut User, StoreError> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)
    }
}

fn require_all(draft: UserDraft) -> Result<(String, String, String), StoreError> {
    let missing = draft.missing_fields();
    match draft {
        UserDraft {
            name: Some(name),
            email: Some(email),
            status: Some(status),
        } => Ok((name, email, status)),
        _ => Err(StoreError::Validation { missing }),
    }
}

//! Client-side copy of the user list, kept in step with server responses.
//!
//! The snapshot is only touched after the server acknowledges an operation:
//! a create appends, an update replaces in place, a delete removes. Failures
//! leave the snapshot alone (except `reload`, which empties it) and surface
//! their message through `error`.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::api::{ClientError, UserApi, GENERIC_ERROR};
use super::confirm::Confirm;
use crate::users::dto::{User, UserDraft, UserPatch};

pub const CREATE_SUCCESS_TTL: Duration = Duration::from_millis(5000);
pub const SUCCESS_TTL: Duration = Duration::from_millis(3000);
const DELETE_FAILED: &str = "Failed to delete. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Nothing fetched yet.
    Idle,
    Loading,
    /// At least one reload finished; see `error` / `success`.
    Ready,
}

#[derive(Debug, Default)]
struct SyncState {
    users: Vec<User>,
    loading: bool,
    loaded: bool,
    error: Option<String>,
    success: Option<String>,
    success_gen: u64,
    selected_ids: BTreeSet<String>,
}

fn lock(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resets `loading` however the reload future ends, including cancellation.
struct LoadingGuard<'a>(&'a Mutex<SyncState>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        lock(self.0).loading = false;
    }
}

pub struct UserListSync {
    api: Arc<dyn UserApi>,
    confirm: Arc<dyn Confirm>,
    state: Arc<Mutex<SyncState>>,
    clear_timer: Mutex<Option<AbortHandle>>,
    activated: AtomicBool,
}

impl UserListSync {
    pub fn new(api: Arc<dyn UserApi>, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            api,
            confirm,
            state: Arc::default(),
            clear_timer: Mutex::new(None),
            activated: AtomicBool::new(false),
        }
    }

    /// Builds the synchroniser and runs its initial reload.
    pub async fn mount(api: Arc<dyn UserApi>, confirm: Arc<dyn Confirm>) -> Self {
        let sync = Self::new(api, confirm);
        sync.activate().await;
        sync
    }

    /// Runs the first reload; later calls are no-ops.
    pub async fn activate(&self) {
        if !self.activated.swap(true, Ordering::SeqCst) {
            self.reload().await;
        }
    }

    pub fn users(&self) -> Vec<User> {
        lock(&self.state).users.clone()
    }

    pub fn loading(&self) -> bool {
        lock(&self.state).loading
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    pub fn success(&self) -> Option<String> {
        lock(&self.state).success.clone()
    }

    pub fn phase(&self) -> SyncPhase {
        let state = lock(&self.state);
        if state.loading {
            SyncPhase::Loading
        } else if state.loaded {
            SyncPhase::Ready
        } else {
            SyncPhase::Idle
        }
    }

    pub async fn reload(&self) {
        {
            let mut state = lock(&self.state);
            state.loading = true;
            state.error = None;
        }
        let _loading = LoadingGuard(&self.state);

        let result = self.api.fetch_users().await;

        let mut state = lock(&self.state);
        state.loaded = true;
        match result {
            Ok(users) => {
                debug!(count = users.len(), "snapshot reloaded");
                state.users = users;
            }
            Err(e) => {
                warn!(error = ?e, "reload failed");
                state.error = Some(message_or(&e, GENERIC_ERROR));
                state.users.clear();
            }
        }
    }

    /// Read-through lookup; the snapshot is not touched.
    pub async fn fetch_user_item(&self, id: &str) -> Option<User> {
        match self.api.fetch_user(id).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(%id, error = ?e, "fetch failed");
                lock(&self.state).error = Some(message_or(&e, GENERIC_ERROR));
                None
            }
        }
    }

    pub async fn create_user_item(&self, draft: UserDraft) -> Option<User> {
        match self.api.create_user(&draft).await {
            Ok(created) => {
                lock(&self.state).users.push(created.clone());
                info!(id = %created.id, "user appended to snapshot");
                self.set_success(
                    format!("User \"{}\" created successfully!", created.name),
                    CREATE_SUCCESS_TTL,
                );
                Some(created)
            }
            Err(e) => {
                warn!(error = ?e, "create failed");
                lock(&self.state).error = Some(message_or(&e, GENERIC_ERROR));
                None
            }
        }
    }

    pub async fn update_user_item(&self, id: &str, draft: UserDraft) -> Option<User> {
        let result = self.api.update_user(id, &draft).await;
        self.apply_update(id, result)
    }

    pub async fn patch_user_item(&self, id: &str, patch: UserPatch) -> Option<User> {
        let result = self.api.patch_user(id, &patch).await;
        self.apply_update(id, result)
    }

    /// Asks for confirmation, then deletes. Returns whether the record is gone.
    pub async fn delete_user_item(&self, user: &User) -> bool {
        let prompt = format!("Delete user \"{}\" (ID {})?", user.name, user.id);
        if !self.confirm.confirm(&prompt).await {
            debug!(id = %user.id, "delete declined");
            return false;
        }

        match self.api.delete_user(&user.id).await {
            Ok(()) => {
                lock(&self.state).users.retain(|u| u.id != user.id);
                info!(id = %user.id, "user removed from snapshot");
                self.set_success(format!("User \"{}\" deleted.", user.name), SUCCESS_TTL);
                true
            }
            Err(e) => {
                warn!(id = %user.id, error = ?e, "delete failed");
                lock(&self.state).error = Some(message_or(&e, DELETE_FAILED));
                false
            }
        }
    }

    pub fn clear_messages(&self) {
        self.cancel_clear_timer();
        let mut state = lock(&self.state);
        state.error = None;
        state.success = None;
    }

    pub fn selected_ids(&self) -> BTreeSet<String> {
        lock(&self.state).selected_ids.clone()
    }

    pub fn select(&self, id: &str) {
        lock(&self.state).selected_ids.insert(id.to_string());
    }

    pub fn deselect(&self, id: &str) {
        lock(&self.state).selected_ids.remove(id);
    }

    /// Flips selection of `id`; returns whether it is now selected.
    pub fn toggle_selected(&self, id: &str) -> bool {
        let mut state = lock(&self.state);
        if state.selected_ids.remove(id) {
            false
        } else {
            state.selected_ids.insert(id.to_string());
            true
        }
    }

    pub fn clear_selection(&self) {
        lock(&self.state).selected_ids.clear();
    }

    fn apply_update(&self, id: &str, result: Result<User, ClientError>) -> Option<User> {
        match result {
            Ok(updated) => {
                {
                    let mut state = lock(&self.state);
                    if let Some(slot) = state.users.iter_mut().find(|u| u.id == updated.id) {
                        *slot = updated.clone();
                    }
                }
                self.set_success(
                    format!("User \"{}\" updated successfully!", updated.name),
                    SUCCESS_TTL,
                );
                Some(updated)
            }
            Err(e) => {
                warn!(%id, error = ?e, "update failed");
                lock(&self.state).error = Some(message_or(&e, GENERIC_ERROR));
                None
            }
        }
    }

    /// Shows `message` and schedules its removal, replacing any pending
    /// removal so an older timer cannot wipe a newer message.
    fn set_success(&self, message: String, ttl: Duration) {
        self.cancel_clear_timer();

        let generation = {
            let mut state = lock(&self.state);
            state.success = Some(message);
            state.error = None;
            state.success_gen += 1;
            state.success_gen
        };

        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut state = lock(&state);
            if state.success_gen == generation {
                state.success = None;
            }
        });
        *self
            .clear_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle.abort_handle());
    }

    fn cancel_clear_timer(&self) {
        let pending = self
            .clear_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = pending {
            handle.abort();
        }
    }
}

impl Drop for UserListSync {
    fn drop(&mut self) {
        self.cancel_clear_timer();
    }
}

fn message_or(e: &ClientError, fallback: &str) -> String {
    let message = e.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod id;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub use dto::{User, UserDraft, UserPatch};
pub use repo::{StoreError, UserStore};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}

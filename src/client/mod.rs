//! Client-side building blocks for an admin UI talking to the users API.

pub mod api;
pub mod confirm;
pub mod form;
pub mod search;
pub mod sync;

pub use api::{ApiClient, ClientError, UserApi};
pub use confirm::{AutoConfirm, Confirm};
pub use form::{UserForm, UserFormData};
pub use search::{name_search, Search, SearchOptions, Searchable};
pub use sync::{SyncPhase, UserListSync};

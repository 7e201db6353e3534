//! Draft state for the create/edit user form.
//!
//! Errors are recomputed on every mutation, so they always match the current
//! draft. `show_errors` only decides whether a UI should display them.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::users::dto::{User, UserDraft};

pub const STATUSES: [&str; 2] = ["Active", "Inactive"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFormData {
    pub name: String,
    pub email: String,
    pub status: String,
}

/// Per-field messages; an empty string means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: String,
    pub email: String,
    pub status: String,
}

impl FormErrors {
    fn of(data: &UserFormData) -> Self {
        Self {
            name: name_error(&data.name).unwrap_or_default().to_string(),
            email: email_error(&data.email).unwrap_or_default().to_string(),
            status: status_error(&data.status).unwrap_or_default().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.status.is_empty()
    }
}

pub(crate) fn name_error(name: &str) -> Option<&'static str> {
    lazy_static! {
        static ref NAME_RE: Regex = Regex::new(r"^[\p{L}\p{N}\s\-\.+]{2,50}$").unwrap();
    }
    let name = name.trim();
    // Length is measured in UTF-16 code units, as browsers report it.
    let len = name.encode_utf16().count();
    if name.is_empty() {
        Some("Name is required.")
    } else if len < 2 {
        Some("Name must be at least 2 characters.")
    } else if len > 50 {
        Some("Name must be at most 50 characters.")
    } else if !NAME_RE.is_match(name) {
        Some("Invalid characters.")
    } else {
        None
    }
}

pub(crate) fn email_error(email: &str) -> Option<&'static str> {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    }
    let email = email.trim();
    if email.is_empty() {
        Some("Email is required.")
    } else if !EMAIL_RE.is_match(email) {
        Some("Invalid email address.")
    } else {
        None
    }
}

pub(crate) fn status_error(status: &str) -> Option<&'static str> {
    let status = status.trim();
    if status.is_empty() {
        Some("Status is required.")
    } else if !STATUSES.contains(&status) {
        Some("Status must be Active or Inactive.")
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct UserForm {
    data: UserFormData,
    errors: FormErrors,
    show_errors: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self::new(UserFormData::default())
    }
}

impl UserForm {
    pub fn new(initial: UserFormData) -> Self {
        let errors = FormErrors::of(&initial);
        Self {
            data: initial,
            errors,
            show_errors: false,
        }
    }

    pub fn data(&self) -> &UserFormData {
        &self.data
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn name_error(&self) -> &str {
        &self.errors.name
    }

    pub fn email_error(&self) -> &str {
        &self.errors.email
    }

    pub fn status_error(&self) -> &str {
        &self.errors.status
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn show_errors(&self) -> bool {
        self.show_errors
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.data.name = name.into();
        self.revalidate();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.data.email = email.into();
        self.revalidate();
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.data.status = status.into();
        self.revalidate();
    }

    /// Replaces the whole draft; fields are not merged.
    pub fn set_form_data(&mut self, data: &UserFormData) {
        self.data = data.clone();
        self.revalidate();
    }

    pub fn set_show_errors(&mut self, show: bool) {
        self.show_errors = show;
    }

    pub fn reset_form(&mut self) {
        self.data = UserFormData::default();
        self.show_errors = false;
        self.revalidate();
    }

    /// Trimmed draft ready to send as a create or full-update body.
    pub fn payload(&self) -> UserDraft {
        UserDraft::new(
            self.data.name.trim(),
            self.data.email.trim(),
            self.data.status.trim(),
        )
    }

    fn revalidate(&mut self) {
        self.errors = FormErrors::of(&self.data);
    }
}

impl From<&User> for UserFormData {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            status: user.status.clone(),
        }
    }
}

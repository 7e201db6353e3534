//! Substring / exact-match filtering over a list of records.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::users::dto::User;

/// Exposes the text-valued fields of a record by name.
pub trait Searchable {
    fn text_fields(&self) -> Vec<(&str, &str)>;
}

impl Searchable for User {
    fn text_fields(&self) -> Vec<(&str, &str)> {
        vec![
            ("id", self.id.as_str()),
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("status", self.status.as_str()),
        ]
    }
}

/// JSON objects expose their string-valued keys; anything else has none.
impl Searchable for Value {
    fn text_fields(&self) -> Vec<(&str, &str)> {
        match self {
            Value::Object(map) => map
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Receives the item and the trimmed search term.
pub type CustomFilter<T> = Arc<dyn Fn(&T, &str) -> bool + Send + Sync>;

pub struct SearchOptions<T> {
    /// Fields to match; empty means every text field of the item.
    pub search_fields: Vec<String>,
    pub case_sensitive: bool,
    pub exact_match: bool,
    pub custom_filter: Option<CustomFilter<T>>,
}

impl<T> Default for SearchOptions<T> {
    fn default() -> Self {
        Self {
            search_fields: Vec::new(),
            case_sensitive: false,
            exact_match: false,
            custom_filter: None,
        }
    }
}

impl<T> Clone for SearchOptions<T> {
    fn clone(&self) -> Self {
        Self {
            search_fields: self.search_fields.clone(),
            case_sensitive: self.case_sensitive,
            exact_match: self.exact_match,
            custom_filter: self.custom_filter.clone(),
        }
    }
}

impl<T> fmt::Debug for SearchOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("search_fields", &self.search_fields)
            .field("case_sensitive", &self.case_sensitive)
            .field("exact_match", &self.exact_match)
            .field("custom_filter", &self.custom_filter.is_some())
            .finish()
    }
}

/// Holds a source list and a term; `filtered_items` is refreshed whenever
/// either changes.
#[derive(Debug, Clone)]
pub struct Search<T> {
    items: Vec<T>,
    term: String,
    options: SearchOptions<T>,
    filtered: Vec<T>,
}

impl<T: Searchable + Clone> Search<T> {
    pub fn new(items: Vec<T>, options: SearchOptions<T>) -> Self {
        let mut search = Self {
            filtered: items.clone(),
            items,
            term: String::new(),
            options,
        };
        search.refresh();
        search
    }

    pub fn search_term(&self) -> &str {
        &self.term
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn filtered_items(&self) -> &[T] {
        &self.filtered
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.refresh();
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
        self.refresh();
    }

    pub fn clear_search(&mut self) {
        self.term.clear();
        self.refresh();
    }

    fn refresh(&mut self) {
        let query = self.term.trim();
        if query.is_empty() {
            self.filtered = self.items.clone();
            return;
        }

        let opts = &self.options;
        self.filtered = self
            .items
            .iter()
            .filter(|item| match &opts.custom_filter {
                Some(filter) => filter(*item, query),
                None => matches(*item, query, opts),
            })
            .cloned()
            .collect();
    }
}

fn matches<T: Searchable>(item: &T, query: &str, opts: &SearchOptions<T>) -> bool {
    let normalize = |s: &str| {
        if opts.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };
    let query = normalize(query);

    item.text_fields()
        .into_iter()
        .filter(|(field, _)| {
            opts.search_fields.is_empty() || opts.search_fields.iter().any(|f| f == field)
        })
        .any(|(_, value)| {
            let value = normalize(value);
            if opts.exact_match {
                value == query
            } else {
                value.contains(&query)
            }
        })
}

pub const DEFAULT_NAME_FIELD: &str = "name";

/// Case-insensitive substring search on a single field, `"name"` unless
/// another is given.
pub fn name_search<T: Searchable + Clone>(items: Vec<T>, field: Option<&str>) -> Search<T> {
    Search::new(
        items,
        SearchOptions {
            search_fields: vec![field.unwrap_or(DEFAULT_NAME_FIELD).to_string()],
            ..SearchOptions::default()
        },
    )
}

//! Declarative form definitions: field lists with a required rule each.
//! Multi-select fields arrive as repeated keys, hence `axum_extra::extract::Form`.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct FormError {
    pub field: &'static str,
    pub message: &'static str,
}

fn required(field: &'static str, value: &str, errors: &mut Vec<FormError>) {
    if value.trim().is_empty() {
        errors.push(FormError {
            field,
            message: "This field is required.",
        });
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub provider: String,
    /// Checkbox: present as "on" when ticked, absent otherwise.
    #[serde(default)]
    pub remember_me: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();
        required("provider", &self.provider, &mut errors);
        errors
    }

    pub fn remember(&self) -> bool {
        self.remember_me.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<i64>,
}

impl BookForm {
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();
        required("title", &self.title, &mut errors);
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub books: Vec<i64>,
}

impl AuthorForm {
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();
        required("name", &self.name, &mut errors);
        errors
    }
}

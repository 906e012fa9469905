//! Field validation for signup and post input.
//!
//! Failures are collected per field and surfaced together as a 422.

use crate::error::FieldError;

const MIN_LEN: usize = 5;

/// Loose well-formedness check: one `@`, non-empty local part, dotted domain.
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty() && !value.contains(char::is_whitespace)
}

fn too_short(value: &str) -> bool {
    value.trim().chars().count() < MIN_LEN
}

pub fn signup_errors(email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_email(email) {
        errors.push(FieldError::new("Email is invalid."));
    }
    if too_short(password) {
        errors.push(FieldError::new("Password must be at least 5 characters."));
    }
    errors
}

pub fn post_errors(title: &str, content: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if too_short(title) {
        errors.push(FieldError::new("Title must be 5 characters or more."));
    }
    if too_short(content) {
        errors.push(FieldError::new(
            "Content must be at least 5 characters long.",
        ));
    }
    errors
}

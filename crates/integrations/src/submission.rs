//! Plugin-independent view of a submitted form and the mapping of its fields
//! onto canonical identity attributes.

use pixel_core::types::IdentityAttribute;
use pixel_core::{RequestContext, UserData};
use thiserror::Error;
use tracing::{debug, warn};

/// The form plugin could not produce its field data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to read form data: {0}")]
pub struct FormReadError(pub String);

/// Semantic role of a submitted field, as classified by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Phone,
    /// Field identified by a slug such as `first_name` or `last_name`.
    Slug(String),
    /// A single field holding the whole name, split into first and last.
    FullName,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub id: String,
    pub kind: FieldKind,
    pub raw_value: Option<String>,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<String>, kind: FieldKind, raw_value: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            raw_value,
        }
    }
}

/// Read-only access to a plugin's form submission. Values are resolved
/// against the request's posted data.
pub trait FormSubmission {
    fn fields(&self, request: &RequestContext) -> Result<Vec<FieldDescriptor>, FormReadError>;
}

/// Map classified fields onto user data. The first field to claim an
/// attribute wins; fields without a usable value are skipped.
pub fn map_fields(fields: &[FieldDescriptor]) -> UserData {
    let mut user = UserData::default();
    for field in fields {
        let Some(value) = field
            .raw_value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
        else {
            continue;
        };

        match &field.kind {
            FieldKind::Email => claim(&mut user, IdentityAttribute::Email, value, &field.id),
            FieldKind::Phone => claim(&mut user, IdentityAttribute::Phone, value, &field.id),
            FieldKind::Slug(slug) => match slug.as_str() {
                "first_name" => claim(&mut user, IdentityAttribute::FirstName, value, &field.id),
                "last_name" => claim(&mut user, IdentityAttribute::LastName, value, &field.id),
                _ => {}
            },
            FieldKind::FullName => {
                let (first, last) = split_name(value);
                if let Some(first) = first {
                    claim(&mut user, IdentityAttribute::FirstName, first, &field.id);
                }
                if let Some(last) = last {
                    claim(&mut user, IdentityAttribute::LastName, last, &field.id);
                }
            }
            FieldKind::Other => {}
        }
    }
    user
}

fn claim(user: &mut UserData, attribute: IdentityAttribute, value: &str, field_id: &str) {
    if !user.set_if_absent(attribute, value.to_string()) {
        debug!(field_id, ?attribute, "attribute already mapped, ignoring field");
    }
}

/// Split a full name on the first run of whitespace.
pub fn split_name(full_name: &str) -> (Option<&str>, Option<&str>) {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return (None, None);
    }
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => {
            let rest = rest.trim();
            (Some(first), (!rest.is_empty()).then_some(rest))
        }
        None => (Some(trimmed), None),
    }
}

/// Extract user data from a submission. Never fails: a missing submission or
/// a plugin read failure yields user data with no attributes.
pub fn extract_user_data(
    submission: Option<&dyn FormSubmission>,
    request: &RequestContext,
) -> UserData {
    let Some(submission) = submission else {
        debug!("no form submission available, extracting nothing");
        return UserData::default();
    };
    match submission.fields(request) {
        Ok(fields) => map_fields(&fields),
        Err(e) => {
            warn!(error = %e, "form data unavailable, tracking without user data");
            UserData::default()
        }
    }
}

//! Conversions API request body for tracked server events.
//!
//! Identity fields are normalized and SHA-256 hashed before they leave the
//! process; request metadata (IP, user agent, pixel cookies) is sent as-is.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::PixelConfig;
use crate::error::{PixelError, PixelResult};
use crate::types::{ActionSource, ServerEvent, UserData};

const GRAPH_API_BASE: &str = "https://graph.facebook.com";

/// Body of `POST /{api_version}/{pixel_id}/events`.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionsPayload {
    pub data: Vec<EventPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_event_code: Option<String>,
    pub partner_agent: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
    pub event_name: String,
    pub event_time: i64,
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_source_url: Option<String>,
    pub action_source: ActionSource,
    pub user_data: HashedUserData,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_data: BTreeMap<String, String>,
}

/// User data as the Graph API expects it, keyed by its short field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HashedUserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub em: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#fn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ln: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
}

impl HashedUserData {
    pub fn from_user_data(user: &UserData) -> Self {
        Self {
            em: hash_field(user.email.as_deref(), normalize_email),
            r#fn: hash_field(user.first_name.as_deref(), normalize_name),
            ln: hash_field(user.last_name.as_deref(), normalize_name),
            ph: hash_field(user.phone.as_deref(), normalize_phone),
            client_ip_address: user.client_ip_address.clone(),
            client_user_agent: user.client_user_agent.clone(),
            fbp: user.fbp.clone(),
            fbc: user.fbc.clone(),
        }
    }
}

impl EventPayload {
    pub fn from_event(event: &ServerEvent) -> Self {
        Self {
            event_name: event.event_name().to_string(),
            event_time: event.event_time().timestamp(),
            event_id: event.event_id().to_string(),
            event_source_url: event.event_source_url().map(String::from),
            action_source: event.action_source(),
            user_data: HashedUserData::from_user_data(event.user_data()),
            custom_data: event.custom_data().clone(),
        }
    }
}

impl ConversionsPayload {
    pub fn from_events(events: &[ServerEvent], config: &PixelConfig) -> Self {
        Self {
            data: events.iter().map(EventPayload::from_event).collect(),
            test_event_code: config.test_event_code.clone(),
            partner_agent: config.partner_agent.clone(),
        }
    }

    pub fn to_json(&self) -> PixelResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Graph API endpoint the payload is posted to.
pub fn endpoint(config: &PixelConfig) -> PixelResult<String> {
    let pixel_id = config
        .pixel_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| PixelError::MissingPixel("pixel_id is not set".into()))?;
    Ok(format!("{}/{}/{}/events", GRAPH_API_BASE, config.api_version, pixel_id))
}

fn hash_field(value: Option<&str>, normalize: fn(&str) -> String) -> Option<String> {
    value
        .map(normalize)
        .filter(|v| !v.is_empty())
        .map(|v| sha256_hex(&v))
}

fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalize_name(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

fn normalize_phone(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Compute SHA-256 hex digest.
fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Custom property carrying the slug of the integration that produced an event.
pub const INTEGRATION_TRACKING_KEY: &str = "fb_integration_tracking";

/// Canonical identity attributes that form fields can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityAttribute {
    Email,
    FirstName,
    LastName,
    Phone,
}

/// Identity of the person behind an event. Attributes that were not
/// submitted stay `None`; nothing is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
}

impl UserData {
    pub fn get(&self, attribute: IdentityAttribute) -> Option<&str> {
        match attribute {
            IdentityAttribute::Email => self.email.as_deref(),
            IdentityAttribute::FirstName => self.first_name.as_deref(),
            IdentityAttribute::LastName => self.last_name.as_deref(),
            IdentityAttribute::Phone => self.phone.as_deref(),
        }
    }

    /// Set an identity attribute unless it already holds a value.
    /// Returns whether the value was stored.
    pub fn set_if_absent(&mut self, attribute: IdentityAttribute, value: String) -> bool {
        let slot = match attribute {
            IdentityAttribute::Email => &mut self.email,
            IdentityAttribute::FirstName => &mut self.first_name,
            IdentityAttribute::LastName => &mut self.last_name,
            IdentityAttribute::Phone => &mut self.phone,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Fill every attribute missing here from `other`.
    pub fn merge_missing(mut self, other: UserData) -> Self {
        self.email = self.email.or(other.email);
        self.first_name = self.first_name.or(other.first_name);
        self.last_name = self.last_name.or(other.last_name);
        self.phone = self.phone.or(other.phone);
        self.client_ip_address = self.client_ip_address.or(other.client_ip_address);
        self.client_user_agent = self.client_user_agent.or(other.client_user_agent);
        self.fbp = self.fbp.or(other.fbp);
        self.fbc = self.fbc.or(other.fbc);
        self
    }

    /// Number of identity attributes (email, names, phone) that are populated.
    pub fn identity_count(&self) -> usize {
        [
            IdentityAttribute::Email,
            IdentityAttribute::FirstName,
            IdentityAttribute::LastName,
            IdentityAttribute::Phone,
        ]
        .iter()
        .filter(|a| self.get(**a).is_some())
        .count()
    }
}

/// Where the conversion happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    Website,
}

/// A normalized conversion event, independent of the form plugin that
/// produced it. Built once, then rendered into a pixel snippet or tracked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEvent {
    event_id: Uuid,
    event_name: String,
    event_time: DateTime<Utc>,
    event_source_url: Option<String>,
    action_source: ActionSource,
    user_data: UserData,
    custom_data: BTreeMap<String, String>,
}

impl ServerEvent {
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_name: event_name.into(),
            event_time: Utc::now(),
            event_source_url: None,
            action_source: ActionSource::Website,
            user_data: UserData::default(),
            custom_data: BTreeMap::new(),
        }
    }

    pub fn with_source_url(mut self, url: Option<String>) -> Self {
        self.event_source_url = url;
        self
    }

    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn with_custom_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.custom_data.insert(key.into(), value.into());
        self
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn event_time(&self) -> DateTime<Utc> {
        self.event_time
    }

    pub fn event_source_url(&self) -> Option<&str> {
        self.event_source_url.as_deref()
    }

    pub fn action_source(&self) -> ActionSource {
        self.action_source
    }

    pub fn user_data(&self) -> &UserData {
        &self.user_data
    }

    pub fn custom_data(&self) -> &BTreeMap<String, String> {
        &self.custom_data
    }

    pub fn custom_property(&self, key: &str) -> Option<&str> {
        self.custom_data.get(key).map(String::as_str)
    }

    /// Slug of the integration that produced this event, if tagged.
    pub fn integration(&self) -> Option<&str> {
        self.custom_property(INTEGRATION_TRACKING_KEY)
    }
}

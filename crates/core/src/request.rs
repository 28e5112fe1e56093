//! Read-only view of the HTTP request a form submission arrived on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::UserData;

const FBP_COOKIE: &str = "_fbp";
const FBC_COOKIE: &str = "_fbc";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Request comes from the admin panel (editor preview).
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub remote_addr: Option<String>,
    #[serde(default)]
    pub forwarded_for: Option<String>,
    #[serde(default)]
    pub cookies: HashMap<String, String>,
    /// Submitted form values keyed by field identifier.
    #[serde(default)]
    pub post: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    pub fn with_forwarded_for(mut self, header: impl Into<String>) -> Self {
        self.forwarded_for = Some(header.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_post_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.post.insert(key.into(), value.into());
        self
    }

    pub fn post_value(&self, key: &str) -> Option<&str> {
        self.post.get(key).map(String::as_str)
    }

    /// Client address: first entry of `X-Forwarded-For`, else the peer address.
    pub fn client_ip(&self) -> Option<String> {
        self.forwarded_for
            .as_deref()
            .and_then(|header| header.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(String::from)
            .or_else(|| self.remote_addr.clone())
    }

    /// User data derivable from the request itself, without any form input.
    pub fn user_data(&self) -> UserData {
        UserData {
            client_ip_address: self.client_ip(),
            client_user_agent: self.user_agent.clone(),
            fbp: self.cookies.get(FBP_COOKIE).cloned(),
            fbc: self.cookies.get(FBC_COOKIE).cloned(),
            ..Default::default()
        }
    }
}

//! Host extension points — named hooks that integrations attach callbacks to.

use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info};

/// Integration operation a hook callback invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookHandler {
    /// Splice the pixel snippet into the form's response, or track the event
    /// server-side when the Conversions API is enabled.
    InjectLeadEvent,
    /// Track the event server-side regardless of the response status.
    TrackServerEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookRegistration {
    pub hook: String,
    pub integration: &'static str,
    pub handler: HookHandler,
    pub priority: i32,
    /// Number of arguments the host passes to the callback.
    pub accepted_args: u8,
}

/// Registered callbacks per hook name. The host side of `add_action`.
pub struct HookRegistry {
    actions: DashMap<String, Vec<HookRegistration>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            actions: DashMap::new(),
        }
    }

    /// Attach a callback. Adding the same integration handler to the same hook
    /// twice is a no-op; returns whether a new registration was stored.
    pub fn add_action(
        &self,
        hook: &str,
        integration: &'static str,
        handler: HookHandler,
        priority: i32,
        accepted_args: u8,
    ) -> bool {
        let mut entry = self.actions.entry(hook.to_string()).or_default();
        if entry
            .iter()
            .any(|r| r.integration == integration && r.handler == handler)
        {
            debug!(hook, integration, ?handler, "hook already registered");
            return false;
        }
        entry.push(HookRegistration {
            hook: hook.to_string(),
            integration,
            handler,
            priority,
            accepted_args,
        });
        info!(hook, integration, ?handler, priority, accepted_args, "hook registered");
        true
    }

    pub fn has_action(&self, hook: &str, integration: &str, handler: HookHandler) -> bool {
        self.actions
            .get(hook)
            .map(|regs| {
                regs.iter()
                    .any(|r| r.integration == integration && r.handler == handler)
            })
            .unwrap_or(false)
    }

    /// Callbacks for `hook` in execution order: ascending priority, ties in
    /// registration order.
    pub fn callbacks_for(&self, hook: &str) -> Vec<HookRegistration> {
        let mut regs = self
            .actions
            .get(hook)
            .map(|r| r.clone())
            .unwrap_or_default();
        regs.sort_by_key(|r| r.priority);
        regs
    }

    /// Every registration across all hooks, sorted by hook name then priority.
    pub fn registrations(&self) -> Vec<HookRegistration> {
        let mut all: Vec<HookRegistration> = self
            .actions
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.hook.cmp(&b.hook).then(a.priority.cmp(&b.priority)));
        all
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

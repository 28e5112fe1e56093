//! Capability every supported form plugin implements.

use pixel_core::config::PixelConfig;
use pixel_core::{RequestContext, TrackingSink};

use crate::hooks::{HookHandler, HookRegistry};
use crate::response::FormResponse;
use crate::submission::{FormReadError, FormSubmission};

pub const LEAD_EVENT: &str = "Lead";

/// Everything a completion callback may consult or touch during one request.
pub struct DispatchContext<'a> {
    pub request: &'a RequestContext,
    pub config: &'a PixelConfig,
    pub sink: &'a dyn TrackingSink,
    pub hooks: &'a HookRegistry,
}

impl<'a> DispatchContext<'a> {
    pub fn new(
        request: &'a RequestContext,
        config: &'a PixelConfig,
        sink: &'a dyn TrackingSink,
        hooks: &'a HookRegistry,
    ) -> Self {
        Self {
            request,
            config,
            sink,
            hooks,
        }
    }

    pub fn use_s2s(&self) -> bool {
        self.config.use_s2s
    }
}

/// Adapter bridging one form plugin to the canonical event pipeline.
pub trait FormIntegration: Send + Sync {
    /// Slug identifying the integration, also used as the tracking tag.
    fn slug(&self) -> &'static str;

    /// Attach completion callbacks to the host's hooks.
    fn register_hooks(&self, hooks: &HookRegistry);

    /// Run `handler` for a completed submission and return the (possibly
    /// modified) response. Never fails; tracking is best-effort.
    fn handle_completion(
        &self,
        handler: HookHandler,
        ctx: &DispatchContext<'_>,
        submission: Option<&dyn FormSubmission>,
        response: FormResponse,
    ) -> FormResponse;

    /// Decode this plugin's form structure from JSON.
    fn parse_submission(
        &self,
        raw: serde_json::Value,
    ) -> Result<Box<dyn FormSubmission>, FormReadError>;
}

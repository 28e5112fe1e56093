//! Contact Form 7 adapter — tracks the Lead server-side when the form is
//! submitted and injects the pixel snippet into the AJAX JSON response.

use pixel_core::{PixelRenderer, RequestContext, ServerEventFactory};
use serde::Deserialize;
use tracing::debug;

use crate::hooks::{HookHandler, HookRegistry};
use crate::integration::{DispatchContext, FormIntegration, LEAD_EVENT};
use crate::response::FormResponse;
use crate::submission::{
    extract_user_data, FieldDescriptor, FieldKind, FormReadError, FormSubmission,
};

pub const TRACKING_NAME: &str = "contact-form-7";
pub const SUBMIT_HOOK: &str = "wpcf7_submit";
pub const AJAX_JSON_ECHO_HOOK: &str = "wpcf7_ajax_json_echo";

const STATUS_MAIL_SENT: &str = "mail_sent";
const MESSAGE_FIELD: &str = "message";

/// Contact Form 7 form: its scanned tags, plus the failure the plugin raised
/// while scanning, if any.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm7 {
    #[serde(default)]
    pub tags: Vec<FormTag>,
    #[serde(default)]
    pub read_error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormTag {
    pub basetype: String,
    pub name: String,
}

impl ContactForm7 {
    pub fn with_tag(mut self, basetype: impl Into<String>, name: impl Into<String>) -> Self {
        self.tags.push(FormTag {
            basetype: basetype.into(),
            name: name.into(),
        });
        self
    }

    /// A form whose tag scan fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            tags: Vec::new(),
            read_error: Some(reason.into()),
        }
    }
}

impl FormTag {
    fn kind(&self) -> FieldKind {
        match self.basetype.trim_end_matches('*') {
            "email" => FieldKind::Email,
            "tel" => FieldKind::Phone,
            "text" => {
                let name = self.name.to_lowercase().replace('-', "_");
                if name == "first_name" || name == "last_name" {
                    FieldKind::Slug(name)
                } else if name.contains("name") {
                    FieldKind::FullName
                } else {
                    FieldKind::Other
                }
            }
            _ => FieldKind::Other,
        }
    }
}

impl FormSubmission for ContactForm7 {
    fn fields(&self, request: &RequestContext) -> Result<Vec<FieldDescriptor>, FormReadError> {
        if let Some(reason) = &self.read_error {
            return Err(FormReadError(reason.clone()));
        }
        Ok(self
            .tags
            .iter()
            .map(|tag| {
                FieldDescriptor::new(
                    tag.name.clone(),
                    tag.kind(),
                    request.post_value(&tag.name).map(String::from),
                )
            })
            .collect())
    }
}

pub struct ContactForm7Integration;

impl ContactForm7Integration {
    /// Action for `wpcf7_submit`. Tracks a Lead whenever the Conversions API
    /// is enabled, whatever the submission status, and makes sure the
    /// response injector is wired up as well.
    pub fn track_server_event(
        &self,
        ctx: &DispatchContext<'_>,
        form: Option<&dyn FormSubmission>,
        result: FormResponse,
    ) -> FormResponse {
        if ctx.request.is_admin || !ctx.use_s2s() {
            debug!(
                integration = TRACKING_NAME,
                is_admin = ctx.request.is_admin,
                use_s2s = ctx.use_s2s(),
                "server tracking skipped"
            );
            return result;
        }

        let user_data = extract_user_data(form, ctx.request);
        let event =
            ServerEventFactory::create_event(LEAD_EVENT, ctx.request, TRACKING_NAME, user_data);
        ctx.sink.track(event);

        self.register_injector(ctx.hooks);
        result
    }

    /// Filter for `wpcf7_ajax_json_echo`. Appends the pixel snippet to the
    /// response message once the mail was sent. When the Lead already went
    /// through the Conversions API the snippet replays those tracked events,
    /// so browser and server share the `eventID`.
    pub fn inject_lead_event(
        &self,
        ctx: &DispatchContext<'_>,
        form: Option<&dyn FormSubmission>,
        mut response: FormResponse,
    ) -> FormResponse {
        if ctx.request.is_admin {
            debug!(integration = TRACKING_NAME, "admin request, skipping lead tracking");
            return response;
        }
        if response.status() != Some(STATUS_MAIL_SENT) {
            debug!(
                integration = TRACKING_NAME,
                status = response.status().unwrap_or("missing"),
                "mail not sent, skipping pixel injection"
            );
            return response;
        }
        if ctx.use_s2s() {
            let tracked: Vec<_> = ctx
                .sink
                .tracked_events()
                .into_iter()
                .filter(|event| event.integration() == Some(TRACKING_NAME))
                .collect();
            if tracked.is_empty() {
                debug!(integration = TRACKING_NAME, "no tracked lead, skipping pixel injection");
                return response;
            }
            let code = PixelRenderer::render(&tracked, TRACKING_NAME);
            response.append_str(MESSAGE_FIELD, &code);
            debug!(
                integration = TRACKING_NAME,
                events = tracked.len(),
                "pixel code injected for tracked events"
            );
            return response;
        }

        let user_data = extract_user_data(form, ctx.request);
        let event =
            ServerEventFactory::create_event(LEAD_EVENT, ctx.request, TRACKING_NAME, user_data);
        let code = PixelRenderer::render(std::slice::from_ref(&event), TRACKING_NAME);
        response.append_str(MESSAGE_FIELD, &code);
        debug!(integration = TRACKING_NAME, event_id = %event.event_id(), "pixel code injected");
        response
    }

    fn register_injector(&self, hooks: &HookRegistry) {
        hooks.add_action(AJAX_JSON_ECHO_HOOK, TRACKING_NAME, HookHandler::InjectLeadEvent, 20, 2);
    }
}

impl FormIntegration for ContactForm7Integration {
    fn slug(&self) -> &'static str {
        TRACKING_NAME
    }

    fn register_hooks(&self, hooks: &HookRegistry) {
        hooks.add_action(SUBMIT_HOOK, TRACKING_NAME, HookHandler::TrackServerEvent, 10, 2);
        self.register_injector(hooks);
    }

    fn handle_completion(
        &self,
        handler: HookHandler,
        ctx: &DispatchContext<'_>,
        submission: Option<&dyn FormSubmission>,
        response: FormResponse,
    ) -> FormResponse {
        match handler {
            HookHandler::TrackServerEvent => self.track_server_event(ctx, submission, response),
            HookHandler::InjectLeadEvent => self.inject_lead_event(ctx, submission, response),
        }
    }

    fn parse_submission(
        &self,
        raw: serde_json::Value,
    ) -> Result<Box<dyn FormSubmission>, FormReadError> {
        if raw.is_null() {
            return Ok(Box::new(ContactForm7::default()));
        }
        let form: ContactForm7 =
            serde_json::from_value(raw).map_err(|e| FormReadError(e.to_string()))?;
        Ok(Box::new(form))
    }
}

//! Caldera Forms adapter — tracks a Lead when the AJAX submission completes.

use pixel_core::{PixelRenderer, RequestContext, ServerEventFactory};
use serde::Deserialize;
use tracing::debug;

use crate::hooks::{HookHandler, HookRegistry};
use crate::integration::{DispatchContext, FormIntegration, LEAD_EVENT};
use crate::response::FormResponse;
use crate::submission::{
    extract_user_data, FieldDescriptor, FieldKind, FormReadError, FormSubmission,
};

pub const TRACKING_NAME: &str = "caldera-forms";
pub const AJAX_RETURN_HOOK: &str = "caldera_forms_ajax_return";

const STATUS_COMPLETE: &str = "complete";
const HTML_FIELD: &str = "html";

/// Caldera form definition as passed to the AJAX return filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalderaForm {
    #[serde(default)]
    pub fields: Vec<CalderaField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalderaField {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl CalderaForm {
    pub fn with_field(
        mut self,
        id: impl Into<String>,
        field_type: Option<&str>,
        slug: Option<&str>,
    ) -> Self {
        self.fields.push(CalderaField {
            id: id.into(),
            field_type: field_type.map(String::from),
            slug: slug.map(String::from),
        });
        self
    }
}

impl CalderaField {
    fn kind(&self) -> FieldKind {
        match self.field_type.as_deref() {
            Some("email") => FieldKind::Email,
            Some("phone") | Some("phone_better") => FieldKind::Phone,
            _ => self
                .slug
                .as_ref()
                .map(|slug| FieldKind::Slug(slug.clone()))
                .unwrap_or(FieldKind::Other),
        }
    }
}

impl FormSubmission for CalderaForm {
    fn fields(&self, request: &RequestContext) -> Result<Vec<FieldDescriptor>, FormReadError> {
        Ok(self
            .fields
            .iter()
            .map(|field| {
                FieldDescriptor::new(
                    field.id.clone(),
                    field.kind(),
                    request.post_value(&field.id).map(String::from),
                )
            })
            .collect())
    }
}

pub struct CalderaFormsIntegration;

impl CalderaFormsIntegration {
    /// Filter for `caldera_forms_ajax_return`. On a completed, non-admin
    /// submission either tracks the Lead server-side or appends the pixel
    /// snippet to the response HTML.
    pub fn inject_lead_event(
        &self,
        ctx: &DispatchContext<'_>,
        form: Option<&dyn FormSubmission>,
        mut out: FormResponse,
    ) -> FormResponse {
        if ctx.request.is_admin {
            debug!(integration = TRACKING_NAME, "admin request, skipping lead tracking");
            return out;
        }
        if out.status() != Some(STATUS_COMPLETE) {
            debug!(
                integration = TRACKING_NAME,
                status = out.status().unwrap_or("missing"),
                "submission not complete, skipping lead tracking"
            );
            return out;
        }

        let user_data = extract_user_data(form, ctx.request);
        let event =
            ServerEventFactory::create_event(LEAD_EVENT, ctx.request, TRACKING_NAME, user_data);

        if ctx.use_s2s() {
            ctx.sink.track(event);
            return out;
        }

        let code = PixelRenderer::render(std::slice::from_ref(&event), TRACKING_NAME);
        out.append_str(HTML_FIELD, &code);
        debug!(integration = TRACKING_NAME, event_id = %event.event_id(), "pixel code injected");
        out
    }
}

impl FormIntegration for CalderaFormsIntegration {
    fn slug(&self) -> &'static str {
        TRACKING_NAME
    }

    fn register_hooks(&self, hooks: &HookRegistry) {
        hooks.add_action(AJAX_RETURN_HOOK, TRACKING_NAME, HookHandler::InjectLeadEvent, 10, 2);
    }

    fn handle_completion(
        &self,
        handler: HookHandler,
        ctx: &DispatchContext<'_>,
        submission: Option<&dyn FormSubmission>,
        response: FormResponse,
    ) -> FormResponse {
        match handler {
            HookHandler::InjectLeadEvent => self.inject_lead_event(ctx, submission, response),
            HookHandler::TrackServerEvent => {
                debug!(integration = TRACKING_NAME, "no server tracking hook for this integration");
                response
            }
        }
    }

    fn parse_submission(
        &self,
        raw: serde_json::Value,
    ) -> Result<Box<dyn FormSubmission>, FormReadError> {
        if raw.is_null() {
            return Ok(Box::new(CalderaForm::default()));
        }
        let form: CalderaForm =
            serde_json::from_value(raw).map_err(|e| FormReadError(e.to_string()))?;
        Ok(Box::new(form))
    }
}

//! Integration registry — adapters keyed by slug, and hook dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;

use pixel_core::{PixelError, PixelResult};
use tracing::{debug, info, warn};

use crate::caldera::CalderaFormsIntegration;
use crate::contact_form7::ContactForm7Integration;
use crate::hooks::HookRegistry;
use crate::integration::{DispatchContext, FormIntegration};
use crate::response::FormResponse;
use crate::submission::FormSubmission;

pub struct IntegrationRegistry {
    integrations: BTreeMap<&'static str, Arc<dyn FormIntegration>>,
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self {
            integrations: BTreeMap::new(),
        }
    }

    /// Registry with every built-in form plugin adapter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(Arc::new(CalderaFormsIntegration));
        registry.insert(Arc::new(ContactForm7Integration));
        registry
    }

    pub fn insert(&mut self, integration: Arc<dyn FormIntegration>) {
        self.integrations.insert(integration.slug(), integration);
    }

    pub fn get(&self, slug: &str) -> Option<Arc<dyn FormIntegration>> {
        self.integrations.get(slug).cloned()
    }

    pub fn slugs(&self) -> Vec<&'static str> {
        self.integrations.keys().copied().collect()
    }

    /// Register hooks for the integrations named in `enabled`. Fails on the
    /// first unknown slug without registering anything.
    pub fn register_enabled(&self, hooks: &HookRegistry, enabled: &[String]) -> PixelResult<()> {
        let selected = enabled
            .iter()
            .map(|slug| {
                self.get(slug)
                    .ok_or_else(|| PixelError::UnknownIntegration(slug.clone()))
            })
            .collect::<PixelResult<Vec<_>>>()?;

        for integration in selected {
            integration.register_hooks(hooks);
        }
        info!(count = enabled.len(), "integrations registered");
        Ok(())
    }

    /// Run every callback registered on `hook`, in priority order, threading
    /// the response through each one.
    pub fn fire(
        &self,
        hook: &str,
        ctx: &DispatchContext<'_>,
        submission: Option<&dyn FormSubmission>,
        response: FormResponse,
    ) -> FormResponse {
        let callbacks = ctx.hooks.callbacks_for(hook);
        if callbacks.is_empty() {
            debug!(hook, "no callbacks registered");
        }

        callbacks.into_iter().fold(response, |response, registration| {
            match self.get(registration.integration) {
                Some(integration) => {
                    integration.handle_completion(registration.handler, ctx, submission, response)
                }
                None => {
                    warn!(
                        hook,
                        integration = registration.integration,
                        "callback registered for unknown integration"
                    );
                    response
                }
            }
        })
    }
}

impl Default for IntegrationRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

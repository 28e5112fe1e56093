//! Form plugin integrations — turn completed form submissions into Lead
//! events, delivered either as a browser pixel snippet or through the
//! Conversions API.
//!
//! # Modules
//!
//! - [`hooks`] — host extension points callbacks attach to
//! - [`submission`] — plugin-independent field model and user-data extraction
//! - [`integration`] — the [`FormIntegration`] capability and dispatch context
//! - [`caldera`] / [`contact_form7`] — the supported form plugins
//! - [`registry`] — adapters keyed by slug, hook dispatch

pub mod caldera;
pub mod contact_form7;
pub mod hooks;
pub mod integration;
pub mod registry;
pub mod response;
pub mod submission;

pub use caldera::CalderaFormsIntegration;
pub use contact_form7::ContactForm7Integration;
pub use hooks::{HookHandler, HookRegistry};
pub use integration::{DispatchContext, FormIntegration};
pub use registry::IntegrationRegistry;
pub use response::FormResponse;
pub use submission::{extract_user_data, FieldDescriptor, FieldKind, FormReadError, FormSubmission};

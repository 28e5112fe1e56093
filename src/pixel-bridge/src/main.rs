//! pixel-bridge — replays a form submission through the Lead tracking
//! pipeline.
//!
//! Fires one host hook with the plugin's response, form and request, then
//! prints the resulting response and the Conversions API payload for every
//! event tracked during the request.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use pixel_core::config::AppConfig;
use pixel_core::conversions::{self, ConversionsPayload};
use pixel_core::{RequestContext, RequestSink};
use pixel_integrations::{
    DispatchContext, FormResponse, FormSubmission, HookRegistry, IntegrationRegistry,
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "pixel-bridge")]
#[command(about = "Replay a form submission through the Lead tracking pipeline")]
#[command(version)]
struct Cli {
    /// TOML config file (environment variables still apply on top)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Integration slug owning the submitted form
    #[arg(long)]
    integration: String,

    /// Host hook to fire
    #[arg(long)]
    hook: String,

    /// JSON response object returned by the form plugin
    #[arg(long)]
    response: PathBuf,

    /// JSON form structure of the plugin
    #[arg(long)]
    form: Option<PathBuf>,

    /// JSON request description (referrer, cookies, posted values, ...)
    #[arg(long)]
    request: Option<PathBuf>,

    /// Referrer header (overrides the request file)
    #[arg(long)]
    referrer: Option<String>,

    /// Treat the request as coming from the admin panel
    #[arg(long, default_value_t = false)]
    admin: bool,

    /// Send through the Conversions API (overrides config)
    #[arg(long, env = "PIXEL_BRIDGE__PIXEL__USE_S2S")]
    use_s2s: Option<bool>,

    /// Pixel ID (overrides config)
    #[arg(long, env = "PIXEL_BRIDGE__PIXEL__PIXEL_ID")]
    pixel_id: Option<String>,
}

#[derive(Serialize)]
struct Replay {
    response: serde_json::Value,
    tracked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<ConversionsPayload>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pixel_bridge=info,pixel_integrations=info,pixel_core=info".into()
            }),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(use_s2s) = cli.use_s2s {
        config.pixel.use_s2s = use_s2s;
    }
    if let Some(pixel_id) = cli.pixel_id.clone() {
        config.pixel.pixel_id = Some(pixel_id);
    }

    info!(
        use_s2s = config.pixel.use_s2s,
        integrations = ?config.integrations.enabled,
        "Configuration loaded"
    );

    let registry = IntegrationRegistry::with_defaults();
    let hooks = HookRegistry::new();
    registry.register_enabled(&hooks, &config.integrations.enabled)?;

    let integration = registry
        .get(&cli.integration)
        .with_context(|| format!("unknown integration '{}'", cli.integration))?;

    let mut request: RequestContext = match &cli.request {
        Some(path) => serde_json::from_value(read_json(path)?)
            .with_context(|| format!("invalid request description in {}", path.display()))?,
        None => RequestContext::new(),
    };
    if let Some(referrer) = cli.referrer.clone() {
        request.referrer = Some(referrer);
    }
    request.is_admin |= cli.admin;

    let response: FormResponse = serde_json::from_value(read_json(&cli.response)?)
        .with_context(|| format!("response in {} is not a JSON object", cli.response.display()))?;

    let raw_form = match &cli.form {
        Some(path) => read_json(path)?,
        None => serde_json::Value::Null,
    };
    // A form the plugin cannot describe degrades to tracking without it.
    let submission: Option<Box<dyn FormSubmission>> = match integration.parse_submission(raw_form) {
        Ok(form) => Some(form),
        Err(e) => {
            warn!(
                integration = integration.slug(),
                error = %e,
                "form unreadable, continuing without it"
            );
            None
        }
    };

    let sink = RequestSink::new();
    let ctx = DispatchContext::new(&request, &config.pixel, &sink, &hooks);
    let response = registry.fire(&cli.hook, &ctx, submission.as_deref(), response);

    let events = sink.drain();
    let (endpoint, payload) = if events.is_empty() {
        (None, None)
    } else {
        let endpoint = conversions::endpoint(&config.pixel)
            .map_err(|e| warn!(error = %e, "Conversions API endpoint unavailable"))
            .ok();
        (endpoint, Some(ConversionsPayload::from_events(&events, &config.pixel)))
    };

    let replay = Replay {
        response: response.into_value(),
        tracked: events.len(),
        endpoint,
        payload,
    };
    println!("{}", serde_json::to_string_pretty(&replay)?);

    info!(hook = %cli.hook, tracked = replay.tracked, "Replay finished");
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

//! End-to-end form flows: hooks registered from config, fired by the host,
//! events collected in a fresh per-request sink.

use pixel_core::config::PixelConfig;
use pixel_core::conversions::ConversionsPayload;
use pixel_core::pixel::PIXEL_CODE_END;
use pixel_core::types::INTEGRATION_TRACKING_KEY;
use pixel_core::{RequestContext, RequestSink, TrackingSink};
use pixel_integrations::caldera::{self, CalderaForm};
use pixel_integrations::contact_form7::{self, ContactForm7};
use pixel_integrations::{DispatchContext, FormResponse, HookRegistry, IntegrationRegistry};

struct Harness {
    registry: IntegrationRegistry,
    hooks: HookRegistry,
    sink: RequestSink,
    pixel: PixelConfig,
}

impl Harness {
    fn new(use_s2s: bool) -> Self {
        let registry = IntegrationRegistry::with_defaults();
        let hooks = HookRegistry::new();
        registry
            .register_enabled(
                &hooks,
                &["caldera-forms".to_string(), "contact-form-7".to_string()],
            )
            .unwrap();
        Self {
            registry,
            hooks,
            sink: RequestSink::new(),
            pixel: PixelConfig {
                use_s2s,
                pixel_id: Some("1234567890".into()),
                ..Default::default()
            },
        }
    }

    fn fire_caldera(
        &self,
        request: &RequestContext,
        form: &CalderaForm,
        out: FormResponse,
    ) -> FormResponse {
        let ctx = DispatchContext::new(request, &self.pixel, &self.sink, &self.hooks);
        self.registry
            .fire(caldera::AJAX_RETURN_HOOK, &ctx, Some(form), out)
    }

    fn fire_cf7(
        &self,
        hook: &str,
        request: &RequestContext,
        form: &ContactForm7,
        out: FormResponse,
    ) -> FormResponse {
        let ctx = DispatchContext::new(request, &self.pixel, &self.sink, &self.hooks);
        self.registry.fire(hook, &ctx, Some(form), out)
    }
}

fn caldera_form() -> CalderaForm {
    CalderaForm::default()
        .with_field("fld_1", Some("email"), None)
        .with_field("fld_2", None, Some("first_name"))
        .with_field("fld_3", None, Some("last_name"))
        .with_field("fld_4", Some("phone"), None)
}

fn caldera_request(is_admin: bool) -> RequestContext {
    RequestContext::new()
        .admin(is_admin)
        .with_referrer("TEST_REFERER")
        .with_post_value("fld_1", "pika.chu@s2s.com")
        .with_post_value("fld_2", "Pika")
        .with_post_value("fld_3", "Chu")
        .with_post_value("fld_4", "(206)123-4567")
}

fn caldera_out(status: &str) -> FormResponse {
    FormResponse::new()
        .with("status", status)
        .with("html", "successful submitted")
}

fn cf7_result() -> FormResponse {
    FormResponse::new()
        .with("status", "mail_sent")
        .with("message", "Thank you for your message")
}

#[test]
fn test_caldera_server_side_lead() {
    let harness = Harness::new(true);
    let out = harness.fire_caldera(
        &caldera_request(false),
        &caldera_form(),
        caldera_out("complete"),
    );
    assert_eq!(out, caldera_out("complete"));

    let events = harness.sink.tracked_events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event_name(), "Lead");
    assert_eq!(event.user_data().email.as_deref(), Some("pika.chu@s2s.com"));
    assert_eq!(event.user_data().first_name.as_deref(), Some("Pika"));
    assert_eq!(event.user_data().last_name.as_deref(), Some("Chu"));
    assert_eq!(event.user_data().phone.as_deref(), Some("(206)123-4567"));
    assert_eq!(event.user_data().identity_count(), 4);
    assert_eq!(event.custom_property(INTEGRATION_TRACKING_KEY), Some("caldera-forms"));
    assert_eq!(event.event_source_url(), Some("TEST_REFERER"));

    let payload = ConversionsPayload::from_events(&events, &harness.pixel);
    let json = payload.to_json().unwrap();
    assert_eq!(json["data"][0]["event_id"], event.event_id().to_string());
    assert_eq!(json["data"][0]["user_data"]["em"].as_str().map(str::len), Some(64));
}

#[test]
fn test_caldera_client_side_lead() {
    let harness = Harness::new(false);
    let out = harness.fire_caldera(
        &caldera_request(false),
        &caldera_form(),
        caldera_out("complete"),
    );

    let html = out.get_str("html").unwrap();
    let start = html.find("caldera-forms").unwrap();
    assert!(html[start..].contains(PIXEL_CODE_END));
    assert!(harness.sink.is_empty());
}

#[test]
fn test_admin_and_incomplete_never_track() {
    for use_s2s in [false, true] {
        let harness = Harness::new(use_s2s);

        let out = harness.fire_caldera(
            &caldera_request(true),
            &caldera_form(),
            caldera_out("complete"),
        );
        assert_eq!(out, caldera_out("complete"));

        let out = harness.fire_caldera(
            &caldera_request(false),
            &caldera_form(),
            caldera_out("preprocess"),
        );
        assert_eq!(out, caldera_out("preprocess"));

        let admin = RequestContext::new().admin(true);
        let form = ContactForm7::default().with_tag("email", "your-email");
        let result = harness.fire_cf7(contact_form7::SUBMIT_HOOK, &admin, &form, cf7_result());
        assert_eq!(result, cf7_result());
        let result =
            harness.fire_cf7(contact_form7::AJAX_JSON_ECHO_HOOK, &admin, &form, cf7_result());
        assert_eq!(result, cf7_result());

        assert!(harness.sink.is_empty(), "use_s2s={use_s2s}");
    }
}

#[test]
fn test_cf7_server_side_lead_then_echo() {
    let harness = Harness::new(true);
    let request = RequestContext::new()
        .with_referrer("TEST_REFERER")
        .with_user_agent("Mozilla/5.0")
        .with_cookie("_fbp", "fb.1.1596403881668.1116446470")
        .with_post_value("your-email", "pika.chu@s2s.com")
        .with_post_value("your-name", "Pika Chu");
    let form = ContactForm7::default()
        .with_tag("email", "your-email")
        .with_tag("text", "your-name");

    let result = harness.fire_cf7(contact_form7::SUBMIT_HOOK, &request, &form, cf7_result());
    assert_eq!(result, cf7_result());

    let echoed =
        harness.fire_cf7(contact_form7::AJAX_JSON_ECHO_HOOK, &request, &form, cf7_result());

    let events = harness.sink.tracked_events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    let message = echoed.get_str("message").unwrap();
    assert!(message.starts_with("Thank you for your message"));
    assert!(message.contains(&event.event_id().to_string()));
    assert!(message.contains(PIXEL_CODE_END));
    assert_eq!(event.event_name(), "Lead");
    assert_eq!(event.user_data().email.as_deref(), Some("pika.chu@s2s.com"));
    assert_eq!(event.user_data().first_name.as_deref(), Some("Pika"));
    assert_eq!(event.user_data().last_name.as_deref(), Some("Chu"));
    assert_eq!(event.user_data().client_user_agent.as_deref(), Some("Mozilla/5.0"));
    assert_eq!(event.user_data().fbp.as_deref(), Some("fb.1.1596403881668.1116446470"));
    assert_eq!(event.custom_property(INTEGRATION_TRACKING_KEY), Some("contact-form-7"));
    assert_eq!(event.event_source_url(), Some("TEST_REFERER"));
}

#[test]
fn test_cf7_read_failure_still_tracks() {
    let harness = Harness::new(true);
    let request = RequestContext::new();
    let form = ContactForm7::failing("scan failed");

    harness.fire_cf7(contact_form7::SUBMIT_HOOK, &request, &form, cf7_result());

    let events = harness.sink.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_name(), "Lead");
    assert!(events[0].event_time().timestamp() > 0);
    assert!(harness.sink.is_empty());
}

#[test]
fn test_cf7_client_side_lead() {
    let harness = Harness::new(false);
    let request = RequestContext::new();
    let form = ContactForm7::default();

    let result = harness.fire_cf7(contact_form7::SUBMIT_HOOK, &request, &form, cf7_result());
    assert_eq!(result, cf7_result());

    let response =
        harness.fire_cf7(contact_form7::AJAX_JSON_ECHO_HOOK, &request, &form, cf7_result());
    let message = response.get_str("message").unwrap();
    assert!(message.starts_with("Thank you for your message"));
    let start = message.find("contact-form-7").unwrap();
    assert!(message[start..].contains(PIXEL_CODE_END));
    assert!(harness.sink.is_empty());
}

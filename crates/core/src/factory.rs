//! Construction of canonical events from a form submission and its request.

use tracing::debug;

use crate::request::RequestContext;
use crate::types::{ServerEvent, UserData, INTEGRATION_TRACKING_KEY};

pub struct ServerEventFactory;

impl ServerEventFactory {
    /// Timestamped skeleton event with no user data.
    pub fn new_event(event_name: &str) -> ServerEvent {
        ServerEvent::new(event_name)
    }

    /// Skeleton event enriched with what the request carries: referrer as the
    /// source URL, client IP, user agent and pixel cookies.
    pub fn for_request(event_name: &str, request: &RequestContext) -> ServerEvent {
        Self::new_event(event_name)
            .with_source_url(request.referrer.clone())
            .with_user_data(request.user_data())
    }

    /// Event for `integration` combining form-submitted identity with the
    /// request-derived data. Form values win where both are present.
    pub fn create_event(
        event_name: &str,
        request: &RequestContext,
        integration: &str,
        form_user: UserData,
    ) -> ServerEvent {
        let base = Self::for_request(event_name, request);
        let user_data = form_user.merge_missing(base.user_data().clone());

        debug!(
            integration,
            event_name,
            identity_fields = user_data.identity_count(),
            "server event created"
        );

        base.with_user_data(user_data)
            .with_custom_property(INTEGRATION_TRACKING_KEY, integration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_request_sets_source_url() {
        let request = RequestContext::new()
            .with_referrer("TEST_REFERER")
            .with_user_agent("Mozilla/5.0");

        let event = ServerEventFactory::for_request("Lead", &request);
        assert_eq!(event.event_name(), "Lead");
        assert_eq!(event.event_source_url(), Some("TEST_REFERER"));
        assert_eq!(event.user_data().client_user_agent.as_deref(), Some("Mozilla/5.0"));
        assert!(event.integration().is_none());
    }

    #[test]
    fn test_create_event_merges_form_data() {
        let request = RequestContext::new()
            .with_remote_addr("203.0.113.9")
            .with_referrer("TEST_REFERER");
        let form_user = UserData {
            email: Some("pika.chu@s2s.com".into()),
            ..Default::default()
        };

        let event = ServerEventFactory::create_event("Lead", &request, "caldera-forms", form_user);
        assert_eq!(event.user_data().email.as_deref(), Some("pika.chu@s2s.com"));
        assert_eq!(
            event.user_data().client_ip_address.as_deref(),
            Some("203.0.113.9")
        );
        assert_eq!(event.event_source_url(), Some("TEST_REFERER"));
        assert_eq!(event.integration(), Some("caldera-forms"));
    }

    #[test]
    fn test_create_event_without_form_data() {
        let request = RequestContext::new();
        let event = ServerEventFactory::create_event(
            "Lead",
            &request,
            "contact-form-7",
            UserData::default(),
        );

        assert_eq!(event.event_name(), "Lead");
        assert_eq!(event.user_data().identity_count(), 0);
        assert!(event.event_source_url().is_none());
        assert_eq!(event.integration(), Some("contact-form-7"));
    }
}

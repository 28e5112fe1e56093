//! Browser pixel snippet rendering.

use serde_json::json;

use crate::types::ServerEvent;

pub const PIXEL_CODE_START: &str = "<!-- Facebook Pixel Event Code";
pub const PIXEL_CODE_END: &str = "<!-- End Facebook Pixel Event Code -->";

pub struct PixelRenderer;

impl PixelRenderer {
    /// Render `fbq('track', ...)` calls for `events` wrapped in a script tag
    /// and the start/end markers. The start marker names `integration`.
    pub fn render(events: &[ServerEvent], integration: &str) -> String {
        let mut code = format!(
            "\n{} ({}) -->\n<script type='text/javascript'>\n",
            PIXEL_CODE_START, integration
        );
        for event in events {
            code.push_str(&Self::fbq_call(event));
            code.push('\n');
        }
        code.push_str("</script>\n");
        code.push_str(PIXEL_CODE_END);
        code.push('\n');
        code
    }

    fn fbq_call(event: &ServerEvent) -> String {
        let name = json!(event.event_name());
        let params = json!(event.custom_data()).to_string();
        let options = json!({ "eventID": event.event_id().to_string() });
        // keep property values from closing the script element
        let params = params.replace("</", "<\\/");
        format!("fbq('track', {}, {}, {});", name, params, options)
    }
}

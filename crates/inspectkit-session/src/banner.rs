//! The banner printed when an inspector starts listening.

use crate::config::InspectorConfig;
use inspectkit_core::state::EndpointDescriptor;

/// Render the two banner lines for `descriptor`.
///
/// ```
/// use inspectkit_core::EndpointDescriptor;
/// use inspectkit_session::{banner, InspectorConfig};
///
/// let lines = banner::render(&InspectorConfig::new(), &EndpointDescriptor::new("127.0.0.1", 9229, "t"));
/// assert_eq!(lines[0], "Debugger listening on port 9229");
/// assert!(lines[1].ends_with("js_app.html?ws=127.0.0.1:9229/t"));
/// ```
#[must_use]
pub fn render(config: &InspectorConfig, descriptor: &EndpointDescriptor) -> [String; 2] {
    [
        format!("Debugger listening on port {}", descriptor.port),
        format!(
            "To start debugging, open the following URL in Chrome: {}{}",
            config.devtools_prefix,
            descriptor.url()
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_prefix() {
        let config = InspectorConfig::new().with_devtools_prefix("chrome-devtools://x?");
        let [first, second] = render(&config, &EndpointDescriptor::new("::1", 4000, "tok"));

        assert_eq!(first, "Debugger listening on port 4000");
        assert!(second.ends_with("chrome-devtools://x?ws=[::1]:4000/tok"));
    }
}

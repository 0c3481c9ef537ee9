//! Prometheus registry and text exposition.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};

/// Global metrics registry; core metrics register themselves here once.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    reformer_core::metrics::register_core_metrics(&registry);
    registry
});

/// Renders the registry in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&REGISTRY.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_core_metrics() {
        reformer_core::metrics::record_conversion("render_test", true);
        let text = render();
        assert!(text.contains("reformer_conversions_total"));
    }
}

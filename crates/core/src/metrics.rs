//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Conversion batches (per operation, per result)
//! - Pipeline fallbacks
//! - Blank-page elimination
//! - Upload filtering
//! - Retention sweeping

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Conversion items processed, by operation and result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reformer_conversions_total", "Conversion items processed"),
        &["operation", "result"], // result: "success" | "error"
    )
    .unwrap()
});

/// Transcodes that succeeded only after falling back past the first
/// strategy.
pub static STRATEGY_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reformer_strategy_fallbacks_total",
        "Transcodes completed by a non-primary strategy",
    )
    .unwrap()
});

/// Blank pages stripped before document conversion.
pub static BLANK_PAGES_REMOVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reformer_blank_pages_removed_total",
        "Blank pages removed from uploaded PDFs",
    )
    .unwrap()
});

/// Uploads rejected by the content filter, by category.
pub static UPLOADS_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reformer_uploads_rejected_total",
            "Uploads rejected by the content filter",
        ),
        &["category"],
    )
    .unwrap()
});

/// Workspaces deleted by the retention sweeper.
pub static WORKSPACES_REAPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reformer_workspaces_reaped_total",
        "Workspaces removed by the retention sweeper",
    )
    .unwrap()
});

/// Registers all core metrics on the given registry.
pub fn register_core_metrics(registry: &Registry) {
    let _ = registry.register(Box::new(CONVERSIONS_TOTAL.clone()));
    let _ = registry.register(Box::new(STRATEGY_FALLBACKS.clone()));
    let _ = registry.register(Box::new(BLANK_PAGES_REMOVED.clone()));
    let _ = registry.register(Box::new(UPLOADS_REJECTED.clone()));
    let _ = registry.register(Box::new(WORKSPACES_REAPED.clone()));
}

/// Records one conversion item outcome.
pub fn record_conversion(operation: &str, success: bool) {
    let result = if success { "success" } else { "error" };
    CONVERSIONS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent_enough() {
        let registry = Registry::new();
        register_core_metrics(&registry);
        // Double registration is swallowed, not a panic.
        register_core_metrics(&registry);
    }

    #[test]
    fn test_record_conversion_counts() {
        let before = CONVERSIONS_TOTAL
            .with_label_values(&["test_op", "success"])
            .get();
        record_conversion("test_op", true);
        let after = CONVERSIONS_TOTAL
            .with_label_values(&["test_op", "success"])
            .get();
        assert_eq!(after, before + 1);
    }
}

//! # Prometheus Metrics
//!
//! Exposes storefront metrics. Scraped by Prometheus at the `/metrics` HTTP
//! endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Reasons a mint request is turned away, used as the `reason` label.
pub mod reject {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const ALREADY_MINTED: &str = "already_minted";
    pub const INTERNAL: &str = "internal";
}

/// Holds all Prometheus metric handles for the server.
///
/// Clone-friendly (prometheus handles are `Arc`s internally) so it can be
/// shared across request handlers.
#[derive(Clone)]
pub struct StoreMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Every `POST /api/mint`, accepted or not.
    pub mint_requests_total: IntCounter,
    /// Mints that created a transaction.
    pub mints_total: IntCounter,
    /// Rejected mints by reason.
    pub mint_rejections_total: IntCounterVec,
    /// Candidates handed out by `GET /api/mint-candidates/:collection`.
    pub candidates_served_total: IntCounter,
    /// Ownership validations that reached the oracle.
    pub ownership_validations_total: IntCounter,
    /// Transactions whose simulated confirmation is still running.
    pub simulations_in_flight: IntGauge,
    /// Histogram of mint handler latency in seconds.
    pub mint_latency_seconds: Histogram,
}

impl StoreMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("ordmint".into()), None)?;

        let mint_requests_total =
            IntCounter::new("mint_requests_total", "Total number of mint requests received")?;
        registry.register(Box::new(mint_requests_total.clone()))?;

        let mints_total = IntCounter::new("mints_total", "Total number of successful mints")?;
        registry.register(Box::new(mints_total.clone()))?;

        let mint_rejections_total = IntCounterVec::new(
            Opts::new("mint_rejections_total", "Rejected mint requests by reason"),
            &["reason"],
        )?;
        registry.register(Box::new(mint_rejections_total.clone()))?;

        let candidates_served_total = IntCounter::new(
            "candidates_served_total",
            "Total number of mint candidates handed out",
        )?;
        registry.register(Box::new(candidates_served_total.clone()))?;

        let ownership_validations_total = IntCounter::new(
            "ownership_validations_total",
            "Total number of ownership validations performed",
        )?;
        registry.register(Box::new(ownership_validations_total.clone()))?;

        let simulations_in_flight = IntGauge::new(
            "simulations_in_flight",
            "Transactions whose simulated confirmation has not finished",
        )?;
        registry.register(Box::new(simulations_in_flight.clone()))?;

        let mint_latency_seconds = Histogram::with_opts(
            HistogramOpts::new("mint_latency_seconds", "Mint request handling latency in seconds")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        )?;
        registry.register(Box::new(mint_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            mint_requests_total,
            mints_total,
            mint_rejections_total,
            candidates_served_total,
            ownership_validations_total,
            simulations_in_flight,
            mint_latency_seconds,
        })
    }

    /// Count a rejected mint.
    pub fn reject_mint(&self, reason: &str) {
        self.mint_rejections_total.with_label_values(&[reason]).inc();
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<StoreMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_prefixed_metrics() {
        let metrics = StoreMetrics::new().unwrap();
        metrics.mints_total.inc();
        metrics.reject_mint(reject::ALREADY_MINTED);

        let text = metrics.encode().unwrap();
        assert!(text.contains("ordmint_mints_total 1"));
        assert!(text.contains("ordmint_mint_rejections_total{reason=\"already_minted\"} 1"));
    }

    #[test]
    fn registries_are_independent() {
        let a = StoreMetrics::new().unwrap();
        let b = StoreMetrics::new().unwrap();
        a.mint_requests_total.inc();
        assert!(b.encode().unwrap().contains("ordmint_mint_requests_total 0"));
    }
}

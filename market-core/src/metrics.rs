//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the marketplace.
//!
//! # Metrics
//!
//! - `market_mints_total` - Total tokens minted
//! - `market_listings_total` - Total listings created
//! - `market_sales_total` - Total completed sales
//! - `market_cancellations_total` - Total cancelled listings
//! - `market_fees_held` - Marketplace-held fee balance
//! - `market_op_duration_seconds` - Histogram of operation latencies

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Total tokens minted
    pub mints_total: IntCounter,

    /// Total listings created
    pub listings_total: IntCounter,

    /// Total completed sales
    pub sales_total: IntCounter,

    /// Total cancelled listings
    pub cancellations_total: IntCounter,

    /// Marketplace-held fee balance
    pub fees_held: IntGauge,

    /// Operation latency histogram
    pub op_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let mints_total =
            IntCounter::with_opts(Opts::new("market_mints_total", "Total tokens minted"))?;
        registry.register(Box::new(mints_total.clone()))?;

        let listings_total =
            IntCounter::with_opts(Opts::new("market_listings_total", "Total listings created"))?;
        registry.register(Box::new(listings_total.clone()))?;

        let sales_total =
            IntCounter::with_opts(Opts::new("market_sales_total", "Total completed sales"))?;
        registry.register(Box::new(sales_total.clone()))?;

        let cancellations_total = IntCounter::with_opts(Opts::new(
            "market_cancellations_total",
            "Total cancelled listings",
        ))?;
        registry.register(Box::new(cancellations_total.clone()))?;

        let fees_held =
            IntGauge::with_opts(Opts::new("market_fees_held", "Marketplace-held fee balance"))?;
        registry.register(Box::new(fees_held.clone()))?;

        let op_duration = Histogram::with_opts(
            HistogramOpts::new(
                "market_op_duration_seconds",
                "Histogram of operation latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100]),
        )?;
        registry.register(Box::new(op_duration.clone()))?;

        Ok(Self {
            mints_total,
            listings_total,
            sales_total,
            cancellations_total,
            fees_held,
            op_duration,
            registry,
        })
    }

    /// Record a mint
    pub fn record_mint(&self) {
        self.mints_total.inc();
    }

    /// Record a listing
    pub fn record_listing(&self) {
        self.listings_total.inc();
    }

    /// Record a completed sale
    pub fn record_sale(&self) {
        self.sales_total.inc();
    }

    /// Record a cancellation
    pub fn record_cancellation(&self) {
        self.cancellations_total.inc();
    }

    /// Update the held-fee gauge
    pub fn update_fees_held(&self, held: u64) {
        self.fees_held.set(held as i64);
    }

    /// Record operation duration
    pub fn record_op_duration(&self, duration_seconds: f64) {
        self.op_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.mints_total.get(), 0);
        assert_eq!(metrics.sales_total.get(), 0);
    }

    #[test]
    fn test_record_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.record_mint();
        metrics.record_mint();
        metrics.record_listing();
        metrics.record_sale();
        metrics.record_cancellation();

        assert_eq!(metrics.mints_total.get(), 2);
        assert_eq!(metrics.listings_total.get(), 1);
        assert_eq!(metrics.sales_total.get(), 1);
        assert_eq!(metrics.cancellations_total.get(), 1);
    }

    #[test]
    fn test_update_fees_held() {
        let metrics = Metrics::new().unwrap();
        metrics.update_fees_held(123);
        assert_eq!(metrics.fees_held.get(), 123);
        metrics.update_fees_held(0);
        assert_eq!(metrics.fees_held.get(), 0);
    }

    #[test]
    fn test_record_op_duration() {
        let metrics = Metrics::new().unwrap();
        metrics.record_op_duration(0.002);
        metrics.record_op_duration(0.030);
        // Histogram recorded successfully (no assertion on histogram internals)
    }
}

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Install the Prometheus recorder. Fails if a recorder is already
/// installed (only one per process).
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full("precificador_final_price".to_string()),
            &[10.0, 25.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2500.0],
        )?
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

fn init_metric_descriptions() {
    describe_counter!(
        "precificador_prices_total",
        "Total number of pricing computations"
    );
    describe_histogram!(
        "precificador_final_price",
        "Final price of computed products in BRL"
    );
    describe_counter!(
        "precificador_quotes_saved_total",
        "Total number of quotes appended to history"
    );
    describe_counter!(
        "precificador_recipes_saved_total",
        "Total number of recipe saves"
    );
    describe_counter!(
        "precificador_catalog_failures_total",
        "Catalog loads that fell back to an empty catalog"
    );
    describe_gauge!("precificador_info", "Version information");

    gauge!("precificador_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record one pricing computation
pub fn record_price_computation(payment_method: &str, final_price: Decimal) {
    counter!(
        "precificador_prices_total",
        "payment_method" => payment_method.to_string(),
    )
    .increment(1);
    histogram!("precificador_final_price").record(final_price.to_f64().unwrap_or(0.0));
}

pub fn record_quote_saved(payment_method: &str) {
    counter!(
        "precificador_quotes_saved_total",
        "payment_method" => payment_method.to_string(),
    )
    .increment(1);
}

pub fn record_recipe_saved() {
    counter!("precificador_recipes_saved_total").increment(1);
}

pub fn record_catalog_failure() {
    counter!("precificador_catalog_failures_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_metrics() {
        init_metric_descriptions();

        record_price_computation("pix", dec!(210.43));
        record_quote_saved("credito");
        record_recipe_saved();
        record_catalog_failure();

        // Without an installed recorder these are no-ops; they must not panic
    }

    #[test]
    fn test_recorder_renders_recorded_values() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_recipe_saved();
            record_price_computation("credito", dec!(99.90));
        });

        let rendered = handle.render();
        assert!(rendered.contains("precificador_recipes_saved_total"));
        assert!(rendered.contains("payment_method=\"credito\""));
    }
}

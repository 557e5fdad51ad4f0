use crate::error::PlannerError;
use crate::otel;
use opentelemetry::KeyValue;
use opentelemetry::metrics::Counter;
use std::sync::OnceLock;

pub fn inc_lookup_success(service: &'static str) {
    lookup_success().add(1, &[KeyValue::new("service", service)])
}

pub fn inc_lookup_error(service: &'static str, status: u64, error: &PlannerError) {
    let attributes = vec![
        KeyValue::new("service", service),
        KeyValue::new("status", status.to_string()),
        KeyValue::new("kind", error.kind()),
    ];
    lookup_error().add(1, &attributes)
}

pub fn inc_plans_generated() {
    plans_generated().add(1, &[])
}

pub fn record_hotels_ranked(count: usize) {
    hotels_ranked().add(count as u64, &[])
}

fn lookup_success() -> &'static Counter<u64> {
    static COUNTER: OnceLock<Counter<u64>> = OnceLock::new();
    COUNTER.get_or_init(|| {
        otel::get_meter()
            .u64_counter("lookup_success")
            .with_description("Number of successful external lookups")
            .build()
    })
}

fn lookup_error() -> &'static Counter<u64> {
    static COUNTER: OnceLock<Counter<u64>> = OnceLock::new();
    COUNTER.get_or_init(|| {
        otel::get_meter()
            .u64_counter("lookup_error")
            .with_description("Number of failed external lookups")
            .build()
    })
}

fn plans_generated() -> &'static Counter<u64> {
    static COUNTER: OnceLock<Counter<u64>> = OnceLock::new();
    COUNTER.get_or_init(|| {
        otel::get_meter()
            .u64_counter("plans_generated")
            .with_description("Number of travel plans produced")
            .build()
    })
}

fn hotels_ranked() -> &'static Counter<u64> {
    static COUNTER: OnceLock<Counter<u64>> = OnceLock::new();
    COUNTER.get_or_init(|| {
        otel::get_meter()
            .u64_counter("hotels_ranked")
            .with_description("Number of priced hotel candidates passed through the ranker")
            .build()
    })
}

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Histogram, register_counter, register_counter_vec, register_histogram,
};

lazy_static! {
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "gateway_requests_total",
        "Total number of requests per endpoint",
        &["endpoint"]
    )
    .expect("gateway_requests_total registers once");
    pub static ref RATE_LIMITED_TOTAL: Counter = register_counter!(
        "gateway_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .expect("gateway_rate_limited_total registers once");
    pub static ref EXTRACTIONS_TOTAL: CounterVec = register_counter_vec!(
        "gateway_extractions_total",
        "Prefill extractions by outcome",
        &["outcome"]
    )
    .expect("gateway_extractions_total registers once");
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "gateway_upstream_latency_seconds",
        "Latency of AI platform calls in seconds"
    )
    .expect("gateway_upstream_latency_seconds registers once");
}

//! Prometheus metrics for the property API

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, register_int_gauge_vec,
    HistogramVec, IntCounterVec, IntGauge, IntGaugeVec,
};
use std::time::Instant;

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "heya_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "heya_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "heya_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    pub static ref HTTP_RESPONSE_SIZE_BYTES: HistogramVec = register_histogram_vec!(
        "heya_http_response_size_bytes",
        "HTTP response size in bytes",
        &["method", "path", "status"],
        vec![100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0]
    )
    .expect("Failed to register HTTP_RESPONSE_SIZE_BYTES");

    // Property Operation Metrics

    /// Property operations (search, detail) by outcome
    pub static ref PROPERTY_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "heya_property_operations_total",
        "Total number of property operations",
        &["operation", "status"]
    )
    .expect("Failed to register PROPERTY_OPERATIONS_TOTAL");

    pub static ref PROPERTY_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "heya_property_operation_duration_seconds",
        "Property operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register PROPERTY_OPERATION_DURATION_SECONDS");

    /// Properties returned per search page
    pub static ref PROPERTY_SEARCH_RESULTS: HistogramVec = register_histogram_vec!(
        "heya_property_search_results",
        "Number of properties returned by a search page",
        &["sort_by"],
        vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0]
    )
    .expect("Failed to register PROPERTY_SEARCH_RESULTS");

    // Database Metrics

    /// Database query duration by query kind
    pub static ref DB_QUERY_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "heya_db_query_duration_seconds",
        "Database query duration in seconds",
        &["query_type"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]
    )
    .expect("Failed to register DB_QUERY_DURATION_SECONDS");

    pub static ref DB_QUERY_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "heya_db_query_errors_total",
        "Total number of database query errors",
        &["query_type"]
    )
    .expect("Failed to register DB_QUERY_ERRORS_TOTAL");

    pub static ref DB_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        "heya_db_connections_active",
        "Number of active database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_ACTIVE");

    pub static ref DB_CONNECTIONS_IDLE: IntGauge = register_int_gauge!(
        "heya_db_connections_idle",
        "Number of idle database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_IDLE");
}

/// Times one database round trip and records it under `query_type`.
pub struct QueryTimer {
    query_type: &'static str,
    started: Instant,
}

impl QueryTimer {
    pub fn start(query_type: &'static str) -> Self {
        Self {
            query_type,
            started: Instant::now(),
        }
    }

    /// Record the duration, and an error count when the query failed.
    pub fn finish<T, E>(self, result: &std::result::Result<T, E>) {
        DB_QUERY_DURATION_SECONDS
            .with_label_values(&[self.query_type])
            .observe(self.started.elapsed().as_secs_f64());
        if result.is_err() {
            DB_QUERY_ERRORS_TOTAL
                .with_label_values(&[self.query_type])
                .inc();
        }
    }
}

/// Helper to sanitize path for metrics labels (numeric ids become `{id}`)
pub fn sanitize_path(path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }

    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Operation label for a property route, if the path is one.
pub fn extract_operation(method: &str, path: &str) -> Option<&'static str> {
    if method != "GET" {
        return None;
    }
    let rest = path.strip_prefix("/api/properties")?;
    match rest.trim_end_matches('/') {
        "" => Some("search"),
        rest => rest
            .strip_prefix('/')
            .filter(|id| !id.contains('/'))
            .map(|_| "detail"),
    }
}

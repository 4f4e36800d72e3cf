// Prometheus metrics for the MCP tool servers
//
// Exposes metrics on the /metrics HTTP endpoint:
// - Tool calls by outcome (counter)
// - Tool call latencies (histogram)
// - Spawned and timed out processes (counters)
// - BIG-IP REST requests by status (counter)

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, HistogramVec, IntCounter, Registry, TextEncoder};
use std::time::Duration;

lazy_static! {
    pub static ref REGISTRY: Registry = {
        let registry = Registry::new();
        register_all(&registry).expect("Failed to register metrics");
        registry
    };

    // Tool metrics
    pub static ref MCP_TOOL_CALLS_TOTAL: CounterVec = CounterVec::new(
        prometheus::Opts::new("mcp_tool_calls_total", "Total number of MCP tool calls"),
        &["tool_name", "status"]
    ).expect("Failed to create MCP tool calls metric");

    pub static ref MCP_TOOL_CALL_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        prometheus::HistogramOpts::new("mcp_tool_call_duration_seconds", "Duration of MCP tool calls"),
        &["tool_name"]
    ).expect("Failed to create MCP tool call duration metric");

    // Process metrics
    pub static ref PROCESSES_SPAWNED_TOTAL: IntCounter = IntCounter::new(
        "processes_spawned_total",
        "Total number of external processes spawned"
    ).expect("Failed to create processes spawned metric");

    pub static ref PROCESS_TIMEOUTS_TOTAL: IntCounter = IntCounter::new(
        "process_timeouts_total",
        "Total number of external processes killed after a timeout"
    ).expect("Failed to create process timeouts metric");

    // BIG-IP metrics
    pub static ref BIGIP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        prometheus::Opts::new("bigip_requests_total", "Total number of BIG-IP REST requests"),
        &["status"]
    ).expect("Failed to create BIG-IP requests metric");
}

fn register_all(registry: &Registry) -> prometheus::Result<()> {
    registry.register(Box::new(MCP_TOOL_CALLS_TOTAL.clone()))?;
    registry.register(Box::new(MCP_TOOL_CALL_DURATION_SECONDS.clone()))?;
    registry.register(Box::new(PROCESSES_SPAWNED_TOTAL.clone()))?;
    registry.register(Box::new(PROCESS_TIMEOUTS_TOTAL.clone()))?;
    registry.register(Box::new(BIGIP_REQUESTS_TOTAL.clone()))?;
    Ok(())
}

/// Record one finished tool call
pub fn record_tool_call(tool_name: &str, status: &str, elapsed: Duration) {
    MCP_TOOL_CALLS_TOTAL
        .with_label_values(&[tool_name, status])
        .inc();
    MCP_TOOL_CALL_DURATION_SECONDS
        .with_label_values(&[tool_name])
        .observe(elapsed.as_secs_f64());
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

use serde::{Deserialize, Serialize};

/// Frames pushed by the benchmark server over the duplex channel.
///
/// The `type` discriminator is mandatory and matched case-sensitively.
/// Frames carrying a discriminator outside the known set decode to
/// `Unknown` so callers can drop them without treating the frame as
/// malformed; a missing discriminator or non-JSON payload is a parse error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "EXECUTION_UPDATE", rename_all = "camelCase")]
    ExecutionUpdate {
        execution_id: String,
        framework_type: String,
        status: String,
        #[serde(default)]
        duration: i64,
    },
    #[serde(rename = "BENCHMARK_UPDATE", rename_all = "camelCase")]
    BenchmarkUpdate {
        benchmark_run_id: String,
        #[serde(default)]
        name: Option<String>,
        status: String,
    },
    /// Signal-only; carries no payload fields the client consumes.
    #[serde(rename = "METRICS_UPDATE")]
    MetricsUpdate,
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Liveness frame sent once after every successful channel open.
#[derive(Debug, Clone, Serialize)]
pub struct PingFrame {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub timestamp: i64,
}

impl PingFrame {
    pub fn at(timestamp_ms: i64) -> Self {
        Self {
            kind: "ping",
            timestamp: timestamp_ms,
        }
    }
}

/// Normalized execution entry handed to the execution-list surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub id: String,
    pub framework_type: String,
    pub status: String,
    pub execution_duration_ms: i64,
}

/// Human-readable benchmark status line. The display name falls back to the
/// run id when absent or empty.
pub fn benchmark_label(run_id: &str, name: Option<&str>, status: &str) -> String {
    let display = match name {
        Some(name) if !name.is_empty() => name,
        _ => run_id,
    };
    format!("Benchmark {display} - {status}")
}

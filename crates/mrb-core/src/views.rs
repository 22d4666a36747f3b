use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// One in-flight benchmark run, pulled from `/api/benchmarks/runs/active`.
/// The response maps run id to run state; list order is the response's own
/// object order, so keys stay outside the struct.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBenchmarkRun {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub completed_executions: u64,
    #[serde(default)]
    pub total_executions: u64,
}

/// Per-framework aggregate pulled for the comparison chart. Replaced
/// wholesale on every pull.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkMetric {
    pub framework_type: String,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub average_response_time_ms: f64,
}

/// System-wide snapshot pulled from `/api/metrics/system/summary`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSummary {
    #[serde(default)]
    pub overall_success_rate: f64,
    #[serde(default)]
    pub overall_average_response_time: f64,
    #[serde(default)]
    pub overall_consistency_score: f64,
}

/// Body for `POST /api/benchmarks/execute`; the server answers 202 on accept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRequest {
    pub name: String,
    pub task_id: i64,
    pub framework_types: Vec<String>,
    pub iterations: u32,
}

pub const TOP_PERFORMER_COUNT: usize = 3;

/// Fixed render order for the reliability histogram.
pub const RELIABILITY_BUCKETS: [&str; 4] = ["Excellent", "Good", "Fair", "Poor"];

/// Top performers by descending success rate. The sort is stable, so ties
/// keep the response order. Entries are already formatted for display.
pub fn top_performers(metrics: &[FrameworkMetric]) -> Vec<String> {
    let mut ranked: Vec<&FrameworkMetric> = metrics.iter().collect();
    ranked.sort_by(|a, b| {
        b.success_rate
            .partial_cmp(&a.success_rate)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(TOP_PERFORMER_COUNT);
    ranked
        .iter()
        .map(|metric| format!("{}: {:.2}%", metric.framework_type, metric.success_rate))
        .collect()
}

/// Counts for the four fixed buckets, in `RELIABILITY_BUCKETS` order.
/// Buckets absent from the pulled distribution render as 0.
pub fn reliability_buckets(distribution: &Map<String, Value>) -> Vec<(&'static str, i64)> {
    RELIABILITY_BUCKETS
        .iter()
        .map(|bucket| {
            let count = distribution
                .get(*bucket)
                .and_then(Value::as_i64)
                .unwrap_or(0);
            (*bucket, count)
        })
        .collect()
}

/// Run entries in response-iteration order. `serde_json` is built with
/// `preserve_order`, so the map iterates exactly as the server wrote it.
pub fn active_runs_in_order(response: Map<String, Value>) -> Vec<(String, ActiveBenchmarkRun)> {
    response
        .into_iter()
        .filter_map(|(run_id, value)| {
            serde_json::from_value(value).ok().map(|run| (run_id, run))
        })
        .collect()
}

/// One display line per active run.
pub fn active_run_line(run_id: &str, run: &ActiveBenchmarkRun) -> String {
    format!(
        "{run_id} | {} | {}/{}",
        run.status, run.completed_executions, run.total_executions
    )
}

/// The three summary panel lines, rates to two decimals and the average
/// response rounded to whole milliseconds.
pub fn summary_lines(summary: &SystemSummary) -> [String; 3] {
    [
        format!("Success Rate: {:.2}%", summary.overall_success_rate),
        format!(
            "Avg Response: {} ms",
            summary.overall_average_response_time.round() as i64
        ),
        format!("Consistency: {:.2}%", summary.overall_consistency_score),
    ]
}

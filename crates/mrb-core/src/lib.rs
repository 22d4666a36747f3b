pub mod protocol;
pub mod views;

pub use protocol::{benchmark_label, ExecutionRecord, PingFrame, ServerEvent};
pub use views::{
    active_run_line, active_runs_in_order, reliability_buckets, summary_lines, top_performers,
    ActiveBenchmarkRun, BenchmarkRequest, FrameworkMetric, SystemSummary, RELIABILITY_BUCKETS,
    TOP_PERFORMER_COUNT,
};

use mrb_core::{summary_lines, ExecutionRecord, FrameworkMetric, SystemSummary};

/// Boundary to whatever renders the dashboard. The live client only knows
/// these seven capabilities; layout and styling live behind them.
pub trait DashboardSurfaces: Send + Sync + 'static {
    /// `live` distinguishes push-delivered entries from historical ones;
    /// it only affects presentation ordering on the far side.
    fn append_execution_item(&self, record: &ExecutionRecord, live: bool);
    fn set_benchmark_status(&self, text: &str);
    fn render_summary(&self, summary: &SystemSummary);
    fn render_comparison_chart(&self, metrics: &[FrameworkMetric]);
    fn render_top_performers(&self, entries: &[String]);
    fn render_reliability_distribution(&self, buckets: &[(&'static str, i64)]);
    fn render_active_runs(&self, lines: &[String]);
}

/// Exclusively-owned handle for the comparison chart. Replaced wholesale on
/// every comparison pull; the coordinator drops the old instance before a
/// rebuilt one takes its place.
#[derive(Debug)]
pub struct ComparisonChart {
    metrics: Vec<FrameworkMetric>,
}

impl ComparisonChart {
    pub fn build(metrics: Vec<FrameworkMetric>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &[FrameworkMetric] {
        &self.metrics
    }
}

/// Plain-line terminal renderer used by the binary.
pub struct TermSurfaces;

impl DashboardSurfaces for TermSurfaces {
    fn append_execution_item(&self, record: &ExecutionRecord, live: bool) {
        let origin = if live { "live" } else { "hist" };
        println!(
            "[exec {origin}] {} {} {} {}ms",
            record.id, record.framework_type, record.status, record.execution_duration_ms
        );
    }

    fn set_benchmark_status(&self, text: &str) {
        println!("[benchmark] {text}");
    }

    fn render_summary(&self, summary: &SystemSummary) {
        println!("[summary]");
        for line in summary_lines(summary) {
            println!("  {line}");
        }
    }

    fn render_comparison_chart(&self, metrics: &[FrameworkMetric]) {
        println!("[comparison]");
        for metric in metrics {
            println!(
                "  {} {:.2}% {:.0}ms",
                metric.framework_type, metric.success_rate, metric.average_response_time_ms
            );
        }
    }

    fn render_top_performers(&self, entries: &[String]) {
        println!("[top performers]");
        for entry in entries {
            println!("  {entry}");
        }
    }

    fn render_reliability_distribution(&self, buckets: &[(&'static str, i64)]) {
        println!("[reliability]");
        for (bucket, count) in buckets {
            println!("  {bucket}: {count}");
        }
    }

    fn render_active_runs(&self, lines: &[String]) {
        println!("[active runs]");
        for line in lines {
            println!("  {line}");
        }
    }
}

use crate::api::MetricsApi;
use crate::surfaces::{ComparisonChart, DashboardSurfaces};
use mrb_core::{active_run_line, reliability_buckets, top_performers, BenchmarkRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Targeted pulls the coordinator performs. Triggered by push events, user
/// actions, and the periodic timer.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshCommand {
    Summary,
    Comparison,
    ActiveRuns,
    Submit(BenchmarkRequest),
}

/// Cheap handle for queueing refresh work from dispatcher and user-action
/// paths without awaiting the coordinator.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<RefreshCommand>,
}

impl RefreshHandle {
    pub fn new(tx: mpsc::Sender<RefreshCommand>) -> Self {
        Self { tx }
    }

    pub fn request(&self, command: RefreshCommand) {
        if self.tx.try_send(command).is_err() {
            warn!("refresh_queue_full");
        }
    }
}

/// Bridges push events and pull-based fetches. Every pull replaces its
/// surface wholesale on success and leaves prior state untouched on failure;
/// there is no retry and no cross-pull caching.
pub struct RefreshCoordinator<A: MetricsApi, S: DashboardSurfaces> {
    api: Arc<A>,
    surfaces: Arc<S>,
    chart: Option<ComparisonChart>,
}

impl<A: MetricsApi, S: DashboardSurfaces> RefreshCoordinator<A, S> {
    pub fn new(api: Arc<A>, surfaces: Arc<S>) -> Self {
        Self {
            api,
            surfaces,
            chart: None,
        }
    }

    pub async fn pull_summary(&self) {
        match self.api.system_summary().await {
            Ok(summary) => self.surfaces.render_summary(&summary),
            Err(err) => warn!("summary_pull_error: {err}"),
        }
    }

    /// Rebuilds the comparison chart from scratch and recomputes both side
    /// panels. A failed comparison fetch renders nothing; a failed
    /// distribution fetch still renders the four buckets, all zero.
    pub async fn pull_comparison(&mut self) {
        let metrics = match self.api.framework_comparison().await {
            Ok(metrics) => metrics,
            Err(err) => {
                warn!("comparison_pull_error: {err}");
                return;
            }
        };
        // old chart instance is destroyed before the rebuilt one exists
        self.chart = None;
        let chart = ComparisonChart::build(metrics);
        self.surfaces.render_comparison_chart(chart.metrics());
        let top = top_performers(chart.metrics());
        self.surfaces.render_top_performers(&top);
        let distribution = match self.api.reliability_distribution().await {
            Ok(distribution) => distribution,
            Err(err) => {
                warn!("distribution_pull_error: {err}");
                Default::default()
            }
        };
        self.surfaces
            .render_reliability_distribution(&reliability_buckets(&distribution));
        self.chart = Some(chart);
    }

    pub async fn pull_active_runs(&self) {
        match self.api.active_runs().await {
            Ok(runs) => {
                let lines: Vec<String> = runs
                    .iter()
                    .map(|(run_id, run)| active_run_line(run_id, run))
                    .collect();
                self.surfaces.render_active_runs(&lines);
            }
            Err(err) => warn!("active_runs_pull_error: {err}"),
        }
    }

    /// Submits a new benchmark and reflects the outcome inline, then pulls
    /// the active-run list either way.
    pub async fn submit_benchmark(&self, request: &BenchmarkRequest) {
        match self.api.execute_benchmark(request).await {
            Ok(202) => self.surfaces.set_benchmark_status("Benchmark started"),
            Ok(status) => {
                warn!("benchmark_submit_status: {status}");
                self.surfaces.set_benchmark_status("Failed to start");
            }
            Err(err) => {
                warn!("benchmark_submit_error: {err}");
                self.surfaces.set_benchmark_status("Failed to start");
            }
        }
        self.pull_active_runs().await;
    }

    pub async fn pull_all(&mut self) {
        self.pull_summary().await;
        self.pull_comparison().await;
        self.pull_active_runs().await;
    }

    /// Drains the command queue and runs the periodic refresh. The first
    /// tick fires immediately and doubles as the initial load; after that
    /// the cadence performs targeted pulls of all three panels.
    pub async fn run(mut self, mut commands: mpsc::Receiver<RefreshCommand>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("periodic_refresh");
                    self.pull_all().await;
                }
                command = commands.recv() => match command {
                    Some(RefreshCommand::Summary) => self.pull_summary().await,
                    Some(RefreshCommand::Comparison) => self.pull_comparison().await,
                    Some(RefreshCommand::ActiveRuns) => self.pull_active_runs().await,
                    Some(RefreshCommand::Submit(request)) => self.submit_benchmark(&request).await,
                    None => break,
                },
            }
        }
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use mrb_core::{ActiveBenchmarkRun, BenchmarkRequest, ExecutionRecord, FrameworkMetric, SystemSummary};
use mrb_dash::{Connection, Connector, DashError, DashboardSurfaces, MetricsApi};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Surface implementation that records every invocation.
#[derive(Default)]
pub struct Recorder {
    pub executions: Mutex<Vec<(ExecutionRecord, bool)>>,
    pub statuses: Mutex<Vec<String>>,
    pub summaries: Mutex<Vec<SystemSummary>>,
    pub charts: Mutex<Vec<Vec<FrameworkMetric>>>,
    pub top_performers: Mutex<Vec<Vec<String>>>,
    pub distributions: Mutex<Vec<Vec<(&'static str, i64)>>>,
    pub active_runs: Mutex<Vec<Vec<String>>>,
}

impl DashboardSurfaces for Recorder {
    fn append_execution_item(&self, record: &ExecutionRecord, live: bool) {
        self.executions.lock().unwrap().push((record.clone(), live));
    }

    fn set_benchmark_status(&self, text: &str) {
        self.statuses.lock().unwrap().push(text.to_string());
    }

    fn render_summary(&self, summary: &SystemSummary) {
        self.summaries.lock().unwrap().push(summary.clone());
    }

    fn render_comparison_chart(&self, metrics: &[FrameworkMetric]) {
        self.charts.lock().unwrap().push(metrics.to_vec());
    }

    fn render_top_performers(&self, entries: &[String]) {
        self.top_performers.lock().unwrap().push(entries.to_vec());
    }

    fn render_reliability_distribution(&self, buckets: &[(&'static str, i64)]) {
        self.distributions.lock().unwrap().push(buckets.to_vec());
    }

    fn render_active_runs(&self, lines: &[String]) {
        self.active_runs.lock().unwrap().push(lines.to_vec());
    }
}

pub enum ConnectOutcome {
    Fail,
    /// Deliver these frames, then close cleanly.
    Session(Vec<String>),
}

/// Connector driven by a script; connects fail once the script runs out.
pub struct ScriptedConnector {
    script: Mutex<VecDeque<ConnectOutcome>>,
    attempts: Arc<Mutex<Vec<Instant>>>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConnector {
    pub fn new(script: Vec<ConnectOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            attempts: Arc::new(Mutex::new(Vec::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn always_failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn attempts(&self) -> Arc<Mutex<Vec<Instant>>> {
        self.attempts.clone()
    }

    pub fn sent(&self) -> Arc<Mutex<Vec<String>>> {
        self.sent.clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Conn = ScriptedConnection;

    async fn connect(&self) -> Result<ScriptedConnection, DashError> {
        self.attempts.lock().unwrap().push(Instant::now());
        match self.script.lock().unwrap().pop_front() {
            Some(ConnectOutcome::Session(frames)) => Ok(ScriptedConnection {
                frames: frames.into(),
                sent: self.sent.clone(),
            }),
            Some(ConnectOutcome::Fail) | None => {
                Err(DashError::Transport("connection refused".to_string()))
            }
        }
    }
}

pub struct ScriptedConnection {
    frames: VecDeque<String>,
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn send_text(&mut self, text: String) -> Result<(), DashError> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn next_text(&mut self) -> Option<Result<String, DashError>> {
        self.frames.pop_front().map(Ok)
    }

    async fn close(&mut self) {}
}

pub fn pull_error() -> DashError {
    DashError::PullStatus {
        url: "http://dash.test/api".to_string(),
        status: 500,
    }
}

/// Canned API; a `None` slot makes that endpoint fail.
pub struct FakeApi {
    pub summary: Mutex<Option<SystemSummary>>,
    pub comparison: Mutex<Option<Vec<FrameworkMetric>>>,
    pub distribution: Mutex<Option<Map<String, Value>>>,
    pub runs: Mutex<Option<Vec<(String, ActiveBenchmarkRun)>>>,
    pub execute_status: Mutex<Option<u16>>,
    pub execute_requests: Mutex<Vec<BenchmarkRequest>>,
    pub summary_calls: Mutex<u64>,
    pub active_run_calls: Mutex<u64>,
}

impl FakeApi {
    pub fn healthy() -> Self {
        Self {
            summary: Mutex::new(Some(SystemSummary::default())),
            comparison: Mutex::new(Some(Vec::new())),
            distribution: Mutex::new(Some(Map::new())),
            runs: Mutex::new(Some(Vec::new())),
            execute_status: Mutex::new(Some(202)),
            execute_requests: Mutex::new(Vec::new()),
            summary_calls: Mutex::new(0),
            active_run_calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl MetricsApi for FakeApi {
    async fn system_summary(&self) -> Result<SystemSummary, DashError> {
        *self.summary_calls.lock().unwrap() += 1;
        self.summary.lock().unwrap().clone().ok_or_else(pull_error)
    }

    async fn framework_comparison(&self) -> Result<Vec<FrameworkMetric>, DashError> {
        self.comparison.lock().unwrap().clone().ok_or_else(pull_error)
    }

    async fn reliability_distribution(&self) -> Result<Map<String, Value>, DashError> {
        self.distribution.lock().unwrap().clone().ok_or_else(pull_error)
    }

    async fn active_runs(&self) -> Result<Vec<(String, ActiveBenchmarkRun)>, DashError> {
        *self.active_run_calls.lock().unwrap() += 1;
        self.runs.lock().unwrap().clone().ok_or_else(pull_error)
    }

    async fn execute_benchmark(&self, request: &BenchmarkRequest) -> Result<u16, DashError> {
        self.execute_requests.lock().unwrap().push(request.clone());
        self.execute_status.lock().unwrap().ok_or_else(pull_error)
    }
}

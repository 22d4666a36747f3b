use crate::error::DashError;
use async_trait::async_trait;
use mrb_core::{active_runs_in_order, ActiveBenchmarkRun, BenchmarkRequest, FrameworkMetric, SystemSummary};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

/// Read/write endpoints the refresh coordinator pulls from. Trait boundary
/// so coordinator behavior can be exercised against canned responses.
#[async_trait]
pub trait MetricsApi: Send + Sync + 'static {
    async fn system_summary(&self) -> Result<SystemSummary, DashError>;

    async fn framework_comparison(&self) -> Result<Vec<FrameworkMetric>, DashError>;

    async fn reliability_distribution(&self) -> Result<Map<String, Value>, DashError>;

    /// Run-id/run pairs in response-iteration order.
    async fn active_runs(&self) -> Result<Vec<(String, ActiveBenchmarkRun)>, DashError>;

    /// Returns the HTTP status; the server accepts with 202.
    async fn execute_benchmark(&self, request: &BenchmarkRequest) -> Result<u16, DashError>;
}

/// REST client against the benchmark server.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, DashError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashError> {
        let url = self.endpoint(path)?;
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(DashError::PullStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MetricsApi for HttpApi {
    async fn system_summary(&self) -> Result<SystemSummary, DashError> {
        self.get_json("/api/metrics/system/summary").await
    }

    async fn framework_comparison(&self) -> Result<Vec<FrameworkMetric>, DashError> {
        self.get_json("/api/metrics/comparison").await
    }

    async fn reliability_distribution(&self) -> Result<Map<String, Value>, DashError> {
        self.get_json("/api/metrics/reliability/distribution").await
    }

    async fn active_runs(&self) -> Result<Vec<(String, ActiveBenchmarkRun)>, DashError> {
        let response: Map<String, Value> = self.get_json("/api/benchmarks/runs/active").await?;
        Ok(active_runs_in_order(response))
    }

    async fn execute_benchmark(&self, request: &BenchmarkRequest) -> Result<u16, DashError> {
        let url = self.endpoint("/api/benchmarks/execute")?;
        let response = self.client.post(url).json(request).send().await?;
        Ok(response.status().as_u16())
    }
}

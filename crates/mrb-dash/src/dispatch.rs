use crate::refresh::{RefreshCommand, RefreshHandle};
use crate::surfaces::DashboardSurfaces;
use mrb_core::{benchmark_label, ExecutionRecord, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Routes decoded server events to the surface collaborators. Holds no
/// per-frame state; frames are handled one at a time in arrival order.
pub struct Dispatcher<S: DashboardSurfaces> {
    surfaces: Arc<S>,
    refresh: RefreshHandle,
}

impl<S: DashboardSurfaces> Dispatcher<S> {
    pub fn new(surfaces: Arc<S>, refresh: RefreshHandle) -> Self {
        Self { surfaces, refresh }
    }

    /// Handles one raw frame. A parse failure drops that frame only; the
    /// channel and later frames are unaffected.
    pub fn dispatch(&self, raw: &str) {
        let event = match ServerEvent::parse(raw) {
            Ok(event) => event,
            Err(err) => {
                warn!("frame_parse_error: {err}");
                return;
            }
        };
        match event {
            ServerEvent::ExecutionUpdate {
                execution_id,
                framework_type,
                status,
                duration,
            } => {
                let record = ExecutionRecord {
                    id: execution_id,
                    framework_type,
                    status,
                    execution_duration_ms: duration,
                };
                self.surfaces.append_execution_item(&record, true);
            }
            ServerEvent::BenchmarkUpdate {
                benchmark_run_id,
                name,
                status,
            } => {
                let label = benchmark_label(&benchmark_run_id, name.as_deref(), &status);
                self.surfaces.set_benchmark_status(&label);
            }
            ServerEvent::MetricsUpdate => {
                // signal-only; the summary pull recomputes the derived view
                self.refresh.request(RefreshCommand::Summary);
            }
            ServerEvent::Unknown => {}
        }
    }

    /// Consumes the transport's frame queue until the channel closes.
    pub async fn run(self, mut frames: mpsc::Receiver<String>) {
        while let Some(raw) = frames.recv().await {
            self.dispatch(&raw);
        }
    }
}

use clap::Parser;
use mrb_dash::config::{
    resolve_base_url, resolve_log_dir, DashConfig, DEFAULT_RECONNECT_MS, DEFAULT_REFRESH_SECS,
};
use mrb_dash::{
    ChannelManager, DashError, Dispatcher, HttpApi, ReconnectPolicy, RefreshCommand,
    RefreshCoordinator, RefreshHandle, TermSurfaces, WsConnector,
};
use std::{
    env,
    fs::OpenOptions,
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "mrb-dash")]
struct Args {
    #[arg(long, default_value = "")]
    base_url: String,
    #[arg(long, default_value_t = DEFAULT_RECONNECT_MS)]
    reconnect_ms: u64,
    #[arg(long, default_value_t = 0)]
    reconnect_jitter_ms: u64,
    /// 0 retries forever.
    #[arg(long, default_value_t = 0)]
    reconnect_max_attempts: u64,
    #[arg(long, default_value_t = DEFAULT_REFRESH_SECS)]
    refresh_secs: u64,
    #[arg(long, default_value = "")]
    log_dir: String,
}

struct LogGuard {
    file: Option<Arc<StdMutex<std::fs::File>>>,
}

struct LogWriter {
    file: Option<Arc<StdMutex<std::fs::File>>>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config_error: {err}");
            std::process::exit(1);
        }
    };
    let _log_guard = init_logging(&config);
    info!("mrb_dash_start: {} (ws {})", config.base_url, config.ws_url);

    let surfaces = Arc::new(TermSurfaces);
    let api = Arc::new(HttpApi::new(config.base_url.clone()));

    let (refresh_tx, refresh_rx) = mpsc::channel::<RefreshCommand>(64);
    let refresh = RefreshHandle::new(refresh_tx);
    let coordinator = RefreshCoordinator::new(api, surfaces.clone());
    let refresh_interval = config.refresh_interval;
    let coordinator_task = tokio::spawn(coordinator.run(refresh_rx, refresh_interval));

    let (frame_tx, frame_rx) = mpsc::channel::<String>(256);
    let dispatcher = Dispatcher::new(surfaces, refresh.clone());
    let dispatch_task = tokio::spawn(dispatcher.run(frame_rx));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let connector = WsConnector::new(config.ws_url.clone());
    let manager = ChannelManager::new(connector, config.reconnect.clone(), frame_tx, shutdown_rx);
    let channel_task = tokio::spawn(manager.run());

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("signal_error: {err}");
    }
    info!("mrb_dash_stop");
    let _ = shutdown_tx.send(true);
    drop(refresh);
    let _ = channel_task.await;
    let _ = dispatch_task.await;
    let _ = coordinator_task.await;
}

fn load_config(args: &Args) -> Result<DashConfig, DashError> {
    let base_url = resolve_base_url(&args.base_url)?;
    let reconnect = ReconnectPolicy {
        delay: Duration::from_millis(args.reconnect_ms),
        jitter: Duration::from_millis(args.reconnect_jitter_ms),
        max_attempts: (args.reconnect_max_attempts > 0).then_some(args.reconnect_max_attempts),
    };
    DashConfig::new(
        base_url,
        reconnect,
        Duration::from_secs(args.refresh_secs),
        resolve_log_dir(&args.log_dir),
    )
}

fn init_logging(config: &DashConfig) -> Option<LogGuard> {
    let level = env::var("MRB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let guard = match open_log_file(&config.log_dir) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("log_file_error: {err}");
            LogGuard { file: None }
        }
    };
    let file = guard.file.clone();
    let make_writer = BoxMakeWriter::new(move || LogWriter { file: file.clone() });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return None;
    }
    Some(guard)
}

fn open_log_file(log_dir: &str) -> io::Result<LogGuard> {
    if log_dir.trim().is_empty() {
        return Ok(LogGuard { file: None });
    }
    let dir = PathBuf::from(log_dir);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("mrb-dash.log");
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(LogGuard {
        file: Some(Arc::new(StdMutex::new(file))),
    })
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.file {
            Some(file) => match file.lock() {
                Ok(mut file) => file.write(buf),
                Err(_) => Ok(buf.len()),
            },
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.file {
            Some(file) => match file.lock() {
                Ok(mut file) => file.flush(),
                Err(_) => Ok(()),
            },
            None => io::stderr().flush(),
        }
    }
}

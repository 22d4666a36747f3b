pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod refresh;
pub mod surfaces;
pub mod transport;

pub use api::{HttpApi, MetricsApi};
pub use config::DashConfig;
pub use dispatch::Dispatcher;
pub use error::DashError;
pub use refresh::{RefreshCommand, RefreshCoordinator, RefreshHandle};
pub use surfaces::{ComparisonChart, DashboardSurfaces, TermSurfaces};
pub use transport::{ChannelManager, Connection, ConnectionState, Connector, ReconnectPolicy, WsConnector};

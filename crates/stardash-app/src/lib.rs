pub mod bootstrap;
pub mod poller;

pub use crate::bootstrap::{AppContext, build};
pub use crate::poller::{
    DashboardPoller, DashboardSnapshot, DashboardState, MetricsSource, PollerHandle, PollerOptions,
};

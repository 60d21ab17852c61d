mod liveness_monitor;

pub use liveness_monitor::LivenessConfig;
pub(crate) use liveness_monitor::LivenessMonitor;

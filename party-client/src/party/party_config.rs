use crate::liveness::LivenessConfig;
use crate::transport::TransportConfig;

#[derive(Debug, Clone, Default)]
pub struct PartyConfig {
    pub transport: TransportConfig,
    pub liveness: LivenessConfig,
}

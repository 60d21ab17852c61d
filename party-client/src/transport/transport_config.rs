use party_core::IceServerConfig;
use party_core::utils::{
    DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2, DEFAULT_STUN_ADDR_3, DEFAULT_STUN_ADDR_4,
};

/// WebRTC settings shared by every peer connection.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: [
                    DEFAULT_STUN_ADDR,
                    DEFAULT_STUN_ADDR_2,
                    DEFAULT_STUN_ADDR_3,
                    DEFAULT_STUN_ADDR_4,
                ]
                .map(str::to_owned)
                .to_vec(),
                username: None,
                credential: None,
            }],
        }
    }
}

impl TransportConfig {
    /// Uses `urls` as STUN servers without credentials.
    pub fn with_stun(urls: Vec<String>) -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls,
                username: None,
                credential: None,
            }],
        }
    }
}

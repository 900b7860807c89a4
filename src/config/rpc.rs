use serde::Deserialize;
use serde::Serialize;
use solana_sdk::commitment_config::CommitmentConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub url: String,
    /// Bounded per-request timeout so a slow node cannot stall a tick.
    pub request_timeout_ms: u64,
    pub commitment: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            request_timeout_ms: 10_000,
            commitment: "confirmed".to_string(),
        }
    }
}

impl RpcConfig {
    pub fn commitment_config(&self) -> CommitmentConfig {
        match self.commitment.as_str() {
            "processed" => CommitmentConfig::processed(),
            "finalized" => CommitmentConfig::finalized(),
            _ => CommitmentConfig::confirmed(),
        }
    }
}

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_signature::Signature;
use solana_transaction_status::EncodedTransaction;
use solana_transaction_status::UiInstruction;
use solana_transaction_status::UiMessage;
use solana_transaction_status::UiParsedInstruction;
use solana_transaction_status::UiTransactionEncoding;
use tracing::debug;

use crate::config::RpcConfig;
use crate::error::rpc::RpcClientError;
use crate::model::ParsedInstruction;
use crate::Result;

/// Chain access as the watcher needs it. The trait seam keeps the loop
/// testable without a node.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// The most recent signatures for the account, newest first.
    async fn recent_signatures(&self, account: &Pubkey, limit: usize) -> Result<Vec<String>>;

    /// Parsed instructions of a transaction, or `None` while the node does
    /// not see it yet.
    async fn parsed_transaction(&self, signature: &str) -> Result<Option<Vec<ParsedInstruction>>>;
}

pub fn parse_wallet(address: &str) -> Result<Pubkey> {
    Pubkey::from_str(address)
        .map_err(|e| RpcClientError::InvalidAddress(format!("{address}: {e}")).into())
}

pub struct SolanaRpc {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaRpc {
    pub fn new(config: &RpcConfig) -> Self {
        let commitment = config.commitment_config();
        let client = RpcClient::new_with_timeout_and_commitment(
            config.url.clone(),
            Duration::from_millis(config.request_timeout_ms),
            commitment,
        );
        Self { client, commitment }
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    async fn recent_signatures(&self, account: &Pubkey, limit: usize) -> Result<Vec<String>> {
        let signatures = self
            .client
            .get_signatures_for_address_with_config(account, GetConfirmedSignaturesForAddress2Config {
                before: None,
                until: None,
                limit: Some(limit),
                commitment: Some(self.commitment),
            })
            .await
            .map_err(|e| RpcClientError::SignatureFetch {
                account: account.to_string(),
                message: e.to_string(),
            })?;

        debug!("fetched_signatures::count::{}::account::{}", signatures.len(), account);

        Ok(signatures.into_iter().map(|info| info.signature).collect())
    }

    async fn parsed_transaction(&self, signature: &str) -> Result<Option<Vec<ParsedInstruction>>> {
        let parsed_signature = Signature::from_str(signature).map_err(|e| RpcClientError::TransactionFetch {
            signature: signature.to_string(),
            message: e.to_string(),
        })?;

        let transaction = match self
            .client
            .get_transaction_with_config(&parsed_signature, RpcTransactionConfig {
                encoding: Some(UiTransactionEncoding::JsonParsed),
                commitment: Some(self.commitment),
                max_supported_transaction_version: Some(0),
            })
            .await
        {
            Ok(transaction) => transaction,
            Err(e) => {
                let message = e.to_string();
                // The node answers null for signatures it has not finalized yet.
                if message.contains("invalid type: null") || message.contains("not found") {
                    debug!("transaction_not_available::signature::{}", signature);
                    return Ok(None);
                }
                return Err(RpcClientError::TransactionFetch {
                    signature: signature.to_string(),
                    message,
                }
                .into());
            },
        };

        Ok(Some(parse_instructions(&transaction.transaction.transaction)))
    }
}

fn parse_instructions(transaction: &EncodedTransaction) -> Vec<ParsedInstruction> {
    let EncodedTransaction::Json(ui_transaction) = transaction else {
        return Vec::new();
    };
    let UiMessage::Parsed(message) = &ui_transaction.message else {
        return Vec::new();
    };

    instruction_views(&message.instructions)
}

fn instruction_views(instructions: &[UiInstruction]) -> Vec<ParsedInstruction> {
    instructions
        .iter()
        .filter_map(|instruction| match instruction {
            UiInstruction::Parsed(UiParsedInstruction::Parsed(parsed)) => Some(ParsedInstruction {
                program: parsed.program.clone(),
                parsed_type: parsed
                    .parsed
                    .get("type")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string),
                info: parsed
                    .parsed
                    .get("info")
                    .cloned()
                    .unwrap_or(serde_json::Value::Null),
            }),
            _ => None,
        })
        .collect()
}

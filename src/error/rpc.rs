use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcClientError {
    #[error("Failed to fetch signatures for {account}: {message}")]
    SignatureFetch { account: String, message: String },
    #[error("Failed to fetch transaction {signature}: {message}")]
    TransactionFetch { signature: String, message: String },
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),
}

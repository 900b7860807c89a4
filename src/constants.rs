/// Program label the RPC node attaches to parsed SPL Token instructions.
pub const SPL_TOKEN_PROGRAM: &str = "spl-token";

/// Parsed instruction type emitted when a new mint account is initialized.
pub const INITIALIZE_MINT_TYPE: &str = "initializeMint";

/// PumpFun token page base URL - This is a public page, not an API endpoint
pub const PUMP_FUN_URL: &str = "https://pump.fun";

/// Solscan token page base URL
pub const SOLSCAN_TOKEN_URL: &str = "https://solscan.io/token";

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

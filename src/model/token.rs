use serde_json::Value;

use crate::constants::INITIALIZE_MINT_TYPE;
use crate::constants::SPL_TOKEN_PROGRAM;

/// One mint-initialization found in a watched transaction. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCreationEvent {
    pub mint: String,
}

/// Instruction view as the RPC node parses it: program label, parsed
/// instruction type and the type-specific info object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstruction {
    pub program: String,
    pub parsed_type: Option<String>,
    pub info: Value,
}

impl ParsedInstruction {
    pub fn token_creation(&self) -> Option<TokenCreationEvent> {
        if self.program != SPL_TOKEN_PROGRAM || self.parsed_type.as_deref() != Some(INITIALIZE_MINT_TYPE) {
            return None;
        }
        self.info
            .get("mint")
            .and_then(Value::as_str)
            .map(|mint| TokenCreationEvent { mint: mint.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherStatus {
    pub online: bool,
    pub uptime_secs: u64,
    pub wallet: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn instruction(program: &str, parsed_type: Option<&str>, info: Value) -> ParsedInstruction {
        ParsedInstruction {
            program: program.to_string(),
            parsed_type: parsed_type.map(str::to_string),
            info,
        }
    }

    #[test]
    fn initialize_mint_yields_event() {
        let event = instruction(
            "spl-token",
            Some("initializeMint"),
            json!({"mint": "Mx1", "decimals": 6}),
        )
        .token_creation();

        assert_eq!(event, Some(TokenCreationEvent { mint: "Mx1".to_string() }));
    }

    #[test]
    fn other_programs_and_types_are_ignored() {
        assert_eq!(
            instruction("system", Some("transfer"), json!({"lamports": 1})).token_creation(),
            None
        );
        assert_eq!(
            instruction("spl-token", Some("transferChecked"), json!({"mint": "Mx1"})).token_creation(),
            None
        );
        assert_eq!(instruction("spl-token", None, json!({})).token_creation(), None);
    }

    #[test]
    fn missing_mint_field_yields_nothing() {
        assert_eq!(
            instruction("spl-token", Some("initializeMint"), json!({})).token_creation(),
            None
        );
    }
}

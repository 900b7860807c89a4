//! The slice of the Telegram Bot API wire format this bot touches.

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgUpdate {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgMessage {
    pub chat: TgChat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TgResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn get_updates_response_deserializes() {
        let body = json!({
            "ok": true,
            "result": [
                {"update_id": 7, "message": {"chat": {"id": 42}, "text": "/status"}},
                {"update_id": 8, "message": {"chat": {"id": 42}}},
                {"update_id": 9}
            ]
        });

        let response: TgResponse<Vec<TgUpdate>> = serde_json::from_value(body).unwrap();
        assert!(response.ok);
        let updates = response.result.unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].message.as_ref().unwrap().text.as_deref(), Some("/status"));
        assert!(updates[2].message.is_none());
    }
}

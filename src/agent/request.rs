//! Canonical inbound request model and the webhook normalizer.

use serde_json::{Map, Value};

use crate::error::HandlerError;

/// Canonical request, constructed once per inbound call.
///
/// Normalization never fails: malformed documents degrade to empty or
/// default fields, since the platform still wants *a* response.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRequest {
    /// Final segment of the transport session path; empty when absent.
    pub session_id: String,
    /// Empty string means "no intent detected".
    pub intent_name: String,
    pub parameters: Map<String, Value>,
    /// Raw user utterance, possibly empty.
    pub query_text: String,
    pub language_code: String,
    /// Full original document, retained for handlers needing extra fields.
    pub raw_payload: Value,
}

impl AgentRequest {
    /// Normalize a parsed webhook document into a canonical request.
    ///
    /// Reads `session`, `queryResult.intent.displayName`,
    /// `queryResult.parameters`, `queryResult.queryText` and
    /// `queryResult.languageCode`, defaulting each absent field.
    pub fn from_webhook(document: &Value) -> Self {
        let session_id = document
            .get("session")
            .and_then(Value::as_str)
            .and_then(|session| session.rsplit('/').next())
            .unwrap_or_default()
            .to_string();

        let query_result = document.get("queryResult");

        let intent_name = query_result
            .and_then(|qr| qr.get("intent"))
            .and_then(|intent| intent.get("displayName"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let parameters = query_result
            .and_then(|qr| qr.get("parameters"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let query_text = query_result
            .and_then(|qr| qr.get("queryText"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let language_code = query_result
            .and_then(|qr| qr.get("languageCode"))
            .and_then(Value::as_str)
            .unwrap_or("en")
            .to_string();

        Self {
            session_id,
            intent_name,
            parameters,
            query_text,
            language_code,
            raw_payload: document.clone(),
        }
    }

    /// Look up a parameter, treating JSON `null` as absent.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name).filter(|v| !v.is_null())
    }

    /// String parameter, or `None` when absent, null, or not a string.
    pub fn string_parameter(&self, name: &str) -> Option<&str> {
        self.parameter(name).and_then(Value::as_str)
    }

    /// Required string parameter; absence is a handler error the
    /// dispatcher will contain.
    pub fn require_string(&self, name: &str) -> Result<&str, HandlerError> {
        self.string_parameter(name)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| HandlerError::MissingParameter {
                name: name.to_string(),
            })
    }

    /// Names of parameters that are missing, null, or empty strings.
    pub fn missing_parameters(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| {
                match self.parameters.get(**name) {
                    None | Some(Value::Null) => true,
                    Some(Value::String(s)) => s.is_empty(),
                    Some(_) => false,
                }
            })
            .map(|name| name.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn sample_document() -> Value {
        json!({
            "session": "projects/p/locations/l/agents/a/sessions/sess-42",
            "queryResult": {
                "queryText": "show my portfolio",
                "parameters": {"symbol": "AAPL", "shares": 10, "note": null},
                "intent": {
                    "name": "projects/p/agent/intents/uuid",
                    "displayName": "get_portfolio"
                },
                "languageCode": "en-US"
            }
        })
    }

    #[test]
    fn normalizes_all_fields() {
        let request = AgentRequest::from_webhook(&sample_document());
        assert_eq!(request.session_id, "sess-42");
        assert_eq!(request.intent_name, "get_portfolio");
        assert_eq!(request.query_text, "show my portfolio");
        assert_eq!(request.language_code, "en-US");
        assert_eq!(request.parameters["symbol"], json!("AAPL"));
    }

    #[test]
    fn malformed_document_degrades_to_defaults() {
        let request = AgentRequest::from_webhook(&json!({"unexpected": true}));
        assert_eq!(request.session_id, "");
        assert_eq!(request.intent_name, "");
        assert_eq!(request.query_text, "");
        assert_eq!(request.language_code, "en");
        assert!(request.parameters.is_empty());
        assert_eq!(request.raw_payload, json!({"unexpected": true}));
    }

    #[test]
    fn session_id_is_last_path_segment() {
        let request = AgentRequest::from_webhook(&json!({"session": "a/b/c/final-segment"}));
        assert_eq!(request.session_id, "final-segment");

        // A bare session string is its own final segment.
        let request = AgentRequest::from_webhook(&json!({"session": "plain"}));
        assert_eq!(request.session_id, "plain");
    }

    #[test]
    fn null_parameters_count_as_absent() {
        let request = AgentRequest::from_webhook(&sample_document());
        assert!(request.parameter("note").is_none());
        assert!(request.parameter("symbol").is_some());
    }

    #[test]
    fn missing_parameters_reports_every_gap() {
        let request = AgentRequest::from_webhook(&sample_document());
        let missing = request.missing_parameters(&["symbol", "account", "note"]);
        assert_eq!(missing, vec!["account".to_string(), "note".to_string()]);
    }

    #[test]
    fn require_string_maps_to_handler_error() {
        let request = AgentRequest::from_webhook(&sample_document());
        assert_eq!(request.require_string("symbol").unwrap(), "AAPL");
        let err = request.require_string("account").unwrap_err();
        assert!(err.to_string().contains("account"));
    }
}

//! Mock webhook requests for tests and local simulation.
//!
//! Builds complete platform-shaped request documents so intent handlers
//! and the full pipeline can be exercised without a live deployment.

use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Builder for a platform-shaped webhook request document.
#[derive(Debug, Clone)]
pub struct WebhookRequestBuilder {
    intent_name: String,
    parameters: Map<String, Value>,
    session_id: Option<String>,
    language_code: String,
    query_text: Option<String>,
    contexts: Vec<Value>,
}

impl WebhookRequestBuilder {
    /// Request carrying the given intent.
    pub fn intent(intent_name: impl Into<String>) -> Self {
        Self {
            intent_name: intent_name.into(),
            parameters: Map::new(),
            session_id: None,
            language_code: "en".to_string(),
            query_text: None,
            contexts: Vec::new(),
        }
    }

    /// Request with no intent at all, for exercising the default handler.
    pub fn without_intent() -> Self {
        Self::intent("")
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }

    pub fn with_query_text(mut self, query_text: impl Into<String>) -> Self {
        self.query_text = Some(query_text.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.contexts.push(context);
        self
    }

    /// Assemble the full request document.
    pub fn build(self) -> Value {
        let session_id = self
            .session_id
            .unwrap_or_else(|| format!("test-session-{}", Uuid::new_v4()));
        let query_text = self
            .query_text
            .unwrap_or_else(|| format!("Trigger {} intent", self.intent_name));

        json!({
            "responseId": format!("response-{}", Uuid::new_v4()),
            "session": format!("projects/test-project/agent/sessions/{session_id}"),
            "queryResult": {
                "queryText": query_text,
                "action": self.intent_name,
                "parameters": self.parameters,
                "allRequiredParamsPresent": true,
                "fulfillmentText": "",
                "fulfillmentMessages": [],
                "outputContexts": self.contexts,
                "intent": {
                    "name": format!("projects/test-project/agent/intents/{}", Uuid::new_v4()),
                    "displayName": self.intent_name,
                },
                "intentDetectionConfidence": 1.0,
                "languageCode": self.language_code,
            },
            "originalDetectIntentRequest": {
                "source": "test",
                "payload": {}
            }
        })
    }
}

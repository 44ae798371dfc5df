//! Canonical response model and the webhook wire formatter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::content::RichContent;
use crate::agent::context::{FollowupEvent, OutputContext};

/// Canonical response built by handlers, immutable once handed to the
/// formatter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentResponse {
    /// Always present on the wire; may be empty.
    pub fulfillment_text: String,
    /// Free-form payload; the `richContent` key holds grouped content blocks.
    pub payload: Option<Map<String, Value>>,
    /// Append order is preserved. Duplicate names are allowed and NOT
    /// deduplicated; downstream consumers may rely on the order.
    pub output_contexts: Vec<OutputContext>,
    pub followup_event: Option<FollowupEvent>,
    pub session_info: Option<Map<String, Value>>,
}

impl AgentResponse {
    pub fn new(fulfillment_text: impl Into<String>) -> Self {
        Self {
            fulfillment_text: fulfillment_text.into(),
            ..Self::default()
        }
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attach grouped content blocks under `payload.richContent`,
    /// preserving any other payload keys already set.
    pub fn with_rich_content(mut self, content: RichContent) -> Self {
        let payload = self.payload.get_or_insert_with(Map::new);
        payload.insert(
            "richContent".to_string(),
            serde_json::to_value(content).unwrap_or(Value::Array(Vec::new())),
        );
        self
    }

    pub fn with_context(mut self, context: OutputContext) -> Self {
        self.output_contexts.push(context);
        self
    }

    pub fn with_followup_event(mut self, event: FollowupEvent) -> Self {
        self.followup_event = Some(event);
        self
    }

    pub fn with_session_info(mut self, session_info: Map<String, Value>) -> Self {
        self.session_info = Some(session_info);
        self
    }

    /// Serialize into the platform wire document.
    pub fn to_webhook_response(&self) -> WebhookResponse {
        WebhookResponse {
            fulfillment_text: self.fulfillment_text.clone(),
            payload: self.payload.clone().filter(|p| !p.is_empty()),
            output_contexts: self.output_contexts.clone(),
            followup_event: self.followup_event.clone(),
            session_info: self.session_info.clone().filter(|s| !s.is_empty()),
        }
    }

    /// The wire document as a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self.to_webhook_response()).unwrap_or_else(|_| {
            // Serialization of these types cannot fail, but the webhook
            // contract demands a body either way.
            serde_json::json!({"fulfillmentText": self.fulfillment_text})
        })
    }
}

/// Wire document for the conversational-agent platform.
///
/// `fulfillmentText` is always emitted; every other key is omitted when
/// absent rather than emitted as null, matching the platform schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub fulfillment_text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub output_contexts: Vec<OutputContext>,
    #[serde(
        rename = "followupEventInput",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub followup_event: Option<FollowupEvent>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session_info: Option<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::agent::content::InfoCard;

    #[test]
    fn minimal_response_emits_only_fulfillment_text() {
        let value = AgentResponse::new("hi").to_value();
        assert_eq!(value, json!({"fulfillmentText": "hi"}));
    }

    #[test]
    fn empty_fulfillment_text_is_still_present() {
        let value = AgentResponse::new("").to_value();
        assert_eq!(value, json!({"fulfillmentText": ""}));
    }

    #[test]
    fn rich_content_lands_under_payload() {
        let response = AgentResponse::new("here you go").with_rich_content(
            RichContent::new().with_block(InfoCard::new("Card").unwrap()),
        );
        let value = response.to_value();
        assert_eq!(
            value["payload"]["richContent"],
            json!([[{"type": "info", "title": "Card"}]])
        );
    }

    #[test]
    fn rich_content_keeps_existing_payload_keys() {
        let mut payload = Map::new();
        payload.insert("telephony".to_string(), json!({"audio": "none"}));
        let response = AgentResponse::new("ok")
            .with_payload(payload)
            .with_rich_content(RichContent::new().with_block(InfoCard::new("Card").unwrap()));
        let value = response.to_value();
        assert_eq!(value["payload"]["telephony"], json!({"audio": "none"}));
        assert!(value["payload"]["richContent"].is_array());
    }

    #[test]
    fn empty_payload_is_omitted() {
        let response = AgentResponse::new("ok").with_payload(Map::new());
        let value = response.to_value();
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn contexts_round_trip_through_the_wire_document() {
        let context = OutputContext {
            name: "projects/p/locations/l/agents/a/sessions/s/contexts/checkout".to_string(),
            lifespan_count: 4,
            parameters: Some(Map::from_iter([("step".to_string(), json!("confirm"))])),
        };
        let response = AgentResponse::new("ok").with_context(context.clone());

        let value = response.to_value();
        let parsed: WebhookResponse = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.output_contexts.len(), 1);
        assert_eq!(parsed.output_contexts[0], context);
    }

    #[test]
    fn duplicate_context_names_are_preserved_in_order() {
        // Known quirk: the consuming layer treats contexts as an ordered
        // list, so the formatter must not dedupe by name.
        let first = OutputContext {
            name: "ctx".to_string(),
            lifespan_count: 1,
            parameters: None,
        };
        let second = OutputContext {
            name: "ctx".to_string(),
            lifespan_count: 9,
            parameters: None,
        };
        let response = AgentResponse::new("ok")
            .with_context(first.clone())
            .with_context(second.clone());
        let wire = response.to_webhook_response();
        assert_eq!(wire.output_contexts, vec![first, second]);
    }

    #[test]
    fn followup_event_uses_platform_key() {
        let response =
            AgentResponse::new("ok").with_followup_event(FollowupEvent::new("next-step"));
        let value = response.to_value();
        assert_eq!(
            value["followupEventInput"],
            json!({"name": "next-step", "languageCode": "en"})
        );
    }
}

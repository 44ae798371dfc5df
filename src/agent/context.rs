//! Session-scoped output contexts and follow-up events.
//!
//! Contexts are named, lifespan-counted key/value bags owned by the
//! conversation platform's session store. The gateway only reads and
//! writes context descriptions; it never decrements lifespans.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::AgentConfig;
use crate::error::ValidationError;

/// Context description carried on a response.
///
/// `lifespan_count` of 0 conventionally means "expire after this turn";
/// decrementing is the platform runtime's job, not ours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputContext {
    pub name: String,
    pub lifespan_count: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parameters: Option<Map<String, Value>>,
}

/// Follow-up event triggering another intent on the platform side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupEvent {
    pub name: String,
    pub language_code: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parameters: Option<Map<String, Value>>,
}

impl FollowupEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language_code: "en".to_string(),
            parameters: None,
        }
    }

    pub fn with_language(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Builds fully-qualified context names from the agent identity.
///
/// Handlers capture a factory at registration time; the agent identity is
/// plain data, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct ContextFactory {
    agent: AgentConfig,
}

impl ContextFactory {
    pub fn new(agent: AgentConfig) -> Self {
        Self { agent }
    }

    /// Create a context description for `session_id`.
    ///
    /// An unqualified `name` is expanded to
    /// `projects/{project}/locations/{location}/agents/{agent_id}/sessions/{session_id}/contexts/{name}`;
    /// a name already starting with `projects/` passes through untouched.
    /// An empty `session_id` would produce a malformed context name, so it
    /// is rejected here instead.
    pub fn context(
        &self,
        session_id: &str,
        name: &str,
        lifespan_count: u32,
        parameters: Option<Map<String, Value>>,
    ) -> Result<OutputContext, ValidationError> {
        if session_id.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "session_id".to_string(),
            });
        }
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "context name".to_string(),
            });
        }

        let name = if name.starts_with("projects/") {
            name.to_string()
        } else {
            format!(
                "projects/{}/locations/{}/agents/{}/sessions/{}/contexts/{}",
                self.agent.project, self.agent.location, self.agent.agent_id, session_id, name
            )
        };

        Ok(OutputContext {
            name,
            lifespan_count,
            parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn factory() -> ContextFactory {
        ContextFactory::new(AgentConfig::default())
    }

    #[test]
    fn unqualified_name_is_fully_qualified() {
        let ctx = factory().context("abc123", "foo", 5, None).unwrap();
        assert!(
            ctx.name.ends_with("/sessions/abc123/contexts/foo"),
            "unexpected name: {}",
            ctx.name
        );
        assert!(ctx.name.starts_with("projects/"));
        assert_eq!(ctx.lifespan_count, 5);
    }

    #[test]
    fn qualified_name_passes_through() {
        let name = "projects/p/locations/l/agents/a/sessions/s/contexts/checkout";
        let ctx = factory().context("ignored-session", name, 2, None).unwrap();
        assert_eq!(ctx.name, name);
    }

    #[test]
    fn empty_session_id_is_rejected() {
        let err = factory().context("", "foo", 5, None).unwrap_err();
        assert!(err.to_string().contains("session_id"));
    }

    #[test]
    fn context_serializes_camel_case() {
        let mut params = Map::new();
        params.insert("step".to_string(), json!(2));
        let ctx = factory().context("s1", "checkout", 3, Some(params)).unwrap();
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["lifespanCount"], json!(3));
        assert_eq!(value["parameters"]["step"], json!(2));
    }

    #[test]
    fn followup_event_defaults_language() {
        let event = FollowupEvent::new("continue-checkout");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"name": "continue-checkout", "languageCode": "en"})
        );
    }
}

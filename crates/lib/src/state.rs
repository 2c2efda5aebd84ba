//! # Shared State Store
//!
//! A per-run key-value context threaded through the stages. Values are stored as
//! JSON and read back through typed accessors, so a stage reading `page_audit`
//! gets a `PageAuditOutput` or an error, never a half-populated map.

use crate::{constants::state_keys, errors::AuditError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// Who produced a message in the conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub author: String,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            author: "user".to_string(),
            text: text.into(),
        }
    }

    pub fn model(author: &str, text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            author: author.to_string(),
            text: text.into(),
        }
    }

    pub fn tool(author: &str, text: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            author: author.to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateStore {
    values: Map<String, Value>,
}

impl StateStore {
    /// Creates the initial store for an audit run.
    pub fn for_target(url: &str) -> Self {
        let mut values = Map::new();
        values.insert(state_keys::TARGET_URL.to_string(), Value::from(url));
        values.insert(
            state_keys::CONVERSATION_HISTORY.to_string(),
            Value::Array(vec![]),
        );
        Self { values }
    }

    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), AuditError> {
        let value = serde_json::to_value(value)
            .map_err(|e| AuditError::State(format!("cannot serialize '{key}': {e}")))?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Reads a value back into its record type. A missing key is an error.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AuditError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| AuditError::State(format!("key '{key}' is not in shared state")))?;
        T::deserialize(value)
            .map_err(|e| AuditError::State(format!("key '{key}' has an unexpected shape: {e}")))
    }

    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn target_url(&self) -> Option<&str> {
        self.values
            .get(state_keys::TARGET_URL)
            .and_then(Value::as_str)
    }

    pub fn push_message(&mut self, message: Message) -> Result<(), AuditError> {
        let value = serde_json::to_value(&message)
            .map_err(|e| AuditError::State(format!("cannot serialize message: {e}")))?;
        match self
            .values
            .entry(state_keys::CONVERSATION_HISTORY.to_string())
            .or_insert_with(|| Value::Array(vec![]))
        {
            Value::Array(history) => {
                history.push(value);
                Ok(())
            }
            _ => Err(AuditError::State(
                "conversation_history is not a list".to_string(),
            )),
        }
    }

    pub fn history(&self) -> Vec<Message> {
        self.get(state_keys::CONVERSATION_HISTORY)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LinkCounts;

    #[test]
    fn test_initial_state() {
        let state = StateStore::for_target("https://example.com");
        assert_eq!(state.target_url(), Some("https://example.com"));
        assert!(state.contains(state_keys::CONVERSATION_HISTORY));
        assert!(state.history().is_empty());
        assert!(!state.contains(state_keys::PAGE_AUDIT));
    }

    #[test]
    fn test_typed_round_trip_and_missing_key() {
        let mut state = StateStore::default();
        let counts = LinkCounts {
            internal: Some(3),
            ..Default::default()
        };
        state.put("links", &counts).unwrap();
        assert_eq!(state.get::<LinkCounts>("links").unwrap(), counts);

        let err = state.get::<LinkCounts>("absent").unwrap_err();
        assert!(err.to_string().contains("'absent' is not in shared state"));
    }

    #[test]
    fn test_push_message_appends_in_order() {
        let mut state = StateStore::for_target("https://example.com");
        state.push_message(Message::user("first")).unwrap();
        state
            .push_message(Message::model("PageAuditorAgent", "second"))
            .unwrap();
        let history = state.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].author, "PageAuditorAgent");
    }
}

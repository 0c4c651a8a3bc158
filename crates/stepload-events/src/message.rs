//! Lifecycle message payload

use serde::{Deserialize, Serialize};
use std::fmt;

/// Step keyword category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepType {
    Context,
    Outcome,
    Action,
    Other(String),
}

impl From<String> for StepType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Context" => StepType::Context,
            "Outcome" => StepType::Outcome,
            "Action" => StepType::Action,
            _ => StepType::Other(value),
        }
    }
}

impl From<StepType> for String {
    fn from(value: StepType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepType::Context => write!(f, "Context"),
            StepType::Outcome => write!(f, "Outcome"),
            StepType::Action => write!(f, "Action"),
            StepType::Other(other) => write!(f, "{}", other),
        }
    }
}

/// Point in the step/hook lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    BeforeRunStep,
    AfterRunStep,
    BeforeRunHook,
    AfterRunHook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Step tag
    pub tag: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub step_type: Option<StepType>,
    pub action: Action,
}

impl Message {
    pub fn new(tag: impl Into<String>, action: Action) -> Self {
        Self {
            tag: tag.into(),
            step_type: None,
            action,
        }
    }

    pub fn with_type(mut self, step_type: StepType) -> Self {
        self.step_type = Some(step_type);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let message = Message::new("@smoke", Action::BeforeRunHook).with_type(StepType::Outcome);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "tag": "@smoke", "type": "Outcome", "action": "beforeRunHook" })
        );
    }

    #[test]
    fn test_free_form_type_and_missing_type() {
        let message: Message =
            serde_json::from_str(r#"{ "tag": "t", "type": "Setup", "action": "afterRunStep" }"#).unwrap();
        assert_eq!(message.step_type, Some(StepType::Other("Setup".to_string())));

        let message: Message = serde_json::from_str(r#"{ "tag": "t", "action": "afterRunHook" }"#).unwrap();
        assert_eq!(message.step_type, None);
        assert_eq!(message.action, Action::AfterRunHook);
    }
}

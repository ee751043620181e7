//! Actions the host runs on the plugin's behalf. Handlers never touch the
//! host directly: they describe what should happen as a list of effects.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::constants::{CREATED_DECK_MARKDOWN, DEFAULT_TITLE, META_KEY, ROUTE_PREFIX, STATE_KEY};

pub const CREATE_ACTION: &str = "marp.create";
pub const UNKNOWN_ACTION: &str = "UNKNOWN_ACTION";
pub const CREATED_TOAST: &str = "Marp slide deck created";

#[derive(Debug, Clone, Deserialize)]
pub struct ExecInput {
    pub action: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub ctx: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    #[serde(rename_all = "camelCase")]
    CreateDocument { title: String, doc_type: String },
    PutKv { scope: String, key: String, value: Value },
    ShowToast { level: ToastKind, message: String },
    Navigate { to: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecFailure {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecOutput {
    pub ok: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub error: Option<ExecFailure>,
}

impl ExecOutput {
    pub fn failure(code: &str, message: Option<String>) -> Self {
        Self {
            ok: false,
            error: Some(ExecFailure {
                code: code.to_string(),
                message,
            }),
            ..Self::default()
        }
    }
}

pub fn handle_exec(input: &ExecInput) -> ExecOutput {
    match input.action.as_str() {
        CREATE_ACTION => create_deck(&input.payload),
        other => {
            log::warn!("unknown action {other}");
            ExecOutput::failure(UNKNOWN_ACTION, None)
        }
    }
}

fn create_deck(payload: &Value) -> ExecOutput {
    let title = payload
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TITLE);

    ExecOutput {
        ok: true,
        effects: vec![
            Effect::CreateDocument {
                title: title.to_string(),
                doc_type: "document".to_string(),
            },
            Effect::PutKv {
                scope: "doc".to_string(),
                key: META_KEY.to_string(),
                value: json!({ "isMarp": true }),
            },
            Effect::PutKv {
                scope: "doc".to_string(),
                key: STATE_KEY.to_string(),
                value: json!({ "markdown": CREATED_DECK_MARKDOWN }),
            },
            Effect::ShowToast {
                level: ToastKind::Success,
                message: CREATED_TOAST.to_string(),
            },
            Effect::Navigate {
                to: format!("{ROUTE_PREFIX}/:createdDocId"),
            },
        ],
        ..ExecOutput::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(action: &str, payload: Value) -> ExecInput {
        ExecInput {
            action: action.to_string(),
            payload,
            ctx: Value::Null,
        }
    }

    #[test]
    fn test_create_uses_payload_title() {
        let out = handle_exec(&input(CREATE_ACTION, json!({ "title": "Roadmap" })));
        assert!(out.ok);
        assert_eq!(out.effects.len(), 5);
        assert_eq!(
            out.effects[0],
            Effect::CreateDocument {
                title: "Roadmap".to_string(),
                doc_type: "document".to_string()
            }
        );
    }

    #[test]
    fn test_create_defaults_title() {
        let out = handle_exec(&input(CREATE_ACTION, Value::Null));
        let Effect::CreateDocument { title, .. } = &out.effects[0] else {
            panic!("expected createDocument first");
        };
        assert_eq!(title, DEFAULT_TITLE);
    }

    #[test]
    fn test_effects_wire_format() {
        let out = handle_exec(&input(CREATE_ACTION, json!({})));
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["effects"][0]["type"], "createDocument");
        assert_eq!(value["effects"][0]["docType"], "document");
        assert_eq!(value["effects"][1]["type"], "putKv");
        assert_eq!(value["effects"][1]["value"]["isMarp"], true);
        assert_eq!(value["effects"][2]["key"], "marpState");
        assert_eq!(value["effects"][3]["level"], "success");
        assert_eq!(value["effects"][4]["to"], "/marp/:createdDocId");
    }

    #[test]
    fn test_created_deck_is_seeded_with_welcome() {
        let out = handle_exec(&input(CREATE_ACTION, Value::Null));
        let Effect::PutKv { key, value, .. } = &out.effects[2] else {
            panic!("expected the deck state write third");
        };
        assert_eq!(key, STATE_KEY);
        let markdown = value["markdown"].as_str().unwrap();
        assert_eq!(markdown, CREATED_DECK_MARKDOWN);
        assert!(markdown.starts_with("---\nmarp: true\n"));
        assert!(markdown.ends_with("Use the left pane to edit Markdown.\n"));
    }

    #[test]
    fn test_unknown_action() {
        let out = handle_exec(&input("marp.delete", Value::Null));
        assert!(!out.ok);
        assert_eq!(out.error.unwrap().code, UNKNOWN_ACTION);
        assert!(out.effects.is_empty());
    }

    #[test]
    fn test_input_parses_without_optional_fields() {
        let parsed: ExecInput = serde_json::from_value(json!({ "action": "marp.create" })).unwrap();
        assert_eq!(parsed.payload, Value::Null);
    }
}

//! Entry points the host calls to discover and route to slide decks.

use futures::future::BoxFuture;
use serde_json::Value;

use crate::backend::ExecOutput;
use crate::constants::{META_KEY, PLUGIN_ID, ROUTE_PREFIX, SLIDE_DOC_TYPE};
use crate::error::ExecError;
use crate::host::KvStore;

pub const EXEC_NOT_AVAILABLE: &str = "EXEC_NOT_AVAILABLE";
pub const EXEC_ERROR: &str = "EXEC_ERROR";

/// What the host knows about a document it is about to open.
#[derive(Debug, Clone, Default)]
pub struct OpenContext {
    pub doc_type: Option<String>,
    pub token: Option<String>,
}

/// The host's action executor.
pub trait ExecHost: Send + Sync {
    fn exec(&self, action: &str, payload: Value) -> BoxFuture<'static, Result<ExecOutput, ExecError>>;
}

/// Whether this plugin should open `doc_id`: either the host declares it a
/// slide document, or its stored metadata marks it as one.
pub async fn can_open(doc_id: &str, ctx: &OpenContext, store: Option<&dyn KvStore>) -> bool {
    if ctx.doc_type.as_deref() == Some(SLIDE_DOC_TYPE) {
        return true;
    }
    let Some(store) = store else {
        return false;
    };
    match store
        .get(PLUGIN_ID, doc_id, META_KEY, ctx.token.as_deref())
        .await
    {
        Ok(Some(value)) => is_marp_meta(&value),
        Ok(None) => false,
        Err(e) => {
            log::warn!("meta lookup for {doc_id} failed: {e}");
            false
        }
    }
}

/// `{ isMarp: true }`, bare or wrapped in `{ value: ... }`.
fn is_marp_meta(value: &Value) -> bool {
    let meta = match value.get("value") {
        Some(inner @ Value::Object(_)) => inner,
        _ => value,
    };
    meta.get("isMarp").is_some_and(truthy)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn get_route(doc_id: &str, token: Option<&str>) -> String {
    match token.filter(|t| !t.is_empty()) {
        Some(token) => format!(
            "{ROUTE_PREFIX}/{doc_id}?token={}",
            urlencoding::encode(token)
        ),
        None => format!("{ROUTE_PREFIX}/{doc_id}"),
    }
}

/// Forward an action to the host. Never fails: problems come back as
/// `ok: false` with an error code.
pub async fn exec(action: &str, host: Option<&dyn ExecHost>, payload: Option<Value>) -> ExecOutput {
    let Some(host) = host else {
        return ExecOutput::failure(EXEC_NOT_AVAILABLE, None);
    };
    let payload = payload.unwrap_or_else(|| Value::Object(Default::default()));
    match host.exec(action, payload).await {
        Ok(output) => output,
        Err(e) => {
            log::warn!("exec {action} failed: {e}");
            ExecOutput::failure(EXEC_ERROR, Some(e.to_string()))
        }
    }
}

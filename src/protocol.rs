//! Request/response messages exchanged with the page-side exporter.
//!
//! Requests are JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "EXPORT_GEMINI_CHAT", "scope": "select", "turnIndex": 2,
//!  "markdownStyle": "gemini", "includeThoughts": false}
//! {"type": "LIST_GEMINI_TURNS"}
//! ```
//!
//! Export fields are read leniently, the way the popup sends them: an unknown
//! or missing scope means all turns, any style but `"gemini"` means legacy,
//! anything but `false` includes reasoning traces, and `select` without an
//! integer index falls back to all turns.
//!
//! Every request gets a [`Response`]; failures become `{"ok": false, "error": ...}`.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::export::{
    ConversationExporter, ExportDocument, ExportOptions, MarkdownStyle, Scope, TurnSummary,
};
use crate::extract::Page;

/// A message from the popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "EXPORT_GEMINI_CHAT")]
    Export(ExportRequest),
    #[serde(rename = "LIST_GEMINI_TURNS")]
    ListTurns,
}

/// Raw export fields; see [`ExportRequest::options`] for their interpretation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportRequest {
    pub scope: Value,
    pub turn_index: Value,
    pub markdown_style: Value,
    pub include_thoughts: Value,
}

impl ExportRequest {
    /// Interpret the raw fields as export options.
    ///
    /// Only a negative `turnIndex` with scope `select` is rejected.
    pub fn options(&self) -> Result<ExportOptions> {
        let scope = match self.scope.as_str() {
            Some("current") => Scope::Current,
            Some("select") => match integer(&self.turn_index) {
                Some(index) => Scope::Select(usize::try_from(index).map_err(|_| {
                    Error::InvalidRequest(format!("turnIndex must not be negative, got {index}"))
                })?),
                None => Scope::All,
            },
            _ => Scope::All,
        };
        let markdown_style = match self.markdown_style.as_str() {
            Some("gemini") => MarkdownStyle::Gemini,
            _ => MarkdownStyle::Legacy,
        };
        let include_thoughts = self.include_thoughts != Value::Bool(false);

        Ok(ExportOptions::new()
            .scope(scope)
            .markdown_style(markdown_style)
            .include_thoughts(include_thoughts))
    }
}

/// A JSON number with no fractional part.
fn integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload of a successful [`Response`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Export(ExportDocument),
    TurnList { turns: Vec<TurnSummary> },
}

impl Response {
    pub fn success(data: ResponseData) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: &Error) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.to_string()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Serve one request against `page`. Never fails; errors are reported in the response.
pub fn handle_request<P: Page + ?Sized>(
    exporter: &ConversationExporter,
    page: &mut P,
    request: &Request,
) -> Response {
    debug!("handling {request:?}");
    let result = match request {
        Request::Export(export) => export
            .options()
            .and_then(|options| exporter.export(page, &options))
            .map(ResponseData::Export),
        Request::ListTurns => Ok(ResponseData::TurnList {
            turns: exporter.list_turns(&*page),
        }),
    };
    match result {
        Ok(data) => Response::success(data),
        Err(e) => Response::failure(&e),
    }
}

/// Parse a JSON request and serve it.
pub fn handle_message<P: Page + ?Sized>(
    exporter: &ConversationExporter,
    page: &mut P,
    message: &str,
) -> Response {
    match parse_request(message) {
        Ok(request) => handle_request(exporter, page, &request),
        Err(e) => Response::failure(&e),
    }
}

fn parse_request(message: &str) -> Result<Request> {
    serde_json::from_str(message).map_err(|e| Error::InvalidRequest(e.to_string()))
}

//! Handler for the `keywords` MCP tool.

use std::sync::Arc;

use crate::{
    keywords::DEFAULT_TOP_TERMS, mcp::format::keywords_payload, processing::SummarizerService,
};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Deserialize;

use super::parse_arguments;

/// Request payload accepted by the `keywords` tool.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct KeywordsToolRequest {
    /// Document text to extract terms from.
    pub(crate) text: String,
    /// Optional number of top-ranked terms to return.
    #[serde(default)]
    pub(crate) top_n: Option<usize>,
}

/// Handle the `keywords` tool by ranking the document's terms with TF-IDF.
pub(crate) async fn handle_keywords(
    summarizer: &Arc<SummarizerService>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: KeywordsToolRequest = parse_arguments(arguments)?;
    let top_n = args.top_n.unwrap_or(DEFAULT_TOP_TERMS);
    if top_n == 0 {
        return Err(McpError::invalid_params(
            "`topN` must be greater than zero",
            None,
        ));
    }

    let terms = summarizer.extract_keywords(&args.text, top_n);
    Ok(CallToolResult::structured(keywords_payload(&terms)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<KeywordsToolRequest, McpError> {
        parse_arguments(Some(value.as_object().expect("object payload").clone()))
    }

    #[test]
    fn accepts_camel_case_top_n() {
        let request = parse(json!({ "text": "Rust ships fast.", "topN": 3 }))
            .expect("valid arguments");
        assert_eq!(request.text, "Rust ships fast.");
        assert_eq!(request.top_n, Some(3));
    }

    #[test]
    fn rejects_snake_case_top_n() {
        let error = parse(json!({ "text": "Rust ships fast.", "top_n": 3 }))
            .expect_err("snake_case key should be rejected");
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn rejects_missing_text() {
        let error = parse(json!({ "topN": 3 })).expect_err("text is required");
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
    }
}

//! Tool registry and `tools/call` argument decoding.
//!
//! The tool set is closed: [`GlucoseTool`] enumerates every tool, and both
//! `tools/list` and `tools/call` are derived from it, so a listed tool can
//! never be missing a handler and vice versa.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::dexcom::GlucoseProvider;
use crate::error::{Error, Result};
use crate::mcp::protocol::{ContentBlock, Tool, ToolResult};
use crate::tools::glucose;

/// Default history window when `hours` is omitted.
pub const DEFAULT_HISTORY_HOURS: u32 = 6;

/// Every tool the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlucoseTool {
    CurrentGlucose,
    GlucoseHistory,
}

impl GlucoseTool {
    /// All tools in `tools/list` order.
    pub const ALL: [GlucoseTool; 2] = [GlucoseTool::CurrentGlucose, GlucoseTool::GlucoseHistory];

    /// Wire name of the tool.
    pub fn name(self) -> &'static str {
        match self {
            Self::CurrentGlucose => "get_current_glucose",
            Self::GlucoseHistory => "get_glucose_history",
        }
    }

    /// Look a tool up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Descriptor returned by `tools/list`.
    pub fn definition(self) -> Tool {
        match self {
            Self::CurrentGlucose => Tool {
                name: self.name().to_string(),
                description: "Get current glucose reading from Dexcom G7".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            },
            Self::GlucoseHistory => Tool {
                name: self.name().to_string(),
                description: "Get glucose history for specified hours".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "hours": {
                            "type": "integer",
                            "description": "Hours of history (default: 6)",
                            "default": DEFAULT_HISTORY_HOURS
                        }
                    },
                    "required": []
                }),
            },
        }
    }
}

/// A decoded, validated tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    CurrentGlucose,
    GlucoseHistory { hours: u32 },
}

impl ToolCall {
    /// Validate arguments for a known tool. Absent or null arguments are
    /// treated as an empty object.
    pub fn from_arguments(tool: GlucoseTool, arguments: Option<&Value>) -> Result<Self> {
        let empty = Map::new();
        let args = match arguments {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(Error::InvalidToolArguments(format!(
                    "arguments must be an object, got {}",
                    other
                )))
            }
        };

        match tool {
            GlucoseTool::CurrentGlucose => Ok(Self::CurrentGlucose),
            GlucoseTool::GlucoseHistory => {
                let hours = get_positive_int_arg(args, "hours")?.unwrap_or(DEFAULT_HISTORY_HOURS);
                Ok(Self::GlucoseHistory { hours })
            }
        }
    }
}

/// Resolve the tool named in `tools/call` params, returning it together with
/// its still-unvalidated `arguments`.
pub fn resolve_tool(params: Option<Value>) -> Result<(GlucoseTool, Option<Value>)> {
    let mut params = match params {
        Some(Value::Object(map)) => map,
        _ => return Err(Error::ToolNotFound("<missing>".to_string())),
    };

    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::ToolNotFound("<missing>".to_string()))?;
    let tool = GlucoseTool::from_name(name).ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

    Ok((tool, params.remove("arguments")))
}

/// Registry of tools bound to the data provider.
pub struct McpHandler {
    provider: Option<Arc<dyn GlucoseProvider>>,
}

impl McpHandler {
    /// Create a handler. `None` means the provider is not configured.
    pub fn new(provider: Option<Arc<dyn GlucoseProvider>>) -> Self {
        Self { provider }
    }

    /// Whether a data provider is available.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Get all registered tools.
    pub fn list_tools(&self) -> Vec<Tool> {
        GlucoseTool::ALL.iter().map(|t| t.definition()).collect()
    }

    /// Get the number of registered tools.
    pub fn tool_count(&self) -> usize {
        GlucoseTool::ALL.len()
    }

    /// Decode and run a `tools/call` request.
    ///
    /// The provider check happens before `params` is looked at.
    pub async fn call(&self, params: Option<Value>) -> Result<ToolResult> {
        let provider = self
            .provider
            .as_deref()
            .ok_or(Error::ProviderNotInitialized)?;

        let (tool, arguments) = resolve_tool(params)?;
        self.execute(provider, tool, arguments.as_ref())
            .await
            .map_err(|e| Error::ToolExecutionFailed(e.to_string()))
    }

    async fn execute(
        &self,
        provider: &dyn GlucoseProvider,
        tool: GlucoseTool,
        arguments: Option<&Value>,
    ) -> Result<ToolResult> {
        match ToolCall::from_arguments(tool, arguments)? {
            ToolCall::CurrentGlucose => glucose::current_glucose(provider).await,
            ToolCall::GlucoseHistory { hours } => glucose::glucose_history(provider, hours).await,
        }
    }
}

/// Helper to create a text content block.
pub fn text_content(text: impl Into<String>) -> ContentBlock {
    ContentBlock::Text { text: text.into() }
}

/// Helper to create a successful tool result.
pub fn success_result(text: impl Into<String>) -> ToolResult {
    ToolResult {
        content: vec![text_content(text)],
    }
}

/// Helper to extract an optional strictly positive integer argument.
pub fn get_positive_int_arg(args: &Map<String, Value>, name: &str) -> Result<Option<u32>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                Error::InvalidToolArguments(format!(
                    "'{}' must be a positive integer, got {}",
                    name, v
                ))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_registry_names_match_dispatch() {
        let handler = McpHandler::new(None);
        let listed: HashSet<String> = handler.list_tools().into_iter().map(|t| t.name).collect();

        assert_eq!(listed.len(), 2);
        assert_eq!(handler.tool_count(), 2);
        for name in &listed {
            let resolved = resolve_tool(Some(json!({"name": name})));
            assert!(resolved.is_ok(), "listed tool {} is not callable", name);
        }
        assert!(GlucoseTool::from_name("nonexistent").is_none());
    }

    #[test]
    fn test_list_order() {
        let names: Vec<_> = McpHandler::new(None)
            .list_tools()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["get_current_glucose", "get_glucose_history"]);
    }

    #[test]
    fn test_history_schema_default() {
        let tool = GlucoseTool::GlucoseHistory.definition();
        assert_eq!(tool.input_schema["properties"]["hours"]["default"], 6);
        assert_eq!(tool.input_schema["properties"]["hours"]["type"], "integer");
    }

    fn decode(params: Value) -> Result<ToolCall> {
        let (tool, arguments) = resolve_tool(Some(params))?;
        ToolCall::from_arguments(tool, arguments.as_ref())
    }

    #[test]
    fn test_tool_call_decoding() {
        let call = decode(json!({"name": "get_current_glucose"})).unwrap();
        assert_eq!(call, ToolCall::CurrentGlucose);

        let call = decode(json!({
            "name": "get_glucose_history",
            "arguments": {}
        }))
        .unwrap();
        assert_eq!(call, ToolCall::GlucoseHistory { hours: 6 });

        let call = decode(json!({
            "name": "get_glucose_history",
            "arguments": {"hours": 3}
        }))
        .unwrap();
        assert_eq!(call, ToolCall::GlucoseHistory { hours: 3 });
    }

    #[test]
    fn test_tool_call_unknown_name() {
        match decode(json!({"name": "delete_everything"})) {
            Err(Error::ToolNotFound(name)) => assert_eq!(name, "delete_everything"),
            other => panic!("Expected ToolNotFound, got {:?}", other),
        }

        assert!(matches!(
            resolve_tool(None),
            Err(Error::ToolNotFound(_))
        ));
        assert!(matches!(
            resolve_tool(Some(json!({"arguments": {}}))),
            Err(Error::ToolNotFound(_))
        ));
        assert!(matches!(
            resolve_tool(Some(json!({"name": 7}))),
            Err(Error::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_tool_call_argument_shapes() {
        let call = decode(json!({
            "name": "get_glucose_history",
            "arguments": null
        }))
        .unwrap();
        assert_eq!(call, ToolCall::GlucoseHistory { hours: 6 });

        assert!(matches!(
            decode(json!({
                "name": "get_glucose_history",
                "arguments": [1, 2]
            })),
            Err(Error::InvalidToolArguments(_))
        ));
        assert!(matches!(
            decode(json!({
                "name": "get_glucose_history",
                "arguments": {"hours": "six"}
            })),
            Err(Error::InvalidToolArguments(_))
        ));
    }

    #[test]
    fn test_get_positive_int_arg() {
        let mut args = Map::new();
        args.insert("hours".to_string(), json!(12));
        assert_eq!(get_positive_int_arg(&args, "hours").unwrap(), Some(12));
        assert_eq!(get_positive_int_arg(&args, "missing").unwrap(), None);

        args.insert("hours".to_string(), json!(null));
        assert_eq!(get_positive_int_arg(&args, "hours").unwrap(), None);

        for bad in [json!(0), json!(-3), json!("6"), json!(2.5)] {
            args.insert("hours".to_string(), bad);
            assert!(matches!(
                get_positive_int_arg(&args, "hours"),
                Err(Error::InvalidToolArguments(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_call_without_provider() {
        let handler = McpHandler::new(None);
        assert!(!handler.has_provider());

        let result = handler.call(Some(json!({"name": "get_current_glucose"}))).await;
        assert!(matches!(result, Err(Error::ProviderNotInitialized)));

        let result = handler.call(Some(json!({"name": "no_such_tool"}))).await;
        assert!(matches!(result, Err(Error::ProviderNotInitialized)));
    }

    #[test]
    fn test_success_result() {
        let result = success_result("Success!");
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.content[0], text_content("Success!"));
    }
}

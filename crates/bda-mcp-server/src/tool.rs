//! Tool envelope types and the typed tool registry.
//!
//! Tools declare a typed argument struct; the registry derives the advertised
//! JSON schema from it and deserialises `tools/call` arguments into it, so a
//! handler only ever sees well-formed input. Handlers return a [`ToolResult`]
//! envelope; failures inside a handler are reported in-band through
//! `isError`, never as protocol faults.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One content block of a tool result. Only text is produced by this server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

/// Uniform tool response envelope: `{content: [...], isError?: bool}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: Some(true),
        }
    }

    /// Serialise `value` as compact JSON into a single text block.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_string(value).map(Self::text)
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ToolContent::Text { text } => Some(text.as_str()),
        })
    }
}

/// Entry advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Argument type for tools that take no input.
#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema)]
pub struct NoArguments {}

/// A callable tool with typed, schema-described arguments.
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    type Args: DeserializeOwned + JsonSchema + Send + 'static;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    async fn call(&self, args: Self::Args) -> ToolResult;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("tool `{0}` not found")]
    UnknownTool(String),
    #[error("invalid arguments for tool `{tool}`: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolRegistryError {
    #[error("tool `{0}` is already registered")]
    Duplicate(String),
}

#[async_trait]
trait ErasedTool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn call_value(&self, arguments: Value) -> Result<ToolResult, ToolCallError>;
}

struct TypedTool<T>(T);

#[async_trait]
impl<T: Tool> ErasedTool for TypedTool<T> {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: T::NAME.to_string(),
            description: T::DESCRIPTION.to_string(),
            input_schema: input_schema_for::<T::Args>(),
        }
    }

    async fn call_value(&self, arguments: Value) -> Result<ToolResult, ToolCallError> {
        let args: T::Args =
            serde_json::from_value(arguments).map_err(|err| ToolCallError::InvalidArguments {
                tool: T::NAME.to_string(),
                reason: err.to_string(),
            })?;
        Ok(self.0.call(args).await)
    }
}

/// Generate an MCP-compatible input schema (always an object schema).
pub fn input_schema_for<A: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(A);
    let mut value = serde_json::to_value(&schema).expect("schema is serializable");
    if let Value::Object(map) = &mut value {
        map.remove("$schema");
        map.entry("type")
            .or_insert_with(|| Value::String("object".to_string()));
        map.entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
    }
    value
}

/// Registered tools in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<(&'static str, Box<dyn ErasedTool>)>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Tool>(&mut self, tool: T) -> Result<&mut Self, ToolRegistryError> {
        if self.contains(T::NAME) {
            return Err(ToolRegistryError::Duplicate(T::NAME.to_string()));
        }
        self.tools.push((T::NAME, Box::new(TypedTool(tool))));
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|(registered, _)| *registered == name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|(_, tool)| tool.definition()).collect()
    }

    /// Invoke `name`. Missing or `null` arguments are treated as `{}`.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolResult, ToolCallError> {
        let (_, tool) = self
            .tools
            .iter()
            .find(|(registered, _)| *registered == name)
            .ok_or_else(|| ToolCallError::UnknownTool(name.to_string()))?;

        let arguments = match arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(other) => other,
        };
        tool.call_value(arguments).await
    }
}

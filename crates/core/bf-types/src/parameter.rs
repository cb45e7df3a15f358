//! Parameter sources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a configuration value comes from at evaluation time.
///
/// Serialized with the flow runtime's type tags:
///
/// ```
/// use bf_types::ParameterSource;
///
/// let source: ParameterSource =
///     serde_json::from_str(r#"{"type":"env","value":"S3_BUCKET"}"#).unwrap();
/// assert_eq!(source, ParameterSource::environment("S3_BUCKET"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ParameterSource {
    /// The stored string itself
    #[serde(rename = "str")]
    Literal(String),

    /// A property path into the triggering message
    #[serde(rename = "msg")]
    MessageField(String),

    /// A key in the flow-scoped context store
    #[serde(rename = "flow")]
    FlowVariable(String),

    /// A key in the global context store
    #[serde(rename = "global")]
    GlobalVariable(String),

    /// A process environment variable
    #[serde(rename = "env")]
    EnvironmentVariable(String),
}

impl ParameterSource {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn message_field(path: impl Into<String>) -> Self {
        Self::MessageField(path.into())
    }

    pub fn flow(key: impl Into<String>) -> Self {
        Self::FlowVariable(key.into())
    }

    pub fn global(key: impl Into<String>) -> Self {
        Self::GlobalVariable(key.into())
    }

    pub fn environment(name: impl Into<String>) -> Self {
        Self::EnvironmentVariable(name.into())
    }

    /// Build a source from a (value, type-tag) pair as stored in flow configuration.
    ///
    /// Unknown or empty tags fall back to a literal.
    pub fn from_typed(value: impl Into<String>, type_tag: &str) -> Self {
        let value = value.into();
        match type_tag {
            "msg" => Self::MessageField(value),
            "flow" => Self::FlowVariable(value),
            "global" => Self::GlobalVariable(value),
            "env" => Self::EnvironmentVariable(value),
            _ => Self::Literal(value),
        }
    }

    /// The type tag of this source (`str`, `msg`, `flow`, `global`, `env`).
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Literal(_) => "str",
            Self::MessageField(_) => "msg",
            Self::FlowVariable(_) => "flow",
            Self::GlobalVariable(_) => "global",
            Self::EnvironmentVariable(_) => "env",
        }
    }

    /// The source-specific key (or the literal value).
    pub fn key(&self) -> &str {
        match self {
            Self::Literal(v)
            | Self::MessageField(v)
            | Self::FlowVariable(v)
            | Self::GlobalVariable(v)
            | Self::EnvironmentVariable(v) => v,
        }
    }
}

impl fmt::Display for ParameterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_tag(), self.key())
    }
}

/// Which bucket wins when both configuration and the triggering message name one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketPrecedence {
    /// Only the configured source is consulted
    ConfiguredOnly,

    /// Configured source first, `msg.bucket` when it yields nothing
    #[default]
    ConfiguredThenMessage,

    /// `msg.bucket` first, configured source when the message has none
    MessageThenConfigured,
}

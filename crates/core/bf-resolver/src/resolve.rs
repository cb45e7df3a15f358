//! Value resolution.

use bf_error::{BfError, Result};
use bf_traits::ContextStore;
use bf_types::{BucketPrecedence, Message, ParameterSource};
use serde_json::Value;
use std::sync::Arc;

use crate::memory::MemoryContextStore;
use crate::path::{lookup, parse_path};

/// Everything a [`ParameterSource`] may be resolved against.
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub message: &'a Message,
    pub flow: &'a dyn ContextStore,
    pub global: &'a dyn ContextStore,
}

/// Holds the flow and global stores an adapter resolves against.
#[derive(Clone)]
pub struct ParameterResolver {
    flow: Arc<dyn ContextStore>,
    global: Arc<dyn ContextStore>,
}

impl Default for ParameterResolver {
    fn default() -> Self {
        Self::new(
            Arc::new(MemoryContextStore::new()),
            Arc::new(MemoryContextStore::new()),
        )
    }
}

impl ParameterResolver {
    pub fn new(flow: Arc<dyn ContextStore>, global: Arc<dyn ContextStore>) -> Self {
        Self { flow, global }
    }

    /// Evaluation context for one message.
    pub fn context<'a>(&'a self, message: &'a Message) -> EvaluationContext<'a> {
        EvaluationContext {
            message,
            flow: self.flow.as_ref(),
            global: self.global.as_ref(),
        }
    }

    /// Resolve a single source against a message.
    pub fn resolve(&self, source: &ParameterSource, message: &Message) -> Result<Option<String>> {
        resolve(source, &self.context(message))
    }
}

/// Resolve a parameter source.
///
/// Absent values and empty strings yield `Ok(None)`. Only a failing lookup
/// mechanism (malformed message path, failing context store) is an error.
pub fn resolve(source: &ParameterSource, ctx: &EvaluationContext<'_>) -> Result<Option<String>> {
    let value = match source {
        ParameterSource::Literal(value) => Some(Value::String(value.clone())),
        ParameterSource::MessageField(path) => {
            let segments = parse_path(path).map_err(|reason| resolution_error(source, reason))?;
            lookup(ctx.message, &segments)
        }
        ParameterSource::FlowVariable(key) => ctx
            .flow
            .get(key)
            .map_err(|e| resolution_error(source, e))?,
        ParameterSource::GlobalVariable(key) => ctx
            .global
            .get(key)
            .map_err(|e| resolution_error(source, e))?,
        ParameterSource::EnvironmentVariable(name) => std::env::var(name).ok().map(Value::String),
    };

    Ok(value.and_then(value_to_string))
}

/// Resolve the bucket for one invocation.
///
/// `configured` may be absent when an adapter relies on the message only.
pub fn resolve_bucket(
    configured: Option<&ParameterSource>,
    precedence: BucketPrecedence,
    ctx: &EvaluationContext<'_>,
) -> Result<Option<String>> {
    let from_config = |ctx: &EvaluationContext<'_>| -> Result<Option<String>> {
        match configured {
            Some(source) => resolve(source, ctx),
            None => Ok(None),
        }
    };
    let from_message = || ctx.message.get_str("bucket").map(str::to_string);

    match precedence {
        BucketPrecedence::ConfiguredOnly => from_config(ctx),
        BucketPrecedence::ConfiguredThenMessage => Ok(from_config(ctx)?.or_else(from_message)),
        BucketPrecedence::MessageThenConfigured => match from_message() {
            Some(bucket) => Ok(Some(bucket)),
            None => from_config(ctx),
        },
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn resolution_error(source: &ParameterSource, reason: impl ToString) -> BfError {
    BfError::Resolution {
        source_type: source.type_tag().to_string(),
        key: source.key().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_types::Payload;
    use serde_json::json;

    struct FailingStore;

    impl ContextStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<Value>> {
            Err(BfError::config("store offline"))
        }

        fn set(&self, _key: &str, _value: Value) -> Result<()> {
            Ok(())
        }
    }

    fn resolver() -> ParameterResolver {
        let flow = MemoryContextStore::new();
        flow.insert("bucket", json!("flow-bucket"));
        flow.insert("retries", json!(3));
        let global = MemoryContextStore::new();
        global.insert("s3", json!({"region": "eu-west-1"}));
        global.insert("blank", json!(""));
        ParameterResolver::new(Arc::new(flow), Arc::new(global))
    }

    #[test]
    fn test_literal_is_returned_unchanged() {
        let r = resolver();
        let msg = Message::new();
        assert_eq!(
            r.resolve(&ParameterSource::literal("media"), &msg).unwrap(),
            Some("media".to_string())
        );
        assert_eq!(r.resolve(&ParameterSource::literal(""), &msg).unwrap(), None);
    }

    #[test]
    fn test_message_field() {
        let r = resolver();
        let msg = Message::new()
            .with_payload(Payload::Json(json!({"bucket": "from-payload"})))
            .with_field("bucket", "from-field");

        assert_eq!(
            r.resolve(&ParameterSource::message_field("payload.bucket"), &msg)
                .unwrap(),
            Some("from-payload".to_string())
        );
        assert_eq!(
            r.resolve(&ParameterSource::message_field("bucket"), &msg).unwrap(),
            Some("from-field".to_string())
        );
        assert_eq!(
            r.resolve(&ParameterSource::message_field("nothing.here"), &msg)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_message_path_is_resolution_error() {
        let r = resolver();
        let err = r
            .resolve(&ParameterSource::message_field("payload..bucket"), &Message::new())
            .unwrap_err();

        match err {
            BfError::Resolution {
                source_type, key, ..
            } => {
                assert_eq!(source_type, "msg");
                assert_eq!(key, "payload..bucket");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_flow_and_global_variables() {
        let r = resolver();
        let msg = Message::new();

        assert_eq!(
            r.resolve(&ParameterSource::flow("bucket"), &msg).unwrap(),
            Some("flow-bucket".to_string())
        );
        assert_eq!(
            r.resolve(&ParameterSource::flow("retries"), &msg).unwrap(),
            Some("3".to_string())
        );
        assert_eq!(
            r.resolve(&ParameterSource::global("s3"), &msg).unwrap(),
            Some(r#"{"region":"eu-west-1"}"#.to_string())
        );
        assert_eq!(r.resolve(&ParameterSource::global("blank"), &msg).unwrap(), None);
        assert_eq!(r.resolve(&ParameterSource::global("missing"), &msg).unwrap(), None);
    }

    #[test]
    fn test_failing_store_is_resolution_error() {
        let r = ParameterResolver::new(Arc::new(FailingStore), Arc::new(MemoryContextStore::new()));
        let err = r
            .resolve(&ParameterSource::flow("bucket"), &Message::new())
            .unwrap_err();
        assert!(matches!(err, BfError::Resolution { ref source_type, .. } if source_type == "flow"));
        assert!(err.to_string().contains("store offline"));
    }

    #[test]
    fn test_environment_variable() {
        let r = resolver();
        let msg = Message::new();

        let path = std::env::var("PATH").ok().filter(|p| !p.is_empty());
        assert_eq!(
            r.resolve(&ParameterSource::environment("PATH"), &msg).unwrap(),
            path
        );
        assert_eq!(
            r.resolve(
                &ParameterSource::environment("BF_RESOLVER_TEST_SURELY_UNSET_VARIABLE"),
                &msg
            )
            .unwrap(),
            None
        );
    }

    #[test]
    fn test_resolve_bucket_precedence() {
        let r = resolver();
        let configured = ParameterSource::literal("configured");
        let with_bucket = Message::new().with_field("bucket", "from-msg");
        let without_bucket = Message::new();

        let only = BucketPrecedence::ConfiguredOnly;
        let config_first = BucketPrecedence::ConfiguredThenMessage;
        let msg_first = BucketPrecedence::MessageThenConfigured;

        assert_eq!(
            resolve_bucket(Some(&configured), only, &r.context(&with_bucket)).unwrap(),
            Some("configured".to_string())
        );
        assert_eq!(
            resolve_bucket(None, only, &r.context(&with_bucket)).unwrap(),
            None
        );
        assert_eq!(
            resolve_bucket(Some(&configured), config_first, &r.context(&with_bucket)).unwrap(),
            Some("configured".to_string())
        );
        assert_eq!(
            resolve_bucket(
                Some(&ParameterSource::literal("")),
                config_first,
                &r.context(&with_bucket)
            )
            .unwrap(),
            Some("from-msg".to_string())
        );
        assert_eq!(
            resolve_bucket(Some(&configured), msg_first, &r.context(&with_bucket)).unwrap(),
            Some("from-msg".to_string())
        );
        assert_eq!(
            resolve_bucket(Some(&configured), msg_first, &r.context(&without_bucket)).unwrap(),
            Some("configured".to_string())
        );
    }
}

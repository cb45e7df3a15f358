//! Collaborators shared by the handlers.

use bf_error::{BfError, Result};
use bf_resolver::ParameterResolver;
use bf_traits::{MessageSink, NoopReporter, ObjectStore, StatusReporter, StoreFactory};
use bf_types::{Message, ResolvedConnection};
use std::sync::Arc;

/// Store factory, sink, reporter and resolver a handler works with.
#[derive(Clone)]
pub struct HandlerContext {
    pub resolver: ParameterResolver,
    pub factory: Arc<dyn StoreFactory>,
    pub sink: Arc<dyn MessageSink>,
    pub reporter: Arc<dyn StatusReporter>,
}

impl HandlerContext {
    pub fn new(factory: Arc<dyn StoreFactory>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            resolver: ParameterResolver::default(),
            factory,
            sink,
            reporter: Arc::new(NoopReporter),
        }
    }

    pub fn with_resolver(mut self, resolver: ParameterResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub(crate) async fn connect(&self, connection: &ResolvedConnection) -> Result<Arc<dyn ObjectStore>> {
        self.factory.connect(connection).await
    }

    /// Report a failed invocation together with its input message.
    pub(crate) fn report(&self, error: &BfError, msg: &Message) {
        self.reporter.error(error, Some(msg));
    }
}

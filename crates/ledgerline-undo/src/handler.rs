#![forbid(unsafe_code)]

//! Handler adapter: every call runs as one undoable transaction.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::annotation::Annotation;
use crate::manager::UndoManager;

type Extractor<A> = Box<dyn Fn(&A) -> Option<Annotation> + Send + Sync>;

/// A handler whose invocations are recorded through an [`UndoManager`].
///
/// Built with [`UndoManager::wrap_handler`].
pub struct UndoableHandler<A, H> {
    manager: Arc<UndoManager>,
    handler: H,
    annotate: Option<Extractor<A>>,
}

impl<A, H> fmt::Debug for UndoableHandler<A, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoableHandler")
            .field("annotated", &self.annotate.is_some())
            .finish_non_exhaustive()
    }
}

impl<A, H> UndoableHandler<A, H> {
    /// Compute each call's annotation from its arguments.
    #[must_use]
    pub fn with_annotation<E>(mut self, extractor: E) -> Self
    where
        E: Fn(&A) -> Option<Annotation> + Send + Sync + 'static,
    {
        self.annotate = Some(Box::new(extractor));
        self
    }

    /// Invoke the handler inside [`UndoManager::run_transaction`].
    pub async fn call<Fut>(&self, args: A) -> Fut::Output
    where
        H: Fn(A) -> Fut,
        Fut: Future,
    {
        let annotation = self.annotate.as_ref().and_then(|extract| extract(&args));
        self.manager
            .run_transaction(annotation, || (self.handler)(args))
            .await
    }

    #[must_use]
    pub fn manager(&self) -> &Arc<UndoManager> {
        &self.manager
    }
}

impl UndoManager {
    /// Adapt `handler` so each call is recorded as one transaction.
    #[must_use]
    pub fn wrap_handler<A, H>(self: &Arc<Self>, handler: H) -> UndoableHandler<A, H> {
        UndoableHandler {
            manager: Arc::clone(self),
            handler,
            annotate: None,
        }
    }
}

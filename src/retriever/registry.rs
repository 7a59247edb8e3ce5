//! Registry of named retrievers.
//!
//! Holds one backend handle per content category. Insertion order is
//! preserved because it doubles as the tool priority order presented to the
//! model.

use super::{RetrieverSpec, SearchBackend};
use crate::error::{Result, VeilederError};
use std::sync::Arc;

/// One registered retriever: spec plus its backend handle.
pub(crate) struct RegisteredRetriever {
    pub(crate) spec: RetrieverSpec,
    pub(crate) backend: Arc<dyn SearchBackend>,
}

/// Ordered registry of retrievers, keyed by spec name.
#[derive(Default)]
pub struct RetrieverRegistry {
    entries: Vec<RegisteredRetriever>,
}

impl std::fmt::Debug for RetrieverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrieverRegistry")
            .field(
                "entries",
                &self
                    .entries
                    .iter()
                    .map(|e| e.spec.name.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl RetrieverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a retriever.
    ///
    /// Fails with [`VeilederError::DuplicateTool`] if the name is taken;
    /// the registry is left unchanged in that case. Specs are immutable
    /// after registration.
    pub fn register(&mut self, spec: RetrieverSpec, backend: Arc<dyn SearchBackend>) -> Result<()> {
        if self.entries.iter().any(|e| e.spec.name == spec.name) {
            return Err(VeilederError::DuplicateTool(spec.name));
        }
        self.entries.push(RegisteredRetriever { spec, backend });
        Ok(())
    }

    /// Look up a backend handle by retriever name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn SearchBackend>> {
        self.entries
            .iter()
            .find(|e| e.spec.name == name)
            .map(|e| Arc::clone(&e.backend))
            .ok_or_else(|| VeilederError::ToolNotFound(name.to_string()))
    }

    /// Look up a spec by retriever name.
    pub fn spec(&self, name: &str) -> Result<&RetrieverSpec> {
        self.entries
            .iter()
            .find(|e| e.spec.name == name)
            .map(|e| &e.spec)
            .ok_or_else(|| VeilederError::ToolNotFound(name.to_string()))
    }

    /// Iterate registered entries in registration order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &RegisteredRetriever> {
        self.entries.iter()
    }

    /// Number of registered retrievers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::RetrievedDocument;
    use async_trait::async_trait;

    struct NullBackend;

    #[async_trait]
    impl SearchBackend for NullBackend {
        async fn search(&self, _query: &str, _fetch_k: usize) -> Result<Vec<RetrievedDocument>> {
            Ok(Vec::new())
        }
    }

    fn spec(name: &str) -> RetrieverSpec {
        RetrieverSpec::new(name, "desc", 4, 0.7, 20).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = RetrieverRegistry::new();
        registry.register(spec("notes"), Arc::new(NullBackend)).unwrap();
        registry.register(spec("textbook"), Arc::new(NullBackend)).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("notes").is_ok());
        assert!(matches!(
            registry.lookup("missing"),
            Err(VeilederError::ToolNotFound(_))
        ));
        assert_eq!(registry.spec("textbook").unwrap().k, 4);
    }

    #[test]
    fn test_duplicate_registration_is_atomic() {
        let mut registry = RetrieverRegistry::new();
        registry.register(spec("notes"), Arc::new(NullBackend)).unwrap();

        let err = registry
            .register(spec("notes"), Arc::new(NullBackend))
            .unwrap_err();
        assert!(matches!(err, VeilederError::DuplicateTool(_)));

        // The failed call must not have changed the registry.
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("notes").is_ok());
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = RetrieverRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(spec(name), Arc::new(NullBackend)).unwrap();
        }

        let names: Vec<_> = registry.iter().map(|e| e.spec.name.clone()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}

//! Expression namespace: named pointcut registry.
//!
//! Each system definition owns one namespace mapping pointcut names to their
//! compiled expressions, so a named pointcut is parsed once and shared. The
//! namespace is the single source of truth for reference resolution and must
//! be passed by reference to all evaluation code.
//!
//! Insert-if-absent is guarded: first-time resolution of the same named
//! pointcut can race from multiple weaving threads under a parallel-capable
//! class loader.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::errors::WeftError;
use crate::expr::ExpressionInfo;

/// Named pointcut registry. Lookup is case-sensitive; re-registration of a
/// name replaces the previous entry.
#[derive(Debug, Default)]
pub struct ExpressionNamespace {
    name: String,
    expressions: RwLock<HashMap<String, Arc<ExpressionInfo>>>,
}

impl ExpressionNamespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expressions: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a pre-compiled expression under a pointcut name.
    pub fn register(&self, pointcut: impl Into<String>, expression: Arc<ExpressionInfo>) {
        let mut map = self.expressions.write().expect("namespace lock poisoned");
        map.insert(pointcut.into(), expression);
    }

    /// Compiles and registers expression text under a pointcut name.
    pub fn register_text(&self, pointcut: &str, text: &str) -> Result<Arc<ExpressionInfo>, WeftError> {
        let compiled = Arc::new(ExpressionInfo::compile(text, self.name.clone())?);
        self.register(pointcut, compiled.clone());
        Ok(compiled)
    }

    pub fn lookup(&self, pointcut: &str) -> Option<Arc<ExpressionInfo>> {
        let map = self.expressions.read().expect("namespace lock poisoned");
        map.get(pointcut).cloned()
    }

    pub fn contains(&self, pointcut: &str) -> bool {
        self.lookup(pointcut).is_some()
    }

    /// Returns the cached expression for a name, compiling and inserting it
    /// if absent. The insert is atomic with respect to other callers: when
    /// two threads race on first-time resolution, one compilation wins and
    /// both see the same shared expression.
    pub fn get_or_compile(&self, pointcut: &str, text: &str) -> Result<Arc<ExpressionInfo>, WeftError> {
        if let Some(existing) = self.lookup(pointcut) {
            return Ok(existing);
        }
        // Compile outside the write lock; parsing is pure.
        let compiled = Arc::new(ExpressionInfo::compile(text, self.name.clone())?);
        let mut map = self.expressions.write().expect("namespace lock poisoned");
        Ok(map
            .entry(pointcut.to_string())
            .or_insert(compiled)
            .clone())
    }

    pub fn len(&self) -> usize {
        self.expressions.read().expect("namespace lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

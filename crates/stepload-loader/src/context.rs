//! Named bindings exposed to sandboxed support code

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

pub type Binding = Arc<dyn Any + Send + Sync>;

/// Ordered name-to-value bindings. Values are shared with every scope
/// created from this context, never copied.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    bindings: IndexMap<String, Binding>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing any previous value.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) -> &mut Self {
        self.bindings.insert(name.into(), Arc::new(value));
        self
    }

    pub fn insert_shared(&mut self, name: impl Into<String>, value: Binding) -> &mut Self {
        self.bindings.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn get_as<T: Any>(&self, name: &str) -> Option<&T> {
        self.bindings.get(name).and_then(|value| value.downcast_ref::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

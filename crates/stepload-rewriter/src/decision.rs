//! Per-specifier rewrite decisions

/// Answer of a resolution policy for one dependency specifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplaceDecision {
    pub need_replace: bool,
    pub replacement: Option<String>,
}

impl ReplaceDecision {
    /// Leave the call site untouched.
    pub fn keep() -> Self {
        Self::default()
    }

    /// Substitute the call site with `replacement`. What is substituted
    /// (argument or whole call) depends on the rewrite mode.
    pub fn replace(replacement: impl Into<String>) -> Self {
        Self {
            need_replace: true,
            replacement: Some(replacement.into()),
        }
    }

    /// The replacement to apply, if the decision asks for one and carries it.
    pub fn replacement(&self) -> Option<&str> {
        if self.need_replace {
            self.replacement.as_deref()
        } else {
            None
        }
    }
}

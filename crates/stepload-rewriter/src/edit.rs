//! Span-based text edits

use stepload_ast::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    span: Span,
    text: String,
}

/// Collected replacements against one source text.
#[derive(Debug, Default)]
pub(crate) struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.edits.push(Edit { span, text: text.into() });
    }

    pub(crate) fn remove(&mut self, span: Span) {
        self.replace(span, String::new());
    }

    pub(crate) fn len(&self) -> usize {
        self.edits.len()
    }

    /// Applies all edits. An edit overlapping one that starts earlier (or
    /// starts at the same offset and is longer) is dropped, so a replaced
    /// outer call swallows edits nested inside it.
    pub(crate) fn apply(mut self, source: &str) -> String {
        self.edits
            .sort_by(|a, b| a.span.start.cmp(&b.span.start).then(b.span.end.cmp(&a.span.end)));

        let mut output = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in self.edits {
            if edit.span.start < cursor {
                continue;
            }
            output.push_str(&source[cursor..edit.span.start]);
            output.push_str(&edit.text);
            cursor = edit.span.end;
        }
        output.push_str(&source[cursor..]);
        output
    }
}

/// Renders `value` as a JavaScript string literal delimited by `quote`.
pub(crate) fn render_string_literal(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

//! Text safety pipeline.
//!
//! Free text from the store may carry HTML metacharacters and LaTeX math.
//! [`TextPipeline::process_text_field`] escapes the prose, leaves `$...$` and
//! `$$...$$` spans intact, then rewrites those spans into `\(...\)` and
//! `\[...\]` for the client-side math renderer.
//!
//! # Example
//! ```
//! use paperfeed_core::text::TextPipeline;
//!
//! let pipeline = TextPipeline::default();
//! assert_eq!(
//!     pipeline.process_text_field("a <b> $\\alpha$"),
//!     "a &lt;b&gt; \\(\\alpha\\)"
//! );
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::warn;

fn block_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\$([^$]+)\$\$").unwrap())
}

fn inline_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([^$]+)\$").unwrap())
}

/// Commands the built-in symbol table knows.
const BUILTIN_SYMBOLS: [&str; 25] = [
    "leq", "geq", "le", "ge", "neq", "approx", "sim", "pm", "mp", "times", "div", "infty",
    "alpha", "beta", "gamma", "delta", "epsilon", "theta", "lambda", "mu", "pi", "sigma",
    "tau", "phi", "omega",
];

/// Exact inline spans with a fixed rendering, consulted before the generic
/// `$...$` rule. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSymbolTable {
    entries: BTreeMap<String, String>,
}

impl MathSymbolTable {
    /// The common single-symbol spans, each rendered as inline math.
    pub fn builtin() -> Self {
        let entries = BUILTIN_SYMBOLS
            .iter()
            .map(|cmd| (format!("${}$", backslashed(cmd)), format!("\\({}\\)", backslashed(cmd))))
            .collect();
        Self { entries }
    }

    pub fn empty() -> Self {
        Self { entries: BTreeMap::new() }
    }

    /// Layer extra entries on top of this table.
    ///
    /// Keys may be a full span (`$\leq$`) or the bare command (`\leq`).
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in overrides {
            let key = key.as_ref().trim();
            let span = if key.starts_with('$') {
                key.to_string()
            } else {
                format!("${}$", key)
            };
            self.entries.insert(span, value.into());
        }
        self
    }

    pub fn get(&self, span: &str) -> Option<&str> {
        self.entries.get(span).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MathSymbolTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn backslashed(cmd: &str) -> String {
    format!("\\{}", cmd)
}

/// Escape `&`, `<`, `>`, `"` and `'`.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c    => out.push(c),
        }
    }
    out
}

/// Placeholder bookkeeping for one pass over one string.
///
/// Tokens are `<sentinel><index><sentinel>`, where the sentinel is a
/// private-use character absent from the input, so a token can never collide
/// with the surrounding text or with the output of [`escape_markup`].
struct Protected {
    sentinel: char,
    spans: Vec<String>,
}

impl Protected {
    fn for_text(text: &str) -> Option<Self> {
        let sentinel = ('\u{E000}'..='\u{F8FF}')
            .chain('\u{F0000}'..='\u{FFFFD}')
            .find(|c| !text.contains(*c))?;
        Some(Self { sentinel, spans: Vec::new() })
    }

    fn token(&self, index: usize) -> String {
        format!("{}{}{}", self.sentinel, index, self.sentinel)
    }

    /// Swap every match of `re` for a token, remembering `render(match)`.
    fn protect<F>(&mut self, re: &Regex, text: &str, mut render: F) -> String
    where
        F: FnMut(&Captures) -> String,
    {
        re.replace_all(text, |caps: &Captures| {
            let token = self.token(self.spans.len());
            self.spans.push(render(caps));
            token
        })
        .into_owned()
    }

    /// Put the remembered spans back. A span may itself hold earlier
    /// tokens, so scan again until a pass restores nothing.
    fn restore(&self, mut text: String) -> String {
        for _ in 0..=self.spans.len() {
            match self.restore_once(&text) {
                Some(next) => text = next,
                None => break,
            }
        }
        text
    }

    /// One left-to-right pass. Tokens are read whole from their opening
    /// sentinel, so digits between two tokens never pair up with the
    /// wrong sentinels. `None` when no token was found.
    fn restore_once(&self, text: &str) -> Option<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut restored = false;

        while let Some(start) = rest.find(self.sentinel) {
            out.push_str(&rest[..start]);
            let after = &rest[start + self.sentinel.len_utf8()..];
            let digits = after.len() - after.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            let span = after[..digits]
                .parse::<usize>()
                .ok()
                .filter(|_| after[digits..].starts_with(self.sentinel))
                .and_then(|index| self.spans.get(index));

            match span {
                Some(span) => {
                    out.push_str(span);
                    rest = &after[digits + self.sentinel.len_utf8()..];
                    restored = true;
                }
                None => {
                    out.push(self.sentinel);
                    rest = after;
                }
            }
        }
        out.push_str(rest);

        restored.then_some(out)
    }
}

/// The two-stage text pipeline, configured with a symbol table.
#[derive(Debug, Clone, Default)]
pub struct TextPipeline {
    symbols: MathSymbolTable,
}

impl TextPipeline {
    pub fn new(symbols: MathSymbolTable) -> Self {
        Self { symbols }
    }

    pub fn symbols(&self) -> &MathSymbolTable {
        &self.symbols
    }

    /// HTML-escape everything outside math spans.
    ///
    /// Block spans are protected before inline spans so the inner dollars of
    /// `$$...$$` are never read as inline delimiters.
    pub fn escape_html(&self, text: &str) -> String {
        let Some(mut protected) = Protected::for_text(text) else {
            warn!("no free placeholder sentinel, escaping without math protection");
            return escape_markup(text);
        };

        let text = protected.protect(block_span(), text, |caps| caps[0].to_string());
        let text = protected.protect(inline_span(), &text, |caps| caps[0].to_string());
        protected.restore(escape_markup(&text))
    }

    /// Rewrite `$$...$$` to `\[...\]` and `$...$` to `\(...\)`.
    ///
    /// Unbalanced dollars match nothing and stay literal.
    pub fn convert_math_delimiters(&self, text: &str) -> String {
        let Some(mut protected) = Protected::for_text(text) else {
            warn!("no free placeholder sentinel, leaving math delimiters untouched");
            return text.to_string();
        };

        let text = protected.protect(block_span(), text, |caps| format!("\\[{}\\]", &caps[1]));
        let text = inline_span().replace_all(&text, |caps: &Captures| {
            match self.symbols.get(&caps[0]) {
                Some(rendered) => rendered.to_string(),
                None => format!("\\({}\\)", &caps[1]),
            }
        });
        protected.restore(text.into_owned())
    }

    /// `convert_math_delimiters(escape_html(text))`.
    pub fn process_text_field(&self, text: &str) -> String {
        self.convert_math_delimiters(&self.escape_html(text))
    }

    /// [`Self::process_text_field`] for strings, identity for everything else.
    pub fn process_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.process_text_field(s)),
            other => other.clone(),
        }
    }
}

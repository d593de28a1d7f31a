//! TypeScript-compatible diagnostic and compiler option types.
//! This crate serves as a shared compatibility layer between the checking
//! service, its capabilities and the command line host.

use std::fmt;

pub mod options;

pub use options::*;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl DiagnosticCategory {
    /// Lower-case name as printed by `tsc`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "warning" => Some(DiagnosticCategory::Warning),
            "error" => Some(DiagnosticCategory::Error),
            "suggestion" => Some(DiagnosticCategory::Suggestion),
            "message" => Some(DiagnosticCategory::Message),
            _ => None,
        }
    }
}

// --- Diagnostic Structures ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticMessageChain {
    String(String),
    Chain {
        message_text: String,
        category: DiagnosticCategory,
        code: i32,
        next: Option<Vec<DiagnosticMessageChain>>,
    },
}

impl DiagnosticMessageChain {
    pub fn new(message: impl Into<String>) -> Self {
        Self::String(message.into())
    }
}

impl From<String> for DiagnosticMessageChain {
    fn from(s: String) -> Self {
        DiagnosticMessageChain::String(s)
    }
}

impl From<&str> for DiagnosticMessageChain {
    fn from(s: &str) -> Self {
        DiagnosticMessageChain::String(s.to_string())
    }
}

impl fmt::Display for DiagnosticMessageChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", flatten_diagnostic_message_text(self, "\n"))
    }
}

/// A raw diagnostic as produced by a type-checking capability.
///
/// `start` and `length` are byte offsets into the file text; diagnostics that
/// are not attached to a file (option or global diagnostics) carry `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: i32,
    pub file: Option<String>,
    pub start: Option<usize>,
    pub length: Option<usize>,
    pub message_text: DiagnosticMessageChain,
}

impl Diagnostic {
    pub fn new(
        category: DiagnosticCategory,
        code: i32,
        message_text: impl Into<DiagnosticMessageChain>,
    ) -> Self {
        Self {
            category,
            code,
            file: None,
            start: None,
            length: None,
            message_text: message_text.into(),
        }
    }

    pub fn error(code: i32, message_text: impl Into<DiagnosticMessageChain>) -> Self {
        Self::new(DiagnosticCategory::Error, code, message_text)
    }

    pub fn warning(code: i32, message_text: impl Into<DiagnosticMessageChain>) -> Self {
        Self::new(DiagnosticCategory::Warning, code, message_text)
    }

    /// Attach the diagnostic to a span of a file.
    pub fn at(mut self, file: impl Into<String>, start: usize, length: usize) -> Self {
        self.file = Some(file.into());
        self.start = Some(start);
        self.length = Some(length);
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

// --- Utilities ---

pub fn make_diagnostic_chain(
    message_text: String,
    next: Option<Vec<DiagnosticMessageChain>>,
) -> DiagnosticMessageChain {
    DiagnosticMessageChain::Chain {
        category: DiagnosticCategory::Message,
        code: 0,
        message_text,
        next,
    }
}

pub fn add_diagnostic_chain(
    message_text: DiagnosticMessageChain,
    add: Vec<DiagnosticMessageChain>,
) -> DiagnosticMessageChain {
    match message_text {
        DiagnosticMessageChain::String(s) => make_diagnostic_chain(s, Some(add)),
        DiagnosticMessageChain::Chain {
            message_text,
            category,
            code,
            next,
        } => {
            let mut next_vec = next.unwrap_or_default();
            next_vec.extend(add);
            DiagnosticMessageChain::Chain {
                message_text,
                category,
                code,
                next: Some(next_vec),
            }
        }
    }
}

/// Render a message chain the way `tsc` does: every nested level starts on a
/// new line, indented by two spaces per level.
pub fn flatten_diagnostic_message_text(chain: &DiagnosticMessageChain, new_line: &str) -> String {
    let mut result = String::new();
    flatten_into(&mut result, chain, new_line, 0);
    result
}

fn flatten_into(out: &mut String, chain: &DiagnosticMessageChain, new_line: &str, indent: usize) {
    if indent > 0 {
        out.push_str(new_line);
        for _ in 0..indent {
            out.push_str("  ");
        }
    }
    match chain {
        DiagnosticMessageChain::String(s) => out.push_str(s),
        DiagnosticMessageChain::Chain {
            message_text, next, ..
        } => {
            out.push_str(message_text);
            for kid in next.iter().flatten() {
                flatten_into(out, kid, new_line, indent + 1);
            }
        }
    }
}

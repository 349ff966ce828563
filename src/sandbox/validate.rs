//! Lexical pre-filter run on scene code before anything is compiled.
//!
//! This is a best-effort filter. It cannot see through string building or aliasing, so the
//! restricted engine in [`crate::sandbox::capability`] remains the actual isolation boundary.

use crate::foundation::error::LoadError;
use crate::foundation::text::bounded_excerpt;
use regex::Regex;
use std::sync::LazyLock;

/// Upper bound for the source excerpt attached to a rejection.
const EXCERPT_CHARS: usize = 120;

/// One blacklist entry.
struct Rule {
    label: &'static str,
    re: Regex,
}

/// Ordered blacklist. The first matching entry wins.
const RULES: &[(&str, &str)] = &[
    ("dynamic-eval", r"\beval\s*\("),
    (
        "dynamic-function",
        r"\bnew\s+Function\b|\bFunction\s*\(|\bFn\s*\(",
    ),
    (
        "module-import",
        r"(?m)^[ \t]*(?:import|export)\b|\bimport\s*\(|\brequire\s*\(",
    ),
    (
        "global-object",
        r"(?:^|[^.\w])(?P<hit>(?:globalThis|window|self|global|document|process)\s*[.\[])",
    ),
    (
        "storage-api",
        r"\b(?:localStorage|sessionStorage|indexedDB)\b|\bdocument\s*\.\s*cookie\b",
    ),
    (
        "network-api",
        r"\bfetch\s*\(|\b(?:XMLHttpRequest|WebSocket|EventSource)\b|\bnavigator\s*\.\s*sendBeacon\b",
    ),
    (
        "timer-api",
        r"\b(?:setTimeout|setInterval|setImmediate|requestAnimationFrame)\s*\(",
    ),
    (
        "nondeterministic-api",
        r"\b(?:Date\s*\.\s*now|Math\s*\.\s*random|performance\s*\.\s*now|timestamp)\s*\(",
    ),
    ("inline-script", r"(?i)<\s*script\b|\bjavascript\s*:"),
];

static COMPILED: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|&(label, pat)| Rule {
            label,
            // Patterns are constants covered by tests.
            re: Regex::new(pat).expect("blacklist pattern must compile"),
        })
        .collect()
});

/// A blacklist hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    /// Label of the matching blacklist entry.
    pub pattern: &'static str,
    /// Bounded excerpt of the offending line.
    pub excerpt: String,
    /// 1-based line of the match.
    pub line: usize,
    /// Byte offset of the match.
    pub offset: usize,
}

impl From<Rejection> for LoadError {
    fn from(r: Rejection) -> Self {
        LoadError::ValidationRejected {
            pattern: r.pattern.to_owned(),
            excerpt: r.excerpt,
            line: r.line,
        }
    }
}

/// Labels of every blacklist entry, in evaluation order.
pub fn pattern_labels() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|(label, _)| *label)
}

/// Scan `code` against the blacklist. Pure; never executes anything.
pub fn validate(code: &str) -> Result<(), Rejection> {
    for rule in COMPILED.iter() {
        if let Some(caps) = rule.re.captures(code) {
            // Rules with a leading context char mark the construct itself as `hit`.
            let offset = caps
                .name("hit")
                .or_else(|| caps.get(0))
                .map_or(0, |m| m.start());
            return Err(rejection(code, rule.label, offset));
        }
    }
    Ok(())
}

fn rejection(code: &str, label: &'static str, offset: usize) -> Rejection {
    let line_start = code[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = code[offset..]
        .find('\n')
        .map_or(code.len(), |i| offset + i);
    Rejection {
        pattern: label,
        excerpt: bounded_excerpt(code[line_start..line_end].trim(), EXCERPT_CHARS),
        line: code[..offset].matches('\n').count() + 1,
        offset,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/validate.rs"]
mod tests;

//! Path template compilation and matching.
//!
//! # Responsibilities
//! - Compile `{name}` and `*` segments of a template into one anchored regex
//! - Make a trailing `/{name}` optional so one template serves both the
//!   collection and the item path
//! - Extract percent-decoded parameter values from a concrete path
//!
//! # Design Decisions
//! - Compiled once at startup; matching is a single regex evaluation
//! - An optional trailing slash is always accepted
//! - No type coercion: values stay strings, consumers convert

use regex::Regex;
use std::collections::HashMap;

/// Name given to a `*` catch-all capture.
pub const WILDCARD: &str = "*";

/// Errors raised when compiling a path template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("unclosed parameter in template '{0}'")]
    Unclosed(String),
    #[error("invalid parameter name '{name}' in template '{template}'")]
    InvalidName { template: String, name: String },
    #[error("duplicate parameter '{name}' in template '{template}'")]
    Duplicate { template: String, name: String },
    #[error("template '{template}' did not compile: {reason}")]
    Regex { template: String, reason: String },
}

enum Piece {
    Literal(String),
    Param(String),
    Wildcard,
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: String,
    names: Vec<String>,
    regex: Regex,
}

impl PathMatcher {
    /// Compile a template such as `/users/{id}` or `/files/*`.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let pieces = scan(template)?;

        let mut names: Vec<String> = Vec::new();
        for piece in &pieces {
            let name = match piece {
                Piece::Param(name) => name.as_str(),
                Piece::Wildcard => WILDCARD,
                Piece::Literal(_) => continue,
            };
            if names.iter().any(|n| n == name) {
                return Err(PatternError::Duplicate {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            names.push(name.to_string());
        }

        // `/{name}` as the final segment becomes `(?:/([^/]+?))?`
        let optional_tail = pieces.len() >= 2
            && matches!(pieces.last(), Some(Piece::Param(_)))
            && matches!(&pieces[pieces.len() - 2], Piece::Literal(l) if l.ends_with('/'));

        let mut source = String::from("^");
        let last = pieces.len().saturating_sub(1);
        for (i, piece) in pieces.iter().enumerate() {
            match piece {
                Piece::Literal(text) if optional_tail && i + 1 == last => {
                    source.push_str(&regex::escape(&text[..text.len() - 1]));
                }
                Piece::Literal(text) => source.push_str(&regex::escape(text)),
                Piece::Param(_) if optional_tail && i == last => source.push_str("(?:/([^/]+?))?"),
                Piece::Param(_) => source.push_str("([^/]+?)"),
                Piece::Wildcard => source.push_str("(.*?)"),
            }
        }
        source.push_str("/?$");

        let regex = Regex::new(&source).map_err(|e| PatternError::Regex {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: template.to_string(),
            names,
            regex,
        })
    }

    /// The template this matcher was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parameter names in order of appearance.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Match a path, returning the captured parameters.
    ///
    /// Absent optional parameters are simply missing from the map.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(path)?;

        let mut params = HashMap::with_capacity(self.names.len());
        for (i, name) in self.names.iter().enumerate() {
            let Some(raw) = caps.get(i + 1) else { continue };
            if raw.as_str().is_empty() {
                continue;
            }
            let value = urlencoding::decode(raw.as_str())
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.as_str().to_string());
            params.insert(name.clone(), value);
        }
        Some(params)
    }
}

fn scan(template: &str) -> Result<Vec<Piece>, PatternError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(PatternError::Unclosed(template.to_string()));
                }
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(PatternError::InvalidName {
                        template: template.to_string(),
                        name,
                    });
                }
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Param(name));
            }
            '*' => {
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Wildcard);
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

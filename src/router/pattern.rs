//! Pattern normalization and per-route match checks.

use regex::bytes::{Regex, RegexBuilder};
use smallvec::SmallVec;

use super::route::{MatchMode, RouteOptions};
use crate::error::RouterError;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered path parameters, whole match excluded.
pub type ParamVec = SmallVec<[String; MAX_INLINE_PARAMS]>;

/// Bring a registered pattern into matching form.
///
/// Returns `None` for an empty pattern, which never matches. Otherwise a
/// leading `/` is added when missing and one trailing `/` is dropped, unless
/// the pattern is the bare root.
#[must_use]
pub fn normalize_pattern(pattern: &str) -> Option<String> {
    if pattern.is_empty() {
        return None;
    }
    let mut normalized = if pattern.starts_with('/') {
        pattern.to_string()
    } else {
        format!("/{pattern}")
    };
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    Some(normalized)
}

/// A pattern compiled for its match mode.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// Empty pattern
    Never,
    Literal(String),
    Regex(Regex),
}

impl CompiledPattern {
    /// Compile `pattern` once, ahead of any request.
    ///
    /// In regex mode `@` is escaped and the expression is wrapped as
    /// `^...$` without an extra group, so a top-level `a|b` keeps its
    /// alternation precedence. Matching is byte-oriented with Unicode
    /// classes off: `\d`, `\w` and `\s` are ASCII only.
    pub fn compile(pattern: &str, mode: MatchMode) -> Result<Self, RouterError> {
        let Some(normalized) = normalize_pattern(pattern) else {
            return Ok(CompiledPattern::Never);
        };
        match mode {
            MatchMode::Literal => Ok(CompiledPattern::Literal(normalized)),
            MatchMode::Regex => {
                let escaped = normalized.replace('@', r"\@");
                let anchored = format!("^{escaped}$");
                RegexBuilder::new(&anchored)
                    .unicode(false)
                    .build()
                    .map(CompiledPattern::Regex)
                    .map_err(|source| RouterError::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    })
            }
        }
    }

    /// Test `path` and return its parameters on a match.
    ///
    /// Unmatched optional groups before the last matched group produce empty
    /// strings; unmatched trailing groups are left out.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        match self {
            CompiledPattern::Never => None,
            CompiledPattern::Literal(literal) => (literal == path).then(ParamVec::new),
            CompiledPattern::Regex(re) => {
                let caps = re.captures(path.as_bytes())?;
                let last = (1..caps.len()).rev().find(|&i| caps.get(i).is_some());
                let mut params = ParamVec::new();
                if let Some(last) = last {
                    for i in 1..=last {
                        params.push(caps.get(i).map_or_else(String::new, |m| {
                            String::from_utf8_lossy(m.as_bytes()).into_owned()
                        }));
                    }
                }
                Some(params)
            }
        }
    }
}

/// One-off match check of a pattern against a path.
///
/// Compiles on every call; the router itself compiles patterns once at build
/// time.
pub fn check_route(
    pattern: &str,
    options: &RouteOptions,
    path: &str,
) -> Result<Option<ParamVec>, RouterError> {
    Ok(CompiledPattern::compile(pattern, options.match_mode())?.captures(path))
}

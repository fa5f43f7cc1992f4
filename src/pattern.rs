//! Hostname pattern expansion.
//!
//! Turns compact patterns such as `rack-[1:2]-node-[01:04]` into concrete
//! hostnames. Each `[...]` group is either a zero-padded numeric range
//! (`001:004`) or a comma-separated list of literals (`dca,dcb`).
//!
//! Groups expand as an ordered Cartesian product: the first group varies
//! slowest and the last group varies fastest.
//!
//! # Example
//!
//! ```
//! use pingwatch::pattern::expand;
//!
//! let hosts = expand("rack-[1:2]-node-[01:02]").unwrap();
//! assert_eq!(
//!     hosts,
//!     ["rack-1-node-01", "rack-1-node-02", "rack-2-node-01", "rack-2-node-02"]
//! );
//! ```

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Largest number of hostnames a single pattern may expand to.
pub const MAX_EXPANDED_HOSTS: usize = 100_000;

/// Errors produced while expanding a host pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `[` was opened but never closed.
    #[error("unterminated bracket group starting at byte {position}")]
    Unterminated { position: usize },

    /// A `]` appeared outside of any group.
    #[error("unexpected ']' at byte {position}")]
    StrayClose { position: usize },

    /// A `[` appeared inside another group.
    #[error("nested '[' at byte {position}")]
    Nested { position: usize },

    /// A group with no content (`[]`).
    #[error("empty bracket group at byte {position}")]
    EmptyGroup { position: usize },

    /// Numeric range whose start is greater than its end.
    #[error("range start {start} is greater than end {end}")]
    ReversedRange { start: u64, end: u64 },

    /// Numeric bound that does not fit in 64 bits.
    #[error("range bound '{0}' is too large")]
    BoundOverflow(String),

    /// The pattern would produce more than [`MAX_EXPANDED_HOSTS`] names.
    #[error("pattern expands to more than {limit} hosts")]
    TooLarge { limit: usize },
}

/// One parsed `[...]` group together with the literal text preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment<'a> {
    prefix: &'a str,
    values: Vec<String>,
}

fn range_regex() -> &'static Regex {
    static RANGE_REGEX: OnceLock<Regex> = OnceLock::new();
    RANGE_REGEX
        .get_or_init(|| Regex::new(r"^([0-9]+):([0-9]+)$").expect("failed to compile range regex"))
}

/// Expand a single pattern into an ordered list of hostnames.
///
/// A pattern without any bracket group expands to itself.
///
/// # Errors
///
/// Returns [`PatternError`] for unbalanced or empty brackets and for
/// numeric ranges that are reversed or overflow, and when the result would
/// exceed [`MAX_EXPANDED_HOSTS`].
pub fn expand(pattern: &str) -> Result<Vec<String>, PatternError> {
    let (segments, suffix) = parse(pattern)?;

    let total = segments
        .iter()
        .try_fold(1usize, |acc, segment| acc.checked_mul(segment.values.len()));
    if total.is_none_or(|n| n > MAX_EXPANDED_HOSTS) {
        return Err(PatternError::TooLarge {
            limit: MAX_EXPANDED_HOSTS,
        });
    }

    let mut expanded = vec![String::new()];
    for segment in &segments {
        let mut next = Vec::with_capacity(expanded.len() * segment.values.len());
        for head in &expanded {
            for value in &segment.values {
                next.push(format!("{head}{}{value}", segment.prefix));
            }
        }
        expanded = next;
    }

    for host in &mut expanded {
        host.push_str(suffix);
    }
    Ok(expanded)
}

/// Expand several patterns and concatenate the results in input order.
///
/// Duplicates across patterns are kept. On failure the offending pattern is
/// returned alongside the error.
pub fn expand_all<I, S>(patterns: I) -> Result<Vec<String>, (String, PatternError)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hosts = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let expanded = expand(pattern).map_err(|e| (pattern.to_string(), e))?;
        tracing::debug!(pattern, count = expanded.len(), "Expanded host pattern");
        hosts.extend(expanded);
    }
    Ok(hosts)
}

/// Split a pattern into bracket segments plus the trailing literal suffix.
fn parse(pattern: &str) -> Result<(Vec<Segment<'_>>, &str), PatternError> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut open: Option<usize> = None;

    for (idx, ch) in pattern.char_indices() {
        match (ch, open) {
            ('[', None) => open = Some(idx),
            ('[', Some(_)) => return Err(PatternError::Nested { position: idx }),
            (']', None) => return Err(PatternError::StrayClose { position: idx }),
            (']', Some(start)) => {
                let content = &pattern[start + 1..idx];
                if content.is_empty() {
                    return Err(PatternError::EmptyGroup { position: start });
                }
                segments.push(Segment {
                    prefix: &pattern[literal_start..start],
                    values: group_values(content)?,
                });
                literal_start = idx + 1;
                open = None;
            }
            _ => {}
        }
    }

    if let Some(position) = open {
        return Err(PatternError::Unterminated { position });
    }
    Ok((segments, &pattern[literal_start..]))
}

/// Values produced by the content of one bracket group.
fn group_values(content: &str) -> Result<Vec<String>, PatternError> {
    let Some(caps) = range_regex().captures(content) else {
        return Ok(content.split(',').map(str::to_string).collect());
    };

    let (first, last) = (&caps[1], &caps[2]);
    let start: u64 = first
        .parse()
        .map_err(|_| PatternError::BoundOverflow(first.to_string()))?;
    let end: u64 = last
        .parse()
        .map_err(|_| PatternError::BoundOverflow(last.to_string()))?;
    if start > end {
        return Err(PatternError::ReversedRange { start, end });
    }
    if end - start >= MAX_EXPANDED_HOSTS as u64 {
        return Err(PatternError::TooLarge {
            limit: MAX_EXPANDED_HOSTS,
        });
    }

    let width = first.len();
    Ok((start..=end).map(|n| format!("{n:0width$}")).collect())
}

//! Hierarchical option keys and wildcard patterns.
//!
//! Responsibilities:
//! - Represent a configuration key as an immutable sequence of dot-separated segments.
//! - Build keys incrementally (`Key::root().child("ckan")?.child("site_url")?`).
//! - Match keys against glob-style patterns (`ckan.datapusher.*`).
//!
//! Does NOT handle:
//! - Uniqueness of keys within a registry (see `declaration`).
//!
//! Invariants:
//! - Every segment is non-empty, contains no whitespace, no `.` and no wildcard characters.
//! - A trailing `*` pattern segment matches any number of remaining key segments, including zero.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reasons a key or pattern string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("empty segment in '{0}'")]
    EmptySegment(String),

    #[error("segment '{segment}' contains whitespace")]
    Whitespace { segment: String },

    #[error("segment '{segment}' contains a wildcard; use a pattern instead")]
    Wildcard { segment: String },

    #[error("segment '{segment}' contains a '.'; use join() for dotted paths")]
    Dotted { segment: String },
}

fn check_segment(segment: &str, source: &str, allow_wildcards: bool) -> Result<(), KeyError> {
    if segment.trim().is_empty() {
        return Err(KeyError::EmptySegment(source.to_string()));
    }
    if segment.chars().any(char::is_whitespace) {
        return Err(KeyError::Whitespace {
            segment: segment.to_string(),
        });
    }
    if segment.contains('.') {
        return Err(KeyError::Dotted {
            segment: segment.to_string(),
        });
    }
    if !allow_wildcards && segment.contains(['*', '?']) {
        return Err(KeyError::Wildcard {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

/// Dotted identifier of a configuration option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// The empty key every declaration is rooted at.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted key such as `ckan.site_url`.
    pub fn parse(text: &str) -> Result<Self, KeyError> {
        Self::root().join(text)
    }

    /// Return a new key one segment deeper.
    pub fn child(&self, segment: &str) -> Result<Self, KeyError> {
        check_segment(segment, segment, false)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Append every segment of a dotted path.
    pub fn join(&self, path: &str) -> Result<Self, KeyError> {
        let mut segments = self.segments.clone();
        for segment in path.split('.') {
            check_segment(segment, path, false)?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `self` equals `other` or is nested below it.
    pub fn starts_with(&self, other: &Key) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Key {
    type Error = KeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Key selector with glob-style segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<String>,
    open_tail: bool,
}

impl Pattern {
    /// The pattern matching every key.
    pub fn any() -> Self {
        Self {
            segments: Vec::new(),
            open_tail: true,
        }
    }

    pub fn parse(text: &str) -> Result<Self, KeyError> {
        let mut segments = Vec::new();
        for segment in text.split('.') {
            check_segment(segment, text, true)?;
            segments.push(segment.to_string());
        }
        let open_tail = segments.last().is_some_and(|last| last == "*");
        if open_tail {
            segments.pop();
        }
        Ok(Self {
            segments,
            open_tail,
        })
    }

    pub fn matches(&self, key: &Key) -> bool {
        if key.segments.len() < self.segments.len() {
            return false;
        }
        if !self.open_tail && key.segments.len() != self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(&key.segments)
            .all(|(pattern, segment)| glob_segment(pattern, segment))
    }
}

impl FromStr for Pattern {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        if self.open_tail {
            parts.push("*");
        }
        f.write_str(&parts.join("."))
    }
}

impl PartialEq<Pattern> for Key {
    fn eq(&self, other: &Pattern) -> bool {
        other.matches(self)
    }
}

/// Match one segment against a glob supporting `*` and `?`.
fn glob_segment(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, consumed)) => {
                    p = star + 1;
                    t = consumed + 1;
                    backtrack = Some((star, consumed + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

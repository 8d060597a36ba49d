use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::VfsError;

/// Tokenized mount path.
///
/// A `Path` is an ordered sequence of tokens that the tree walk consumes
/// from the front. Popping is destructive: clone the path first if the
/// original is still needed afterwards.
///
/// Parsing normalizes the input:
///
/// - Replaces backslashes with forward slashes
/// - Collapses redundant separators (`a///b` → `a/b`)
/// - Drops `.` segments
/// - Rejects `..` segments (the namespace has no parent traversal)
///
/// A string made only of separators parses to the empty path, which names
/// the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    tokens: VecDeque<String>,
}

impl Path {
    /// The empty path (the root).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse and normalize a slash-separated path.
    pub fn parse(path: &str) -> Result<Self, VfsError> {
        let replaced = path.replace('\\', "/");
        let mut tokens = VecDeque::new();

        for segment in replaced.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }
            if segment == ".." {
                return Err(VfsError::InvalidPath(format!(
                    "path traversal (..) not allowed in {path}"
                )));
            }
            tokens.push_back(segment.to_owned());
        }

        Ok(Self { tokens })
    }

    pub fn front(&self) -> Option<&str> {
        self.tokens.front().map(String::as_str)
    }

    pub fn back(&self) -> Option<&str> {
        self.tokens.back().map(String::as_str)
    }

    pub fn pop_front(&mut self) -> Option<String> {
        self.tokens.pop_front()
    }

    pub fn pop_back(&mut self) -> Option<String> {
        self.tokens.pop_back()
    }

    pub fn push_back(&mut self, token: impl Into<String>) {
        self.tokens.push_back(token.into());
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens.iter().map(String::as_str)
    }

    /// Append every token of `suffix` to a copy of this path.
    pub fn join(&self, suffix: &Path) -> Path {
        let mut joined = self.clone();
        joined.tokens.extend(suffix.tokens.iter().cloned());
        joined
    }

    /// Render without the leading slash (`a/b/c`); the root renders empty.
    pub fn to_relative_string(&self) -> String {
        self.tokens().collect::<Vec<_>>().join("/")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tokens.is_empty() {
            return f.write_str("/");
        }
        for token in &self.tokens {
            write!(f, "/{token}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Tokens are taken as-is, without normalization.
impl From<Vec<String>> for Path {
    fn from(tokens: Vec<String>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }
}

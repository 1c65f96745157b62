//! Configuration tree types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Source path recorded for directives that did not come from a file.
pub const COMMAND_LINE_SOURCE: &str = "(command line)";

/// A parsed configuration tree, rooted at the http block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigTree {
    /// Document root set in the http block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Directives set directly in the http block.
    #[serde(default)]
    pub directives: Vec<Directive>,

    /// Virtual hosts in declaration order.
    #[serde(default)]
    pub servers: Vec<VirtualHost>,
}

/// A `server` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualHost {
    /// Names from the `server_name` directive. Empty for a catch-all server.
    #[serde(default)]
    pub server_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    #[serde(default)]
    pub directives: Vec<Directive>,

    /// `if` blocks directly inside the server block.
    #[serde(default)]
    pub conditions: Vec<Conditional>,

    #[serde(default)]
    pub locations: Vec<Location>,
}

/// A `location` block, possibly nested inside another location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub matcher: LocationMatcher,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    #[serde(default)]
    pub directives: Vec<Directive>,

    /// `if` blocks inside this location. They govern the same request
    /// paths as the location itself.
    #[serde(default)]
    pub conditions: Vec<Conditional>,

    #[serde(default)]
    pub locations: Vec<Location>,
}

/// An `if` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    /// Condition text, kept for diagnostics only.
    pub condition: String,

    #[serde(default)]
    pub directives: Vec<Directive>,
}

/// How a location matches request paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    Exact,
    Prefix,
    Regex,
}

impl MatcherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatcherKind::Exact => "exact",
            MatcherKind::Prefix => "prefix",
            MatcherKind::Regex => "regex",
        }
    }
}

impl FromStr for MatcherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(MatcherKind::Exact),
            "prefix" => Ok(MatcherKind::Prefix),
            "regex" => Ok(MatcherKind::Regex),
            other => Err(format!(
                "unknown matcher type '{}' (expected exact, prefix or regex)",
                other
            )),
        }
    }
}

/// Matcher rule of a location block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationMatcher {
    #[serde(rename = "type")]
    pub kind: MatcherKind,
    pub value: String,
}

impl LocationMatcher {
    pub fn new(kind: MatcherKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn prefix(value: impl Into<String>) -> Self {
        Self::new(MatcherKind::Prefix, value)
    }
}

/// One directive occurrence with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// File the directive was read from. `None` when it was given on the
    /// command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

impl Directive {
    pub fn new(name: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            file: None,
            line: None,
        }
    }

    /// Attach file/line provenance.
    pub fn at(mut self, file: impl Into<String>, line: u64) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Source path as recorded in the manifest.
    pub fn source_path(&self) -> &str {
        self.file.as_deref().unwrap_or(COMMAND_LINE_SOURCE)
    }

    /// Source line as recorded in the manifest; 0 for command-line input.
    pub fn source_line(&self) -> u64 {
        match self.file {
            Some(_) => self.line.unwrap_or(0),
            None => 0,
        }
    }
}

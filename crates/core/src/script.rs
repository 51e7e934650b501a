//! Script sources and the line-based statement splitter.
//!
//! Every non-blank line of a script body is one statement. Statements that
//! span several lines are not supported: each line is submitted on its own.

use std::fmt;

/// Schema scripts applied by a default bootstrap run.
pub const DEFAULT_SCRIPT_SOURCES: [&str; 4] = [
    "https://raw.githubusercontent.com/microbusinesses/AddressService/master/DatabaseScript.cql",
    "https://raw.githubusercontent.com/microbusinesses/UserService/master/DatabaseScript.cql",
    "https://raw.githubusercontent.com/microbusinesses/NameService/master/DatabaseScript.cql",
    "https://raw.githubusercontent.com/microbusinesses/PersonService/master/DatabaseScript.cql",
];

/// URL of one remote CQL script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptSource(String);

impl ScriptSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }

    /// The fixed bootstrap set, in declaration order.
    pub fn defaults() -> Vec<Self> {
        DEFAULT_SCRIPT_SOURCES.iter().map(|u| Self::new(*u)).collect()
    }
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScriptSource {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// One executable statement taken from a script body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLine<'a> {
    /// 1-based position of the raw line in the body.
    pub number: usize,
    /// The line with surrounding whitespace removed. Never empty.
    pub statement: &'a str,
}

/// Split a script body into statements, in line order.
///
/// The body is split on `\n`; each line is trimmed (which also drops a
/// trailing `\r`) and skipped if nothing remains.
pub fn script_lines(body: &str) -> impl Iterator<Item = ScriptLine<'_>> {
    body.split('\n')
        .enumerate()
        .filter_map(|(idx, raw)| {
            let statement = raw.trim();
            (!statement.is_empty()).then_some(ScriptLine {
                number: idx + 1,
                statement,
            })
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Testcase Loading
//!
//! A testcase file is a JSON object: each member is one testcase, keyed by
//! its identifier, whose `input` is either an array (positional arguments)
//! or an object (arguments in member order). Key order on disk is the run
//! order and the report order.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Testcase file errors; all of them abort the run
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("failed to read testcase file {}: {source}", path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON
    #[error("malformed testcase file {}: {source}", path.display())]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// The top-level JSON value is not an object
    #[error("malformed testcase file {}: expected a JSON object of testcases", path.display())]
    NotAnObject {
        /// File path
        path: PathBuf,
    },
}

/// One named testcase
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// Unique identifier
    pub key: String,
    /// Raw `input` member (`null` when absent)
    pub input: Value,
}

impl TestCase {
    /// Input normalized to an ordered value sequence
    pub fn values(&self) -> Vec<Value> {
        match &self.input {
            Value::Array(items) => items.clone(),
            Value::Object(members) => members.values().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Number of input values supplied
    pub fn arity(&self) -> usize {
        match &self.input {
            Value::Array(items) => items.len(),
            Value::Object(members) => members.len(),
            _ => 0,
        }
    }
}

/// Ordered collection of testcases
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestSuite {
    cases: Vec<TestCase>,
}

impl TestSuite {
    /// Load and parse a testcase file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let suite = Self::parse(&content, path)?;
        tracing::debug!(path = %path.display(), testcases = suite.len(), "testcases loaded");
        Ok(suite)
    }

    /// Parse testcases from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self, LoadError> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self, LoadError> {
        let root: Value = serde_json::from_str(content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let Value::Object(members) = root else {
            return Err(LoadError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        Ok(Self::from_members(members))
    }

    fn from_members(members: Map<String, Value>) -> Self {
        let cases = members
            .into_iter()
            .map(|(key, body)| {
                let input = match body {
                    Value::Object(mut fields) => fields.remove("input").unwrap_or(Value::Null),
                    _ => Value::Null,
                };
                if !matches!(input, Value::Array(_) | Value::Object(_)) {
                    tracing::warn!(
                        testcase = %key,
                        "testcase input is not an array or object, every parameter takes its zero value"
                    );
                }
                TestCase { key, input }
            })
            .collect();

        Self { cases }
    }

    /// Number of testcases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether the suite is empty
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Testcases in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, TestCase> {
        self.cases.iter()
    }

    /// Testcase keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|case| case.key.as_str())
    }
}

impl<'a> IntoIterator for &'a TestSuite {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

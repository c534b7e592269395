//! Argument Binding
//!
//! An [`ArgumentVector`] has exactly one slot per declared parameter. Slots
//! are filled positionally from the testcase input; surplus input values are
//! dropped and missing ones leave the slot empty, which binds to the
//! parameter type's zero value.

use crate::kind::{Kind, Param, coerce};
use serde_json::Value;
use thiserror::Error;

/// Failure to turn a slot into its declared type
#[derive(Debug, Error)]
pub enum BindError {
    /// The JSON value does not fit the declared parameter kind
    #[error("argument {index} (expected {expected}): {source}")]
    Coerce {
        /// Parameter position
        index: usize,
        /// Declared kind
        expected: Kind,
        /// Underlying conversion error
        #[source]
        source: serde_json::Error,
    },

    /// The shim asked for a slot beyond the signature
    #[error("argument {index} is out of range for a signature of {arity} parameters")]
    OutOfRange {
        /// Requested position
        index: usize,
        /// Signature length
        arity: usize,
    },
}

/// Failure inside a generated call shim, outside the solution body
#[derive(Debug, Error)]
pub enum CallError {
    /// Argument binding failed
    #[error(transparent)]
    Bind(#[from] BindError),

    /// The return value could not be represented as JSON
    #[error("return value is not representable as JSON: {0}")]
    Encode(#[source] serde_json::Error),

    /// The async runtime for an `async` entry point could not start
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Fixed-length, per-parameter argument slots for one invocation
#[derive(Debug, Clone, Default)]
pub struct ArgumentVector {
    slots: Vec<Option<Value>>,
}

impl ArgumentVector {
    /// Bind up to `arity` input values, in order
    pub fn bind(arity: usize, inputs: impl IntoIterator<Item = Value>) -> Self {
        let mut slots: Vec<Option<Value>> = inputs.into_iter().take(arity).map(Some).collect();
        slots.resize(arity, None);
        Self { slots }
    }

    /// Bind and coerce each supplied value toward its declared kind
    pub fn bind_coerced(kinds: &[Kind], inputs: impl IntoIterator<Item = Value>) -> Self {
        let mut args = Self::bind(kinds.len(), inputs);
        for (slot, kind) in args.slots.iter_mut().zip(kinds) {
            if let Some(value) = slot.take() {
                *slot = Some(coerce(value, kind));
            }
        }
        args
    }

    /// Number of slots (the signature length)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the signature has no parameters
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots that received an input value
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Take slot `index` as `T`, or `T::default()` when the slot was never filled
    pub fn take<T: Param>(&mut self, index: usize) -> Result<T, BindError> {
        let arity = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(BindError::OutOfRange { index, arity })?;

        match slot.take() {
            None => Ok(T::default()),
            Some(value) => serde_json::from_value(value).map_err(|source| BindError::Coerce {
                index,
                expected: T::kind(),
                source,
            }),
        }
    }
}

/// Encode an entry point's return value as JSON
pub fn encode_return<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, CallError> {
    serde_json::to_value(value).map_err(CallError::Encode)
}

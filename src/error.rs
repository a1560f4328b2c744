// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the sequencer engine.
//!
//! Both kinds are startup problems: the poll loop itself never fails once the
//! engine has been constructed from a consistent configuration.

use thiserror::Error;

/// Errors raised by the sequencer engine and its configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    /// An index, track or step outside the declared grid shape
    #[error("{what} {value} is out of range (must be below {limit})")]
    OutOfRange {
        /// What was being addressed ("track", "step", "flat index", ...)
        what: &'static str,
        /// The offending value
        value: usize,
        /// Exclusive upper bound
        limit: usize,
    },

    /// Configuration values that cannot work together
    #[error("inconsistent configuration: {0}")]
    ConfigurationInconsistent(String),
}

impl SequencerError {
    pub(crate) fn out_of_range(what: &'static str, value: usize, limit: usize) -> Self {
        SequencerError::OutOfRange { what, value, limit }
    }

    pub(crate) fn inconsistent(message: impl Into<String>) -> Self {
        SequencerError::ConfigurationInconsistent(message.into())
    }
}

/// Result alias for sequencer operations
pub type SequencerResult<T> = std::result::Result<T, SequencerError>;

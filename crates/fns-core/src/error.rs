//! # Error Types
//!
//! Parse and projection errors for fns-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fns-core errors (this file)                                           │
//! │  ├── QrError          - Malformed QR payload                           │
//! │  └── ProjectionError  - Wire receipt cannot become a domain Receipt    │
//! │                                                                         │
//! │  fns-client errors (separate crate)                                    │
//! │  └── FnsError         - Transport, remote rejection, business outcomes │
//! │                                                                         │
//! │  Flow: ProjectionError → FnsError::Projection → caller                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant carries the raw fragment that caused it, so the message
//! names the offending element.

use thiserror::Error;

// =============================================================================
// QR Error
// =============================================================================

/// QR payload parsing errors.
///
/// Detection order follows the scan: the pair count is checked first, then
/// each pair left to right. The first bad pair, key or value wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    /// The payload does not split into exactly six `&`-separated pairs.
    #[error("unexpected params count {0}. 6 expected")]
    ParamsCount(usize),

    /// A pair does not split into exactly `key` and `value` on `=`.
    #[error("bad kv at {0}")]
    BadPair(String),

    /// A key outside `t`, `s`, `fn`, `i`, `fp`, `n`.
    #[error("unexpected key {0}")]
    UnexpectedKey(String),

    /// A recognized key appeared twice.
    #[error("duplicate key {0}")]
    DuplicateKey(String),

    /// A recognized key never appeared.
    #[error("missing key {0}")]
    MissingKey(&'static str),

    /// `t` matched neither `YYYYMMDDTHHmm` nor `YYYYMMDDTHHmmss`.
    #[error("bad date {0}")]
    BadDate(String),

    /// `s` is not a decimal number.
    #[error("bad sum {0}")]
    BadSum(String),

    /// `i`, `fp` or `n` is not a base-10 integer.
    ///
    /// `field` is the domain name of the value (`fd`, `fpd`, `opType`).
    #[error("bad {field} {value}")]
    BadInteger { field: &'static str, value: String },
}

// =============================================================================
// Projection Error
// =============================================================================

/// Wire-to-domain projection errors.
///
/// The timestamp is the only field the projection can reject; everything
/// else was already typed by the wire decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// `dateTime` is not `YYYY-MM-DDTHH:mm:ss`.
    #[error("bad date {0}")]
    BadDate(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for QR parsing results.
pub type QrResult<T> = Result<T, QrError>;

/// Convenience type alias for projection results.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

// =============================================================================
// Unit Tests
// =============================================================================

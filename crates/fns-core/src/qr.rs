//! # QR Payload Parser
//!
//! Decodes the compact string printed as a QR code on every Russian fiscal
//! receipt into the six fields the remote service is queried with.
//!
//! ## Payload Grammar
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  t=20200115T2110&s=1030.00&fn=9251440300046840&i=29414&fp=1250830908&n=1│
//! │  │               │         │                   │       │             │  │
//! │  │               │         │                   │       │   operation ┘  │
//! │  │               │         │                   │       └ fiscal sign    │
//! │  │               │         │                   └ fiscal document number │
//! │  │               │         └ fiscal drive number (opaque digits)        │
//! │  │               └ total sum, rubles                                    │
//! │  └ timestamp, YYYYMMDDTHHmm or YYYYMMDDTHHmmss                          │
//! │                                                                         │
//! │  Exactly six pairs, any order, every key exactly once.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fns_core::qr::parse_qr;
//!
//! let qr = parse_qr("t=20200115T2110&s=1030.00&fn=9251440300046840&i=29414&fp=1250830908&n=1")
//!     .unwrap();
//! assert_eq!(qr.fiscal_drive_number, "9251440300046840");
//! assert_eq!(qr.fiscal_document_number, 29414);
//! assert_eq!(qr.total_sum, 1030.0);
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QrError, QrResult};
use crate::kopecks::Kopecks;

/// Number of `key=value` pairs in a well-formed payload.
pub const QR_PAIR_COUNT: usize = 6;

/// Minute-precision timestamp layout.
const QR_MINUTE_FORMAT: &str = "%Y%m%dT%H%M";

/// Second-precision timestamp layout.
const QR_SECOND_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Character masks for the two timestamp widths; `#` is one ASCII digit.
const QR_MINUTE_MASK: &str = "########T####";
const QR_SECOND_MASK: &str = "########T######";

// =============================================================================
// Parsed QR
// =============================================================================

/// The typed contents of a receipt QR code.
///
/// Produced by [`parse_qr`] and handed straight to the remote client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQr {
    /// `fn`: serial of the fiscal drive. Kept as digits, never used in arithmetic.
    pub fiscal_drive_number: String,

    /// `n`: operation type (1 = sale, 2 = sale return, ...). Passed through as-is.
    pub operation_type: i64,

    /// `i`: sequential document number within the fiscal drive.
    pub fiscal_document_number: i64,

    /// `fp`: fiscal sign printed on the receipt.
    pub fiscal_sign: i64,

    /// `t`: receipt time. The payload carries no offset; it is read as UTC.
    pub date_time: DateTime<Utc>,

    /// `s`: total sum in rubles.
    pub total_sum: f32,
}

impl ParsedQr {
    /// Returns the total sum in kopecks, as the existence check sends it.
    pub fn total_kopecks(&self) -> Kopecks {
        Kopecks::from_rubles(self.total_sum)
    }
}

impl FromStr for ParsedQr {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_qr(s)
    }
}

/// Emits the canonical payload: fixed key order, second-precision timestamp,
/// two-decimal sum.
impl fmt::Display for ParsedQr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={}&s={:.2}&fn={}&i={}&fp={}&n={}",
            self.date_time.format(QR_SECOND_FORMAT),
            self.total_sum,
            self.fiscal_drive_number,
            self.fiscal_document_number,
            self.fiscal_sign,
            self.operation_type
        )
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Fields collected while scanning; every slot must be filled exactly once.
#[derive(Default)]
struct QrSlots {
    date_time: Option<DateTime<Utc>>,
    total_sum: Option<f32>,
    fiscal_drive_number: Option<String>,
    fiscal_document_number: Option<i64>,
    fiscal_sign: Option<i64>,
    operation_type: Option<i64>,
}

/// Parses a receipt QR payload.
///
/// ## Failure Order
/// ```text
/// split on '&' ──► count != 6?          → ParamsCount
///      │
///      ▼  (each pair, left to right)
/// split on '=' ──► parts != 2?          → BadPair
///      │
///      ▼
/// key known?  ──► no                    → UnexpectedKey
///      │
///      ▼
/// key seen?   ──► yes                   → DuplicateKey
///      │
///      ▼
/// value parse ──► fails                 → BadDate / BadSum / BadInteger
///      │
///      ▼  (after the scan)
/// any slot empty?                       → MissingKey
/// ```
pub fn parse_qr(payload: &str) -> QrResult<ParsedQr> {
    let pairs: Vec<&str> = payload.split('&').collect();
    if pairs.len() != QR_PAIR_COUNT {
        return Err(QrError::ParamsCount(pairs.len()));
    }

    let mut slots = QrSlots::default();

    for pair in pairs {
        let parts: Vec<&str> = pair.split('=').collect();
        let [key, value] = parts.as_slice() else {
            return Err(QrError::BadPair(pair.to_string()));
        };

        match *key {
            "t" => {
                ensure_vacant(&slots.date_time, key)?;
                slots.date_time = Some(parse_qr_timestamp(value)?);
            }
            "s" => {
                ensure_vacant(&slots.total_sum, key)?;
                let sum = value
                    .parse::<f32>()
                    .map_err(|_| QrError::BadSum(value.to_string()))?;
                slots.total_sum = Some(sum);
            }
            "fn" => {
                ensure_vacant(&slots.fiscal_drive_number, key)?;
                slots.fiscal_drive_number = Some(value.to_string());
            }
            "i" => {
                ensure_vacant(&slots.fiscal_document_number, key)?;
                slots.fiscal_document_number = Some(parse_integer(value, "fd")?);
            }
            "fp" => {
                ensure_vacant(&slots.fiscal_sign, key)?;
                slots.fiscal_sign = Some(parse_integer(value, "fpd")?);
            }
            "n" => {
                ensure_vacant(&slots.operation_type, key)?;
                slots.operation_type = Some(parse_integer(value, "opType")?);
            }
            other => return Err(QrError::UnexpectedKey(other.to_string())),
        }
    }

    Ok(ParsedQr {
        date_time: slots.date_time.ok_or(QrError::MissingKey("t"))?,
        total_sum: slots.total_sum.ok_or(QrError::MissingKey("s"))?,
        fiscal_drive_number: slots
            .fiscal_drive_number
            .ok_or(QrError::MissingKey("fn"))?,
        fiscal_document_number: slots
            .fiscal_document_number
            .ok_or(QrError::MissingKey("i"))?,
        fiscal_sign: slots.fiscal_sign.ok_or(QrError::MissingKey("fp"))?,
        operation_type: slots.operation_type.ok_or(QrError::MissingKey("n"))?,
    })
}

/// Parses a QR timestamp at minute or second precision.
///
/// Every field is fixed width; `20200115T211` is rejected rather than read
/// as 21:01.
pub fn parse_qr_timestamp(raw: &str) -> QrResult<DateTime<Utc>> {
    let format = if matches_mask(raw, QR_MINUTE_MASK) {
        QR_MINUTE_FORMAT
    } else if matches_mask(raw, QR_SECOND_MASK) {
        QR_SECOND_FORMAT
    } else {
        return Err(QrError::BadDate(raw.to_string()));
    };

    NaiveDateTime::parse_from_str(raw, format)
        .map(|naive| naive.and_utc())
        .map_err(|_| QrError::BadDate(raw.to_string()))
}

/// True when `raw` has exactly the shape of `mask`: `#` matches one ASCII
/// digit, any other byte matches itself.
pub(crate) fn matches_mask(raw: &str, mask: &str) -> bool {
    raw.len() == mask.len()
        && raw.bytes().zip(mask.bytes()).all(|(c, m)| match m {
            b'#' => c.is_ascii_digit(),
            _ => c == m,
        })
}

fn parse_integer(raw: &str, field: &'static str) -> QrResult<i64> {
    raw.parse::<i64>().map_err(|_| QrError::BadInteger {
        field,
        value: raw.to_string(),
    })
}

fn ensure_vacant<T>(slot: &Option<T>, key: &str) -> QrResult<()> {
    match slot {
        Some(_) => Err(QrError::DuplicateKey(key.to_string())),
        None => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

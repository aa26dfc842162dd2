//! # Kopecks Module
//!
//! Provides the `Kopecks` type for amounts as the remote service sends them.
//!
//! ## Minor vs Major Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE EACH UNIT LIVES                                                  │
//! │                                                                         │
//! │  Wire JSON (remote service)     Domain Receipt (callers)                │
//! │    "totalSum": 103000      ──►    total_sum: 1030.0                     │
//! │    integer kopecks                f32 rubles                            │
//! │                                                                         │
//! │  QR payload (s=1030.00)    ──►  existence check query (sum=103000)      │
//! │    f32 rubles                     integer kopecks                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The domain model keeps rubles at single precision. Rescaling is a plain
//! division by 100 with no rounding policy beyond native float division.
//!
//! ## Usage
//! ```rust
//! use fns_core::kopecks::Kopecks;
//!
//! let total = Kopecks::from_kopecks(103000);
//! assert_eq!(total.to_rubles(), 1030.0);
//!
//! let sum = Kopecks::from_rubles(1030.0);
//! assert_eq!(sum.kopecks(), 103000);
//! ```

use serde::{Deserialize, Serialize};

/// Number of kopecks in one ruble.
pub const KOPECKS_PER_RUBLE: i64 = 100;

// =============================================================================
// Kopecks Type
// =============================================================================

/// A monetary value in kopecks (the smallest ruble unit).
///
/// Deserializes directly from a JSON integer, which is how every monetary
/// field of the wire receipt is encoded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Kopecks(i64);

impl Kopecks {
    /// Creates a value from kopecks.
    #[inline]
    pub const fn from_kopecks(kopecks: i64) -> Self {
        Kopecks(kopecks)
    }

    /// Converts a ruble amount to kopecks, rounding to the nearest kopeck.
    ///
    /// ## Example
    /// ```rust
    /// use fns_core::kopecks::Kopecks;
    ///
    /// // 10.99 is not exact in f32; rounding recovers the intended kopecks
    /// assert_eq!(Kopecks::from_rubles(10.99).kopecks(), 1099);
    /// ```
    #[inline]
    pub fn from_rubles(rubles: f32) -> Self {
        Kopecks((rubles * KOPECKS_PER_RUBLE as f32).round() as i64)
    }

    /// Returns the raw kopeck count.
    #[inline]
    pub const fn kopecks(&self) -> i64 {
        self.0
    }

    /// Rescales to rubles at single precision.
    ///
    /// ## Example
    /// ```rust
    /// use fns_core::kopecks::Kopecks;
    ///
    /// assert_eq!(Kopecks::from_kopecks(62700).to_rubles(), 627.0);
    /// assert_eq!(Kopecks::from_kopecks(17166).to_rubles(), 171.66);
    /// ```
    #[inline]
    pub fn to_rubles(&self) -> f32 {
        self.0 as f32 / KOPECKS_PER_RUBLE as f32
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

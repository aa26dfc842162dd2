//! # fns-core: Pure Receipt Logic
//!
//! Everything needed to read a Russian fiscal receipt that does not touch
//! the network: the QR payload parser, the wire schema of the remote
//! service, and the projection from that schema onto a typed `Receipt`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   caller ──► qr::parse_qr ──► ParsedQr                                  │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                      fns-client (HTTP round trip)                       │
//! │                                  │ body                                 │
//! │                                  ▼                                      │
//! │              wire::WirePayload ──► receipt::project_receipt ──► Receipt │
//! │                                                                         │
//! │   ★ fns-core (THIS CRATE): NO I/O • NO NETWORK • PURE FUNCTIONS ★       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`qr`] - QR payload parser
//! - [`wire`] - JSON schema of the receipt fetch response
//! - [`receipt`] - Domain `Receipt` / `ReceiptItem` and the projection
//! - [`kopecks`] - Minor-unit amounts and rescaling to rubles
//! - [`error`] - Parse and projection errors
//!
//! ## Example Usage
//!
//! ```rust
//! use fns_core::parse_qr;
//!
//! let qr = parse_qr("t=20200115T2110&s=1030.00&fn=9251440300046840&i=29414&fp=1250830908&n=1")?;
//! assert_eq!(qr.operation_type, 1);
//! assert_eq!(qr.fiscal_sign, 1250830908);
//! # Ok::<(), fns_core::QrError>(())
//! ```

pub mod error;
pub mod kopecks;
pub mod qr;
pub mod receipt;
pub mod wire;

pub use error::{ProjectionError, ProjectionResult, QrError, QrResult};
pub use kopecks::Kopecks;
pub use qr::{parse_qr, ParsedQr};
pub use receipt::{project_receipt, Receipt, ReceiptItem};
pub use wire::WirePayload;

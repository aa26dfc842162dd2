//! # fns-client: Receipt-Check Service Client
//!
//! This crate performs the three remote operations of the Russian tax
//! service's receipt-check API. Parsing and projection live in `fns-core`.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Client Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      FnsClient<T: HttpTransport>                 │  │
//! │  │                                                                  │  │
//! │  │  register / check_receipt / get_receipt                          │  │
//! │  │  Builds the request, maps the status to a result                 │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ RequestContext │  │ HttpTransport  │  │   fns-core             │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Per-call       │  │ reqwest in     │  │ WirePayload decode and │    │
//! │  │ timeout and    │  │ production, a  │  │ project_receipt        │    │
//! │  │ cancellation   │  │ stub in tests  │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ClientConfig: base URL, timeouts, device headers (TOML + env)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`client`] - `FnsClient` and the three operations
//! - [`config`] - Client configuration
//! - [`context`] - Per-call timeout and cancellation
//! - [`error`] - Client error types
//! - [`transport`] - HTTP seam and the reqwest implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fns_client::{ClientConfig, FnsClient, RequestContext};
//! use fns_core::parse_qr;
//!
//! let config = ClientConfig::load_or_default(None);
//! let client = FnsClient::from_config(&config)?;
//! let ctx = RequestContext::new().with_timeout(Duration::from_secs(15));
//!
//! let qr = parse_qr(scanned)?;
//! client.check_qr(&ctx, &qr).await?;
//! let receipt = client.get_receipt_for_qr(&ctx, phone, password, &qr).await?;
//! println!("{} items, {} total", receipt.items.len(), receipt.total_sum);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod transport;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::FnsClient;
pub use config::{ClientConfig, DeviceSettings, ServiceSettings, DEFAULT_BASE_URL};
pub use context::RequestContext;
pub use error::{FnsError, FnsResult};
pub use transport::{BasicAuth, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

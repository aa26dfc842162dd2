//! # Receipt Service Client
//!
//! The three remote operations of the receipt-check service.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register       POST /v1/mobile/users/signup                           │
//! │                 204 → Ok   409 → UserAlreadyRegistered                 │
//! │                 other → BadEmail / BadPhone / UnexpectedResponse       │
//! │                                                                         │
//! │  check_receipt  GET /v1/ofds/*/inns/*/fss/{fn}/operations/{n}/tickets/{i}│
//! │                     ?fiscalSign&date&sum(kopecks)                      │
//! │                 204 → Ok   other → UnexpectedStatus                    │
//! │                                                                         │
//! │  get_receipt    GET /v1/inns/*/kkts/*/fss/{fn}/tickets/{i}             │
//! │                     ?fiscalSign&sendToEmail=no  + basic auth           │
//! │                 200 → decode → project → Receipt                        │
//! │                 other → UnexpectedStatus (body ignored)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each operation is one round trip with no retry. The client holds no
//! mutable state, so a single instance can be cloned into any number of
//! tasks.

use chrono::{DateTime, Utc};
use fns_core::{project_receipt, Kopecks, ParsedQr, Receipt, WirePayload};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ClientConfig, DeviceSettings};
use crate::context::RequestContext;
use crate::error::{FnsError, FnsResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

/// Layout of the `date` query parameter of the existence check.
const CHECK_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Signup rejection markers the service embeds in its error body.
const BAD_EMAIL_MARKER: &str = "bad_email";
const BAD_PHONE_MARKER: &str = "bad_phone";

#[derive(Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    name: &'a str,
    phone: &'a str,
}

// =============================================================================
// Client
// =============================================================================

/// Client for the receipt-check service, generic over its transport.
#[derive(Debug, Clone)]
pub struct FnsClient<T = ReqwestTransport> {
    base_url: Url,
    device: DeviceSettings,
    transport: T,
}

impl FnsClient<ReqwestTransport> {
    /// Builds a client that talks to the configured service over reqwest.
    pub fn from_config(config: &ClientConfig) -> FnsResult<Self> {
        let transport = ReqwestTransport::new(config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> FnsClient<T> {
    /// Builds a client over any transport.
    pub fn with_transport(config: &ClientConfig, transport: T) -> FnsResult<Self> {
        config.validate()?;

        Ok(Self {
            base_url: config.base_url()?,
            device: config.device.clone(),
            transport,
        })
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Signs a new user up; the service texts a password to `phone`.
    ///
    /// `UserAlreadyRegistered`, `BadEmail` and `BadPhone` are returned as
    /// errors but are outcomes the caller is expected to act on.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        email: &str,
        name: &str,
        phone: &str,
    ) -> FnsResult<()> {
        let url = self.endpoint(&["v1", "mobile", "users", "signup"])?;
        let request = HttpRequest::post_json(url, &SignupRequest { email, name, phone })?;

        let response = self.dispatch(ctx, "register", request).await?;

        match response.status {
            StatusCode::NO_CONTENT => {
                info!("User registered");
                Ok(())
            }
            StatusCode::CONFLICT => Err(FnsError::UserAlreadyRegistered),
            status => {
                let err = classify_signup_rejection(status.as_u16(), &response.body_text());
                warn!(status = status.as_u16(), error = %err, "Signup rejected");
                Err(err)
            }
        }
    }

    // =========================================================================
    // Existence Check
    // =========================================================================

    /// Confirms the service knows a receipt with these fields.
    ///
    /// Succeeds only on `204 No Content`. Any other status, including the
    /// service's "not found" codes, is `UnexpectedStatus`.
    #[allow(clippy::too_many_arguments)]
    pub async fn check_receipt(
        &self,
        ctx: &RequestContext,
        fiscal_drive_number: &str,
        operation_type: i64,
        fiscal_document_number: i64,
        fiscal_sign: i64,
        date_time: DateTime<Utc>,
        total_sum: f32,
    ) -> FnsResult<()> {
        let mut url = self.endpoint(&[
            "v1",
            "ofds",
            "*",
            "inns",
            "*",
            "fss",
            fiscal_drive_number,
            "operations",
            &operation_type.to_string(),
            "tickets",
            &fiscal_document_number.to_string(),
        ])?;

        url.query_pairs_mut()
            .append_pair("fiscalSign", &fiscal_sign.to_string())
            .append_pair("date", &date_time.format(CHECK_DATE_FORMAT).to_string())
            .append_pair("sum", &Kopecks::from_rubles(total_sum).kopecks().to_string());

        debug!(
            fiscal_drive = %fiscal_drive_number,
            fiscal_document = fiscal_document_number,
            "Checking receipt"
        );

        let response = self
            .dispatch(ctx, "check_receipt", HttpRequest::get(url))
            .await?;

        expect_status(&response, StatusCode::NO_CONTENT)
    }

    /// [`check_receipt`](Self::check_receipt) with the fields of a parsed QR code.
    pub async fn check_qr(&self, ctx: &RequestContext, qr: &ParsedQr) -> FnsResult<()> {
        self.check_receipt(
            ctx,
            &qr.fiscal_drive_number,
            qr.operation_type,
            qr.fiscal_document_number,
            qr.fiscal_sign,
            qr.date_time,
            qr.total_sum,
        )
        .await
    }

    // =========================================================================
    // Full Fetch
    // =========================================================================

    /// Fetches the full receipt using the end user's phone and password.
    ///
    /// The body is decoded only on `200 OK`; any other status is returned as
    /// `UnexpectedStatus` without reading it.
    pub async fn get_receipt(
        &self,
        ctx: &RequestContext,
        phone: &str,
        password: &str,
        fiscal_drive_number: &str,
        fiscal_document_number: i64,
        fiscal_sign: i64,
    ) -> FnsResult<Receipt> {
        let mut url = self.endpoint(&[
            "v1",
            "inns",
            "*",
            "kkts",
            "*",
            "fss",
            fiscal_drive_number,
            "tickets",
            &fiscal_document_number.to_string(),
        ])?;

        url.query_pairs_mut()
            .append_pair("fiscalSign", &fiscal_sign.to_string())
            .append_pair("sendToEmail", "no");

        let request = HttpRequest::get(url)
            .header("device-id", self.device.id.as_str())
            .header("device-os", self.device.os.as_str())
            .basic_auth(phone, password);

        debug!(
            fiscal_drive = %fiscal_drive_number,
            fiscal_document = fiscal_document_number,
            "Fetching receipt"
        );

        let response = self.dispatch(ctx, "get_receipt", request).await?;
        expect_status(&response, StatusCode::OK)?;

        let payload: WirePayload = serde_json::from_slice(&response.body)?;
        let receipt = project_receipt(payload)?;

        info!(
            fiscal_document = receipt.fiscal_document_number,
            items = receipt.items.len(),
            "Receipt fetched"
        );
        Ok(receipt)
    }

    /// [`get_receipt`](Self::get_receipt) with the fields of a parsed QR code.
    pub async fn get_receipt_for_qr(
        &self,
        ctx: &RequestContext,
        phone: &str,
        password: &str,
        qr: &ParsedQr,
    ) -> FnsResult<Receipt> {
        self.get_receipt(
            ctx,
            phone,
            password,
            &qr.fiscal_drive_number,
            qr.fiscal_document_number,
            qr.fiscal_sign,
        )
        .await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> FnsResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FnsError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn dispatch(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        request: HttpRequest,
    ) -> FnsResult<HttpResponse> {
        debug!(
            operation,
            method = %request.method,
            path = request.url.path(),
            "Sending request"
        );

        let response = ctx.run(self.transport.send(request)).await?;

        debug!(operation, status = response.status.as_u16(), "Received response");
        Ok(response)
    }
}

// =============================================================================
// Status Mapping
// =============================================================================

fn expect_status(response: &HttpResponse, expected: StatusCode) -> FnsResult<()> {
    if response.status == expected {
        return Ok(());
    }

    warn!(
        status = response.status.as_u16(),
        expected = expected.as_u16(),
        "Unexpected status"
    );
    Err(FnsError::UnexpectedStatus(response.status.as_u16()))
}

/// Maps a failed signup to an error kind by scanning the body for the
/// service's rejection markers. `bad_email` is checked before `bad_phone`.
pub(crate) fn classify_signup_rejection(status: u16, body: &str) -> FnsError {
    if body.contains(BAD_EMAIL_MARKER) {
        FnsError::BadEmail
    } else if body.contains(BAD_PHONE_MARKER) {
        FnsError::BadPhone
    } else {
        FnsError::UnexpectedResponse {
            status,
            body: body.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

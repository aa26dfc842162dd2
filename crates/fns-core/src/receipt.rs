//! # Receipt Types
//!
//! The domain `Receipt` and its projection from the wire payload.
//!
//! ## Projection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      WirePayload → Receipt                              │
//! │                                                                         │
//! │  document.receipt.dateTime "2020-01-15T21:10:00" ──► DateTime<Utc>     │
//! │  document.receipt.totalSum 103000 (kopecks)      ──► 1030.0 (rubles)   │
//! │  document.receipt.items[i].sum 62700             ──► items[i].sum 627.0│
//! │  identifiers, codes, counters, INNs, rawData     ──► unchanged         │
//! │                                                                         │
//! │  Items map one-to-one, same order, no filtering.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, ProjectionResult};
use crate::qr::matches_mask;
use crate::wire::{WireItem, WirePayload, WireReceipt};

/// Layout of `document.receipt.dateTime`.
const RECEIPT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const RECEIPT_DATE_MASK: &str = "####-##-##T##:##:##";

// =============================================================================
// Receipt Item
// =============================================================================

/// One line of a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    /// Calculation subject sign (goods, service, ...), as coded by the register.
    pub calculation_subject_sign: i64,

    pub quantity: i64,

    /// VAT rate code.
    pub nds_rate: i64,

    /// VAT amount in rubles.
    pub nds_sum: f32,

    pub name: String,

    /// Line total in rubles.
    pub sum: f32,

    /// Unit price in rubles.
    pub price: f32,
}

impl From<WireItem> for ReceiptItem {
    fn from(item: WireItem) -> Self {
        ReceiptItem {
            calculation_subject_sign: item.calculation_subject_sign,
            quantity: item.quantity,
            nds_rate: item.nds_rate,
            nds_sum: item.nds_sum.to_rubles(),
            name: item.name,
            sum: item.sum.to_rubles(),
            price: item.price.to_rubles(),
        }
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// A full fiscal document as returned by the receipt fetch.
///
/// Built once by [`project_receipt`]; all sums are rubles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    // -------------------------------------------------------------------------
    // Identification
    // -------------------------------------------------------------------------
    pub fiscal_drive_number: String,
    pub fiscal_document_number: i64,
    pub fiscal_sign: i64,

    /// INN of the cashier, often blank-padded.
    pub operator_inn: String,

    /// INN of the seller.
    pub user_inn: String,

    /// Registration id of the cash register (KKT).
    pub kkt_reg_id: String,

    // -------------------------------------------------------------------------
    // Classification
    // -------------------------------------------------------------------------
    pub taxation_type: i64,

    /// `receiptCode` on the wire.
    pub code: i64,

    pub operation_type: i64,
    pub protocol_version: i64,

    // -------------------------------------------------------------------------
    // Sums (rubles)
    // -------------------------------------------------------------------------
    pub cash_total_sum: f32,
    pub ecash_total_sum: f32,
    pub prepayment_sum: f32,
    pub postpayment_sum: f32,
    pub counter_submission_sum: f32,

    /// VAT total at the 18% rate.
    pub nds18: f32,

    pub total_sum: f32,

    // -------------------------------------------------------------------------
    // Everything else
    // -------------------------------------------------------------------------
    pub date_time: DateTime<Utc>,
    pub raw_data: String,
    pub shift_number: i64,
    pub request_number: i64,

    /// Cashier name as printed.
    pub operator: String,

    pub items: Vec<ReceiptItem>,
}

impl Receipt {
    /// Sum of item line totals, in rubles.
    pub fn items_total(&self) -> f32 {
        self.items.iter().map(|item| item.sum).sum()
    }
}

impl TryFrom<WirePayload> for Receipt {
    type Error = ProjectionError;

    fn try_from(payload: WirePayload) -> Result<Self, Self::Error> {
        project_receipt(payload)
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Projects a decoded wire payload onto the domain model.
///
/// The timestamp is the single failure mode; every sum is divided by 100.
pub fn project_receipt(payload: WirePayload) -> ProjectionResult<Receipt> {
    let wire: WireReceipt = payload.document.receipt;
    let date_time = parse_receipt_timestamp(&wire.date_time)?;

    Ok(Receipt {
        fiscal_drive_number: wire.fiscal_drive_number,
        fiscal_document_number: wire.fiscal_document_number,
        fiscal_sign: wire.fiscal_sign,
        operator_inn: wire.operator_inn,
        user_inn: wire.user_inn,
        kkt_reg_id: wire.kkt_reg_id,
        taxation_type: wire.taxation_type,
        code: wire.receipt_code,
        operation_type: wire.operation_type,
        protocol_version: wire.protocol_version,
        cash_total_sum: wire.cash_total_sum.to_rubles(),
        ecash_total_sum: wire.ecash_total_sum.to_rubles(),
        prepayment_sum: wire.prepayment_sum.to_rubles(),
        postpayment_sum: wire.postpayment_sum.to_rubles(),
        counter_submission_sum: wire.counter_submission_sum.to_rubles(),
        nds18: wire.nds18.to_rubles(),
        total_sum: wire.total_sum.to_rubles(),
        date_time,
        raw_data: wire.raw_data,
        shift_number: wire.shift_number,
        request_number: wire.request_number,
        operator: wire.operator,
        items: wire.items.into_iter().map(ReceiptItem::from).collect(),
    })
}

/// Parses `document.receipt.dateTime`. No offset is carried; read as UTC.
pub fn parse_receipt_timestamp(raw: &str) -> ProjectionResult<DateTime<Utc>> {
    if !matches_mask(raw, RECEIPT_DATE_MASK) {
        return Err(ProjectionError::BadDate(raw.to_string()));
    }

    NaiveDateTime::parse_from_str(raw, RECEIPT_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ProjectionError::BadDate(raw.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE_BODY: &str = r#"{
        "document": {
            "receipt": {
                "prepaymentSum": 0,
                "fiscalDocumentNumber": 29414,
                "counterSubmissionSum": 0,
                "taxationType": 1,
                "receiptCode": 3,
                "fiscalDriveNumber": "9251440300046840",
                "rawData": "AwBGAA==",
                "items": [
                    {
                        "calculationSubjectSign": 1,
                        "quantity": 1,
                        "ndsRate": 1,
                        "ndsSum": 10450,
                        "name": "Ролик для пресса",
                        "sum": 62700,
                        "price": 62700
                    },
                    {
                        "calculationSubjectSign": 1,
                        "quantity": 2,
                        "ndsRate": 1,
                        "ndsSum": 3358,
                        "name": "Скакалка",
                        "sum": 20150,
                        "price": 10075
                    },
                    {
                        "calculationSubjectSign": 4,
                        "quantity": 1,
                        "ndsRate": 6,
                        "ndsSum": 0,
                        "name": "Доставка",
                        "sum": 20150,
                        "price": 20150
                    }
                ],
                "nds18": 17166,
                "fiscalSign": 1250830908,
                "operator": "КАССИР: Вербицкая Анаст",
                "operationType": 1,
                "requestNumber": 93,
                "postpaymentSum": 0,
                "shiftNumber": 179,
                "operatorInn": "            ",
                "ecashTotalSum": 103000,
                "protocolVersion": 2,
                "dateTime": "2020-01-15T21:10:00",
                "totalSum": 103000,
                "userInn": "7703380158",
                "kktRegId": "0001234567012345",
                "cashTotalSum": 0
            }
        }
    }"#;

    fn sample_payload() -> WirePayload {
        serde_json::from_str(SAMPLE_BODY).unwrap()
    }

    #[test]
    fn test_projects_sample_receipt() {
        let receipt = project_receipt(sample_payload()).unwrap();

        assert_eq!(receipt.prepayment_sum, 0.0);
        assert_eq!(receipt.fiscal_document_number, 29414);
        assert_eq!(receipt.counter_submission_sum, 0.0);
        assert_eq!(receipt.taxation_type, 1);
        assert_eq!(receipt.code, 3);
        assert_eq!(receipt.fiscal_drive_number, "9251440300046840");
        assert_eq!(receipt.nds18, 171.66);
        assert_eq!(receipt.fiscal_sign, 1250830908);
        assert_eq!(receipt.operator, "КАССИР: Вербицкая Анаст");
        assert_eq!(receipt.operation_type, 1);
        assert_eq!(receipt.request_number, 93);
        assert_eq!(receipt.postpayment_sum, 0.0);
        assert_eq!(receipt.shift_number, 179);
        assert_eq!(receipt.operator_inn, "            ");
        assert_eq!(receipt.ecash_total_sum, 1030.0);
        assert_eq!(receipt.protocol_version, 2);
        assert_eq!(
            receipt.date_time,
            Utc.with_ymd_and_hms(2020, 1, 15, 21, 10, 0).unwrap()
        );
        assert_eq!(receipt.total_sum, 1030.0);
        assert_eq!(receipt.user_inn, "7703380158");
        assert_eq!(receipt.kkt_reg_id, "0001234567012345");
        assert_eq!(receipt.raw_data, "AwBGAA==");
        assert_eq!(receipt.cash_total_sum, 0.0);
    }

    #[test]
    fn test_items_keep_length_and_order() {
        let receipt = project_receipt(sample_payload()).unwrap();

        assert_eq!(receipt.items.len(), 3);
        let names: Vec<&str> = receipt.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Ролик для пресса", "Скакалка", "Доставка"]);

        let first = &receipt.items[0];
        assert_eq!(first.calculation_subject_sign, 1);
        assert_eq!(first.quantity, 1);
        assert_eq!(first.nds_rate, 1);
        assert_eq!(first.nds_sum, 104.50);
        assert_eq!(first.sum, 627.0);
        assert_eq!(first.price, 627.0);

        assert_eq!(receipt.items[1].price, 100.75);
        assert_eq!(receipt.items_total(), 1030.0);
    }

    #[test]
    fn test_bad_date_is_the_only_failure() {
        let mut payload = WirePayload::default();
        payload.document.receipt.date_time = "bad_date".to_string();

        let err = project_receipt(payload).unwrap_err();
        assert_eq!(err.to_string(), "bad date bad_date");
    }

    #[test]
    fn test_short_timestamp_fields_are_rejected() {
        for raw in [
            "2020-1-5T1:2:3",
            "2020-01-15 21:10:00",
            "2020-01-15T21:10",
            "2020-01-15T21:10:00Z",
        ] {
            assert_eq!(
                parse_receipt_timestamp(raw),
                Err(ProjectionError::BadDate(raw.to_string()))
            );
        }
        assert!(parse_receipt_timestamp("2020-01-15T21:10:00").is_ok());
    }

    #[test]
    fn test_empty_date_fails() {
        let err = Receipt::try_from(WirePayload::default()).unwrap_err();
        assert_eq!(err, ProjectionError::BadDate(String::new()));
    }

    #[test]
    fn test_receipt_serializes_to_json() {
        let receipt = project_receipt(sample_payload()).unwrap();
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["total_sum"], 1030.0);
        assert_eq!(json["items"].as_array().unwrap().len(), 3);
    }
}

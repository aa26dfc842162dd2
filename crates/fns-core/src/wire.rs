//! # Wire Schema
//!
//! The JSON body returned by the full receipt fetch, exactly as the remote
//! service shapes it: `document.receipt.*`, camelCase keys, amounts in
//! kopecks and the timestamp as a string.
//!
//! The service omits zero sums and absent identifiers, so every receipt
//! field falls back to its zero value. Unknown keys are ignored.

use serde::Deserialize;

use crate::kopecks::Kopecks;

/// Top-level response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WirePayload {
    pub document: WireDocument,
}

/// The `document` envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireDocument {
    pub receipt: WireReceipt,
}

/// `document.receipt`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireReceipt {
    pub prepayment_sum: Kopecks,
    pub fiscal_document_number: i64,
    pub counter_submission_sum: Kopecks,
    pub taxation_type: i64,
    pub receipt_code: i64,
    pub fiscal_drive_number: String,
    pub raw_data: String,
    pub items: Vec<WireItem>,
    pub nds18: Kopecks,
    pub fiscal_sign: i64,
    pub operator: String,
    pub operation_type: i64,
    pub request_number: i64,
    pub postpayment_sum: Kopecks,
    pub shift_number: i64,
    pub operator_inn: String,
    pub ecash_total_sum: Kopecks,
    pub protocol_version: i64,
    /// `YYYY-MM-DDTHH:mm:ss`, no offset.
    pub date_time: String,
    pub total_sum: Kopecks,
    pub user_inn: String,
    pub kkt_reg_id: String,
    pub cash_total_sum: Kopecks,
}

/// One entry of `document.receipt.items`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireItem {
    pub calculation_subject_sign: i64,
    pub quantity: i64,
    pub nds_rate: i64,
    pub nds_sum: Kopecks,
    pub name: String,
    pub sum: Kopecks,
    pub price: Kopecks,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_zero() {
        let payload: WirePayload = serde_json::from_str(
            r#"{"document":{"receipt":{"totalSum":103000,"dateTime":"2020-01-15T21:10:00","extra":true}}}"#,
        )
        .unwrap();

        let receipt = payload.document.receipt;
        assert_eq!(receipt.total_sum.kopecks(), 103000);
        assert_eq!(receipt.cash_total_sum.kopecks(), 0);
        assert!(receipt.operator_inn.is_empty());
        assert!(receipt.items.is_empty());
    }

    #[test]
    fn test_kkt_reg_id_key() {
        let receipt: WireReceipt =
            serde_json::from_str(r#"{"kktRegId":"0001234567012345","nds18":17166}"#).unwrap();
        assert_eq!(receipt.kkt_reg_id, "0001234567012345");
        assert_eq!(receipt.nds18.kopecks(), 17166);
    }
}

//! ISO 20022 payload construction for the submission gateway.
//!
//! The gateway accepts a simplified transaction request and expands it into
//! the pacs.008.001.10 (credit transfer) and pacs.002.001.12 (payment
//! status) messages the evaluation service expects. The two messages share
//! one `EndToEndId` so the pipeline links them to a single transaction.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Simplified, human-friendly submission body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SimpleTransactionRequest {
    /// Member ID of the debtor (sender).
    pub debtor_member: String,
    /// Member ID of the creditor (receiver).
    pub creditor_member: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// ACCC (accepted) or RJCT (rejected).
    #[serde(default = "default_status")]
    pub status: String,
    pub tenant_id: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_status() -> String {
    "ACCC".to_string()
}

impl SimpleTransactionRequest {
    pub fn resolved_tenant(&self, fallback: &str) -> String {
        self.tenant_id.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// A fully built wire message plus its extracted message id.
#[derive(Debug, Clone)]
pub struct BuiltMessage {
    pub msg_id: String,
    pub payload: Value,
}

fn now_iso_millis() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn member(id: &str) -> Value {
    json!({ "FinInstnId": { "ClrSysMmbId": { "MmbId": id } } })
}

/// Build the pacs.008 credit transfer that seeds debtor/creditor entities.
pub fn build_pacs008(req: &SimpleTransactionRequest, end_to_end_id: &str) -> BuiltMessage {
    let msg_id = Uuid::new_v4().simple().to_string();
    let now = now_iso_millis();
    let payload = json!({
        "TxTp": "pacs.008.001.10",
        "FIToFICstmrCdtTrf": {
            "GrpHdr": {
                "MsgId": msg_id,
                "CreDtTm": now,
                "NbOfTxs": 1,
                "SttlmInf": { "SttlmMtd": "CLRG" },
            },
            "CdtTrfTxInf": {
                "PmtId": {
                    "InstrId": Uuid::new_v4().simple().to_string(),
                    "EndToEndId": end_to_end_id,
                },
                "IntrBkSttlmAmt": {
                    "Amt": { "Amt": req.amount, "Ccy": req.currency },
                },
                "InstdAmt": {
                    "Amt": { "Amt": req.amount, "Ccy": req.currency },
                },
                "ChrgBr": "DEBT",
                "InitgPty": { "Nm": req.debtor_member },
                "Dbtr": { "Nm": req.debtor_member },
                "DbtrAcct": {
                    "Id": { "Othr": { "Id": req.debtor_member, "SchmeNm": { "Prtry": "MSISDN" } } },
                },
                "DbtrAgt": member(&req.debtor_member),
                "Cdtr": { "Nm": req.creditor_member },
                "CdtrAcct": {
                    "Id": { "Othr": { "Id": req.creditor_member, "SchmeNm": { "Prtry": "MSISDN" } } },
                },
                "CdtrAgt": member(&req.creditor_member),
            },
        },
    });
    BuiltMessage { msg_id, payload }
}

/// Build the pacs.002 payment status that triggers evaluation.
pub fn build_pacs002(req: &SimpleTransactionRequest, end_to_end_id: &str) -> BuiltMessage {
    let msg_id = Uuid::new_v4().simple().to_string();
    let now = now_iso_millis();
    let payload = json!({
        "TxTp": "pacs.002.001.12",
        "FIToFIPmtSts": {
            "GrpHdr": {
                "MsgId": msg_id,
                "CreDtTm": now,
            },
            "TxInfAndSts": {
                "OrgnlInstrId": Uuid::new_v4().simple().to_string(),
                "OrgnlEndToEndId": end_to_end_id,
                "TxSts": req.status,
                "ChrgsInf": [
                    {
                        "Amt": { "Amt": req.amount, "Ccy": req.currency },
                        "Agt": member(&req.debtor_member),
                    },
                    {
                        "Amt": { "Amt": 0, "Ccy": req.currency },
                        "Agt": member(&req.debtor_member),
                    },
                    {
                        "Amt": { "Amt": 0, "Ccy": req.currency },
                        "Agt": member(&req.creditor_member),
                    },
                ],
                "AccptncDtTm": now,
                "InstgAgt": member(&req.debtor_member),
                "InstdAgt": member(&req.creditor_member),
            },
        },
    });
    BuiltMessage { msg_id, payload }
}

/// Extract the GrpHdr MsgId from a raw pacs.002 payload, if present.
pub fn pacs002_msg_id(payload: &Value) -> Option<&str> {
    payload
        .get("FIToFIPmtSts")?
        .get("GrpHdr")?
        .get("MsgId")?
        .as_str()
}

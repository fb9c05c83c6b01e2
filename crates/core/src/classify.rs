//! Evaluation classification and breakdown views.
//!
//! Turns one raw evaluation record (arbitrary nested JSON from the result
//! store) into the alert/clean label plus per-typology and per-rule views
//! used by the investigation screen. Pure functions, no side effects.

use serde::Serialize;
use serde_json::Value;

/// Wire tag for a flagged evaluation.
pub const STATUS_ALERT: &str = "ALRT";
/// Wire tag for a clean evaluation.
pub const STATUS_CLEAN: &str = "NALT";

// ── View types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Alert,
    Clean,
}

/// One rule's contribution inside a typology.
#[derive(Debug, Clone, Serialize)]
pub struct RuleView {
    pub id: String,
    pub cfg: String,
    pub sub_rule_ref: String,
    pub reason: String,
    /// Raw weight value — rendered as-is when not numeric.
    pub weight: Value,
    /// Numeric weight > 0. Presentation-only risk coloring, not a
    /// scoring decision.
    pub risk_positive: bool,
}

/// One typology's scoring pass.
#[derive(Debug, Clone, Serialize)]
pub struct TypologyView {
    pub id: String,
    pub cfg: String,
    pub score: f64,
    pub alert_threshold: Option<f64>,
    pub interdiction_threshold: Option<f64>,
    pub is_alert: bool,
    pub rules: Vec<RuleView>,
}

/// Classified evaluation ready for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub label: Label,
    /// Raw wire status tag, preserved even when unrecognized.
    pub status: String,
    pub typology_count: usize,
    pub breakdown: Vec<TypologyView>,
}

// ── Classification ────────────────────────────────────────────────

/// Classify one evaluation record.
///
/// Accepts both the full stored evaluation (`{ report: { status, tadpResult:
/// { typologyResult } } }`) and the flattened list-row shape (top-level
/// `status` + `typology_results`). A record missing the expected wrappers
/// yields an empty breakdown rather than an error — one bad row must not
/// take down the page.
pub fn classify(record: &Value) -> Classification {
    let report = record.get("report").filter(|r| r.is_object());

    let status = report
        .and_then(|r| r.get("status"))
        .or_else(|| record.get("status"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let typologies = report
        .and_then(|r| r.get("tadpResult"))
        .and_then(|t| t.get("typologyResult"))
        .or_else(|| record.get("typologyResults"))
        .or_else(|| record.get("typology_results"));

    let normalized = typologies.map(normalize_typologies).unwrap_or_default();

    let breakdown: Vec<TypologyView> = normalized.iter().map(typology_view).collect();

    Classification {
        // Anything other than ALRT surfaces on the clean side; unknown tags
        // are never a third user-visible state.
        label: if status == STATUS_ALERT {
            Label::Alert
        } else {
            Label::Clean
        },
        status,
        typology_count: breakdown.len(),
        breakdown,
    }
}

/// Normalize `typologyResults` into a uniform ordered list.
///
/// Upstream producers emit either a JSON array or a keyed object for the
/// same logical field; both count the same way. Done once here so nothing
/// downstream branches on shape.
pub fn normalize_typologies(raw: &Value) -> Vec<Value> {
    match raw {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map.values().cloned().collect(),
        _ => Vec::new(),
    }
}

/// Count typologies in either wire shape without normalizing.
pub fn typology_count(raw: &Value) -> usize {
    match raw {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 0,
    }
}

/// The single authoritative alert rule for a typology: score at or above
/// the alert threshold when one is present (ties alert), otherwise any
/// positive score.
pub fn typology_is_alert(score: f64, alert_threshold: Option<f64>) -> bool {
    match alert_threshold {
        Some(t) => score >= t,
        None => score > 0.0,
    }
}

fn typology_view(t: &Value) -> TypologyView {
    let id = str_field(t, "id");
    let cfg = {
        let c = str_field(t, "cfg");
        // id and cfg may coincide; an absent cfg falls back to id.
        if c.is_empty() { id.clone() } else { c }
    };
    let score = num_field(t, "result").unwrap_or(0.0);

    let workflow = t.get("workflow");
    let alert_threshold = workflow.and_then(|w| num_field(w, "alertThreshold"));
    let interdiction_threshold = workflow.and_then(|w| num_field(w, "interdictionThreshold"));

    let rules = t
        .get("ruleResults")
        .and_then(Value::as_array)
        .map(|rs| rs.iter().map(rule_view).collect())
        .unwrap_or_default();

    TypologyView {
        id,
        cfg,
        score,
        alert_threshold,
        interdiction_threshold,
        is_alert: typology_is_alert(score, alert_threshold),
        rules,
    }
}

fn rule_view(r: &Value) -> RuleView {
    // Weight may arrive under either name; prefer `result`.
    let weight = r
        .get("result")
        .or_else(|| r.get("wght"))
        .cloned()
        .unwrap_or(Value::Null);
    let risk_positive = as_number(&weight).map(|w| w > 0.0).unwrap_or(false);

    RuleView {
        id: str_field(r, "id"),
        cfg: str_field(r, "cfg"),
        sub_rule_ref: str_field(r, "subRuleRef"),
        reason: str_field(r, "reason"),
        weight,
        risk_positive,
    }
}

// ── Field helpers ─────────────────────────────────────────────────

fn str_field(v: &Value, key: &str) -> String {
    match v.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn num_field(v: &Value, key: &str) -> Option<f64> {
    v.get(key).and_then(as_number)
}

/// Numeric coercion: JSON numbers directly, numeric strings parsed.
/// Anything else is non-numeric and stays as-is for rendering.
fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_with_typologies(status: &str, typologies: Value) -> Value {
        json!({
            "transactionID": "tx-1",
            "report": {
                "status": status,
                "evaluationID": "ev-1",
                "timestamp": "2025-01-01T00:00:00.000Z",
                "tadpResult": { "prcgTm": 1234567, "typologyResult": typologies },
            }
        })
    }

    #[test]
    fn alert_status_classifies_as_alert() {
        let c = classify(&record_with_typologies("ALRT", json!([])));
        assert_eq!(c.label, Label::Alert);
        assert_eq!(c.status, "ALRT");
    }

    #[test]
    fn clean_status_classifies_as_clean() {
        let c = classify(&record_with_typologies("NALT", json!([])));
        assert_eq!(c.label, Label::Clean);
    }

    #[test]
    fn unknown_status_is_not_a_third_state() {
        let c = classify(&record_with_typologies("WHAT", json!([])));
        assert_eq!(c.label, Label::Clean);
        assert_eq!(c.status, "WHAT");
    }

    #[test]
    fn empty_typologies_classify_from_top_level_status() {
        // Flattened list-row shape: no report wrapper at all.
        let row = json!({ "status": "ALRT", "typology_results": [] });
        let c = classify(&row);
        assert_eq!(c.label, Label::Alert);
        assert_eq!(c.typology_count, 0);
        assert!(c.breakdown.is_empty());
    }

    #[test]
    fn malformed_record_yields_empty_breakdown() {
        let c = classify(&json!({ "unexpected": true }));
        assert_eq!(c.label, Label::Clean);
        assert_eq!(c.typology_count, 0);
        assert!(c.breakdown.is_empty());
    }

    #[test]
    fn typology_count_same_for_list_and_map() {
        let list = json!([{ "id": "a" }, { "id": "b" }, { "id": "c" }]);
        let map = json!({ "a": { "id": "a" }, "b": { "id": "b" }, "c": { "id": "c" } });
        assert_eq!(typology_count(&list), 3);
        assert_eq!(typology_count(&map), 3);

        let from_list = classify(&record_with_typologies("NALT", list));
        let from_map = classify(&record_with_typologies("NALT", map));
        assert_eq!(from_list.typology_count, from_map.typology_count);
    }

    #[test]
    fn threshold_tie_counts_as_alert() {
        assert!(typology_is_alert(300.0, Some(300.0)));
    }

    #[test]
    fn below_threshold_is_not_alert() {
        assert!(!typology_is_alert(299.999, Some(300.0)));
    }

    #[test]
    fn no_threshold_falls_back_to_positive_score() {
        assert!(typology_is_alert(0.1, None));
        assert!(!typology_is_alert(0.0, None));
        assert!(!typology_is_alert(-5.0, None));
    }

    #[test]
    fn typology_view_applies_threshold_rule() {
        let c = classify(&record_with_typologies(
            "ALRT",
            json!([{
                "id": "typology-001",
                "cfg": "typology-001@1.0.0",
                "result": 400.0,
                "workflow": { "alertThreshold": 400.0, "interdictionThreshold": 600.0 },
                "ruleResults": [],
            }]),
        ));
        assert_eq!(c.breakdown.len(), 1);
        let t = &c.breakdown[0];
        assert!(t.is_alert);
        assert_eq!(t.alert_threshold, Some(400.0));
        assert_eq!(t.interdiction_threshold, Some(600.0));
    }

    #[test]
    fn string_thresholds_are_coerced() {
        let c = classify(&record_with_typologies(
            "ALRT",
            json!([{
                "id": "t", "result": "500",
                "workflow": { "alertThreshold": "400" },
            }]),
        ));
        assert!(c.breakdown[0].is_alert);
        assert_eq!(c.breakdown[0].score, 500.0);
    }

    #[test]
    fn rule_weight_prefers_result_over_wght() {
        let c = classify(&record_with_typologies(
            "ALRT",
            json!([{
                "id": "t", "result": 100,
                "ruleResults": [
                    { "id": "rule-001", "result": 100, "wght": 0, "subRuleRef": ".01", "reason": "matched" },
                    { "id": "rule-002", "wght": -50, "reason": "benign band" },
                ],
            }]),
        ));
        let rules = &c.breakdown[0].rules;
        assert_eq!(rules[0].weight, serde_json::json!(100));
        assert!(rules[0].risk_positive);
        assert_eq!(rules[1].weight, serde_json::json!(-50));
        assert!(!rules[1].risk_positive);
    }

    #[test]
    fn non_numeric_weight_renders_as_is_without_failing() {
        let c = classify(&record_with_typologies(
            "NALT",
            json!([{
                "id": "t", "result": 0,
                "ruleResults": [{ "id": "r", "result": "n/a", "reason": "no data" }],
            }]),
        ));
        let r = &c.breakdown[0].rules[0];
        assert_eq!(r.weight, serde_json::json!("n/a"));
        assert!(!r.risk_positive);
    }

    #[test]
    fn missing_cfg_falls_back_to_id() {
        let c = classify(&record_with_typologies(
            "NALT",
            json!([{ "id": "typology-042", "result": 0 }]),
        ));
        assert_eq!(c.breakdown[0].cfg, "typology-042");
    }
}

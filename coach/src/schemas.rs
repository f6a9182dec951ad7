//! Coaching endpoint schemas
//!
//! Declarative schemas for both directions of the pipeline: inbound
//! request bodies, and the two model-output shapes. Model output is
//! never trusted until it passes the schema here, whichever path
//! (real or demo) produced it.

use caseguard_core::incident::{RiskLevel, Severity};
use caseguard_core::schema::{FieldSchema, Schema, Violation};
use serde_json::Value;

fn basics_schema() -> Schema {
    Schema::new()
        .field("what_happened", FieldSchema::string().min_length(1))
        .field(
            "involved_parties",
            FieldSchema::array(FieldSchema::string().min_length(1)).min_length(1),
        )
        .field("location", FieldSchema::string().min_length(1))
        .field("datetime", FieldSchema::string().min_length(1))
        .optional_field(
            "attachments",
            FieldSchema::array(FieldSchema::object(
                Schema::new()
                    .field("name", FieldSchema::string().min_length(1))
                    .optional_field("url", FieldSchema::string()),
            )),
        )
}

fn qa_schema() -> FieldSchema {
    FieldSchema::object(
        Schema::new()
            .field("question", FieldSchema::string())
            .field("answer", FieldSchema::string()),
    )
}

/// Body schema for `POST /api/coach/next-questions`
pub fn next_questions_request_schema() -> Schema {
    Schema::new()
        .field("basics", FieldSchema::object(basics_schema()))
        .optional_field("history", FieldSchema::array(qa_schema()))
}

/// Body schema for `POST /api/coach/final-report`
pub fn final_report_request_schema() -> Schema {
    Schema::new()
        .field("basics", FieldSchema::object(basics_schema()))
        .optional_field("qa", FieldSchema::array(qa_schema()))
}

/// Output schema for the follow-up-questions call
pub fn questions_response_schema() -> Schema {
    Schema::new()
        .field(
            "questions",
            FieldSchema::array(FieldSchema::string().min_length(1))
                .min_length(6)
                .max_length(12),
        )
        .field("rationale", FieldSchema::string().min_length(1))
}

fn violation_schema() -> FieldSchema {
    FieldSchema::object(
        Schema::new()
            .field("policy", FieldSchema::string().min_length(1))
            .field("policy_text", FieldSchema::string().min_length(1))
            .field("violation_reason", FieldSchema::string().min_length(1))
            .field("supporting_facts", FieldSchema::array(FieldSchema::string()))
            .field(
                "severity",
                FieldSchema::string().one_of(&Severity::VALUES),
            )
            .field(
                "recommended_remediation",
                FieldSchema::array(FieldSchema::string()),
            )
            .field(
                "confidence",
                FieldSchema::number().minimum(0.0).maximum(1.0),
            ),
    )
}

/// Every name in `involved_parties` must have a personalized message
fn personalized_messages_cover_parties(value: &Value, _path: &str) -> Vec<Violation> {
    let parties = match value.get("involved_parties").and_then(|v| v.as_array()) {
        Some(parties) => parties,
        None => return Vec::new(), // missing field reported by the field schema
    };
    let messages = value.get("personalized_messages").and_then(|v| v.as_object());

    parties
        .iter()
        .filter_map(|p| p.as_str())
        .filter(|name| !messages.map(|m| m.contains_key(*name)).unwrap_or(false))
        .map(|name| {
            Violation::new(
                format!("personalized_messages.{}", name),
                "missing message for involved party",
            )
        })
        .collect()
}

/// Output schema for the final-report call
pub fn incident_report_schema() -> Schema {
    let risk_level = || FieldSchema::string().one_of(&RiskLevel::VALUES);

    Schema::new()
        .field(
            "incident_score",
            FieldSchema::object(
                Schema::new()
                    .field(
                        "factors",
                        FieldSchema::array(FieldSchema::object(
                            Schema::new()
                                .field("factor", FieldSchema::string().min_length(1))
                                .field("weight", FieldSchema::number().minimum(0.0).maximum(1.0))
                                .field("score", FieldSchema::number().minimum(0.0).maximum(10.0)),
                        ))
                        .min_length(1),
                    )
                    .field("total", FieldSchema::number().minimum(0.0))
                    .field("risk_level", risk_level()),
            ),
        )
        .field(
            "general_information",
            FieldSchema::object(
                Schema::new()
                    .field("report_date", FieldSchema::string().min_length(1))
                    .field("location", FieldSchema::string().min_length(1))
                    .field("incident_datetime", FieldSchema::string().min_length(1))
                    .field("reported_by", FieldSchema::string().min_length(1)),
            ),
        )
        .field(
            "parties_involved",
            FieldSchema::object(
                Schema::new()
                    .field("reporters", FieldSchema::array(FieldSchema::string()))
                    .field("accused", FieldSchema::array(FieldSchema::string()))
                    .field("witnesses", FieldSchema::array(FieldSchema::string())),
            ),
        )
        .field(
            "incident_details",
            FieldSchema::object(
                Schema::new()
                    .field("description", FieldSchema::string().min_length(1))
                    .field("category", FieldSchema::string().min_length(1))
                    .field("timeline", FieldSchema::array(FieldSchema::string())),
            ),
        )
        .field(
            "impact_consequences",
            FieldSchema::object(
                Schema::new()
                    .field("impact_summary", FieldSchema::string().min_length(1))
                    .field(
                        "affected_individuals",
                        FieldSchema::array(FieldSchema::string()),
                    )
                    .field("business_impact", FieldSchema::string().min_length(1)),
            ),
        )
        .field(
            "policy_cross_check",
            FieldSchema::object(
                Schema::new()
                    .field(
                        "policies_reviewed",
                        FieldSchema::array(FieldSchema::string()),
                    )
                    .field("violations", FieldSchema::array(violation_schema())),
            ),
        )
        .field("summary", FieldSchema::string().min_length(1))
        .field("risk_level", risk_level())
        .field("risk_type", FieldSchema::array(FieldSchema::string()))
        .field(
            "recommended_next_steps",
            FieldSchema::array(FieldSchema::string().min_length(1)).min_length(1),
        )
        .field("company_message", FieldSchema::string().min_length(1))
        .field(
            "involved_parties",
            FieldSchema::array(FieldSchema::string().min_length(1)).min_length(1),
        )
        .field(
            "personalized_messages",
            FieldSchema::map_of(FieldSchema::string().min_length(1)),
        )
        .field("policy_refs", FieldSchema::array(FieldSchema::string()))
        .field("policy_violations", FieldSchema::array(violation_schema()))
        .check(personalized_messages_cover_parties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_location_reported_as_basics_location() {
        let body = json!({
            "basics": {
                "what_happened": "Verbal altercation",
                "involved_parties": ["A", "B"],
                "datetime": "2024-01-01T10:00:00Z"
            },
            "history": []
        });
        let violations = next_questions_request_schema().validate(&body).unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.path == "basics.location" && v.reason.contains("missing")));
    }

    #[test]
    fn test_empty_involved_parties_rejected() {
        let body = json!({
            "basics": {
                "what_happened": "x",
                "involved_parties": [],
                "location": "Office",
                "datetime": "2024-01-01"
            }
        });
        let violations = final_report_request_schema().validate(&body).unwrap_err();
        assert!(violations.iter().any(|v| v.path == "basics.involved_parties"));
    }

    #[test]
    fn test_questions_count_bounds() {
        let four: Vec<String> = (0..4).map(|i| format!("q{}", i)).collect();
        let eight: Vec<String> = (0..8).map(|i| format!("q{}", i)).collect();
        let thirteen: Vec<String> = (0..13).map(|i| format!("q{}", i)).collect();

        let schema = questions_response_schema();
        assert!(schema
            .validate(&json!({"questions": four, "rationale": "r"}))
            .is_err());
        assert!(schema
            .validate(&json!({"questions": eight, "rationale": "r"}))
            .is_ok());
        assert!(schema
            .validate(&json!({"questions": thirteen, "rationale": "r"}))
            .is_err());
    }

    #[test]
    fn test_personalized_messages_must_cover_all_parties() {
        let mut report = crate::demo::demo_report(
            &caseguard_core::IncidentBasics {
                what_happened: "Shouting match".to_string(),
                involved_parties: vec!["Alice Smith".to_string(), "Bob Lee".to_string()],
                location: "Warehouse".to_string(),
                datetime: "2024-02-02T09:00:00Z".to_string(),
                attachments: None,
            },
            &[],
        );
        assert!(incident_report_schema().validate(&report).is_ok());

        // Drop one message and the invariant must fire
        report["personalized_messages"]
            .as_object_mut()
            .unwrap()
            .remove("Bob Lee");
        let violations = incident_report_schema().validate(&report).unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.path == "personalized_messages.Bob Lee"));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let make = |confidence: f64| {
            json!({
                "policy": "P-1",
                "policy_text": "Quoted text",
                "violation_reason": "reason",
                "supporting_facts": [],
                "severity": "moderate",
                "recommended_remediation": [],
                "confidence": confidence
            })
        };
        let schema = Schema::new().field("v", violation_schema());
        assert!(schema.validate(&json!({"v": make(0.0)})).is_ok());
        assert!(schema.validate(&json!({"v": make(1.0)})).is_ok());
        assert!(schema.validate(&json!({"v": make(1.01)})).is_err());
        assert!(schema.validate(&json!({"v": make(-0.01)})).is_err());
    }

    #[test]
    fn test_unknown_severity_rejected() {
        let report_schema = Schema::new().field("v", violation_schema());
        let body = json!({"v": {
            "policy": "P-1",
            "policy_text": "text",
            "violation_reason": "reason",
            "supporting_facts": [],
            "severity": "apocalyptic",
            "recommended_remediation": [],
            "confidence": 0.5
        }});
        let violations = report_schema.validate(&body).unwrap_err();
        assert!(violations.iter().any(|v| v.path == "v.severity"));
    }
}

//! Incident data model
//!
//! Wire types for the coaching pipeline. `IncidentBasics` and
//! `QaExchange` arrive from the client and are immutable once submitted;
//! `IncidentReport` is produced once per completed coaching session and
//! is regenerable by re-running the pipeline, never mutated in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File reference attached to an incident submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Facts collected by the intake form before coaching starts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentBasics {
    pub what_happened: String,
    /// Names of everyone involved; must be non-empty
    pub involved_parties: Vec<String>,
    pub location: String,
    pub datetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

/// One question/answer turn of the coaching dialogue (chronological)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaExchange {
    pub question: String,
    pub answer: String,
}

/// Closed risk classification set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Every allowed wire value, in severity order
    pub const VALUES: [&'static str; 4] = ["low", "medium", "high", "critical"];
}

/// Closed severity set for policy violations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Serious,
    Severe,
}

impl Severity {
    pub const VALUES: [&'static str; 4] = ["minor", "moderate", "serious", "severe"];
}

/// One weighted factor feeding the incident score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreFactor {
    pub factor: String,
    pub weight: f64,
    pub score: f64,
}

/// Weighted factors summing to a total, with the derived risk level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentScore {
    pub factors: Vec<ScoreFactor>,
    pub total: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralInformation {
    pub report_date: String,
    pub location: String,
    pub incident_datetime: String,
    pub reported_by: String,
}

/// Parties partitioned by role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartiesInvolved {
    pub reporters: Vec<String>,
    pub accused: Vec<String>,
    pub witnesses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentDetails {
    pub description: String,
    pub category: String,
    pub timeline: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpactConsequences {
    pub impact_summary: String,
    pub affected_individuals: Vec<String>,
    pub business_impact: String,
}

/// A claimed mismatch between the incident facts and a quoted policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyViolation {
    /// Policy id or title
    pub policy: String,
    /// Verbatim quote of the policy text
    pub policy_text: String,
    pub violation_reason: String,
    pub supporting_facts: Vec<String>,
    pub severity: Severity,
    pub recommended_remediation: Vec<String>,
    /// Model confidence, strictly within [0, 1]
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyCrossCheck {
    pub policies_reviewed: Vec<String>,
    pub violations: Vec<PolicyViolation>,
}

/// The structured compliance document produced from incident facts and
/// Q/A history.
///
/// Nested sub-records carry the current report format; the flat fields
/// below them are kept for older report consumers. Invariant: every
/// name in `involved_parties` has a key in `personalized_messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentReport {
    pub incident_score: IncidentScore,
    pub general_information: GeneralInformation,
    pub parties_involved: PartiesInvolved,
    pub incident_details: IncidentDetails,
    pub impact_consequences: ImpactConsequences,
    pub policy_cross_check: PolicyCrossCheck,

    // Legacy flat fields
    pub summary: String,
    pub risk_level: RiskLevel,
    pub risk_type: Vec<String>,
    pub recommended_next_steps: Vec<String>,
    pub company_message: String,
    pub involved_parties: Vec<String>,
    pub personalized_messages: BTreeMap<String, String>,
    pub policy_refs: Vec<String>,
    pub policy_violations: Vec<PolicyViolation>,
}

/// Coaching response: follow-up questions plus the model's rationale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basics_round_trip() {
        let basics = IncidentBasics {
            what_happened: "Verbal altercation".to_string(),
            involved_parties: vec!["A".to_string(), "B".to_string()],
            location: "Office".to_string(),
            datetime: "2024-01-01T10:00:00Z".to_string(),
            attachments: None,
        };
        let value = serde_json::to_value(&basics).unwrap();
        assert!(value.get("attachments").is_none());
        let back: IncidentBasics = serde_json::from_value(value).unwrap();
        assert_eq!(back, basics);
    }

    #[test]
    fn test_risk_level_serializes_lowercase() {
        assert_eq!(serde_json::to_value(RiskLevel::High).unwrap(), json!("high"));
        assert_eq!(
            serde_json::to_value(Severity::Moderate).unwrap(),
            json!("moderate")
        );
    }

    #[test]
    fn test_unknown_risk_level_rejected() {
        let result: Result<RiskLevel, _> = serde_json::from_value(json!("catastrophic"));
        assert!(result.is_err());
    }
}

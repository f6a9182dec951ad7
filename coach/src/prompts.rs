//! Prompt templates
//!
//! Two fixed system instructions and two pure builder functions that
//! interpolate the collected facts. Identical inputs produce
//! byte-identical prompts: no timestamps, no randomness.

use caseguard_core::{IncidentBasics, QaExchange};

/// System instruction for the follow-up-questions call.
///
/// Directs a single JSON object `{"questions": [...], "rationale": "..."}`
/// with between 6 and 12 questions.
pub const QUESTIONS_SYSTEM_PROMPT: &str = "You are an HR compliance incident coach. \
You help an employee document a workplace incident thoroughly enough for a formal review.

Given the incident facts and the dialogue so far, produce the next round of follow-up \
questions that close the most important factual gaps.

RULES:
1. Respond with a single JSON object and nothing else.
2. The object has exactly two keys: \"questions\" (array of strings) and \"rationale\" (string).
3. Provide between 6 and 12 questions.
4. Questions must be specific to the facts given, neutral in tone, and answerable by the reporter.
5. Never ask for information already covered by an earlier answer.
6. The rationale briefly explains which factual gaps the questions target.";

/// System instruction for the final-report call.
///
/// Directs the full incident-report JSON object with no surrounding prose.
pub const REPORT_SYSTEM_PROMPT: &str = "You are an HR compliance incident coach. \
Produce the final structured incident report from the facts and the completed Q/A dialogue.

RULES:
1. Respond with a single JSON object and nothing else — no prose, no markdown fences.
2. The object must contain: incident_score (factors with weight and score, total, risk_level), \
general_information, parties_involved (reporters, accused, witnesses), incident_details, \
impact_consequences, policy_cross_check (policies_reviewed, violations), and the flat fields \
summary, risk_level, risk_type, recommended_next_steps, company_message, involved_parties, \
personalized_messages, policy_refs, policy_violations.
3. risk_level is one of: low, medium, high, critical. Violation severity is one of: \
minor, moderate, serious, severe.
4. Every policy violation quotes the policy text verbatim and carries a confidence between 0 and 1.
5. personalized_messages must contain one entry for every name in involved_parties.
6. State only what the facts support; mark gaps explicitly rather than inventing details.";

/// Build the user prompt for the follow-up-questions call
pub fn build_questions_prompt(basics: &IncidentBasics, history: &[QaExchange]) -> String {
    let mut prompt = String::from("INCIDENT FACTS:\n");
    push_basics(&mut prompt, basics);

    if history.is_empty() {
        prompt.push_str("\nDIALOGUE SO FAR: none — this is the first round of questions.\n");
    } else {
        prompt.push_str("\nDIALOGUE SO FAR:\n");
        push_history(&mut prompt, history);
    }

    prompt.push_str("\nProduce the next round of follow-up questions as JSON.\n");
    prompt
}

/// Build the user prompt for the final-report call
pub fn build_report_prompt(basics: &IncidentBasics, qa: &[QaExchange]) -> String {
    let mut prompt = String::from("INCIDENT FACTS:\n");
    push_basics(&mut prompt, basics);

    if qa.is_empty() {
        prompt.push_str("\nCOACHING DIALOGUE: none recorded.\n");
    } else {
        prompt.push_str("\nCOACHING DIALOGUE:\n");
        push_history(&mut prompt, qa);
    }

    prompt.push_str("\nProduce the final incident report as a single JSON object.\n");
    prompt
}

fn push_basics(prompt: &mut String, basics: &IncidentBasics) {
    prompt.push_str(&format!("- What happened: {}\n", basics.what_happened));
    prompt.push_str(&format!(
        "- Involved parties: {}\n",
        basics.involved_parties.join(", ")
    ));
    prompt.push_str(&format!("- Location: {}\n", basics.location));
    prompt.push_str(&format!("- Date/time: {}\n", basics.datetime));
    if let Some(attachments) = &basics.attachments {
        if !attachments.is_empty() {
            let names: Vec<&str> = attachments.iter().map(|a| a.name.as_str()).collect();
            prompt.push_str(&format!("- Attachments: {}\n", names.join(", ")));
        }
    }
}

fn push_history(prompt: &mut String, history: &[QaExchange]) {
    for (idx, exchange) in history.iter().enumerate() {
        prompt.push_str(&format!("Q{}: {}\n", idx + 1, exchange.question));
        prompt.push_str(&format!("A{}: {}\n", idx + 1, exchange.answer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basics() -> IncidentBasics {
        IncidentBasics {
            what_happened: "Verbal altercation".to_string(),
            involved_parties: vec!["A".to_string(), "B".to_string()],
            location: "Office".to_string(),
            datetime: "2024-01-01T10:00:00Z".to_string(),
            attachments: None,
        }
    }

    #[test]
    fn test_questions_prompt_is_deterministic() {
        let history = vec![QaExchange {
            question: "Who was present?".to_string(),
            answer: "Just us".to_string(),
        }];
        let first = build_questions_prompt(&basics(), &history);
        let second = build_questions_prompt(&basics(), &history);
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_prompt_is_deterministic() {
        assert_eq!(
            build_report_prompt(&basics(), &[]),
            build_report_prompt(&basics(), &[])
        );
    }

    #[test]
    fn test_prompt_interpolates_all_facts() {
        let prompt = build_questions_prompt(&basics(), &[]);
        assert!(prompt.contains("Verbal altercation"));
        assert!(prompt.contains("A, B"));
        assert!(prompt.contains("Office"));
        assert!(prompt.contains("2024-01-01T10:00:00Z"));
    }

    #[test]
    fn test_history_is_rendered_in_order() {
        let history = vec![
            QaExchange {
                question: "first?".to_string(),
                answer: "one".to_string(),
            },
            QaExchange {
                question: "second?".to_string(),
                answer: "two".to_string(),
            },
        ];
        let prompt = build_report_prompt(&basics(), &history);
        let first = prompt.find("Q1: first?").unwrap();
        let second = prompt.find("Q2: second?").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_system_prompts_state_the_output_contract() {
        assert!(QUESTIONS_SYSTEM_PROMPT.contains("questions"));
        assert!(QUESTIONS_SYSTEM_PROMPT.contains("rationale"));
        assert!(QUESTIONS_SYSTEM_PROMPT.contains("6 and 12"));
        assert!(REPORT_SYSTEM_PROMPT.contains("personalized_messages"));
        assert!(REPORT_SYSTEM_PROMPT.contains("no prose"));
    }
}

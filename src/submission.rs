use serde::Serialize;

use crate::models::{
    CustomQuestion, EmploymentType, ExperienceLevel, InterviewRound, JobDraft, RemoteType,
    ScreeningQuestion,
};

/// Body of the create-job request. `None` fields are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub title: String,
    pub niche_category: String,
    pub employment_type: EmploymentType,
    pub experience_level: String,
    pub location: String,
    pub remote: bool,
    pub remote_type: RemoteType,

    pub description: String,
    // Legacy flat strings, sent alongside the arrays below
    pub requirements: String,
    pub responsibilities: String,
    pub key_responsibilities: Vec<String>,
    pub skills: Vec<String>,
    pub nice_to_have_skills: Vec<String>,
    pub tech_stack: Vec<String>,

    // Cents
    pub salary_min: Option<u64>,
    pub salary_max: Option<u64>,
    pub is_competitive: bool,
    pub equity_offered: bool,
    pub specific_benefits: Vec<String>,

    pub requires_assessment: bool,
    pub min_skills_score: Option<u8>,
    pub required_tier: Option<String>,
    pub custom_assessment_questions: Option<Vec<CustomQuestion>>,

    pub interview_rounds: Option<usize>,
    pub interview_process: Option<String>,
    pub interview_rounds_detailed: Vec<InterviewRound>,
    pub hiring_timeline: Option<String>,
    pub start_date_needed: Option<String>,

    pub deadline: Option<String>,
    pub max_applicants: Option<u32>,
    pub screening_questions: Vec<ScreeningQuestion>,
}

/// Backend spelling of the experience ladder.
pub fn experience_level_label(level: &ExperienceLevel) -> String {
    match level {
        ExperienceLevel::Entry => "ENTRY_LEVEL".to_string(),
        ExperienceLevel::Mid => "MID_LEVEL".to_string(),
        ExperienceLevel::Senior => "SENIOR_LEVEL".to_string(),
        ExperienceLevel::Lead => "EXECUTIVE".to_string(),
        ExperienceLevel::Other(raw) => raw.clone(),
    }
}

/// Free-text rendering of the interview rounds, `None` when there are none.
pub fn interview_process_text(rounds: &[InterviewRound]) -> Option<String> {
    if rounds.is_empty() {
        return None;
    }

    let blocks: Vec<String> = rounds
        .iter()
        .map(|round| {
            let mut block = format!(
                "Round {}: {}\n{}",
                round.round_number, round.round_name, round.round_description
            );
            if !round.duration.trim().is_empty() {
                block.push_str(&format!(" ({})", round.duration));
            }
            block
        })
        .collect();

    Some(blocks.join("\n\n"))
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn dollars_to_cents(dollars: u64) -> Option<u64> {
    match dollars {
        0 => None,
        amount => Some(amount.saturating_mul(100)),
    }
}

pub fn transform_for_submission(draft: &JobDraft) -> SubmissionPayload {
    let rounds = &draft.interview_rounds_detailed;
    let assessment = draft.requires_assessment;

    SubmissionPayload {
        title: draft.title.trim().to_string(),
        niche_category: draft.niche_category.clone(),
        employment_type: draft.employment_type,
        experience_level: experience_level_label(&draft.experience_level),
        location: draft.location.trim().to_string(),
        // Hybrid roles are not flagged as remote
        remote: draft.remote_type == RemoteType::Remote,
        remote_type: draft.remote_type,

        description: draft.description.clone(),
        requirements: draft.skills.join(", "),
        responsibilities: draft.key_responsibilities.join("\n"),
        key_responsibilities: draft.key_responsibilities.clone(),
        skills: draft.skills.clone(),
        nice_to_have_skills: draft.nice_to_have_skills.clone(),
        tech_stack: draft.tech_stack.clone(),

        salary_min: dollars_to_cents(draft.salary_min),
        salary_max: dollars_to_cents(draft.salary_max),
        is_competitive: draft.is_competitive,
        equity_offered: draft.equity_offered,
        specific_benefits: draft.specific_benefits.clone(),

        requires_assessment: assessment,
        min_skills_score: assessment.then_some(draft.min_skills_score),
        required_tier: if assessment {
            non_empty(&draft.required_tier)
        } else {
            None
        },
        custom_assessment_questions: assessment
            .then(|| draft.custom_assessment_questions.clone()),

        interview_rounds: (!rounds.is_empty()).then_some(rounds.len()),
        interview_process: interview_process_text(rounds),
        interview_rounds_detailed: rounds.clone(),
        hiring_timeline: non_empty(&draft.hiring_timeline),
        start_date_needed: non_empty(&draft.start_date_needed),

        deadline: non_empty(&draft.deadline),
        max_applicants: draft.max_applicants,
        screening_questions: draft.screening_questions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;

    fn round(number: u32, name: &str, description: &str, duration: &str) -> InterviewRound {
        InterviewRound {
            round_number: number,
            round_name: name.to_string(),
            round_description: description.to_string(),
            duration: duration.to_string(),
        }
    }

    #[test]
    fn test_experience_levels_are_remapped() {
        let cases = [
            (ExperienceLevel::Entry, "ENTRY_LEVEL"),
            (ExperienceLevel::Mid, "MID_LEVEL"),
            (ExperienceLevel::Senior, "SENIOR_LEVEL"),
            (ExperienceLevel::Lead, "EXECUTIVE"),
            (ExperienceLevel::Other("STAFF".to_string()), "STAFF"),
        ];
        for (level, expected) in cases {
            let draft = JobDraft {
                experience_level: level,
                ..JobDraft::default()
            };
            assert_eq!(transform_for_submission(&draft).experience_level, expected);
        }
    }

    #[test]
    fn test_only_fully_remote_jobs_are_remote() {
        let mut draft = JobDraft::default();
        for (remote_type, expected) in [
            (RemoteType::Remote, true),
            (RemoteType::Hybrid, false),
            (RemoteType::Onsite, false),
        ] {
            draft.remote_type = remote_type;
            assert_eq!(transform_for_submission(&draft).remote, expected);
        }
    }

    #[test]
    fn test_disabled_assessment_nulls_assessment_fields() {
        let draft = JobDraft {
            requires_assessment: false,
            min_skills_score: 80,
            required_tier: "GOLD".to_string(),
            custom_assessment_questions: vec![CustomQuestion {
                question: "Explain ownership".to_string(),
                kind: QuestionType::Text,
                weight: 5,
                options: None,
                correct_answer: None,
            }],
            ..JobDraft::default()
        };

        let payload = transform_for_submission(&draft);
        assert!(!payload.requires_assessment);
        assert_eq!(payload.min_skills_score, None);
        assert_eq!(payload.required_tier, None);
        assert_eq!(payload.custom_assessment_questions, None);

        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["minSkillsScore"].is_null());
        assert!(value["requiredTier"].is_null());
        assert!(value["customAssessmentQuestions"].is_null());

        // the local draft keeps its values for when the toggle comes back on
        assert_eq!(draft.min_skills_score, 80);
    }

    #[test]
    fn test_enabled_assessment_carries_fields() {
        let draft = JobDraft {
            requires_assessment: true,
            min_skills_score: 65,
            required_tier: "SILVER".to_string(),
            ..JobDraft::default()
        };
        let payload = transform_for_submission(&draft);
        assert_eq!(payload.min_skills_score, Some(65));
        assert_eq!(payload.required_tier.as_deref(), Some("SILVER"));
        assert_eq!(payload.custom_assessment_questions, Some(vec![]));
    }

    #[test]
    fn test_interview_process_text_and_count() {
        let draft = JobDraft {
            interview_rounds_detailed: vec![
                round(1, "Screen", "Recruiter call", "30 min"),
                round(2, "Technical", "Pairing session", ""),
            ],
            ..JobDraft::default()
        };
        let payload = transform_for_submission(&draft);
        assert_eq!(payload.interview_rounds, Some(2));
        assert_eq!(
            payload.interview_process.as_deref(),
            Some("Round 1: Screen\nRecruiter call (30 min)\n\nRound 2: Technical\nPairing session")
        );
    }

    #[test]
    fn test_no_rounds_sends_nulls() {
        let payload = transform_for_submission(&JobDraft::default());
        assert_eq!(payload.interview_rounds, None);
        assert_eq!(payload.interview_process, None);
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["interviewRounds"].is_null());
        assert!(value["interviewProcess"].is_null());
    }

    #[test]
    fn test_legacy_strings_and_salary_cents() {
        let draft = JobDraft {
            skills: vec!["Rust".to_string(), "Postgres".to_string()],
            key_responsibilities: vec!["Ship features".to_string(), "Review code".to_string()],
            salary_min: 120_000,
            salary_max: 0,
            ..JobDraft::default()
        };
        let payload = transform_for_submission(&draft);
        assert_eq!(payload.requirements, "Rust, Postgres");
        assert_eq!(payload.responsibilities, "Ship features\nReview code");
        assert_eq!(payload.skills, draft.skills);
        assert_eq!(payload.salary_min, Some(12_000_000));
        assert_eq!(payload.salary_max, None);
    }
}

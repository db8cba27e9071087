//! Field-by-field merge of untrusted JSON (persisted drafts, imported files,
//! CLI patches) over a typed [`JobDraft`].
//!
//! A value of the wrong JSON type never replaces the base field: the base
//! value survives. Merging over `JobDraft::default()` therefore resets
//! corrupted fields to their defaults.

use serde_json::{Map, Value};

use crate::error::DraftError;
use crate::models::{
    renumber_rounds, CustomQuestion, EmploymentType, ExperienceLevel, InterviewRound, JobDraft,
    QuestionType, RemoteType, ScreeningQuestion,
};

pub const MAX_CUSTOM_QUESTIONS: usize = 3;
pub const MAX_SKILLS_SCORE: u8 = 100;
pub const MIN_QUESTION_WEIGHT: u8 = 1;
pub const MAX_QUESTION_WEIGHT: u8 = 10;

/// Parses a JSON document that must be an object of draft fields.
pub fn parse_fields(raw: &str) -> Result<Map<String, Value>, DraftError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(DraftError::NotAnObject),
    }
}

/// Shallow merge: each known top-level key replaces the whole field.
/// Unknown keys are ignored.
pub fn merge_fields(base: &JobDraft, fields: &Map<String, Value>) -> JobDraft {
    let mut draft = base.clone();

    for (key, value) in fields {
        match key.as_str() {
            "title" => take_string(value, &mut draft.title),
            "nicheCategory" => take_string(value, &mut draft.niche_category),
            "employmentType" => {
                if let Some(kind) = value.as_str().and_then(EmploymentType::parse) {
                    draft.employment_type = kind;
                }
            }
            "experienceLevel" => {
                if let Some(raw) = value.as_str().filter(|raw| !raw.is_empty()) {
                    draft.experience_level = ExperienceLevel::from(raw.to_string());
                }
            }
            "location" => take_string(value, &mut draft.location),
            "remoteType" => {
                if let Some(kind) = value.as_str().and_then(RemoteType::parse) {
                    draft.remote_type = kind;
                }
            }
            "description" => take_string(value, &mut draft.description),
            "keyResponsibilities" => take_strings(value, &mut draft.key_responsibilities),
            "skills" => take_strings(value, &mut draft.skills),
            "niceToHaveSkills" => take_strings(value, &mut draft.nice_to_have_skills),
            "techStack" => take_strings(value, &mut draft.tech_stack),
            "salaryMin" => take_whole(value, &mut draft.salary_min),
            "salaryMax" => take_whole(value, &mut draft.salary_max),
            "isCompetitive" => take_bool(value, &mut draft.is_competitive),
            "equityOffered" => take_bool(value, &mut draft.equity_offered),
            "specificBenefits" => {
                if let Some(items) = value.as_array() {
                    draft.specific_benefits = dedup(string_items(items));
                }
            }
            "requiresAssessment" => take_bool(value, &mut draft.requires_assessment),
            "minSkillsScore" => {
                if let Some(score) = whole_number(value) {
                    draft.min_skills_score = score.min(MAX_SKILLS_SCORE as u64) as u8;
                }
            }
            "requiredTier" => take_string(value, &mut draft.required_tier),
            "customAssessmentQuestions" => {
                if let Some(items) = value.as_array() {
                    draft.custom_assessment_questions = items
                        .iter()
                        .filter_map(custom_question)
                        .take(MAX_CUSTOM_QUESTIONS)
                        .collect();
                }
            }
            "interviewRoundsDetailed" => {
                if let Some(items) = value.as_array() {
                    let mut rounds: Vec<InterviewRound> =
                        items.iter().filter_map(interview_round).collect();
                    renumber_rounds(&mut rounds);
                    draft.interview_rounds_detailed = rounds;
                }
            }
            "hiringTimeline" => take_string(value, &mut draft.hiring_timeline),
            "startDateNeeded" => take_string(value, &mut draft.start_date_needed),
            "deadline" => take_string(value, &mut draft.deadline),
            "maxApplicants" => match value {
                Value::Null => draft.max_applicants = None,
                other => {
                    if let Some(count) = whole_number(other) {
                        draft.max_applicants = positive_u32(count);
                    }
                }
            },
            "screeningQuestions" => {
                if let Some(items) = value.as_array() {
                    draft.screening_questions =
                        items.iter().filter_map(screening_question).collect();
                }
            }
            _ => {}
        }
    }

    draft
}

fn take_string(value: &Value, slot: &mut String) {
    if let Some(text) = value.as_str() {
        *slot = text.to_string();
    }
}

fn take_strings(value: &Value, slot: &mut Vec<String>) {
    if let Some(items) = value.as_array() {
        *slot = string_items(items);
    }
}

fn take_bool(value: &Value, slot: &mut bool) {
    if let Some(flag) = value.as_bool() {
        *slot = flag;
    }
}

fn take_whole(value: &Value, slot: &mut u64) {
    if let Some(number) = whole_number(value) {
        *slot = number;
    }
}

/// Non-string entries are dropped rather than failing the whole list.
fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

/// Non-negative numbers; fractional values are truncated.
fn whole_number(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.is_finite() && *number >= 0.0)
            .map(|number| number.trunc() as u64)
    })
}

fn positive_u32(value: u64) -> Option<u32> {
    match value {
        0 => None,
        n => Some(n.min(u32::MAX as u64) as u32),
    }
}

fn object_string(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn custom_question(value: &Value) -> Option<CustomQuestion> {
    let fields = value.as_object()?;
    let weight = fields
        .get("weight")
        .and_then(whole_number)
        .map(|weight| weight.clamp(MIN_QUESTION_WEIGHT as u64, MAX_QUESTION_WEIGHT as u64) as u8)
        .unwrap_or(MIN_QUESTION_WEIGHT);

    Some(CustomQuestion {
        question: object_string(fields, "question"),
        kind: fields
            .get("type")
            .and_then(Value::as_str)
            .and_then(QuestionType::parse)
            .unwrap_or_default(),
        weight,
        options: fields
            .get("options")
            .and_then(Value::as_array)
            .map(|items| string_items(items)),
        correct_answer: fields
            .get("correctAnswer")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn interview_round(value: &Value) -> Option<InterviewRound> {
    let fields = value.as_object()?;
    Some(InterviewRound {
        round_number: 0,
        round_name: object_string(fields, "roundName"),
        round_description: object_string(fields, "roundDescription"),
        duration: object_string(fields, "duration"),
    })
}

fn screening_question(value: &Value) -> Option<ScreeningQuestion> {
    let fields = value.as_object()?;
    Some(ScreeningQuestion {
        question: object_string(fields, "question"),
        required: fields
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn merge_over_default(value: Value) -> JobDraft {
        let fields = value.as_object().unwrap().clone();
        merge_fields(&JobDraft::default(), &fields)
    }

    #[test]
    fn test_wrong_typed_lists_and_numbers_fall_back() {
        let draft = merge_over_default(json!({
            "skills": "rust",
            "techStack": {"lang": "rust"},
            "salaryMin": "lots",
            "salaryMax": -10,
            "minSkillsScore": null,
            "interviewRoundsDetailed": 3,
        }));
        assert_eq!(draft, JobDraft::default());
    }

    #[test]
    fn test_wrong_typed_patch_keeps_current_value() {
        let current = JobDraft {
            title: "Data Engineer".to_string(),
            skills: vec!["SQL".to_string()],
            ..JobDraft::default()
        };
        let fields = json!({"title": 42, "skills": null});
        let merged = merge_fields(&current, fields.as_object().unwrap());
        assert_eq!(merged, current);
    }

    #[test]
    fn test_list_entries_of_wrong_type_are_dropped() {
        let draft = merge_over_default(json!({
            "skills": ["Rust", 7, null, "Go"],
            "specificBenefits": ["Dental", "Dental", "Equity"],
        }));
        assert_eq!(draft.skills, vec!["Rust", "Go"]);
        assert_eq!(draft.specific_benefits, vec!["Dental", "Equity"]);
    }

    #[test]
    fn test_rounds_are_renumbered_on_merge() {
        let draft = merge_over_default(json!({
            "interviewRoundsDetailed": [
                {"roundNumber": 4, "roundName": "Screen", "roundDescription": "Call"},
                "garbage",
                {"roundNumber": 9, "roundName": "Onsite", "roundDescription": "Loop", "duration": "4h"},
            ]
        }));
        let rounds = &draft.interview_rounds_detailed;
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].round_number, 1);
        assert_eq!(rounds[1].round_number, 2);
        assert_eq!(rounds[1].duration, "4h");
    }

    #[test]
    fn test_custom_questions_are_capped_and_clamped() {
        let draft = merge_over_default(json!({
            "customAssessmentQuestions": [
                {"question": "a", "type": "coding", "weight": 50},
                {"question": "b", "type": "essay", "weight": 0},
                {"question": "c", "options": ["x", "y"], "correctAnswer": "x"},
                {"question": "d"},
            ]
        }));
        let questions = &draft.custom_assessment_questions;
        assert_eq!(questions.len(), MAX_CUSTOM_QUESTIONS);
        assert_eq!(questions[0].kind, QuestionType::Coding);
        assert_eq!(questions[0].weight, 10);
        assert_eq!(questions[1].kind, QuestionType::Text);
        assert_eq!(questions[1].weight, 1);
        assert_eq!(questions[2].options.as_deref(), Some(&["x".to_string(), "y".to_string()][..]));
        assert_eq!(questions[2].correct_answer.as_deref(), Some("x"));
    }

    #[test]
    fn test_enums_and_scores() {
        let draft = merge_over_default(json!({
            "employmentType": "SEASONAL",
            "remoteType": "HYBRID",
            "experienceLevel": "STAFF",
            "minSkillsScore": 140,
            "maxApplicants": 0,
        }));
        assert_eq!(draft.employment_type, EmploymentType::FullTime);
        assert_eq!(draft.remote_type, RemoteType::Hybrid);
        assert_eq!(draft.experience_level, ExperienceLevel::Other("STAFF".to_string()));
        assert_eq!(draft.min_skills_score, 100);
        assert_eq!(draft.max_applicants, None);
    }

    #[test]
    fn test_max_applicants_accepts_null_to_clear() {
        let current = JobDraft {
            max_applicants: Some(50),
            ..JobDraft::default()
        };
        let fields = json!({"maxApplicants": null});
        assert_eq!(merge_fields(&current, fields.as_object().unwrap()).max_applicants, None);

        let fields = json!({"maxApplicants": 25.0});
        assert_eq!(merge_fields(&current, fields.as_object().unwrap()).max_applicants, Some(25));
    }

    #[test]
    fn test_parse_fields_rejects_non_objects() {
        assert!(matches!(parse_fields("[1, 2]"), Err(DraftError::NotAnObject)));
        assert!(matches!(parse_fields("{not json"), Err(DraftError::MalformedJson(_))));
        assert!(parse_fields("{}").unwrap().is_empty());
    }

    const DRAFT_KEYS: &[&str] = &[
        "title",
        "nicheCategory",
        "employmentType",
        "experienceLevel",
        "location",
        "remoteType",
        "description",
        "keyResponsibilities",
        "skills",
        "niceToHaveSkills",
        "techStack",
        "salaryMin",
        "salaryMax",
        "isCompetitive",
        "equityOffered",
        "specificBenefits",
        "requiresAssessment",
        "minSkillsScore",
        "requiredTier",
        "customAssessmentQuestions",
        "interviewRoundsDetailed",
        "hiringTimeline",
        "startDateNeeded",
        "deadline",
        "maxApplicants",
        "screeningQuestions",
    ];

    const NESTED_KEYS: &[&str] = &[
        "question",
        "type",
        "weight",
        "options",
        "correctAnswer",
        "roundNumber",
        "roundName",
        "roundDescription",
        "duration",
        "required",
    ];

    fn any_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|number| json!(number)),
            any::<f64>().prop_map(|number| json!(number)),
            "[A-Z_]{0,10}".prop_map(Value::String),
            prop::sample::select(QuestionType::ALL.to_vec())
                .prop_map(|kind| Value::String(kind.as_str().to_string())),
        ];
        leaf.prop_recursive(3, 48, 6, |inner| {
            let key = prop_oneof![
                prop::sample::select(NESTED_KEYS).prop_map(str::to_string),
                "[a-z]{1,6}",
            ];
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec((key, inner), 0..6)
                    .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
            ]
        })
    }

    fn any_fields() -> impl Strategy<Value = Map<String, Value>> {
        prop::collection::vec((prop::sample::select(DRAFT_KEYS), any_json()), 0..16).prop_map(
            |pairs| {
                pairs
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), value))
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_merge_always_yields_a_well_formed_draft(
            fields in any_fields(),
            current_rounds in 0..4usize,
        ) {
            let mut base = JobDraft::default();
            for _ in 0..current_rounds {
                base.add_interview_round();
            }

            let draft = merge_fields(&base, &fields);

            prop_assert!(draft.custom_assessment_questions.len() <= MAX_CUSTOM_QUESTIONS);
            for question in &draft.custom_assessment_questions {
                prop_assert!((MIN_QUESTION_WEIGHT..=MAX_QUESTION_WEIGHT).contains(&question.weight));
            }
            let numbers: Vec<u32> = draft
                .interview_rounds_detailed
                .iter()
                .map(|round| round.round_number)
                .collect();
            let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
            prop_assert_eq!(numbers, expected);
            prop_assert!(draft.min_skills_score <= MAX_SKILLS_SCORE);
            prop_assert_ne!(draft.max_applicants, Some(0));

            let mut benefits = draft.specific_benefits.clone();
            benefits.sort();
            benefits.dedup();
            prop_assert_eq!(benefits.len(), draft.specific_benefits.len());
        }

        #[test]
        fn prop_parse_fields_never_panics(raw in ".{0,64}") {
            let _ = parse_fields(&raw);
        }
    }
}

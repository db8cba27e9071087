use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::coerce::{
    self, MAX_CUSTOM_QUESTIONS, MAX_QUESTION_WEIGHT, MAX_SKILLS_SCORE, MIN_QUESTION_WEIGHT,
};
use crate::db::KeyValueStore;
use crate::error::{DraftError, SubmitError};
use crate::models::{
    renumber_rounds, CustomQuestion, InterviewRound, JobDraft, QuestionType, ScreeningQuestion,
};
use crate::service::{CreatedJob, JobService};
use crate::steps::{self, WizardStep};
use crate::submission::transform_for_submission;

pub const DRAFT_KEY: &str = "jobPostingDraft";
pub const STEP_KEY: &str = "jobPostingDraftStep";

// --- Pure draft edits ---

impl JobDraft {
    /// Appends an empty round numbered after the current last one.
    pub fn add_interview_round(&mut self) {
        let round_number = self.interview_rounds_detailed.len() as u32 + 1;
        self.interview_rounds_detailed.push(InterviewRound {
            round_number,
            ..InterviewRound::default()
        });
    }

    pub fn remove_interview_round(&mut self, index: usize) -> Result<InterviewRound, DraftError> {
        if index >= self.interview_rounds_detailed.len() {
            return Err(DraftError::NoSuchEntry {
                list: "interview round",
                index,
            });
        }
        let removed = self.interview_rounds_detailed.remove(index);
        renumber_rounds(&mut self.interview_rounds_detailed);
        Ok(removed)
    }

    pub fn add_custom_question(&mut self) -> Result<(), DraftError> {
        if self.custom_assessment_questions.len() >= MAX_CUSTOM_QUESTIONS {
            return Err(DraftError::QuestionLimit {
                max: MAX_CUSTOM_QUESTIONS,
            });
        }
        self.custom_assessment_questions.push(CustomQuestion::default());
        Ok(())
    }
}

// --- Field-level edits used by the CLI ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Date,
    Dollars,
    Score,
    Flag,
    OptionalCount,
    Choice(&'static [&'static str]),
}

const EMPLOYMENT_TYPES: &[&str] = &["FULL_TIME", "PART_TIME", "CONTRACT", "INTERNSHIP"];
const EXPERIENCE_LEVELS: &[&str] = &["ENTRY", "MID", "SENIOR", "LEAD"];
const REMOTE_TYPES: &[&str] = &["REMOTE", "HYBRID", "ONSITE"];

const SCALAR_FIELDS: &[(&str, FieldKind)] = &[
    ("title", FieldKind::Text),
    ("nicheCategory", FieldKind::Text),
    ("employmentType", FieldKind::Choice(EMPLOYMENT_TYPES)),
    ("experienceLevel", FieldKind::Choice(EXPERIENCE_LEVELS)),
    ("location", FieldKind::Text),
    ("remoteType", FieldKind::Choice(REMOTE_TYPES)),
    ("description", FieldKind::Text),
    ("salaryMin", FieldKind::Dollars),
    ("salaryMax", FieldKind::Dollars),
    ("isCompetitive", FieldKind::Flag),
    ("equityOffered", FieldKind::Flag),
    ("requiresAssessment", FieldKind::Flag),
    ("minSkillsScore", FieldKind::Score),
    ("requiredTier", FieldKind::Text),
    ("hiringTimeline", FieldKind::Text),
    ("startDateNeeded", FieldKind::Date),
    ("deadline", FieldKind::Date),
    ("maxApplicants", FieldKind::OptionalCount),
];

pub fn scalar_field_names() -> impl Iterator<Item = &'static str> {
    SCALAR_FIELDS.iter().map(|(name, _)| *name)
}

fn invalid(field: &str, reason: impl Into<String>) -> DraftError {
    DraftError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parses CLI text for `field` into the JSON value the merge understands.
fn scalar_value(field: &str, raw: &str) -> Result<Value, DraftError> {
    let (_, kind) = SCALAR_FIELDS
        .iter()
        .find(|(name, _)| *name == field)
        .ok_or_else(|| DraftError::UnknownField(field.to_string()))?;

    let trimmed = raw.trim();
    match kind {
        FieldKind::Text => Ok(Value::String(raw.to_string())),
        FieldKind::Date => {
            if trimmed.is_empty() {
                return Ok(Value::String(String::new()));
            }
            let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map_err(|err| invalid(field, format!("expected YYYY-MM-DD ({})", err)))?;
            Ok(Value::String(date.format("%Y-%m-%d").to_string()))
        }
        FieldKind::Dollars => trimmed
            .replace(',', "")
            .parse::<u64>()
            .map(|amount| json!(amount))
            .map_err(|_| invalid(field, "expected a whole dollar amount")),
        FieldKind::Score => match trimmed.parse::<u8>() {
            Ok(score) if score <= MAX_SKILLS_SCORE => Ok(json!(score)),
            _ => Err(invalid(field, format!("expected 0-{}", MAX_SKILLS_SCORE))),
        },
        FieldKind::Flag => parse_flag(trimmed)
            .map(Value::Bool)
            .ok_or_else(|| invalid(field, "expected true or false")),
        FieldKind::OptionalCount => {
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                return Ok(Value::Null);
            }
            match trimmed.parse::<u32>() {
                Ok(count) if count > 0 => Ok(json!(count)),
                _ => Err(invalid(field, "expected a positive number or 'none'")),
            }
        }
        FieldKind::Choice(choices) => {
            let upper = trimmed.to_ascii_uppercase();
            if choices.contains(&upper.as_str()) {
                Ok(Value::String(upper))
            } else {
                Err(invalid(field, format!("expected one of {}", choices.join(", "))))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    KeyResponsibilities,
    Skills,
    NiceToHaveSkills,
    TechStack,
    SpecificBenefits,
}

impl ListField {
    pub const ALL: [ListField; 5] = [
        ListField::KeyResponsibilities,
        ListField::Skills,
        ListField::NiceToHaveSkills,
        ListField::TechStack,
        ListField::SpecificBenefits,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ListField::KeyResponsibilities => "keyResponsibilities",
            ListField::Skills => "skills",
            ListField::NiceToHaveSkills => "niceToHaveSkills",
            ListField::TechStack => "techStack",
            ListField::SpecificBenefits => "specificBenefits",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DraftError> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == raw)
            .ok_or_else(|| DraftError::UnknownField(raw.to_string()))
    }

    fn slot(self, draft: &mut JobDraft) -> &mut Vec<String> {
        match self {
            ListField::KeyResponsibilities => &mut draft.key_responsibilities,
            ListField::Skills => &mut draft.skills,
            ListField::NiceToHaveSkills => &mut draft.nice_to_have_skills,
            ListField::TechStack => &mut draft.tech_stack,
            ListField::SpecificBenefits => &mut draft.specific_benefits,
        }
    }
}

/// Replacement values for an interview round; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct RoundEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionEdit {
    pub question: Option<String>,
    pub kind: Option<String>,
    pub weight: Option<u8>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
}

// --- Controller ---

/// Owns the draft and the wizard cursor. Every mutation goes through
/// [`DraftController::commit`], which writes the draft back to the store.
pub struct DraftController<S: KeyValueStore> {
    store: S,
    draft: JobDraft,
    step: WizardStep,
}

impl<S: KeyValueStore> DraftController<S> {
    /// Rehydrates from the store. Corrupted slots are discarded silently.
    pub fn load(store: S) -> Self {
        let (draft, step) = match load_draft(&store) {
            Some(draft) => (draft, load_step(&store)),
            // A cursor without its draft would point past empty steps
            None => {
                if let Err(err) = store.remove(STEP_KEY) {
                    warn!(error = %format!("{:#}", err), "could not clear wizard step");
                }
                (JobDraft::default(), WizardStep::FIRST)
            }
        };
        debug!(step = step.index(), "draft controller ready");
        Self { store, draft, step }
    }

    pub fn draft(&self) -> &JobDraft {
        &self.draft
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn progress(&self) -> u8 {
        steps::compute_progress(&self.draft)
    }

    pub fn validate_step(&self, step: WizardStep) -> bool {
        steps::validate_step(&self.draft, step)
    }

    pub fn missing_fields(&self, step: WizardStep) -> Vec<&'static str> {
        steps::missing_fields(&self.draft, step)
    }

    /// Shallow-merges `fields` over the draft and persists it.
    pub fn update(&mut self, fields: &Map<String, Value>) -> &JobDraft {
        let merged = coerce::merge_fields(&self.draft, fields);
        self.commit(merged)
    }

    /// Sets one scalar field from user-entered text.
    pub fn set_field(&mut self, field: &str, raw: &str) -> Result<&JobDraft, DraftError> {
        let value = scalar_value(field, raw)?;
        let mut fields = Map::new();
        fields.insert(field.to_string(), value);
        Ok(self.update(&fields))
    }

    pub fn edit<F>(&mut self, change: F) -> &JobDraft
    where
        F: FnOnce(&mut JobDraft),
    {
        let mut draft = self.draft.clone();
        change(&mut draft);
        self.commit(draft)
    }

    fn try_edit<T, F>(&mut self, change: F) -> Result<T, DraftError>
    where
        F: FnOnce(&mut JobDraft) -> Result<T, DraftError>,
    {
        let mut draft = self.draft.clone();
        let outcome = change(&mut draft)?;
        self.commit(draft);
        Ok(outcome)
    }

    fn commit(&mut self, draft: JobDraft) -> &JobDraft {
        self.draft = draft;
        self.persist();
        &self.draft
    }

    /// Writes the whole draft to its slot. Failures are logged, not returned.
    pub fn persist(&self) {
        let written = serde_json::to_string(&self.draft)
            .context("Failed to serialize draft")
            .and_then(|raw| self.store.set(DRAFT_KEY, &raw));
        if let Err(err) = written {
            warn!(error = %format!("{:#}", err), "could not save job draft");
        }
    }

    fn persist_step(&self) {
        if let Err(err) = self.store.set(STEP_KEY, &self.step.index().to_string()) {
            warn!(error = %format!("{:#}", err), "could not save wizard step");
        }
    }

    // --- Step cursor ---

    pub fn advance(&mut self) -> Result<WizardStep, DraftError> {
        let missing = self.missing_fields(self.step);
        if !missing.is_empty() {
            return Err(DraftError::Incomplete {
                step: self.step,
                missing,
            });
        }
        self.step = self.step.next();
        self.persist_step();
        Ok(self.step)
    }

    pub fn retreat(&mut self) -> WizardStep {
        self.step = self.step.prev();
        self.persist_step();
        self.step
    }

    /// Moves to `target`. Going forward requires every step before it to be
    /// valid; going back is always allowed.
    pub fn go_to(&mut self, target: WizardStep) -> Result<WizardStep, DraftError> {
        if target > self.step {
            if let Some(step) = WizardStep::ALL[..target.index()]
                .iter()
                .copied()
                .find(|step| !self.validate_step(*step))
            {
                return Err(DraftError::Incomplete {
                    step,
                    missing: self.missing_fields(step),
                });
            }
        }
        self.step = target;
        self.persist_step();
        Ok(self.step)
    }

    // --- Collections ---

    pub fn add_interview_round(&mut self) -> &JobDraft {
        self.edit(JobDraft::add_interview_round)
    }

    pub fn remove_interview_round(&mut self, index: usize) -> Result<InterviewRound, DraftError> {
        self.try_edit(|draft| draft.remove_interview_round(index))
    }

    pub fn edit_interview_round(&mut self, index: usize, edit: RoundEdit) -> Result<(), DraftError> {
        self.try_edit(|draft| {
            let round = draft
                .interview_rounds_detailed
                .get_mut(index)
                .ok_or(DraftError::NoSuchEntry {
                    list: "interview round",
                    index,
                })?;
            if let Some(name) = edit.name {
                round.round_name = name;
            }
            if let Some(description) = edit.description {
                round.round_description = description;
            }
            if let Some(duration) = edit.duration {
                round.duration = duration;
            }
            Ok(())
        })
    }

    pub fn add_custom_question(&mut self) -> Result<(), DraftError> {
        self.try_edit(JobDraft::add_custom_question)
    }

    pub fn edit_custom_question(&mut self, index: usize, edit: QuestionEdit) -> Result<(), DraftError> {
        let kind = edit
            .kind
            .as_deref()
            .map(|raw| {
                QuestionType::parse(raw).ok_or_else(|| {
                    invalid("type", "expected text, multiple_choice or coding")
                })
            })
            .transpose()?;
        if let Some(weight) = edit.weight {
            if !(MIN_QUESTION_WEIGHT..=MAX_QUESTION_WEIGHT).contains(&weight) {
                return Err(invalid(
                    "weight",
                    format!("expected {}-{}", MIN_QUESTION_WEIGHT, MAX_QUESTION_WEIGHT),
                ));
            }
        }

        self.try_edit(|draft| {
            let question = draft
                .custom_assessment_questions
                .get_mut(index)
                .ok_or(DraftError::NoSuchEntry {
                    list: "custom question",
                    index,
                })?;
            if let Some(text) = edit.question {
                question.question = text;
            }
            if let Some(kind) = kind {
                question.kind = kind;
            }
            if let Some(weight) = edit.weight {
                question.weight = weight;
            }
            if let Some(options) = edit.options {
                question.options = Some(options);
            }
            if let Some(answer) = edit.correct_answer {
                question.correct_answer = Some(answer);
            }
            Ok(())
        })
    }

    pub fn remove_custom_question(&mut self, index: usize) -> Result<CustomQuestion, DraftError> {
        self.try_edit(|draft| {
            if index >= draft.custom_assessment_questions.len() {
                return Err(DraftError::NoSuchEntry {
                    list: "custom question",
                    index,
                });
            }
            Ok(draft.custom_assessment_questions.remove(index))
        })
    }

    pub fn add_screening_question(&mut self, question: &str, required: bool) -> &JobDraft {
        self.edit(|draft| {
            draft.screening_questions.push(ScreeningQuestion {
                question: question.to_string(),
                required,
            })
        })
    }

    pub fn remove_screening_question(&mut self, index: usize) -> Result<ScreeningQuestion, DraftError> {
        self.try_edit(|draft| {
            if index >= draft.screening_questions.len() {
                return Err(DraftError::NoSuchEntry {
                    list: "screening question",
                    index,
                });
            }
            Ok(draft.screening_questions.remove(index))
        })
    }

    /// Appends a trimmed, non-blank entry to a list field. Benefits behave
    /// as a set.
    pub fn push_list(&mut self, field: ListField, value: &str) -> Result<&JobDraft, DraftError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(invalid(field.name(), "entries cannot be blank"));
        }
        Ok(self.edit(|draft| {
            let slot = field.slot(draft);
            if field == ListField::SpecificBenefits && slot.contains(&value) {
                return;
            }
            slot.push(value);
        }))
    }

    pub fn remove_from_list(&mut self, field: ListField, index: usize) -> Result<String, DraftError> {
        self.try_edit(|draft| {
            let slot = field.slot(draft);
            if index >= slot.len() {
                return Err(DraftError::NoSuchEntry {
                    list: field.name(),
                    index,
                });
            }
            Ok(slot.remove(index))
        })
    }

    pub fn clear_list(&mut self, field: ListField) -> &JobDraft {
        self.edit(|draft| field.slot(draft).clear())
    }

    // --- Import / export ---

    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.draft).context("Failed to serialize draft")
    }

    /// Shallow-merges a JSON document over the draft. Malformed input
    /// leaves the draft untouched.
    pub fn import_json(&mut self, raw: &str) -> Result<&JobDraft, DraftError> {
        let fields = coerce::parse_fields(raw)?;
        info!(fields = fields.len(), "imported job draft");
        Ok(self.update(&fields))
    }

    // --- Lifecycle ---

    /// Clears both slots and starts over from an empty draft.
    pub fn discard(&mut self) {
        for key in [DRAFT_KEY, STEP_KEY] {
            if let Err(err) = self.store.remove(key) {
                warn!(error = %format!("{:#}", err), key, "could not clear draft slot");
            }
        }
        self.draft = JobDraft::default();
        self.step = WizardStep::FIRST;
    }

    /// Validates every step, sends the payload and clears the draft once the
    /// backend confirms. On any failure the draft is kept for a retry.
    pub fn submit(&mut self, service: &dyn JobService) -> Result<CreatedJob, SubmitError> {
        if let Some(step) = steps::first_invalid_step(&self.draft) {
            return Err(DraftError::Incomplete {
                step,
                missing: self.missing_fields(step),
            }
            .into());
        }

        let payload = transform_for_submission(&self.draft);
        info!(title = %payload.title, "submitting job posting");

        match service.create_job(&payload) {
            Ok(created) => {
                info!(job_id = %created.id, "job posting created");
                self.discard();
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "job posting submission failed");
                Err(err.into())
            }
        }
    }
}

/// The saved draft, or `None` when the slot is absent, unreadable or
/// corrupt. Corrupt slots are cleared.
fn load_draft(store: &impl KeyValueStore) -> Option<JobDraft> {
    let raw = match store.get(DRAFT_KEY) {
        Ok(raw) => raw?,
        Err(err) => {
            warn!(error = %format!("{:#}", err), "could not read saved job draft");
            return None;
        }
    };

    match coerce::parse_fields(&raw) {
        Ok(fields) => Some(coerce::merge_fields(&JobDraft::default(), &fields)),
        Err(err) => {
            warn!(error = %err, "discarding unreadable job draft");
            if let Err(err) = store.remove(DRAFT_KEY) {
                warn!(error = %format!("{:#}", err), "could not clear unreadable job draft");
            }
            None
        }
    }
}

fn load_step(store: &impl KeyValueStore) -> WizardStep {
    let raw = match store.get(STEP_KEY) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %format!("{:#}", err), "could not read saved wizard step");
            None
        }
    };

    raw.and_then(|raw| raw.trim().parse::<usize>().ok())
        .and_then(WizardStep::from_index)
        .unwrap_or(WizardStep::FIRST)
}

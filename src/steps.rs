use std::fmt;

use crate::models::JobDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Basics,
    Description,
    Compensation,
    Assessment,
    Interview,
    Application,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Basics,
        WizardStep::Description,
        WizardStep::Compensation,
        WizardStep::Assessment,
        WizardStep::Interview,
        WizardStep::Application,
    ];

    pub const FIRST: WizardStep = WizardStep::Basics;
    pub const LAST: WizardStep = WizardStep::Application;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Basics => "Basics",
            WizardStep::Description => "Description",
            WizardStep::Compensation => "Compensation",
            WizardStep::Assessment => "Assessment",
            WizardStep::Interview => "Interview process",
            WizardStep::Application => "Application settings",
        }
    }

    /// The step after this one, saturating at the last step.
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(Self::LAST)
    }

    /// The step before this one, saturating at the first step.
    pub fn prev(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(Self::from_index)
            .unwrap_or(Self::FIRST)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} ({})", self.index() + 1, self.title())
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn has_entry(values: &[String]) -> bool {
    values.iter().any(|value| !blank(value))
}

/// Labels of the fields keeping `step` from being valid. Empty means valid.
pub fn missing_fields(draft: &JobDraft, step: WizardStep) -> Vec<&'static str> {
    let mut missing = Vec::new();

    match step {
        WizardStep::Basics => {
            if blank(&draft.title) {
                missing.push("job title");
            }
            if blank(&draft.niche_category) {
                missing.push("niche category");
            }
            if blank(&draft.location) {
                missing.push("location");
            }
        }
        WizardStep::Description => {
            if blank(&draft.description) {
                missing.push("description");
            }
            if !has_entry(&draft.key_responsibilities) {
                missing.push("at least one key responsibility");
            }
            if !has_entry(&draft.skills) {
                missing.push("at least one required skill");
            }
        }
        WizardStep::Compensation | WizardStep::Application => {}
        WizardStep::Assessment => {
            // min_skills_score is unsigned, so only the tier can be missing
            if draft.requires_assessment && blank(&draft.required_tier) {
                missing.push("required tier");
            }
        }
        WizardStep::Interview => {
            let rounds = &draft.interview_rounds_detailed;
            if rounds.is_empty() {
                missing.push("at least one interview round");
            }
            if rounds.iter().any(|round| blank(&round.round_name)) {
                missing.push("a name for every interview round");
            }
            if rounds.iter().any(|round| blank(&round.round_description)) {
                missing.push("a description for every interview round");
            }
            if blank(&draft.hiring_timeline) {
                missing.push("hiring timeline");
            }
        }
    }

    missing
}

pub fn validate_step(draft: &JobDraft, step: WizardStep) -> bool {
    missing_fields(draft, step).is_empty()
}

/// First step that fails validation, if any.
pub fn first_invalid_step(draft: &JobDraft) -> Option<WizardStep> {
    WizardStep::ALL
        .into_iter()
        .find(|step| !validate_step(draft, *step))
}

/// Looser "has the user filled this in" check used for the progress bar.
pub fn step_completed(draft: &JobDraft, step: WizardStep) -> bool {
    match step {
        WizardStep::Basics => {
            !blank(&draft.title) && !blank(&draft.niche_category) && !blank(&draft.location)
        }
        WizardStep::Description => !blank(&draft.description) && has_entry(&draft.skills),
        WizardStep::Compensation => {
            draft.salary_min > 0 || draft.salary_max > 0 || has_entry(&draft.specific_benefits)
        }
        WizardStep::Assessment => draft.requires_assessment,
        WizardStep::Interview => !draft.interview_rounds_detailed.is_empty(),
        WizardStep::Application => true,
    }
}

/// Percentage of completed steps, 0..=100.
pub fn compute_progress(draft: &JobDraft) -> u8 {
    let total = WizardStep::ALL.len() as f64;
    let completed = WizardStep::ALL
        .into_iter()
        .filter(|step| step_completed(draft, *step))
        .count() as f64;
    (100.0 * completed / total).round() as u8
}

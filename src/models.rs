use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 4] = [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::Contract,
        EmploymentType::Internship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "FULL_TIME",
            EmploymentType::PartTime => "PART_TIME",
            EmploymentType::Contract => "CONTRACT",
            EmploymentType::Internship => "INTERNSHIP",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

/// Seniority of the role. Values outside the known ladder are kept verbatim
/// so that drafts written by newer clients survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExperienceLevel {
    Entry,
    #[default]
    Mid,
    Senior,
    Lead,
    Other(String),
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &str {
        match self {
            ExperienceLevel::Entry => "ENTRY",
            ExperienceLevel::Mid => "MID",
            ExperienceLevel::Senior => "SENIOR",
            ExperienceLevel::Lead => "LEAD",
            ExperienceLevel::Other(raw) => raw,
        }
    }
}

impl From<String> for ExperienceLevel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ENTRY" => ExperienceLevel::Entry,
            "MID" => ExperienceLevel::Mid,
            "SENIOR" => ExperienceLevel::Senior,
            "LEAD" => ExperienceLevel::Lead,
            _ => ExperienceLevel::Other(value),
        }
    }
}

impl From<ExperienceLevel> for String {
    fn from(value: ExperienceLevel) -> Self {
        match value {
            ExperienceLevel::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteType {
    Remote,
    Hybrid,
    #[default]
    Onsite,
}

impl RemoteType {
    pub const ALL: [RemoteType; 3] = [RemoteType::Remote, RemoteType::Hybrid, RemoteType::Onsite];

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteType::Remote => "REMOTE",
            RemoteType::Hybrid => "HYBRID",
            RemoteType::Onsite => "ONSITE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    Text,
    MultipleChoice,
    Coding,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::Text,
        QuestionType::MultipleChoice,
        QuestionType::Coding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Coding => "coding",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub weight: u8, // 1-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

impl Default for CustomQuestion {
    fn default() -> Self {
        Self {
            question: String::new(),
            kind: QuestionType::Text,
            weight: 1,
            options: None,
            correct_answer: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRound {
    pub round_number: u32,
    pub round_name: String,
    pub round_description: String,
    pub duration: String,
}

/// Keeps `round_number` equal to the round's 1-based position.
pub fn renumber_rounds(rounds: &mut [InterviewRound]) {
    for (index, round) in rounds.iter_mut().enumerate() {
        round.round_number = index as u32 + 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScreeningQuestion {
    pub question: String,
    pub required: bool,
}

/// The job posting being composed, one field group per wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    // Basics
    pub title: String,
    pub niche_category: String,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub location: String,
    pub remote_type: RemoteType,

    // Description
    pub description: String,
    pub key_responsibilities: Vec<String>,
    pub skills: Vec<String>,
    pub nice_to_have_skills: Vec<String>,
    pub tech_stack: Vec<String>,

    // Compensation, whole dollars
    pub salary_min: u64,
    pub salary_max: u64,
    pub is_competitive: bool,
    pub equity_offered: bool,
    pub specific_benefits: Vec<String>,

    // Assessment
    pub requires_assessment: bool,
    pub min_skills_score: u8,
    pub required_tier: String,
    pub custom_assessment_questions: Vec<CustomQuestion>,

    // Interview process
    pub interview_rounds_detailed: Vec<InterviewRound>,
    pub hiring_timeline: String,
    pub start_date_needed: String,

    // Application settings
    pub deadline: String,
    pub max_applicants: Option<u32>,
    pub screening_questions: Vec<ScreeningQuestion>,
}

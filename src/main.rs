mod coerce;
mod config;
mod db;
mod draft;
mod error;
mod models;
mod service;
mod steps;
mod submission;
mod telemetry;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use db::Database;
use draft::{DraftController, ListField, QuestionEdit, RoundEdit};
use error::{DraftError, SubmitError};
use models::JobDraft;
use service::{HttpJobService, JobService, ProfileStatus};
use std::path::PathBuf;
use steps::WizardStep;
use submission::transform_for_submission;

#[derive(Parser)]
#[command(name = "jobpost")]
#[command(about = "Compose, save and publish job postings step by step")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the local draft store
    Init,

    /// Show the current draft, wizard step and progress
    Show {
        /// Print the raw draft JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Check that the employer profile exists before posting
    Status,

    /// Set a single field (e.g. title, remoteType, salaryMax, deadline)
    Set {
        /// Field name, as in the exported JSON
        field: String,

        /// New value; an empty string clears text and date fields
        value: String,
    },

    /// Edit list fields (keyResponsibilities, skills, niceToHaveSkills, techStack, specificBenefits)
    List {
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Manage interview rounds
    Round {
        #[command(subcommand)]
        command: RoundCommands,
    },

    /// Manage custom assessment questions (at most 3)
    Question {
        #[command(subcommand)]
        command: QuestionCommands,
    },

    /// Manage screening questions
    Screening {
        #[command(subcommand)]
        command: ScreeningCommands,
    },

    /// Move to the next step if the current one is complete
    Next,

    /// Move to the previous step
    Back,

    /// Jump to a step (1-6)
    Goto {
        step: usize,
    },

    /// Check the current step, or a given one (1-6)
    Validate {
        #[arg(short, long)]
        step: Option<usize>,
    },

    /// Print the payload that would be submitted
    Preview,

    /// Save the draft as a JSON file
    Export {
        /// Output file (defaults to job-draft-YYYY-MM-DD.json)
        path: Option<PathBuf>,
    },

    /// Merge a JSON file into the draft
    Import {
        path: PathBuf,
    },

    /// Publish the job posting
    Submit,

    /// Throw the draft away and start over
    Discard,
}

#[derive(Subcommand)]
enum ListCommands {
    /// Append an entry
    Add { field: String, value: String },

    /// Remove entry number N
    Remove { field: String, number: usize },

    /// Remove every entry
    Clear { field: String },
}

#[derive(Subcommand)]
enum RoundCommands {
    /// Append an empty round
    Add,

    /// Remove round N; later rounds are renumbered
    Remove { number: usize },

    /// Change round N
    Edit {
        number: usize,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        duration: Option<String>,
    },
}

#[derive(Subcommand)]
enum QuestionCommands {
    /// Append an empty text question
    Add,

    /// Change question N
    Edit {
        number: usize,

        #[arg(short, long)]
        question: Option<String>,

        /// text, multiple_choice or coding
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// 1-10
        #[arg(short, long)]
        weight: Option<u8>,

        /// Answer option; repeat for several
        #[arg(short, long = "option")]
        options: Vec<String>,

        #[arg(short, long)]
        answer: Option<String>,
    },

    /// Remove question N
    Remove { number: usize },
}

#[derive(Subcommand)]
enum ScreeningCommands {
    /// Append a screening question
    Add {
        question: String,

        /// Applicants must answer it
        #[arg(short, long)]
        required: bool,
    },

    /// Remove screening question N
    Remove { number: usize },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    telemetry::init(&config.log_level)?;

    let db = Database::open(&config.db_path)?;
    let mut wizard = DraftController::load(db);

    match cli.command {
        Commands::Init => {
            println!("Draft store ready at {}", wizard.store().path().display());
        }

        Commands::Show { json } => {
            if json {
                println!("{}", wizard.export_json()?);
            } else {
                print_draft(&wizard);
            }
        }

        Commands::Status => {
            let service = http_service(&config)?;
            if preflight(&service)? {
                println!("Employer profile found. You can post jobs.");
            }
        }

        Commands::Set { field, value } => {
            wizard.set_field(&field, &value).map_err(|err| match err {
                DraftError::UnknownField(_) => anyhow!(
                    "{}\nSettable fields: {}",
                    err,
                    draft::scalar_field_names().collect::<Vec<_>>().join(", ")
                ),
                other => other.into(),
            })?;
            println!("Updated {}.", field);
        }

        Commands::List { command } => match command {
            ListCommands::Add { field, value } => {
                let field = ListField::parse(&field)?;
                wizard.push_list(field, &value)?;
                println!("Added to {}.", field.name());
            }
            ListCommands::Remove { field, number } => {
                let field = ListField::parse(&field)?;
                let removed = wizard.remove_from_list(field, zero_based(number)?)?;
                println!("Removed '{}' from {}.", removed, field.name());
            }
            ListCommands::Clear { field } => {
                let field = ListField::parse(&field)?;
                wizard.clear_list(field);
                println!("Cleared {}.", field.name());
            }
        },

        Commands::Round { command } => match command {
            RoundCommands::Add => {
                let count = wizard.add_interview_round().interview_rounds_detailed.len();
                println!("Added round {}.", count);
            }
            RoundCommands::Remove { number } => {
                let removed = wizard.remove_interview_round(zero_based(number)?)?;
                println!(
                    "Removed round {} ({}). {} round(s) left.",
                    number,
                    display_or_dash(&removed.round_name),
                    wizard.draft().interview_rounds_detailed.len()
                );
            }
            RoundCommands::Edit {
                number,
                name,
                description,
                duration,
            } => {
                let edit = RoundEdit {
                    name,
                    description,
                    duration,
                };
                wizard.edit_interview_round(zero_based(number)?, edit)?;
                println!("Updated round {}.", number);
            }
        },

        Commands::Question { command } => match command {
            QuestionCommands::Add => {
                wizard.add_custom_question()?;
                println!(
                    "Added question {}.",
                    wizard.draft().custom_assessment_questions.len()
                );
            }
            QuestionCommands::Edit {
                number,
                question,
                kind,
                weight,
                options,
                answer,
            } => {
                let edit = QuestionEdit {
                    question,
                    kind,
                    weight,
                    options: (!options.is_empty()).then_some(options),
                    correct_answer: answer,
                };
                wizard.edit_custom_question(zero_based(number)?, edit)?;
                println!("Updated question {}.", number);
            }
            QuestionCommands::Remove { number } => {
                wizard.remove_custom_question(zero_based(number)?)?;
                println!("Removed question {}.", number);
            }
        },

        Commands::Screening { command } => match command {
            ScreeningCommands::Add { question, required } => {
                wizard.add_screening_question(&question, required);
                println!(
                    "Added screening question {}.",
                    wizard.draft().screening_questions.len()
                );
            }
            ScreeningCommands::Remove { number } => {
                let removed = wizard.remove_screening_question(zero_based(number)?)?;
                println!("Removed '{}'.", removed.question);
            }
        },

        Commands::Next => {
            let step = wizard.advance()?;
            println!("Now at {}.", step);
        }

        Commands::Back => {
            let step = wizard.retreat();
            println!("Now at {}.", step);
        }

        Commands::Goto { step } => {
            let target = step_from_number(step)?;
            let step = wizard.go_to(target)?;
            println!("Now at {}.", step);
        }

        Commands::Validate { step } => {
            let step = match step {
                Some(number) => step_from_number(number)?,
                None => wizard.step(),
            };
            let missing = wizard.missing_fields(step);
            if missing.is_empty() {
                println!("{} is complete.", step);
            } else {
                println!("{} is incomplete. Missing:", step);
                for field in missing {
                    println!("  - {}", field);
                }
            }
        }

        Commands::Preview => {
            let payload = transform_for_submission(wizard.draft());
            let rendered =
                serde_json::to_string_pretty(&payload).context("Failed to render payload")?;
            println!("{}", rendered);
        }

        Commands::Export { path } => {
            let path = path.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "job-draft-{}.json",
                    chrono::Local::now().format("%Y-%m-%d")
                ))
            });
            let exported = wizard.export_json()?;
            std::fs::write(&path, exported)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "exported job draft");
            println!("Draft exported to {}", path.display());
        }

        Commands::Import { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match wizard.import_json(&raw) {
                Ok(_) => println!("Draft imported from {}", path.display()),
                Err(err) => {
                    return Err(anyhow!(
                        "Could not import {}: {}. Your draft was not changed.",
                        path.display(),
                        err
                    ));
                }
            }
        }

        Commands::Submit => {
            let service = http_service(&config)?;
            if !preflight(&service)? {
                return Ok(());
            }

            match wizard.submit(&service) {
                Ok(created) => {
                    println!("Job posted! ID: {}", created.id);
                }
                Err(SubmitError::Draft(err)) => return Err(err.into()),
                Err(SubmitError::Service(err)) => {
                    return Err(anyhow!(
                        "{}\nYour draft was kept; fix the problem and run 'jobpost submit' again.",
                        err
                    ));
                }
            }
        }

        Commands::Discard => {
            wizard.discard();
            println!("Draft discarded.");
        }
    }

    Ok(())
}

fn http_service(config: &Config) -> Result<HttpJobService> {
    HttpJobService::new(&config.api_url, config.api_token.clone())
}

/// Returns false, after pointing the user at profile setup, when the
/// employer has no profile yet.
fn preflight(service: &dyn JobService) -> Result<bool> {
    match service.employer_profile()? {
        ProfileStatus::Ready => Ok(true),
        ProfileStatus::Missing => {
            println!("You need an employer profile before posting jobs.");
            println!("Create one in the employer dashboard, then run this command again.");
            Ok(false)
        }
    }
}

fn zero_based(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Numbers start at 1"))
}

fn step_from_number(number: usize) -> Result<WizardStep> {
    zero_based(number)
        .ok()
        .and_then(WizardStep::from_index)
        .ok_or_else(|| anyhow!("Steps are numbered 1 to {}", WizardStep::ALL.len()))
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = (percent as usize * 20) / 100;
    format!("[{}{}] {}%", "#".repeat(filled), ".".repeat(20 - filled), percent)
}

fn print_draft(wizard: &DraftController<Database>) {
    let draft = wizard.draft();
    let current = wizard.step();

    println!("Job posting draft {}", progress_bar(wizard.progress()));
    println!();
    for step in WizardStep::ALL {
        let marker = if step == current { ">" } else { " " };
        let state = if wizard.validate_step(step) { "ok" } else { "--" };
        println!("{} [{}] {}", marker, state, step);
    }

    println!("\n--- Basics ---");
    println!("Title:       {}", display_or_dash(&draft.title));
    println!("Niche:       {}", display_or_dash(&draft.niche_category));
    println!("Type:        {}", draft.employment_type.as_str());
    println!("Level:       {}", draft.experience_level.as_str());
    println!("Location:    {} ({})", display_or_dash(&draft.location), draft.remote_type.as_str());

    println!("\n--- Description ---");
    if draft.description.trim().is_empty() {
        println!("-");
    } else {
        println!("{}", textwrap::fill(&draft.description, 78));
    }
    print_numbered("Responsibilities", &draft.key_responsibilities);
    println!("Skills:      {}", join_or_dash(&draft.skills));
    println!("Nice to have: {}", join_or_dash(&draft.nice_to_have_skills));
    println!("Tech stack:  {}", join_or_dash(&draft.tech_stack));

    println!("\n--- Compensation ---");
    print_compensation(draft);

    println!("\n--- Assessment ---");
    if draft.requires_assessment {
        println!(
            "Required: min score {}, tier {}",
            draft.min_skills_score,
            display_or_dash(&draft.required_tier)
        );
        for (i, question) in draft.custom_assessment_questions.iter().enumerate() {
            println!(
                "  {}. [{} x{}] {}",
                i + 1,
                question.kind.as_str(),
                question.weight,
                display_or_dash(&question.question)
            );
        }
    } else {
        println!("Not required");
    }

    println!("\n--- Interview process ---");
    for round in &draft.interview_rounds_detailed {
        let duration = if round.duration.trim().is_empty() {
            String::new()
        } else {
            format!(" ({})", round.duration)
        };
        println!(
            "  Round {}: {}{}",
            round.round_number,
            display_or_dash(&round.round_name),
            duration
        );
        if !round.round_description.trim().is_empty() {
            println!("{}", textwrap::indent(&textwrap::fill(&round.round_description, 72), "      "));
        }
    }
    println!("Timeline:    {}", display_or_dash(&draft.hiring_timeline));
    println!("Start date:  {}", display_or_dash(&draft.start_date_needed));

    println!("\n--- Application settings ---");
    println!("Deadline:    {}", display_or_dash(&draft.deadline));
    match draft.max_applicants {
        Some(max) => println!("Max applicants: {}", max),
        None => println!("Max applicants: unlimited"),
    }
    for (i, question) in draft.screening_questions.iter().enumerate() {
        let required = if question.required { " (required)" } else { "" };
        println!("  {}. {}{}", i + 1, question.question, required);
    }
}

fn print_numbered(label: &str, values: &[String]) {
    if values.is_empty() {
        println!("{}: -", label);
        return;
    }
    println!("{}:", label);
    for (i, value) in values.iter().enumerate() {
        println!("  {}. {}", i + 1, value);
    }
}

fn print_compensation(draft: &JobDraft) {
    match (draft.salary_min, draft.salary_max) {
        (0, 0) => println!("Salary:      -"),
        (min, 0) => println!("Salary:      ${}+", min),
        (0, max) => println!("Salary:      up to ${}", max),
        (min, max) => println!("Salary:      ${} - ${}", min, max),
    }
    let mut flags = Vec::new();
    if draft.is_competitive {
        flags.push("competitive");
    }
    if draft.equity_offered {
        flags.push("equity");
    }
    if !flags.is_empty() {
        println!("Extras:      {}", flags.join(", "));
    }
    println!("Benefits:    {}", join_or_dash(&draft.specific_benefits));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_based_rejects_zero() {
        assert_eq!(zero_based(1).unwrap(), 0);
        assert!(zero_based(0).is_err());
    }

    #[test]
    fn test_step_from_number() {
        assert_eq!(step_from_number(1).unwrap(), WizardStep::Basics);
        assert_eq!(step_from_number(6).unwrap(), WizardStep::Application);
        assert!(step_from_number(0).is_err());
        assert!(step_from_number(7).is_err());
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), format!("[{}] 0%", ".".repeat(20)));
        assert_eq!(progress_bar(50), format!("[{}{}] 50%", "#".repeat(10), ".".repeat(10)));
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(20)));
    }

    #[test]
    fn test_cli_parses_round_edit() {
        let cli = Cli::try_parse_from([
            "jobpost", "round", "edit", "2", "--name", "Onsite", "--duration", "4h",
        ])
        .unwrap();
        match cli.command {
            Commands::Round {
                command: RoundCommands::Edit { number, name, description, duration },
            } => {
                assert_eq!(number, 2);
                assert_eq!(name.as_deref(), Some("Onsite"));
                assert_eq!(description, None);
                assert_eq!(duration.as_deref(), Some("4h"));
            }
            _ => panic!("expected round edit"),
        }
    }

    #[test]
    fn test_cli_parses_question_options() {
        let cli = Cli::try_parse_from([
            "jobpost", "question", "edit", "1", "-t", "multiple_choice", "-o", "a", "-o", "b",
        ])
        .unwrap();
        match cli.command {
            Commands::Question {
                command: QuestionCommands::Edit { kind, options, .. },
            } => {
                assert_eq!(kind.as_deref(), Some("multiple_choice"));
                assert_eq!(options, vec!["a", "b"]);
            }
            _ => panic!("expected question edit"),
        }
    }
}

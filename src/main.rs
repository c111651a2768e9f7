use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use stepform::app::App;
use stepform::config::Config;
use stepform::form::{AnswerSheet, FieldValue, FormSchema};
use stepform::logging;
use stepform::profile::{Profile, Routine};
use stepform::ui::install_panic_hook;

#[derive(Parser)]
#[command(name = "stepform")]
#[command(about = "Multi-step terminal forms with validation and sliding steps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// Form definition (TOML); the built-in questionnaire when omitted
    #[arg(short, long)]
    form: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a form definition and list its steps
    Check {
        /// Form definition to check
        #[arg(short, long)]
        form: Option<PathBuf>,
    },

    /// Build a skincare routine without the form
    Routine {
        #[arg(long)]
        name: String,

        #[arg(long)]
        age: u32,

        /// dry, oily, combination, sensitive or normal
        #[arg(long)]
        skin_type: String,

        /// acne, dark_spots, wrinkles or redness (repeatable)
        #[arg(long)]
        condition: Vec<String>,

        /// full, night_only or minimal
        #[arg(long)]
        frequency: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // Determine if we're running in TUI mode (no subcommand)
    let is_tui_mode = cli.command.is_none();

    // Initialize logging (file-based for TUI, stderr for CLI)
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Check { form }) => {
            let path = form.or(cli.form).or_else(|| config.form_path());
            cmd_check(path.as_deref())?;
        }
        Some(Commands::Routine {
            name,
            age,
            skin_type,
            condition,
            frequency,
        }) => {
            let mut answers = AnswerSheet::default();
            answers.set_text("name", name);
            answers.set_text("age", age.to_string());
            answers.set_choice("skin_type", skin_type);
            answers.set("conditions", FieldValue::Many(condition));
            answers.set_choice("frequency", frequency);
            let profile = Profile::from_answers(&answers).context("Invalid routine options")?;
            print_routine(&profile, cli.json)?;
        }
        None => {
            let path = cli.form.or_else(|| config.form_path());
            run_tui(config, path.as_deref(), cli.json, logging_handle.log_file_path)?;
        }
    }

    Ok(())
}

fn cmd_check(path: Option<&Path>) -> Result<()> {
    let form = FormSchema::load_or_builtin(path).context("Form definition is invalid")?;
    println!("{} ({} steps)", form.title, form.total_steps());
    for (i, step) in form.steps.iter().enumerate() {
        println!("  {}. {} [{}]", i + 1, step.title, step.name);
        for field in &step.fields {
            let marker = if field.required { "*" } else { " " };
            println!("     {marker} {} ({:?})", field.name, field.kind);
        }
    }
    Ok(())
}

fn run_tui(
    config: Config,
    form_path: Option<&Path>,
    json: bool,
    log_file_path: Option<PathBuf>,
) -> Result<()> {
    let form = FormSchema::load_or_builtin(form_path).context("Failed to load form")?;

    install_panic_hook();
    let mut app = App::new(config, form);
    let result = app.run();

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    match result? {
        Some(answers) => print_result(&answers, json),
        None => {
            tracing::info!("form closed without submitting");
            Ok(())
        }
    }
}

/// Print the routine for the answers, or the raw answers when they do not
/// describe a skin profile
fn print_result(answers: &AnswerSheet, json: bool) -> Result<()> {
    match Profile::from_answers(answers) {
        Ok(profile) => print_routine(&profile, json)?,
        Err(err) => {
            tracing::debug!(%err, "answers are not a skin profile");
            if json {
                println!("{}", serde_json::to_string_pretty(answers)?);
            } else {
                for (name, value) in answers.iter() {
                    println!("{name}: {}", display_value(value));
                }
            }
        }
    }
    Ok(())
}

fn print_routine(profile: &Profile, json: bool) -> Result<()> {
    let routine = Routine::for_profile(profile);
    if json {
        let out = serde_json::json!({ "profile": profile, "routine": routine });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Routine for {} ({}):", profile.name, profile.age);
        print!("{routine}");
    }
    Ok(())
}

fn display_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Choice(choice) => choice.clone().unwrap_or_default(),
        FieldValue::Many(items) => items.join(", "),
    }
}

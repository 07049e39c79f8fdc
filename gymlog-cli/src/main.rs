use anyhow::{Context, Result, bail};
use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use gymlog::Logbook;
use gymlog::db;
use gymlog::logging::set_log_level;
use gymlog::objects::{NewExerciseTemplate, NewTraining, TrainingUpdate, User};
use gymlog::validation::validate_training_template_data;

#[derive(Parser, Debug)]
#[command(version, about = "Gymlog - training logbook CLI", long_about = None)]
struct Args {
    /// SQLite database file
    #[arg(long, env = "DATABASE_URL", global = true)]
    database: Option<String>,
    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database and apply migrations
    Init,
    AddUser {
        username: String,
    },
    AddExerciseTemplate {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        name: String,
        /// Comma separated, e.g. reps,weight
        #[arg(short, long, value_delimiter = ',', required = true)]
        fields: Vec<String>,
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Share the template with every user
        #[arg(long)]
        admin: bool,
    },
    DeactivateExerciseTemplate {
        #[arg(short, long)]
        user: String,
        id: i64,
    },
    /// List the exercise templates a user may record with
    ExerciseTemplates {
        #[arg(short, long)]
        user: String,
    },
    AddTrainingTemplate {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// JSON file with the template's Notes and Exercises
        file: PathBuf,
    },
    /// Validate a training template file without touching the database
    CheckTemplate {
        file: PathBuf,
    },
    /// Record a training from a JSON file
    Record {
        #[arg(short, long)]
        user: String,
        file: PathBuf,
    },
    /// Update a training from a JSON file; its exercises are replaced
    Update {
        #[arg(short, long)]
        user: String,
        id: i64,
        file: PathBuf,
    },
    Show {
        #[arg(short, long)]
        user: String,
        id: i64,
    },
    /// List trainings, most recent first
    List {
        #[arg(short, long)]
        user: String,
    },
    Delete {
        #[arg(short, long)]
        user: String,
        id: i64,
    },
    /// Best values and volume recorded with an exercise template
    Stats {
        #[arg(short, long)]
        user: String,
        template: i64,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn open_logbook(database: Option<&str>) -> Result<Logbook> {
    if let Some(path) = database {
        db::set_db_path(path).await?;
    }
    Logbook::open_configured().await
}

async fn resolve_user(logbook: &Logbook, username: &str) -> Result<User> {
    match logbook.find_user(username).await? {
        Some(user) => Ok(user),
        None => bail!("Unknown user '{}'", username),
    }
}

/// Trainings recorded from the command line default to now.
fn training_payload(mut payload: Value) -> Result<NewTraining> {
    if let Value::Object(map) = &mut payload {
        map.entry("conducted").or_insert_with(|| {
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
        });
    }
    Ok(serde_json::from_value(payload)?)
}

fn check_template(file: &Path) -> Result<()> {
    let data: Value = read_json(file)?;
    let schema = validate_training_template_data(&data)?;
    println!(
        "Template is valid: {} notes, {} exercises",
        schema.notes.len(),
        schema.exercises.len()
    );
    Ok(())
}

async fn run(logbook: &Logbook, command: Commands) -> Result<()> {
    debug!("Running {:?}", command);

    match command {
        Commands::Init => {
            println!("Database ready at {}", db::db_path().await?);
        }
        Commands::AddUser { username } => {
            print_json(&logbook.create_user(&username).await?)?;
        }
        Commands::AddExerciseTemplate {
            user,
            name,
            fields,
            tags,
            description,
            admin,
        } => {
            let owner = resolve_user(logbook, &user).await?;
            let new = NewExerciseTemplate {
                name,
                description,
                fields,
                tags,
                is_admin: admin,
            };
            print_json(&logbook.create_exercise_template(owner.id, new).await?)?;
        }
        Commands::DeactivateExerciseTemplate { user, id } => {
            let owner = resolve_user(logbook, &user).await?;
            logbook.deactivate_exercise_template(owner.id, id).await?;
            println!("Exercise template {} deactivated", id);
        }
        Commands::ExerciseTemplates { user } => {
            let owner = resolve_user(logbook, &user).await?;
            print_json(&logbook.available_exercise_templates(owner.id).await?)?;
        }
        Commands::AddTrainingTemplate {
            user,
            name,
            description,
            file,
        } => {
            let owner = resolve_user(logbook, &user).await?;
            let data: Value = read_json(&file)?;
            let template = logbook
                .create_training_template(owner.id, &name, description, &data)
                .await?;
            print_json(&template)?;
        }
        Commands::CheckTemplate { file } => check_template(&file)?,
        Commands::Record { user, file } => {
            let owner = resolve_user(logbook, &user).await?;
            let new = training_payload(read_json(&file)?)?;
            print_json(&logbook.create_training(owner.id, new).await?)?;
        }
        Commands::Update { user, id, file } => {
            let owner = resolve_user(logbook, &user).await?;
            let update: TrainingUpdate = read_json(&file)?;
            print_json(&logbook.update_training(owner.id, id, update).await?)?;
        }
        Commands::Show { user, id } => {
            let owner = resolve_user(logbook, &user).await?;
            print_json(&logbook.get_training(owner.id, id).await?)?;
        }
        Commands::List { user } => {
            let owner = resolve_user(logbook, &user).await?;
            print_json(&logbook.list_trainings(owner.id).await?)?;
        }
        Commands::Delete { user, id } => {
            let owner = resolve_user(logbook, &user).await?;
            logbook.delete_training(owner.id, id).await?;
            println!("Training {} deleted", id);
        }
        Commands::Stats { user, template } => {
            let owner = resolve_user(logbook, &user).await?;
            print_json(&logbook.exercise_statistics(owner.id, template).await?)?;
        }
    }

    Ok(())
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    if !set_log_level(&args.log_level) {
        bail!("Unknown log level '{}'", args.log_level);
    }

    match args.command {
        Commands::CheckTemplate { file } => check_template(&file),
        command => {
            let logbook = open_logbook(args.database.as_deref()).await?;
            run(&logbook, command).await
        }
    }
}

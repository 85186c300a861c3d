mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quizex",
    version,
    about = "Extract multiple-choice quizzes from PDF and DOCX exam files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract questions, options and answers from a PDF or DOCX file
    Extract {
        /// Path to a .pdf or .docx file
        input_file: PathBuf,

        /// Input format: pdf or docx (default: from the extension, then the file contents)
        #[arg(short, long)]
        format: Option<String>,

        /// Built-in extraction profile: vi (default), en
        #[arg(short, long, value_name = "NAME", conflicts_with = "config")]
        profile: Option<String>,

        /// Custom JSON options file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the extraction context to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Shuffle questions and/or answers of a saved extraction
    Shuffle {
        /// JSON file written by `quizex extract --out`
        context_file: PathBuf,

        /// Shuffle question order
        #[arg(long)]
        questions: bool,

        /// Shuffle options within each question
        #[arg(long)]
        answers: bool,

        /// Seed for a reproducible shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Write the result to a JSON file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Inspect built-in extraction profiles
    Profiles {
        #[command(subcommand)]
        action: ProfilesAction,
    },
}

#[derive(Subcommand)]
enum ProfilesAction {
    /// List built-in profiles
    List,
    /// Print a profile's settings as JSON
    Show {
        /// Profile name (e.g., "vi")
        name: String,
    },
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    setup_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input_file,
            format,
            profile,
            config,
            output,
            out,
        } => commands::extract::run(input_file, format, profile, config, &output, out),
        Commands::Shuffle {
            context_file,
            questions,
            answers,
            seed,
            out,
        } => commands::shuffle::run(context_file, questions, answers, seed, out),
        Commands::Profiles { action } => match action {
            ProfilesAction::List => commands::profiles::list(),
            ProfilesAction::Show { name } => commands::profiles::show(&name),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

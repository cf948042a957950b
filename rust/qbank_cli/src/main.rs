use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use qbank_render::question::backfill_question_ids;
use qbank_render::{
    assemble_random, available_tags, normalize, parse_latex_document,
    render_formula_with, render_markdown_with_latex_with, segment, PaperFilter, Question,
    RenderConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON render config (macros, error color, link target).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Input {
    /// Read from this file instead of stdin.
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full display pipeline and print HTML.
    Render {
        #[command(flatten)]
        input: Input,
        /// Emit a standalone HTML document.
        #[arg(long)]
        wrap: bool,
    },
    /// Print the normalized text only.
    Normalize {
        #[command(flatten)]
        input: Input,
    },
    /// Typeset one formula.
    Formula {
        latex: String,
        #[arg(long)]
        display: bool,
    },
    /// Split OCR text into content, answer and analysis.
    Segment {
        #[command(flatten)]
        input: Input,
    },
    /// Parse a pasted LaTeX question.
    ParseLatex {
        #[command(flatten)]
        input: Input,
    },
    /// Draw a random paper from a question list.
    Assemble {
        /// JSON array of questions.
        #[arg(long)]
        questions: PathBuf,
        #[arg(long)]
        count: usize,
        #[arg(long)]
        grade: Option<String>,
        #[arg(long = "type")]
        question_type: Option<String>,
        #[arg(long)]
        difficulty: Option<u8>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List every custom tag in a question list.
    Tags {
        #[arg(long)]
        questions: PathBuf,
    },
    /// Assign display IDs to questions that lack one and print the list.
    BackfillIds {
        #[arg(long)]
        questions: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: &Input) -> Result<String> {
    match &input.input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
        }
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s).context("read stdin")?;
            Ok(s)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    RenderConfig::from_json(&raw).with_context(|| format!("parse config {}", path.display()))
}

fn load_questions(path: &Path) -> Result<Vec<Question>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let questions: Vec<Question> =
        serde_json::from_str(&raw).with_context(|| format!("parse questions {}", path.display()))?;
    debug!(count = questions.len(), "loaded questions");
    Ok(questions)
}

fn wrap_document(body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>qbank</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize output")?;
    writeln!(io::stdout(), "{s}").context("write stdout")
}

fn emit(s: &str) -> Result<()> {
    writeln!(io::stdout(), "{s}").context("write stdout")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Render { input, wrap } => {
            let html = render_markdown_with_latex_with(&read_input(&input)?, &cfg);
            emit(&if wrap { wrap_document(&html) } else { html })
        }
        Command::Normalize { input } => emit(&normalize(&read_input(&input)?)),
        Command::Formula { latex, display } => {
            let html = render_formula_with(&latex, display, &cfg);
            if html.is_empty() {
                return Err(anyhow!("empty formula"));
            }
            emit(&html)
        }
        Command::Segment { input } => print_json(&segment(&read_input(&input)?)),
        Command::ParseLatex { input } => print_json(&parse_latex_document(&read_input(&input)?)),
        Command::Assemble {
            questions,
            count,
            grade,
            question_type,
            difficulty,
            tags,
            seed,
        } => {
            let questions = load_questions(&questions)?;
            let filter = PaperFilter {
                grade,
                question_type,
                difficulty,
                tags,
            };
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let ids = assemble_random(&questions, &filter, count, &mut rng)
                .context("assemble paper")?;
            info!(picked = ids.len(), requested = count, "assembled paper");
            print_json(&ids)
        }
        Command::Tags { questions } => print_json(&available_tags(&load_questions(&questions)?)),
        Command::BackfillIds { questions } => {
            let mut questions = load_questions(&questions)?;
            let assigned = backfill_question_ids(&mut questions);
            info!(assigned, "backfilled question ids");
            print_json(&questions)
        }
    }
}

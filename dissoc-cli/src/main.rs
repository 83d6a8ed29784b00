use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Stdout, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dissoc_core::interaction::{Responder, ScriptedResponder, TeeSink, WriterSink};
use dissoc_core::model::corpus::Corpus;
use dissoc_core::model::generation_config::{GenerationConfig, SearchMode};
use dissoc_core::model::generator::{Generator, SessionReport, StopReason, Strategy};
use dissoc_core::model::sampler::Sampler;
use dissoc_core::model::tokenizer::Tokenizer;
use dissoc_core::model::window::Window;
use dissoc_core::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate corpus-flavored nonsense text", long_about = None, name = "dissoc")]
struct CliArgs {
    /// Training text files, concatenated in order.
    #[arg(required = true, value_name = "FILE")]
    inputs: Vec<PathBuf>,

    #[arg(short, long, value_enum, default_value = "window")]
    strategy: CliStrategy,

    #[arg(long, value_name = "FILE", help = "JSON generation settings")]
    config: Option<PathBuf>,

    #[arg(short, long, value_name = "NUM", help = "Tokens per search window")]
    frame_size: Option<usize>,

    #[arg(short, long, value_name = "NUM", help = "Tokens emitted per session")]
    max_steps: Option<usize>,

    #[arg(long, value_name = "NUM", help = "Failed match attempts before giving up")]
    scan_limit: Option<usize>,

    #[arg(long, value_enum)]
    search: Option<CliSearch>,

    #[arg(long, value_name = "NUM", help = "Random seed (default: system clock)")]
    seed: Option<u64>,

    #[arg(short, long, value_name = "FILE", help = "Append the transcript to this file")]
    output: Option<PathBuf>,

    #[arg(short, long, value_name = "TEXT", help = "Starting phrase for the successor chain")]
    phrase: Option<String>,

    #[arg(short, long, help = "Run one session without prompting")]
    yes: bool,
}

// Enums for the CLI parsing layer, to keep clap attributes out of the core
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum CliStrategy {
    Window,
    Markov,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum CliSearch {
    Random,
    FromStart,
}

impl From<CliStrategy> for Strategy {
    fn from(cli: CliStrategy) -> Self {
        match cli {
            CliStrategy::Window => Strategy::Window,
            CliStrategy::Markov => Strategy::Markov,
        }
    }
}

impl From<CliSearch> for SearchMode {
    fn from(cli: CliSearch) -> Self {
        match cli {
            CliSearch::Random => SearchMode::Random,
            CliSearch::FromStart => SearchMode::FromStart,
        }
    }
}

/// Asks the questions on stderr and reads answers from stdin, keeping
/// stdout for the generated text.
///
/// End of input accepts the proposed window, gives no phrase and stops.
struct PromptResponder {
    first_phrase: Option<String>,
}

impl PromptResponder {
    fn ask(question: &str) -> Option<String> {
        eprintln!("\n{question}");
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_owned()),
        }
    }

    fn is_yes(answer: &str) -> bool {
        matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

impl Responder for PromptResponder {
    fn confirm_window(&mut self, window: &Window) -> bool {
        Self::ask(&format!("Starting string: {window}\nAcceptable? (Y/N)")).is_none_or(|a| Self::is_yes(&a))
    }

    fn request_phrase(&mut self, retry: bool) -> Option<String> {
        if let Some(phrase) = self.first_phrase.take() {
            return Some(phrase);
        }
        Self::ask(if retry { "Bad starting phrase, retry." } else { "Start talking." })
    }

    fn continue_session(&mut self, _report: &SessionReport) -> bool {
        Self::ask("Generate again? (Y/N)").is_some_and(|a| Self::is_yes(&a))
    }
}

fn build_config(args: &CliArgs) -> Result<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_file(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(frame_size) = args.frame_size {
        config.set_frame_size(frame_size)?;
    }
    if let Some(max_steps) = args.max_steps {
        config.set_max_steps(max_steps)?;
    }
    if args.scan_limit.is_some() {
        config.scan_limit = args.scan_limit;
    }
    if let Some(search) = args.search {
        config.search = search.into();
    }
    Ok(config)
}

fn open_transcript(path: &Option<PathBuf>) -> io::Result<Option<WriterSink<File>>> {
    path.as_ref()
        .map(|p| OpenOptions::new().create(true).append(true).open(p).map(WriterSink::new))
        .transpose()
}

fn run(args: CliArgs) -> Result<()> {
    let config = build_config(&args)?;
    let sampler = match args.seed {
        Some(seed) => Sampler::seeded(seed),
        None => Sampler::from_clock(),
    };

    let tokenizer = Tokenizer::default();
    let corpus = Corpus::from_paths(&tokenizer, &args.inputs)?;
    let mut generator = Generator::new(corpus, tokenizer, config, sampler)?;

    let console: WriterSink<Stdout> = WriterSink::new(io::stdout());
    let mut sink = TeeSink::new(console, open_transcript(&args.output)?);

    let strategy = Strategy::from(args.strategy);
    let reports = if args.yes {
        let mut responder = ScriptedResponder::new().with_phrases(args.phrase.clone());
        generator.run(strategy, &mut responder, &mut sink)?
    } else {
        let mut responder = PromptResponder { first_phrase: args.phrase.clone() };
        generator.run(strategy, &mut responder, &mut sink)?
    };
    println!();

    for report in &reports {
        if report.reason == StopReason::OutOfVocabulary {
            println!("No starting phrase with a known word; nothing generated.");
        }
        info!(emitted = report.emitted.len(), reason = ?report.reason, "Session finished");
    }
    io::stdout().flush()?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli_args = CliArgs::parse();
    if let Err(e) = run(cli_args) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

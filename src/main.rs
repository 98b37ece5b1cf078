use anyhow::{Context, Result};
use browser_steps::{Recipe, Recorder, Step, StepCommand};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "browser-steps", about = "Build and inspect recorded browser-step recipes")]
struct Cli {
    /// Default log filter when RUST_LOG is unset.
    #[arg(long, env = "BROWSER_STEPS_LOG", default_value = "warn", global = true)]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a JSON-lines log of capture events and print the resulting steps.
    Replay {
        events: PathBuf,
        #[arg(long, default_value = "recording")]
        name: String,
        /// Write the finished recipe here.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the steps of a saved recipe.
    Show { recipe: PathBuf },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    browser_steps::logging::init(&cli.log)?;

    match cli.command {
        Command::Replay { events, name, out } => {
            let recipe = replay(&events, &name)?;
            print_steps(&recipe.steps);
            if let Some(path) = out {
                recipe
                    .save(&path)
                    .with_context(|| format!("write recipe to {}", path.display()))?;
                info!(path = %path.display(), "recipe saved");
            }
        }
        Command::Show { recipe } => {
            let recipe = Recipe::load(&recipe)
                .with_context(|| format!("read recipe {}", recipe.display()))?;
            println!("{}", recipe.name);
            print_steps(&recipe.steps);
        }
    }

    Ok(())
}

fn replay(events: &Path, name: &str) -> Result<Recipe> {
    let file = std::fs::File::open(events)
        .with_context(|| format!("open event log {}", events.display()))?;
    let reader = std::io::BufReader::new(file);
    replay_lines(reader, name)
}

/// Replays one `StepCommand` per line inside a fresh recording session.
fn replay_lines(reader: impl BufRead, name: &str) -> Result<Recipe> {
    let mut recorder = Recorder::new();
    recorder.start();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("read line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let command: StepCommand = serde_json::from_str(&line)
            .with_context(|| format!("line {line_no}: not a step command"))?;
        let outcome = recorder.apply(command)?;
        debug!(line = line_no, ?outcome, "applied");
    }

    Ok(recorder.finish(name)?)
}

fn print_steps(steps: &[Step]) {
    if steps.is_empty() {
        println!("(no steps)");
        return;
    }
    for (number, step) in steps.iter().enumerate() {
        println!("{:>3}. {}", number + 1, step);
    }
}

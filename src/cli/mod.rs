// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All business logic is delegated to Layer 2 (application).
//
// Commands:
//   1. `prepare`  - build dictionaries and encode every split
//   2. `encode`   - encode one file into id lines
//   3. `inspect`  - show one document as ids and tokens
//   4. `schedule` - show the remaining training windows

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EncodeArgs, InspectArgs, PrepareArgs, ScheduleArgs};

#[derive(Parser, Debug)]
#[command(
    name = "summ-vocab",
    version,
    about = "Build summarization vocabularies, encode corpora and plan training windows."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args)  => run_prepare(args),
            Commands::Encode(args)   => run_encode(args),
            Commands::Inspect(args)  => run_inspect(args),
            Commands::Schedule(args) => run_schedule(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    tracing::info!("Preparing datasets in: {}", args.data_dir);
    let data = PrepareUseCase::new(args.into()).execute()?;

    println!(
        "Prepared {} training pairs (document dictionary: {} tokens, summary dictionary: {} tokens).",
        data.train_docs.len(),
        data.doc_dict.len(),
        data.sum_dict.len(),
    );
    if let Some(cover) = data.test_docs.as_ref().and_then(|t| t.coverage()) {
        println!("Document dictionary covers {:.2}% of test words.", cover * 100.0);
    }
    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    use crate::application::encode_use_case::EncodeUseCase;

    let (config, output) = args.split();
    let use_case = EncodeUseCase::new(config)?;
    let corpus = use_case.encode_to(output.as_ref())?;

    if let Some(cover) = corpus.coverage() {
        tracing::info!(
            "Dictionary '{}' covers {:.2}% words",
            use_case.dictionary().name(),
            cover * 100.0
        );
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::encode_use_case::EncodeUseCase;

    let (config, index) = args.split();
    let sample = EncodeUseCase::new(config)?.sample(index)?;

    println!("{}", sample.index);
    println!("{:?}", sample.ids);
    println!("{:?}", sample.tokens);
    Ok(())
}

fn run_schedule(args: ScheduleArgs) -> Result<()> {
    use crate::application::train_use_case::DriverConfig;
    use crate::infra::checkpoint::CheckpointManager;

    let config: DriverConfig = args.into();
    config.validate()?;

    let step = CheckpointManager::new(&config.model_dir).global_step()?;
    let windows = config.plan(step);
    if windows.is_empty() {
        println!("Training already finished at step {}.", step);
        return Ok(());
    }

    println!("Training resumes at step {}:", step);
    for w in &windows {
        println!(
            "  train {:>8} → {:>8}  ({} steps, validate every {}, checkpoint every {}), then evaluate",
            w.start_step, w.target_step, w.steps(), w.steps_per_validation, w.steps_per_checkpoint,
        );
    }
    Ok(())
}

// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the subcommands `prepare`, `encode`, `inspect` and
// `schedule`, and all their configurable flags.
//
// Args structs are converted into application-layer configs
// with `From`, so the application layer never sees clap types.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    encode_use_case::EncodeConfig,
    prepare_use_case::PrepareConfig,
    train_use_case::DriverConfig,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build or load the article/title dictionaries and encode every split
    Prepare(PrepareArgs),

    /// Encode one corpus file into id sequences
    Encode(EncodeArgs),

    /// Show one encoded document next to its tokens
    Inspect(InspectArgs),

    /// Print the training windows the driver would run
    Schedule(ScheduleArgs),
}

/// All arguments for the `prepare` command
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Directory holding the corpus files; dictionaries and reports are written here too
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Training articles, one per line
    #[arg(long, default_value = "train.article.txt")]
    pub train_doc: String,

    /// Training titles, line-aligned with the articles
    #[arg(long, default_value = "train.title.txt")]
    pub train_sum: String,

    /// Validation articles
    #[arg(long, default_value = "valid.article.filter.txt")]
    pub valid_doc: String,

    /// Validation titles
    #[arg(long, default_value = "valid.title.filter.txt")]
    pub valid_sum: String,

    /// Test articles; digits are normalised before encoding
    #[arg(long, default_value = "test.giga.txt")]
    pub test_doc: String,

    /// Skip the validation split
    #[arg(long)]
    pub no_valid: bool,

    /// Skip the test split
    #[arg(long)]
    pub no_test: bool,

    /// Article dictionary file
    #[arg(long, default_value = "doc_dict.txt")]
    pub doc_dict: String,

    /// Title dictionary file
    #[arg(long, default_value = "sum_dict.txt")]
    pub sum_dict: String,

    /// Maximum article vocabulary size, reserved tokens included
    #[arg(long, default_value_t = 30000)]
    pub max_doc_vocab: usize,

    /// Maximum title vocabulary size, reserved tokens included
    #[arg(long, default_value_t = 30000)]
    pub max_sum_vocab: usize,
}

impl From<PrepareArgs> for PrepareConfig {
    fn from(a: PrepareArgs) -> Self {
        PrepareConfig {
            data_dir:      a.data_dir,
            train_doc:     a.train_doc,
            train_sum:     a.train_sum,
            valid_doc:     (!a.no_valid).then_some(a.valid_doc),
            valid_sum:     (!a.no_valid).then_some(a.valid_sum),
            test_doc:      (!a.no_test).then_some(a.test_doc),
            doc_dict:      a.doc_dict,
            sum_dict:      a.sum_dict,
            max_doc_vocab: Some(a.max_doc_vocab),
            max_sum_vocab: Some(a.max_sum_vocab),
        }
    }
}

/// Dictionary options shared by `encode` and `inspect`
#[derive(Args, Debug)]
pub struct DictArgs {
    /// Dictionary file; built from --corpus (or the input) when missing
    #[arg(long)]
    pub dict: PathBuf,

    /// Corpus to build a missing dictionary from
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Name used for the dictionary in log output
    #[arg(long, default_value = "document")]
    pub name: String,

    /// Maximum vocabulary size when building, reserved tokens included
    #[arg(long)]
    pub max_vocab: Option<usize>,

    /// Replace digits with '#' before encoding (test/inference data)
    #[arg(long)]
    pub normalize: bool,
}

impl DictArgs {
    fn into_config(self, input: PathBuf) -> EncodeConfig {
        EncodeConfig {
            input,
            dict:      self.dict,
            corpus:    self.corpus,
            name:      self.name,
            max_vocab: self.max_vocab,
            normalize: self.normalize,
        }
    }
}

/// All arguments for the `encode` command
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Corpus to encode, one document per line
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the ids; stdout if omitted
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub dict: DictArgs,
}

impl EncodeArgs {
    pub fn split(self) -> (EncodeConfig, Option<PathBuf>) {
        (self.dict.into_config(self.input), self.output)
    }
}

/// All arguments for the `inspect` command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Corpus to sample from, one document per line
    #[arg(long)]
    pub input: PathBuf,

    /// Document to show; a random one if omitted
    #[arg(long)]
    pub index: Option<usize>,

    #[command(flatten)]
    pub dict: DictArgs,
}

impl InspectArgs {
    pub fn split(self) -> (EncodeConfig, Option<usize>) {
        (self.dict.into_config(self.input), self.index)
    }
}

/// All arguments for the `schedule` command
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Directory holding the model checkpoint and global_step.json
    #[arg(long, default_value = "model")]
    pub model_dir: String,

    /// Stop training at this global step
    #[arg(long, default_value_t = 300_000)]
    pub max_steps: u64,

    /// Validation interval passed to the training process
    #[arg(long, default_value_t = 1_000)]
    pub steps_per_validation: u64,

    /// Checkpoint interval, also the length of each window
    #[arg(long, default_value_t = 20_000)]
    pub steps_per_checkpoint: u64,

    /// The first window trains straight up to this step
    #[arg(long, default_value_t = 200_000)]
    pub test_threshold: u64,
}

impl From<ScheduleArgs> for DriverConfig {
    fn from(a: ScheduleArgs) -> Self {
        DriverConfig {
            model_dir:            a.model_dir,
            max_steps:            a.max_steps,
            steps_per_validation: a.steps_per_validation,
            steps_per_checkpoint: a.steps_per_checkpoint,
            test_threshold:       a.test_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_prepare_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["summ-vocab", "prepare"]).unwrap();
        let Commands::Prepare(args) = cli.command else {
            panic!("expected prepare");
        };
        assert_eq!(PrepareConfig::from(args), PrepareConfig::default());
    }

    #[test]
    fn test_prepare_can_skip_splits() {
        let cli = Cli::try_parse_from(["summ-vocab", "prepare", "--no-valid", "--no-test"]).unwrap();
        let Commands::Prepare(args) = cli.command else {
            panic!("expected prepare");
        };
        let cfg = PrepareConfig::from(args);
        assert_eq!(cfg.valid_doc, None);
        assert_eq!(cfg.test_doc, None);
    }

    #[test]
    fn test_schedule_defaults_match_driver_defaults() {
        let cli = Cli::try_parse_from(["summ-vocab", "schedule"]).unwrap();
        let Commands::Schedule(args) = cli.command else {
            panic!("expected schedule");
        };
        assert_eq!(DriverConfig::from(args), DriverConfig::default());
    }

    #[test]
    fn test_encode_requires_dict() {
        assert!(Cli::try_parse_from(["summ-vocab", "encode", "--input", "a.txt"]).is_err());
        let cli = Cli::try_parse_from([
            "summ-vocab", "encode", "--input", "a.txt", "--dict", "d.txt", "--normalize",
        ])
        .unwrap();
        let Commands::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        let (cfg, output) = args.split();
        assert!(cfg.normalize);
        assert_eq!(output, None);
        assert_eq!(cfg.input, PathBuf::from("a.txt"));
    }
}

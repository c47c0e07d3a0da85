use anyhow::{Context, Result};
use cladenorm::pipeline::{Mode, RunConfig, TargetGroup, run};
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Normalised distances on gene trees
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tree batch file (seed \t _ \t _ \t newick per line)
    #[arg(short = 'f', long)]
    input: Option<PathBuf>,

    /// Annotation table (.csv)
    #[arg(short, long)]
    groups: Option<PathBuf>,

    /// Species age table (.tsv: phylome, species, age)
    #[arg(short, long)]
    ages: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short = 'c', long)]
    cpus: Option<usize>,

    /// Phylome id, by default the input file name up to the first '_'
    #[arg(short, long)]
    phylome: Option<String>,

    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Target clade as name=column:tag[:seed|:any]; replaces configured targets
    #[arg(short, long = "target")]
    targets: Vec<TargetGroup>,

    /// Process every tree of a pairwise batch
    #[arg(long)]
    no_filter: bool,

    /// Fail if any tree fails
    #[arg(long)]
    strict: bool,

    /// Overwrite existing outputs
    #[arg(long)]
    force: bool,
}

impl Args {
    fn into_config(self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_toml_file(path).with_context(|| format!("loading {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(groups) = self.groups {
            config.groups = groups;
        }
        if self.ages.is_some() {
            config.ages = self.ages;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(cpus) = self.cpus {
            config.workers = cpus;
        }
        if self.phylome.is_some() {
            config.phylome = self.phylome;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if !self.targets.is_empty() {
            config.targets = self.targets;
        }
        config.filter.enabled &= !self.no_filter;
        config.strict |= self.strict;
        config.force |= self.force;

        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config()?;
    let summary = run(&config).context("batch run failed")?;
    if summary.skipped {
        info!("Nothing to do");
    }
    Ok(())
}

//! schicrank - iterative PageRank core cell selection CLI.

use clap::{Parser, Subcommand, ValueEnum};
use schic_rank::data::{CachePolicy, CellPhases, NeighborMap};
use schic_rank::error::Result;
use schic_rank::pipeline::{
    IterationObserver, IterationSnapshot, PrunePolicy, RankConfig, RankController,
};
use std::path::PathBuf;

/// CLI-friendly pruning policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPolicy {
    /// Remove the low-scoring side of the elbow split (keep the core)
    DropLow,
    /// Remove the high-scoring side instead (bulk filtering)
    DropHigh,
}

impl From<CliPolicy> for PrunePolicy {
    fn from(policy: CliPolicy) -> Self {
        match policy {
            CliPolicy::DropLow => PrunePolicy::DropLow,
            CliPolicy::DropHigh => PrunePolicy::DropHigh,
        }
    }
}

/// Iterative PageRank core cell selection
#[derive(Parser)]
#[command(name = "schicrank")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the iterative ranking over a directory of pairwise tables
    Run {
        /// Directory of per-chromosome pairwise-frequency CSV files
        #[arg(short, long)]
        input: PathBuf,

        /// Cell phase metadata CSV (columns: Cell, Phase)
        #[arg(short, long)]
        phases: Option<PathBuf>,

        /// Output path for the removal-report CSV
        #[arg(short, long)]
        output: PathBuf,

        /// YAML configuration; overrides the individual flags below
        #[arg(long)]
        config: Option<PathBuf>,

        /// Top neighbors per cell in each chromosome graph
        #[arg(short, long, default_value = "5")]
        k: usize,

        /// Stop once the active set is at or below this size
        #[arg(long, default_value = "10")]
        min_active: usize,

        /// Which side of the elbow split to remove
        #[arg(long, value_enum, default_value = "drop-low")]
        policy: CliPolicy,

        /// Validate the neighbor-map cache against file stamps instead of
        /// trusting it unconditionally
        #[arg(long)]
        validate_cache: bool,
    },

    /// Build (or load) the neighbor-map cache for a directory
    BuildCache {
        /// Directory of per-chromosome pairwise-frequency CSV files
        #[arg(short, long)]
        input: PathBuf,

        /// Validate an existing cache against file stamps
        #[arg(long)]
        validate_cache: bool,
    },

    /// Write an example YAML configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "rank.yaml")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            phases,
            output,
            config,
            k,
            min_active,
            policy,
            validate_cache,
        } => cmd_run(
            &input,
            phases.as_deref(),
            &output,
            config.as_deref(),
            k,
            min_active,
            policy,
            validate_cache,
        ),

        Commands::BuildCache {
            input,
            validate_cache,
        } => cmd_build_cache(&input, validate_cache),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Progress display for each controller iteration.
struct ProgressObserver;

impl IterationObserver for ProgressObserver {
    fn on_iteration(&mut self, snapshot: &IterationSnapshot<'_>) {
        match snapshot.elbow {
            Some(elbow) => eprintln!(
                "Iteration {}: {} active cells, elbow at {}",
                snapshot.iteration,
                snapshot.cells.len(),
                elbow
            ),
            None => eprintln!(
                "Iteration {}: {} active cells, no elbow",
                snapshot.iteration,
                snapshot.cells.len()
            ),
        }
    }
}

fn cache_policy(validate: bool) -> CachePolicy {
    if validate {
        CachePolicy::Fingerprint
    } else {
        CachePolicy::Trusting
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    input: &std::path::Path,
    phases_path: Option<&std::path::Path>,
    output: &std::path::Path,
    config_path: Option<&std::path::Path>,
    k: usize,
    min_active: usize,
    policy: CliPolicy,
    validate_cache: bool,
) -> Result<()> {
    let config = match config_path {
        Some(path) => {
            eprintln!("Loading configuration from {:?}...", path);
            RankConfig::from_yaml(&std::fs::read_to_string(path)?)?
        }
        None => RankConfig {
            k,
            min_active,
            policy: policy.into(),
            ..Default::default()
        },
    };

    eprintln!("Loading neighbor map from {:?}...", input);
    let map = NeighborMap::build(input, cache_policy(validate_cache))?;
    eprintln!("Loaded {} relation sources", map.len());

    let phases = match phases_path {
        Some(path) => {
            let phases = CellPhases::from_csv(path)?;
            eprintln!("Loaded phases for {} cells", phases.len());
            phases
        }
        None => CellPhases::new(),
    };

    let initial = map.all_cells();
    eprintln!(
        "Ranking {} cells (K={}, floor={})...",
        initial.len(),
        config.k,
        config.min_active
    );

    let controller = RankController::new(config, phases);
    let report = controller.run_with_observer(&map, initial, &mut ProgressObserver)?;

    eprintln!("Writing report to {:?}...", output);
    report.to_csv(output)?;

    let core = report.core_cells();
    eprintln!("Done! {} cells ranked, {} in the final core", report.len(), core.len());

    Ok(())
}

fn cmd_build_cache(input: &std::path::Path, validate_cache: bool) -> Result<()> {
    eprintln!("Building neighbor map for {:?}...", input);
    let map = NeighborMap::build(input, cache_policy(validate_cache))?;
    eprintln!(
        "Done! {} relation sources, {} cells",
        map.len(),
        map.all_cells().len()
    );
    Ok(())
}

fn cmd_example(output: &std::path::Path) -> Result<()> {
    let yaml = RankConfig::default().to_yaml()?;
    std::fs::write(output, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);
    Ok(())
}

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use forest_fire_core::{
    run_workers, Ignition, Normalization, SeedPolicy, Simulator, SweepConfig, DEFAULT_FOREST_SIZE,
    DEFAULT_IGNITION, DEFAULT_N_PROBS, DEFAULT_N_TRIALS,
};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Forest fire spread sweep with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "forest-fire-sweep")]
#[command(about = "Average burned fraction of a forest across fire spread probabilities", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    forest: ForestArgs,

    /// Lowest spread probability in the sweep
    #[arg(long, default_value_t = 0.0)]
    prob_min: f64,

    /// Highest spread probability in the sweep
    #[arg(long, default_value_t = 1.0)]
    prob_max: f64,

    /// Number of probabilities sampled between min and max (at least 2)
    #[arg(short = 'p', long, default_value_t = DEFAULT_N_PROBS)]
    n_probs: usize,

    /// Trials per probability, split across all workers
    #[arg(short, long, default_value_t = DEFAULT_N_TRIALS)]
    trials: usize,

    /// Number of workers
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Divide by the global trial count instead of local trials times workers
    #[arg(long)]
    exact: bool,

    /// Also print the average number of ticks until each fire went out
    #[arg(long)]
    iterations: bool,

    /// Print the result table as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Burn a single forest and print it
    Single {
        /// Probability of fire spreading to each neighbouring tree
        #[arg(long, default_value_t = 0.5)]
        probability: f64,
    },
}

#[derive(ClapArgs, Debug)]
struct ForestArgs {
    /// Trees per row of the square forest
    #[arg(short = 'n', long, default_value_t = DEFAULT_FOREST_SIZE)]
    forest_size: usize,

    /// Row of the first lit tree
    #[arg(long, default_value_t = DEFAULT_IGNITION)]
    ignition_row: usize,

    /// Column of the first lit tree
    #[arg(long, default_value_t = DEFAULT_IGNITION)]
    ignition_col: usize,

    /// Base random seed (defaults to the current time)
    #[arg(short, long)]
    seed: Option<u64>,
}

impl ForestArgs {
    fn ignition(&self) -> Ignition {
        Ignition::new(self.ignition_row, self.ignition_col)
    }

    fn seeds(&self) -> SeedPolicy {
        self.seed.map_or(SeedPolicy::TimeBased, SeedPolicy::Fixed)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    match args.command {
        Some(Command::Single { probability }) => run_single(&args.forest, probability),
        None => run_sweep(args),
    }
}

fn run_sweep(args: &Args) -> Result<()> {
    let config = SweepConfig {
        forest_size: args.forest.forest_size,
        prob_min: args.prob_min,
        prob_max: args.prob_max,
        n_probs: args.n_probs,
        n_trials_total: args.trials,
        ignition: args.forest.ignition(),
        normalization: if args.exact {
            Normalization::Exact
        } else {
            Normalization::Legacy
        },
    };

    let start = Instant::now();
    let table = run_workers(&config, args.workers, args.forest.seeds())
        .context("fire sweep failed")?;
    info!(
        "Total running time: {:.4} seconds on {} workers",
        start.elapsed().as_secs_f64(),
        args.workers
    );

    if args.json {
        let json = serde_json::to_string_pretty(&table).context("failed to encode table")?;
        println!("{json}");
        return Ok(());
    }

    print!("{}", table.render());
    if args.iterations {
        println!();
        print!("{}", table.render_iterations());
    }
    Ok(())
}

fn run_single(forest: &ForestArgs, probability: f64) -> Result<()> {
    let config = SweepConfig {
        forest_size: forest.forest_size,
        prob_min: probability,
        prob_max: probability,
        ignition: forest.ignition(),
        ..SweepConfig::default()
    };
    config.validate().context("invalid forest")?;

    let seed = forest.seeds().base_seed();
    info!("Single trial: p={:.3}, seed {}", probability, seed);

    let mut simulator = Simulator::seeded(config.forest_size, seed);
    let outcome = simulator.run_trial(probability, config.ignition);

    print!("{}", simulator.grid());
    println!("Percent burned = {:.6}", outcome.burned_fraction);
    println!("Iterations = {}", outcome.iterations);
    Ok(())
}

//! corridor — train shout-ahead signal controllers on a three-light arterial.
//!
//! Each light draws its rules from its own pool of randomly generated
//! individuals.  Neighbouring lights announce their intended phase to each
//! other every reevaluation, and cooperative rules may react to those
//! announcements.  Traffic is simulated in process by `ScriptedSimulator`.
//!
//! ```text
//! cargo run -p corridor -- --generations 3 --output output/corridor
//! RUST_LOG=debug cargo run -p corridor -- --config corridor.toml
//! ```

mod config;
mod corridor;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sa_core::SimRng;
use sa_learning::TruncationSelection;
use sa_output::{CsvWriter, EngineOutputObserver};
use sa_sim::{EngineBuilder, Experiment};

use config::DemoConfig;

#[derive(Parser)]
#[command(name = "corridor")]
#[command(version, about = "Shout-ahead signal control on a three-intersection corridor", long_about = None)]
struct Cli {
    /// TOML config file; built-in defaults otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of generations to train
    #[arg(short, long)]
    generations: Option<u32>,

    /// Master RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Probability of following a lighter cooperative rule
    #[arg(long)]
    p_coop: Option<f64>,

    /// Directory for decisions.csv and individuals.csv
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // 1. Configuration: defaults ← file ← flags.
    let mut config = DemoConfig::load(cli.config.as_deref())?;
    if let Some(g) = cli.generations {
        config.schedule.total_generations = g;
    }
    if let Some(s) = cli.seed {
        config.engine.seed = s;
    }
    if let Some(p) = cli.p_coop {
        config.engine.p_coop = p;
    }
    if let Some(dir) = cli.output {
        config.output_dir = dir;
    }
    let seed = config.engine.seed;
    info!(
        generations = config.schedule.total_generations,
        seed,
        p_coop = config.engine.p_coop,
        "corridor starting"
    );

    // 2. Lights, conditions, populations.
    let (store, lights) = corridor::build_store(seed, config.engine.intention_retention)?;
    let catalog = corridor::build_catalog()?;
    let mut rng = SimRng::new(seed).child(0);
    let pools = corridor::build_pools(&lights, &catalog, &config.pool, &mut rng)?;
    info!(
        lights = lights.len(),
        individuals = config.pool.individuals,
        conditions = catalog.individual.len() + catalog.cooperative.len(),
        "corridor built"
    );

    // 3. Engine and generation loop.
    let engine = EngineBuilder::new(config.engine.clone(), store, pools)
        .registry(catalog.registry)
        .build()
        .context("invalid engine setup")?;
    let strategy = TruncationSelection::new(config.pool.survivor_fraction, config.pool.weight_jitter)?;
    let mut experiment = Experiment::new(engine, config.schedule.clone(), strategy)?;

    // 4. Output.
    let writer = CsvWriter::new(&config.output_dir)
        .with_context(|| format!("cannot write to {}", config.output_dir.display()))?;
    let mut obs = EngineOutputObserver::new(writer);

    // 5. Train.
    let demand = config.demand.clone();
    let t0 = Instant::now();
    let report = experiment.run(
        |_generation, run| corridor::build_simulator(&demand, seed, run),
        &mut obs,
    )?;
    let elapsed = t0.elapsed();

    obs.finish()?;
    if let Some(e) = obs.take_error() {
        warn!(error = %e, "some output rows were not written");
    }

    // 6. Summary.
    println!(
        "Trained {} generations over {} runs in {:.3} s",
        report.generations,
        report.runs,
        elapsed.as_secs_f64()
    );
    println!("Output written to {}", config.output_dir.display());
    println!();
    println!("{:<8} {:<8} {:<12} {:>12}", "Light", "Pool", "Individual", "Fitness");
    println!("{}", "-".repeat(44));
    for champion in &report.champions {
        let light = experiment
            .engine()
            .pools()
            .get(champion.pool.index())
            .and_then(|p| p.agents().first())
            .map(|&a| experiment.engine().agents().name(a))
            .unwrap_or("?");
        println!(
            "{:<8} {:<8} {:<12} {:>12.2}",
            light, champion.pool.0, champion.individual.0, champion.fitness
        );
    }

    Ok(())
}

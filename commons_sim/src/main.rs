//! Commons simulator CLI
//!
//! Run baseline scenarios against the step engine, one or many seeds.

use clap::Parser;
use commons_core::EngineConfig;
use commons_sim::scenarios::ScenarioId;
use commons_sim::{RunExport, ScenarioResult, ScenarioRunner, SeedProvider, SimError};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Commons shared-resource simulator
#[derive(Parser, Debug)]
#[command(name = "commons-sim")]
#[command(about = "Run seeded shared-resource scenarios", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of agents (overrides the config file)
    #[arg(short, long)]
    agents: Option<usize>,

    /// Scenario to run (greedy, coop, adaptive, mixed, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of seeds to sweep
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Rounds per run (overrides the config file)
    #[arg(short, long)]
    rounds: Option<u32>,

    /// Engine configuration as a JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output
    #[arg(long)]
    json: bool,

    /// Export the full run to a JSON file (single scenario and seed only)
    #[arg(long)]
    export: Option<String>,

    /// Replay an exported run and check it reproduces the same trajectory
    #[arg(long, conflicts_with = "export")]
    replay: Option<String>,
}

/// Log filter: --verbose > --json > RUST_LOG > "info".
fn log_filter(verbose: bool, json: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else if json {
        EnvFilter::new("warn")
    } else {
        rust_log
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

fn load_config(args: &Args) -> Result<EngineConfig, SimError> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if let Some(agents) = args.agents {
        config.num_agents = agents;
    }
    if let Some(rounds) = args.rounds {
        config.horizon = rounds;
    }
    config.validate()?;
    Ok(config)
}

fn parse_scenarios(name: &str) -> Result<Vec<ScenarioId>, SimError> {
    if name == "all" {
        return Ok(ScenarioId::all());
    }
    name.parse::<ScenarioId>()
        .map(|s| vec![s])
        .map_err(|_| SimError::UnknownScenario(name.to_string()))
}

fn run(args: &Args) -> Result<Vec<ScenarioResult>, SimError> {
    if let Some(path) = &args.replay {
        let export = RunExport::read_from_file(path)?;
        let result = export.verify_replay()?;
        info!("Replayed {} steps of {} from {}: identical", result.records.len(), export.scenario, path);
        return Ok(vec![result]);
    }

    let config = load_config(args)?;
    let scenarios = parse_scenarios(&args.scenario)?;

    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    if args.export.is_some() && (scenarios.len() > 1 || args.seeds > 1) {
        return Err(SimError::InvalidArguments(
            "--export only supports a single scenario and seed".to_string(),
        ));
    }

    let mut results = Vec::new();
    for seed in SeedProvider::new(base_seed).run_seeds(args.seeds.max(1)) {
        let runner = ScenarioRunner::new(config.clone(), seed);
        for scenario in &scenarios {
            let result = runner.run(*scenario)?;

            if !args.json {
                let s = &result.summary;
                info!(
                    "{} (seed={}) steps={} stock={:.3} collapsed={}",
                    scenario.name(),
                    seed,
                    s.steps,
                    s.final_stock,
                    s.collapsed
                );
            }

            if let Some(path) = &args.export {
                RunExport::new(&result).write_to_file(path)?;
                info!("Exported {} steps to {}", result.records.len(), path);
            }

            results.push(result);
        }
    }
    Ok(results)
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let rust_log = std::env::var("RUST_LOG").ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(args.verbose, args.json, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("Commons Simulator v{}", env!("CARGO_PKG_VERSION"));
    }

    let results = match run(&args) {
        Ok(results) => results,
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(1);
        }
    };

    let collapsed = results.iter().filter(|r| r.summary.collapsed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": results.len(),
            "collapsed": collapsed,
            "results": results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "summary": r.summary,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to render summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("{} runs, {} collapsed", results.len(), collapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_flags_override_rust_log() {
        let filter = log_filter(true, false, Some("warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = log_filter(false, true, Some("trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_rust_log_is_honoured() {
        let filter = log_filter(false, false, Some("commons_core=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_default_filter_is_info() {
        assert_eq!(log_filter(false, false, None).max_level_hint(), Some(LevelFilter::INFO));
    }
}

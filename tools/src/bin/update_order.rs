// cargo run --bin update-order -- --scenario scenarios/reentry.toml

use clap::Parser;
use std::path::PathBuf;

use propagator_lib::{environment::EnvironmentUpdater, scenario::Scenario};

/// Print the resolved environment update order of a scenario
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Scenario configuration toml file.
    ///
    /// The default nominal scenario is used when not provided.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Also print the integrated states and their vector layout
    #[arg(short = 'i', long)]
    integrated: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    let scenario = Scenario::load(opts.scenario.as_ref())?;
    let env = scenario.build()?;
    let updater = EnvironmentUpdater::new(&env.bodies, env.update_settings, env.integrated_states)?;

    println!("Scenario '{}'", scenario.name);

    println!("Reset at the start of each step:");
    for entry in updater.reset_entries() {
        println!("  {} {}", entry.kind, entry.body);
    }

    println!("Update order:");
    for (i, entry) in updater.update_entries().iter().enumerate() {
        println!("  {i:3} {entry}");
    }

    if opts.integrated {
        println!("Integrated states:");
        for (state_type, bodies) in updater.integrated_states() {
            let size = state_type.state_size();
            for (i, (body, reference)) in bodies.iter().enumerate() {
                let reference = if reference.is_empty() {
                    String::new()
                } else {
                    format!(" wrt {reference}")
                };
                println!(
                    "  {state_type} [{}..{}] {body}{reference}",
                    i * size,
                    (i + 1) * size
                );
            }
        }
    }

    Ok(())
}

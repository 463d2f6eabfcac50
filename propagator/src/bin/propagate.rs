use clap::Parser;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};
use tracing::info;

use propagator_lib::{
    environment::EnvironmentUpdater,
    propagation::{next_step_size, Propagation},
    scenario::Scenario,
    sim_info::SimulationInfo,
};

#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Scenario configuration toml file.
    ///
    /// The default nominal scenario is used when not provided.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Write JSON lines output to this file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Override the scenario duration [s]
    #[arg(long)]
    duration: Option<f64>,

    /// Override the scenario step size [s]
    #[arg(long)]
    step: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let opts = Opts::parse();

    let intr = interruptor::Interruptor::new();
    let intr_clone = intr.clone();
    ctrlc::set_handler(move || {
        if intr_clone.is_set() {
            let exit_code = if cfg!(target_family = "unix") {
                // 128 (fatal error signal "n") + 2 (control-c is fatal error signal 2)
                130
            } else {
                // Windows code 3221225786
                // -1073741510 == C000013A
                -1073741510
            };
            std::process::exit(exit_code);
        } else {
            intr_clone.set();
        }
    })?;

    let scenario = Scenario::load(opts.scenario.as_ref())?;
    let duration = opts.duration.unwrap_or(scenario.duration);
    let step = opts.step.unwrap_or(scenario.step);
    if step.is_nan() || step <= 0.0 {
        return Err(format!("Step size must be positive, got {step}").into());
    }

    let env = scenario.build()?;
    let updater = EnvironmentUpdater::new(&env.bodies, env.update_settings, env.integrated_states)?;
    info!(
        scenario = scenario.name.as_str(),
        updates = updater.update_entries().len(),
        resets = updater.reset_entries().len(),
        "Built environment updater"
    );

    let mut out: Box<dyn Write> = match opts.output.as_ref() {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut propagation =
        Propagation::new(updater, env.bodies, scenario.start_epoch, env.initial_states)?;
    let mut sim_info = SimulationInfo::new(scenario.start_epoch);
    serde_json::to_writer(&mut out, &propagation.record())?;
    writeln!(out)?;

    let end = scenario.start_epoch + duration;
    while let Some(dt) = next_step_size(propagation.epoch(), end, step) {
        if intr.is_set() {
            break;
        }
        let updates = propagation.step(dt)?;
        sim_info.step(dt, updates);

        if sim_info.step_iteration % scenario.output_every as u64 == 0 {
            serde_json::to_writer(&mut out, &propagation.record())?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    eprintln!("Stopped at\n{sim_info:#?}");

    Ok(())
}

mod interruptor {
    use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    #[repr(transparent)]
    pub struct Interruptor(Arc<AtomicBool>);

    impl Interruptor {
        pub fn new() -> Self {
            Interruptor(Arc::new(AtomicBool::new(false)))
        }

        pub fn set(&self) {
            self.0.store(true, SeqCst);
        }

        pub fn is_set(&self) -> bool {
            self.0.load(SeqCst)
        }
    }

    impl Default for Interruptor {
        fn default() -> Self {
            Self::new()
        }
    }
}

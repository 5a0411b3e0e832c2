use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use sensorstick_algorithms::PcaNormalEstimator;
use sensorstick_capture::{cli::Args, list_name, models_for_list, CaptureDriver};
use sensorstick_io::write_training_set;
use sensorstick_sim::SyntheticSimulator;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.capture_config();
    let models = models_for_list(args.list);

    info!("Capturing features for {}", list_name(args.list));

    let simulator = SyntheticSimulator::with_builtin_catalog(args.simulator_config())
        .context("failed to start the synthetic simulator")?;
    let normals = PcaNormalEstimator::new(args.normal_config());

    let output = config.output_path();
    let mut driver = CaptureDriver::new(simulator, normals, config)
        .context("invalid capture configuration")?;

    let outcome = driver.run(models).context("capture run failed")?;
    info!("capture summary:\n{}", outcome.report);

    write_training_set(&outcome.training_set, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    Ok(())
}

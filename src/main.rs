use anyhow::Context;
use clap::Parser;

use chd_risk::commands;
use chd_risk::config::{Cli, Command};
use chd_risk::telemetry;

fn main() -> anyhow::Result<()> {
	telemetry::init_tracing();
	let cli = Cli::parse();

	match cli.command {
		Command::Fit(args) => {
			commands::fit(&args).with_context(|| format!("fitting on {}", args.data.display()))?;
		},
		Command::Predict(args) => {
			commands::predict(&args).with_context(|| format!("predicting {}", args.data.display()))?;
		},
		Command::Serve(args) => {
			let runtime = tokio::runtime::Builder::new_multi_thread()
				.enable_all()
				.build()
				.context("starting the async runtime")?;

			runtime.block_on(commands::serve(args))?;
		},
	}

	Ok(())
}

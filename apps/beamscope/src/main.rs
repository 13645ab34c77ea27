use clap::Parser;

use beamscope::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	beamscope::run(args)
}

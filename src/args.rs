use clap::{Args as ClapArgs, Parser};
use lloggs::{LoggingArgs, PreArgs, WorkerGuard};
use matrix_orbital_driver::PortConfig;
use miette::{Result, miette};
use tracing::debug;

/// Drive a Matrix Orbital LCD panel over a serial link.
#[derive(Debug, Clone, Parser)]
#[command(
	author,
	version,
	after_help = "Want more detail? Try the long '--help' flag!",
	after_long_help = "Didn't expect this much output? Use the short '-h' flag to get short help."
)]
pub struct Args {
	#[command(flatten)]
	pub logging: LoggingArgs,

	#[command(flatten)]
	pub panel: PanelArgs,

	/// What to do
	#[command(subcommand)]
	pub action: crate::actions::Action,
}

/// Where the panel is.
#[derive(Debug, Clone, ClapArgs)]
pub struct PanelArgs {
	/// Serial port the panel is attached to.
	#[arg(long, env = "MORBITAL_PORT", default_value = "/dev/ttyUSB1")]
	pub port: String,

	/// Baud rate of the serial link.
	///
	/// Matrix Orbital panels ship configured for 19200 baud.
	#[arg(long, env = "MORBITAL_BAUD_RATE", default_value = "19200")]
	pub baud_rate: u32,

	/// Don't open the port; print the bytes that would be written instead.
	///
	/// Each write is printed on its own line, as hex.
	#[arg(long)]
	pub dry_run: bool,
}

impl PanelArgs {
	pub fn config(&self) -> PortConfig {
		PortConfig::new(&self.port, self.baud_rate)
	}
}

pub fn get_args() -> Result<(Args, WorkerGuard)> {
	let log_guard = PreArgs::parse().setup().map_err(|err| miette!("{err}"))?;

	debug!("parsing arguments");
	let args = Args::parse();

	let log_guard = match log_guard {
		Some(g) => g,
		None => args
			.logging
			.setup(|v| match v {
				0 => "info",
				1 => "info,morbital=debug,matrix_orbital_driver=debug",
				2 => "debug",
				3 => "debug,morbital=trace,matrix_orbital_driver=trace",
				_ => "trace",
			})
			.map_err(|err| miette!("{err}"))?,
	};

	debug!(?args, "got arguments");
	Ok((args, log_guard))
}

#[test]
fn verify_cli() {
	use clap::CommandFactory;
	Args::command().debug_assert()
}

#[test]
fn panel_args_defaults() {
	let args = Args::try_parse_from(["morbital", "clear"]).unwrap();
	if std::env::var_os("MORBITAL_PORT").is_none() {
		assert_eq!(args.panel.config().port, PortConfig::default().port);
	}
	if std::env::var_os("MORBITAL_BAUD_RATE").is_none() {
		assert_eq!(args.panel.config().baud_rate, PortConfig::default().baud_rate);
	}
	assert!(!args.panel.dry_run);
}

#[test]
fn panel_args_flags() {
	let args = Args::try_parse_from([
		"morbital",
		"--port",
		"/dev/ttyACM0",
		"--baud-rate",
		"115200",
		"--dry-run",
		"led",
		"1",
		"amber",
	])
	.unwrap();
	assert_eq!(args.panel.config(), PortConfig::new("/dev/ttyACM0", 115200));
	assert!(args.panel.dry_run);
}

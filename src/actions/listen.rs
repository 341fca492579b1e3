use std::io::{self, Write as _};

use clap::Parser;
use matrix_orbital_driver::ListenerReport;
use miette::{IntoDiagnostic, Result, miette};
use serde::Serialize;
use tracing::{debug, info};

use crate::actions::Context;

/// Print keypad presses until interrupted.
///
/// Each key is printed on its own line. Stop with Ctrl-C.
#[derive(Debug, Clone, Parser)]
pub struct ListenArgs {
	/// Output in JSON format, one object per line.
	#[arg(long)]
	pub json: bool,
}

#[derive(Debug, Serialize)]
struct KeyPress {
	key: char,
}

pub async fn run(ctx: Context<ListenArgs>) -> Result<()> {
	let json = ctx.args_top.json;
	let panel = ctx.session()?;

	panel.register_button_callback(move |key| {
		let mut stdout = io::stdout().lock();
		if json {
			serde_json::to_writer(&mut stdout, &KeyPress { key })?;
			writeln!(stdout)?;
		} else {
			writeln!(stdout, "{key}")?;
		}
		Ok(())
	});

	let mut reports = panel.start_listening()?;
	info!("listening for keypresses, press Ctrl-C to stop");

	let outcome = loop {
		tokio::select! {
			res = tokio::signal::ctrl_c() => {
				debug!("interrupted");
				break res.into_diagnostic();
			}
			report = reports.recv() => match report {
				Some(ListenerReport::ReadFailed(err)) => {
					break Err(miette!("lost the panel: {err}"));
				}
				Some(report) => debug!(%report, "listener report"),
				None => break Ok(()),
			}
		}
	};

	panel.close().await?;
	outcome
}

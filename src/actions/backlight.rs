use clap::{Parser, Subcommand};
use miette::Result;

use crate::actions::Context;

/// Control the display backlight.
#[derive(Debug, Clone, Parser)]
pub struct BacklightArgs {
	#[command(subcommand)]
	pub action: BacklightAction,
}

#[derive(Debug, Clone, Subcommand)]
pub enum BacklightAction {
	/// Turn the backlight on.
	On {
		/// Turn off again after this many minutes, up to 255. Zero keeps it on.
		#[arg(long, default_value = "0", allow_negative_numbers = true)]
		minutes: i32,
	},

	/// Turn the backlight off.
	Off,

	/// Set the backlight brightness.
	Brightness {
		/// Brightness, from 0 to 255.
		#[arg(allow_negative_numbers = true)]
		level: i32,

		/// Save as the power-on brightness instead.
		#[arg(long)]
		startup: bool,
	},
}

pub async fn run(ctx: Context<BacklightArgs>) -> Result<()> {
	let panel = ctx.session()?;
	match ctx.args_top.action {
		BacklightAction::On { minutes } => panel.display_backlight_on(minutes).await?,
		BacklightAction::Off => panel.display_backlight_off().await?,
		BacklightAction::Brightness {
			level,
			startup: false,
		} => panel.set_backlight_brightness(level).await?,
		BacklightAction::Brightness {
			level,
			startup: true,
		} => panel.set_startup_backlight_brightness(level).await?,
	}
	panel.close().await?;
	Ok(())
}

use clap::Parser;
use miette::Result;

use crate::actions::Context;

/// Set the display contrast.
#[derive(Debug, Clone, Parser)]
pub struct ContrastArgs {
	/// Contrast, from 0 to 255.
	#[arg(allow_negative_numbers = true)]
	pub level: i32,

	/// Save as the power-on contrast instead.
	#[arg(long)]
	pub startup: bool,
}

pub async fn run(ctx: Context<ContrastArgs>) -> Result<()> {
	let ContrastArgs { level, startup } = ctx.args_top;
	let panel = ctx.session()?;
	if startup {
		panel.set_startup_display_contrast(level).await?;
	} else {
		panel.set_display_contrast(level).await?;
	}
	panel.close().await?;
	Ok(())
}

use clap::Parser;
use miette::Result;

use crate::actions::Context;

/// Clear the display.
///
/// The cursor goes back to the top left.
#[derive(Debug, Clone, Parser)]
pub struct ClearArgs {}

pub async fn run(ctx: Context<ClearArgs>) -> Result<()> {
	let panel = ctx.session()?;
	panel.clear_display().await?;
	panel.close().await?;
	Ok(())
}

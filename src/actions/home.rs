use clap::Parser;
use miette::Result;

use crate::actions::Context;

/// Move the cursor to the top left, without clearing the display.
#[derive(Debug, Clone, Parser)]
pub struct HomeArgs {}

pub async fn run(ctx: Context<HomeArgs>) -> Result<()> {
	let panel = ctx.session()?;
	panel.reset_cursor().await?;
	panel.close().await?;
	Ok(())
}

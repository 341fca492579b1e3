use clap::Parser;
use miette::Result;
use tracing::info;

use crate::actions::Context;

/// Reboot the panel.
///
/// This waits for the panel to come back up before returning, which takes a few seconds.
#[derive(Debug, Clone, Parser)]
pub struct ResetArgs {}

pub async fn run(ctx: Context<ResetArgs>) -> Result<()> {
	let panel = ctx.session()?;
	panel.soft_reset().await?;
	info!("panel is back up");
	panel.close().await?;
	Ok(())
}

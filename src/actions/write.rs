use clap::Parser;
use miette::Result;

use crate::actions::Context;

/// Write text at the cursor.
///
/// The text is sent as-is. The panel wraps at the end of a row.
#[derive(Debug, Clone, Parser)]
pub struct WriteArgs {
	/// Text to write.
	pub text: String,
}

pub async fn run(ctx: Context<WriteArgs>) -> Result<()> {
	let panel = ctx.session()?;
	panel.write_text(ctx.args_top.text).await?;
	panel.close().await?;
	Ok(())
}

use clap::Parser;
use miette::Result;

use crate::actions::Context;

/// Write text at the start of a row.
///
/// The cursor is moved to the first column of the row, the text is written, and the cursor is
/// sent home again.
#[derive(Debug, Clone, Parser)]
pub struct LineArgs {
	/// Row to write on, from 1 (top) to 8 (bottom).
	#[arg(allow_negative_numbers = true)]
	pub row: i32,

	/// Text to write.
	pub text: String,
}

pub async fn run(ctx: Context<LineArgs>) -> Result<()> {
	let LineArgs { row, text } = ctx.args_top.clone();
	let panel = ctx.session()?;
	panel.write_line(row, text).await?;
	panel.close().await?;
	Ok(())
}

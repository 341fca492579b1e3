use clap::Parser;
use miette::Result;

use crate::actions::Context;

/// Move the cursor.
///
/// Positions are 1-based. Text cells go from 1,1 to 27,8; with --pixel, the graphics cursor goes
/// from 1,1 to 192,64.
#[derive(Debug, Clone, Parser)]
pub struct CursorArgs {
	/// Column (or X pixel).
	#[arg(allow_negative_numbers = true)]
	pub x: i32,

	/// Row (or Y pixel).
	#[arg(allow_negative_numbers = true)]
	pub y: i32,

	/// Move the graphics cursor instead of the text cursor.
	#[arg(long)]
	pub pixel: bool,
}

pub async fn run(ctx: Context<CursorArgs>) -> Result<()> {
	let CursorArgs { x, y, pixel } = ctx.args_top;
	let panel = ctx.session()?;
	if pixel {
		panel.set_cursor_pixel(x, y).await?;
	} else {
		panel.set_cursor_position(x, y).await?;
	}
	panel.close().await?;
	Ok(())
}

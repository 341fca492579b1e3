use clap::Parser;
use matrix_orbital_driver::font;
use miette::Result;
use tracing::warn;

use crate::actions::Context;

/// Switch the current font.
///
/// Font 1 is the built-in small filled font, and font 2 is Futura Bk BT 16. Other IDs must have
/// been uploaded to the panel beforehand.
#[derive(Debug, Clone, Parser)]
pub struct FontArgs {
	/// Font ID, from 0 to 255.
	#[arg(allow_negative_numbers = true)]
	pub id: i32,
}

pub async fn run(ctx: Context<FontArgs>) -> Result<()> {
	let id = ctx.args_top.id;
	if ![font::SMALL_FILLED, font::FUTURA_BK_BT_16].contains(&id) {
		warn!(
			id,
			"not a preloaded font; if the panel doesn't have it, text will not render until `morbital reset`"
		);
	}

	let panel = ctx.session()?;
	panel.set_font(id).await?;
	panel.close().await?;
	Ok(())
}

use clap::Parser;
use matrix_orbital_driver::LedColour;
use miette::Result;

use crate::actions::Context;

/// Set one of the LED indicators beside the keypad.
#[derive(Debug, Clone, Parser)]
pub struct LedArgs {
	/// LED to set, from 0 (top) to 2 (bottom).
	#[arg(allow_negative_numbers = true)]
	pub index: i32,

	/// Colour: off, green, red, or amber.
	pub colour: LedColour,
}

pub async fn run(ctx: Context<LedArgs>) -> Result<()> {
	let LedArgs { index, colour } = ctx.args_top;
	let panel = ctx.session()?;
	panel.set_device_led(index, colour).await?;
	panel.close().await?;
	Ok(())
}

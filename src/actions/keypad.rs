use clap::{Parser, Subcommand};
use miette::Result;

use crate::actions::Context;

/// Control the keypad backlight.
#[derive(Debug, Clone, Parser)]
pub struct KeypadArgs {
	#[command(subcommand)]
	pub action: KeypadAction,
}

#[derive(Debug, Clone, Subcommand)]
pub enum KeypadAction {
	/// Turn the keypad backlight on, at full brightness.
	On,

	/// Turn the keypad backlight off.
	Off,

	/// Set the keypad backlight brightness.
	Brightness {
		/// Brightness, from 0 to 255.
		#[arg(allow_negative_numbers = true)]
		level: i32,
	},
}

pub async fn run(ctx: Context<KeypadArgs>) -> Result<()> {
	let panel = ctx.session()?;
	match ctx.args_top.action {
		KeypadAction::On => panel.keypad_backlight_on().await?,
		KeypadAction::Off => panel.keypad_backlight_off().await?,
		KeypadAction::Brightness { level } => panel.set_keypad_backlight_brightness(level).await?,
	}
	panel.close().await?;
	Ok(())
}

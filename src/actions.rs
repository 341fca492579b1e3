use clap::Subcommand;
use miette::Result;
use tracing::{debug, trace};

pub use context::Context;
pub mod context;

macro_rules! commands {
	(
		[$argtype:ty => $ctxcode:block]
		$(
			$modname:ident => $enumname:ident($argname:ident)
		),+
	) => {
		$(
			pub mod $modname;
		)*

		#[derive(Debug, Clone, Subcommand)]
		pub enum Action {
			$(
				$enumname($modname::$argname),
			)*
		}

		pub async fn run(ctx: $argtype) -> Result<()> {
			let ctxfn = $ctxcode;
			match ctxfn(ctx)? {
				$(
					(Action::$enumname(args), ctx) => $modname::run(ctx.with_top(args)).await,
				)*
			}
		}
	};
}

use crate::args::Args;

commands! {
	[Args => {|args: Args| -> Result<(Action, Context<()>)> {
		let ctx = Context::new(args.panel).with_top(args.action);
		debug!(version=%env!("CARGO_PKG_VERSION"), "starting up");
		trace!(?ctx, "context");
		Ok(ctx.take_top())
	}}]

	backlight => Backlight(BacklightArgs),
	clear => Clear(ClearArgs),
	contrast => Contrast(ContrastArgs),
	cursor => Cursor(CursorArgs),
	font => Font(FontArgs),
	home => Home(HomeArgs),
	keypad => Keypad(KeypadArgs),
	led => Led(LedArgs),
	line => Line(LineArgs),
	listen => Listen(ListenArgs),
	reset => Reset(ResetArgs),
	write => Write(WriteArgs)
}

use std::io;

use matrix_orbital_driver::{ByteStream, PanelSession};
use miette::Result;

use crate::{args::PanelArgs, dry_run::HexDump};

#[derive(Clone, Debug)]
pub struct Context<A = ()> {
	pub args_top: A,
	pub panel: PanelArgs,
}

impl Context {
	pub fn new(panel: PanelArgs) -> Self {
		Self {
			args_top: (),
			panel,
		}
	}
}

impl<A> Context<A> {
	pub fn with_top<C>(self, args_top: C) -> Context<C> {
		Context::<C> {
			args_top,
			panel: self.panel,
		}
	}

	pub fn take_top(self) -> (A, Context<()>) {
		(
			self.args_top,
			Context::<()> {
				args_top: (),
				panel: self.panel,
			},
		)
	}

	/// Connect to the panel, or to a hex dump on stdout with `--dry-run`.
	pub fn session(&self) -> Result<PanelSession> {
		let session = PanelSession::new();
		if self.panel.dry_run {
			session.connect(&|| -> io::Result<Box<dyn ByteStream>> { Ok(Box::new(HexDump)) })?;
		} else {
			session.connect(&self.panel.config())?;
		}
		Ok(session)
	}
}

#[cfg(test)]
mod tests {
	use matrix_orbital_driver::{SessionError, SessionState};

	use super::*;

	fn panel(dry_run: bool) -> PanelArgs {
		PanelArgs {
			port: "/dev/morbital-test-does-not-exist".into(),
			baud_rate: 19200,
			dry_run,
		}
	}

	#[tokio::test]
	async fn dry_run_does_not_touch_the_port() {
		let ctx = Context::new(panel(true));
		let session = ctx.session().unwrap();
		assert_eq!(session.state(), SessionState::Connected);

		session.write_line(1, "dry").await.unwrap();
		let err = session.write_line(0, "nope").await.unwrap_err();
		assert!(matches!(err, SessionError::Encoding(_)));
		session.close().await.unwrap();
	}

	#[test]
	fn missing_port_is_an_error() {
		let ctx = Context::new(panel(false));
		assert!(ctx.session().is_err());
	}
}

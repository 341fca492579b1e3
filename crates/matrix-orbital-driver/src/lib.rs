//! A driver for Matrix Orbital graphic LCD panels connected over a serial link.
//!
//! This crate targets the [GLK19264][glk] family (192x64 pixels, 27x8 text cells, three
//! bicolour LEDs and a backlit keypad), and speaks the panel's binary command protocol: every
//! command is a `0xFE` prefix byte followed by a command byte and its parameters, while plain
//! text is sent as-is.
//!
//! The crate is split in two halves:
//! - [`Operation`] and [`encode()`] map display operations to exact wire bytes, validating
//!   parameters against the ranges the hardware accepts. This does no I/O.
//! - [`PanelSession`] owns a [`ByteStream`] (usually a serial port opened from a
//!   [`PortConfig`]), serializes command writes to it, and runs a background listener that
//!   delivers keypad presses to registered callbacks.
//!
//! [glk]: https://www.matrixorbital.com/glk19264-7t-1u
//!
//! # Example
//!
//! ```no_run
//! # use matrix_orbital_driver::{PanelSession, PortConfig, SessionError};
//! # async fn example() -> Result<(), SessionError> {
//! let panel = PanelSession::open(&PortConfig::new("/dev/ttyUSB0", 19200))?;
//! panel.clear_display().await?;
//! panel.write_line(1, "Hello").await?;
//!
//! panel.register_button_callback(|key| {
//! 	println!("pressed {key}");
//! 	Ok(())
//! });
//! let _reports = panel.start_listening()?;
//! # panel.close().await }
//! ```

#[doc(inline)]
pub use commands::{
	COMMAND_PREFIX, Command, CommandBytes, LedColour, Operation, ParameterRange, encode, font, ranges,
};

#[doc(inline)]
pub use decode::{DecodeOutcome, decode_byte};

#[doc(inline)]
pub use error::{Result, SessionError, UnknownColour, ValidationError};

#[doc(inline)]
pub use io::*;

#[doc(inline)]
pub use session::*;

mod commands;
mod decode;
mod error;
mod io;
mod session;

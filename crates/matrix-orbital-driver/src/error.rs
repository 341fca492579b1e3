use std::io;

/// A command parameter was outside the range the panel accepts.
///
/// This is always raised before anything is written to the panel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum ValidationError {
	#[error("{parameter} is out of range: {value} is not within {min}..={max}")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("the panel only accepts {parameter} values from {min} to {max} inclusive"))
	)]
	OutOfRange {
		parameter: &'static str,
		value: i32,
		min: i32,
		max: i32,
	},
}

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum SessionError {
	#[error("panel session is not connected")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("connect the session first; closed sessions cannot be reused"))
	)]
	NotConnected,

	#[error("panel session is already connected")]
	AlreadyConnected,

	#[error("panel session is closed")]
	#[cfg_attr(feature = "miette", diagnostic(help("open a new session instead")))]
	Closed,

	#[error("panel session is already listening for button presses")]
	AlreadyListening,

	#[error("no Tokio runtime to run the button listener on")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("call start_listening from within a Tokio runtime"))
	)]
	NoRuntime,

	#[error(transparent)]
	#[cfg_attr(feature = "miette", diagnostic(transparent))]
	Encoding(#[from] ValidationError),

	#[error("panel I/O error")]
	#[cfg_attr(
		feature = "miette",
		diagnostic(help("check the port name, its permissions, and the cable"))
	)]
	Io(#[from] io::Error),
}

/// A colour name that isn't one of the panel's LED colours.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
#[error("unknown LED colour {0:?}")]
#[cfg_attr(feature = "miette", diagnostic(help("expected one of: off, green, red, amber")))]
pub struct UnknownColour(pub String);

/// Convenience type for Results in this crate.
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

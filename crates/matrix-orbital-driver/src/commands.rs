use std::{fmt, str::FromStr};

use itertools::Itertools;

use crate::error::{UnknownColour, ValidationError};

/// Marker byte that starts every command.
///
/// Anything written without this prefix is displayed as text. `0xFE` never occurs in valid
/// UTF-8, so text can't be mistaken for a command.
pub const COMMAND_PREFIX: u8 = 0xFE;

/// Payload that must follow [`Command::SoftReset`] for the panel to accept it.
const SOFT_RESET_MAGIC: [u8; 4] = [0x4D, 0x4F, 0x75, 0x6E];

/// Panel command bytes.
///
/// This is the subset of the GLK19264 command set this driver uses. Each is sent after
/// [`COMMAND_PREFIX`], followed by its parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
	/// Clear screen.
	///
	/// Clears the contents of the screen. The cursor is not moved.
	ClearScreen = 0x58,

	/// Go home.
	///
	/// Moves the text cursor to the top left of the screen.
	GoHome = 0x48,

	/// Soft reset.
	///
	/// Reboots the panel. Must be followed by the 4-byte magic `MOun`, and the panel doesn't
	/// respond for about 4 seconds afterwards.
	SoftReset = 0xFD,

	/// Set cursor position.
	///
	/// 2 bytes: column (1-27), row (1-8), in character cells of the current font.
	SetCursorPosition = 0x47,

	/// Set cursor coordinate.
	///
	/// 2 bytes: x (1-192), y (1-64), in pixels.
	SetCursorCoordinate = 0x79,

	/// Keypad backlight off.
	KeypadBacklightOff = 0x9B,

	/// Set keypad brightness.
	///
	/// 1 byte: brightness. There's no keypad "on" command, use full brightness instead.
	KeypadBrightness = 0x9C,

	/// Display backlight off.
	BacklightOff = 0x46,

	/// Display backlight on.
	///
	/// 1 byte: minutes to stay on for, 0 for permanently.
	BacklightOn = 0x42,

	/// Set display backlight brightness.
	///
	/// 1 byte: brightness.
	Brightness = 0x99,

	/// Set and save display backlight brightness.
	///
	/// 1 byte: brightness to use from the next power on.
	StartupBrightness = 0x98,

	/// Set display contrast.
	///
	/// 1 byte: contrast.
	Contrast = 0x50,

	/// Set and save display contrast.
	///
	/// 1 byte: contrast to use from the next power on.
	StartupContrast = 0x91,

	/// Set LED indicator.
	///
	/// 2 bytes: LED (0-2, top to bottom), colour (see [`LedColour`]).
	LedIndicator = 0x5A,

	/// Set current font.
	///
	/// 1 byte: font id. Ids refer to fonts uploaded to the panel's memory.
	CurrentFont = 0x31,
}

/// Inclusive bounds for a numeric command parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterRange {
	pub min: i32,
	pub max: i32,
}

impl ParameterRange {
	pub const fn new(min: i32, max: i32) -> Self {
		Self { min, max }
	}

	pub const fn contains(&self, value: i32) -> bool {
		self.min <= value && value <= self.max
	}

	/// Check a value against this range, and narrow it to its wire byte.
	pub fn check(&self, parameter: &'static str, value: i32) -> Result<u8, ValidationError> {
		let out_of_range = || ValidationError::OutOfRange {
			parameter,
			value,
			min: self.min,
			max: self.max,
		};

		if !self.contains(value) {
			return Err(out_of_range());
		}

		u8::try_from(value).map_err(|_| out_of_range())
	}
}

/// Parameter ranges accepted by the panel.
pub mod ranges {
	use super::ParameterRange;

	/// Any single byte.
	pub const BYTE: ParameterRange = ParameterRange::new(0, 255);

	/// Text column, in character cells.
	pub const COLUMN: ParameterRange = ParameterRange::new(1, 27);

	/// Text row, in character cells.
	pub const ROW: ParameterRange = ParameterRange::new(1, 8);

	/// Horizontal pixel coordinate.
	pub const PIXEL_X: ParameterRange = ParameterRange::new(1, 192);

	/// Vertical pixel coordinate.
	pub const PIXEL_Y: ParameterRange = ParameterRange::new(1, 64);

	/// LED indicator index.
	pub const LED_INDEX: ParameterRange = ParameterRange::new(0, 2);

	/// LED indicator colour.
	pub const LED_COLOUR: ParameterRange = ParameterRange::new(0, 3);
}

/// Font ids preloaded on most panels.
///
/// Switching to a font the panel doesn't have can leave the display unreadable until a soft
/// reset.
pub mod font {
	pub const SMALL_FILLED: i32 = 1;
	pub const FUTURA_BK_BT_16: i32 = 2;
}

/// Colours of the LED indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LedColour {
	Off = 0,
	Green = 1,
	Red = 2,
	Amber = 3,
}

impl From<LedColour> for i32 {
	fn from(colour: LedColour) -> Self {
		colour as u8 as _
	}
}

impl FromStr for LedColour {
	type Err = UnknownColour;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"off" => Ok(Self::Off),
			"green" => Ok(Self::Green),
			"red" => Ok(Self::Red),
			"amber" | "yellow" => Ok(Self::Amber),
			_ => Err(UnknownColour(s.into())),
		}
	}
}

/// Something to do on the panel.
///
/// Numeric parameters are plain integers so that out-of-range input can be represented and
/// rejected by [`encode()`], rather than silently wrapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
	ClearDisplay,
	ResetCursor,
	SoftReset,
	SetCursorPosition { x: i32, y: i32 },
	SetCursorPixel { x: i32, y: i32 },
	KeypadBacklightOff,
	SetKeypadBacklightBrightness { level: i32 },
	DisplayBacklightOff,
	DisplayBacklightOn { minutes: i32 },
	SetBacklightBrightness { level: i32 },
	SetStartupBacklightBrightness { level: i32 },
	SetDisplayContrast { level: i32 },
	SetStartupDisplayContrast { level: i32 },
	SetDeviceLed { index: i32, colour: i32 },
	WriteText { text: String },
	SetFont { id: i32 },
}

impl Operation {
	/// Keypad backlight at full brightness.
	pub fn keypad_backlight_on() -> Self {
		Self::SetKeypadBacklightBrightness { level: 255 }
	}

	pub fn device_led(index: i32, colour: LedColour) -> Self {
		Self::SetDeviceLed {
			index,
			colour: colour.into(),
		}
	}

	pub fn text(text: impl Into<String>) -> Self {
		Self::WriteText { text: text.into() }
	}

	/// The three operations that write a whole line: move to the start of the row, write, go
	/// home.
	pub fn write_line(row: i32, text: impl Into<String>) -> [Self; 3] {
		[
			Self::SetCursorPosition { x: 1, y: row },
			Self::text(text),
			Self::ResetCursor,
		]
	}

	/// Short name for logs.
	pub fn name(&self) -> &'static str {
		match self {
			Self::ClearDisplay => "clear-display",
			Self::ResetCursor => "reset-cursor",
			Self::SoftReset => "soft-reset",
			Self::SetCursorPosition { .. } => "set-cursor-position",
			Self::SetCursorPixel { .. } => "set-cursor-pixel",
			Self::KeypadBacklightOff => "keypad-backlight-off",
			Self::SetKeypadBacklightBrightness { .. } => "set-keypad-backlight-brightness",
			Self::DisplayBacklightOff => "display-backlight-off",
			Self::DisplayBacklightOn { .. } => "display-backlight-on",
			Self::SetBacklightBrightness { .. } => "set-backlight-brightness",
			Self::SetStartupBacklightBrightness { .. } => "set-startup-backlight-brightness",
			Self::SetDisplayContrast { .. } => "set-display-contrast",
			Self::SetStartupDisplayContrast { .. } => "set-startup-display-contrast",
			Self::SetDeviceLed { .. } => "set-device-led",
			Self::WriteText { .. } => "write-text",
			Self::SetFont { .. } => "set-font",
		}
	}

	/// Validate parameters and produce the wire bytes.
	pub fn encode(&self) -> Result<CommandBytes, ValidationError> {
		use ranges::*;

		Ok(match self {
			Self::ClearDisplay => CommandBytes::command(Command::ClearScreen, &[]),
			Self::ResetCursor => CommandBytes::command(Command::GoHome, &[]),
			Self::SoftReset => CommandBytes::command(Command::SoftReset, &SOFT_RESET_MAGIC),
			Self::SetCursorPosition { x, y } => CommandBytes::command(
				Command::SetCursorPosition,
				&[COLUMN.check("x", *x)?, ROW.check("y", *y)?],
			),
			Self::SetCursorPixel { x, y } => CommandBytes::command(
				Command::SetCursorCoordinate,
				&[PIXEL_X.check("x", *x)?, PIXEL_Y.check("y", *y)?],
			),
			Self::KeypadBacklightOff => CommandBytes::command(Command::KeypadBacklightOff, &[]),
			Self::SetKeypadBacklightBrightness { level } => {
				CommandBytes::command(Command::KeypadBrightness, &[BYTE.check("level", *level)?])
			}
			Self::DisplayBacklightOff => CommandBytes::command(Command::BacklightOff, &[]),
			Self::DisplayBacklightOn { minutes } => {
				CommandBytes::command(Command::BacklightOn, &[BYTE.check("minutes", *minutes)?])
			}
			Self::SetBacklightBrightness { level } => {
				CommandBytes::command(Command::Brightness, &[BYTE.check("level", *level)?])
			}
			Self::SetStartupBacklightBrightness { level } => {
				CommandBytes::command(Command::StartupBrightness, &[BYTE.check("level", *level)?])
			}
			Self::SetDisplayContrast { level } => {
				CommandBytes::command(Command::Contrast, &[BYTE.check("level", *level)?])
			}
			Self::SetStartupDisplayContrast { level } => {
				CommandBytes::command(Command::StartupContrast, &[BYTE.check("level", *level)?])
			}
			Self::SetDeviceLed { index, colour } => CommandBytes::command(
				Command::LedIndicator,
				&[
					LED_INDEX.check("index", *index)?,
					LED_COLOUR.check("colour", *colour)?,
				],
			),
			Self::WriteText { text } => CommandBytes::text(text),
			Self::SetFont { id } => {
				CommandBytes::command(Command::CurrentFont, &[BYTE.check("id", *id)?])
			}
		})
	}
}

/// Validate an operation and produce its wire bytes.
pub fn encode(op: &Operation) -> Result<CommandBytes, ValidationError> {
	op.encode()
}

/// The exact bytes sent to the panel for one [`Operation`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CommandBytes(Vec<u8>);

impl CommandBytes {
	fn command(command: Command, args: &[u8]) -> Self {
		let mut bytes = Vec::with_capacity(2 + args.len());
		bytes.push(COMMAND_PREFIX);
		bytes.push(command as u8);
		bytes.extend_from_slice(args);
		Self(bytes)
	}

	fn text(text: &str) -> Self {
		Self(text.as_bytes().to_vec())
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Whether these bytes are a command, as opposed to display text.
	pub fn is_command(&self) -> bool {
		self.0.first() == Some(&COMMAND_PREFIX)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl AsRef<[u8]> for CommandBytes {
	fn as_ref(&self) -> &[u8] {
		&self.0
	}
}

impl fmt::Display for CommandBytes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:02X}", self.0.iter().format(" "))
	}
}

impl fmt::Debug for CommandBytes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "CommandBytes[{self}]")
	}
}

use std::{
	fmt,
	io::{self, Read, Write},
	time::Duration,
};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{info, instrument};

/// A duplex byte stream to a panel.
///
/// Reads must not block: when nothing is waiting they return `Ok(0)` or an error of kind
/// [`WouldBlock`](io::ErrorKind::WouldBlock) or [`TimedOut`](io::ErrorKind::TimedOut). Writes
/// may be partial.
pub trait ByteStream: Send {
	/// Write some bytes, returning how many were accepted.
	fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

	/// Read up to `buf.len()` bytes of whatever is waiting.
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

	/// How many bytes are waiting to be read.
	fn bytes_available(&mut self) -> io::Result<usize>;

	fn flush(&mut self) -> io::Result<()>;

	/// Release the underlying resource.
	///
	/// Called once when the session is closed. Dropping the stream must also release it.
	fn close(&mut self) -> io::Result<()> {
		Ok(())
	}
}

/// Something that can open a [`ByteStream`].
pub trait Connector {
	fn connect(&self) -> io::Result<Box<dyn ByteStream>>;
}

impl<F> Connector for F
where
	F: Fn() -> io::Result<Box<dyn ByteStream>>,
{
	fn connect(&self) -> io::Result<Box<dyn ByteStream>> {
		self()
	}
}

/// Serial port settings for a panel.
///
/// Only the port and speed are configurable: the panel always uses 8 data bits, no parity, one
/// stop bit, and no flow control.
///
/// It implements [`Default`] with the factory settings of a GLK19264 on a USB adapter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PortConfig {
	/// Serial port to use.
	///
	/// Defaults to `/dev/ttyUSB1`.
	pub port: String,

	/// Baud rate.
	///
	/// Defaults to 19200.
	pub baud_rate: u32,
}

impl Default for PortConfig {
	fn default() -> Self {
		Self {
			port: "/dev/ttyUSB1".into(),
			baud_rate: 19200,
		}
	}
}

impl PortConfig {
	pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
		Self {
			port: port.into(),
			baud_rate,
		}
	}

	/// Open the serial port.
	///
	/// The port is opened with a zero timeout so reads never block.
	#[instrument(level = "debug")]
	pub fn open(&self) -> io::Result<SerialStream> {
		let port = serialport::new(&self.port, self.baud_rate)
			.data_bits(DataBits::Eight)
			.parity(Parity::None)
			.stop_bits(StopBits::One)
			.flow_control(FlowControl::None)
			.timeout(Duration::ZERO)
			.open()?;

		info!(port=%self.port, baud_rate=%self.baud_rate, "connected to panel");
		Ok(SerialStream { port })
	}
}

impl Connector for PortConfig {
	fn connect(&self) -> io::Result<Box<dyn ByteStream>> {
		Ok(Box::new(self.open()?))
	}
}

/// A panel connected over a serial port.
pub struct SerialStream {
	port: Box<dyn SerialPort>,
}

impl fmt::Debug for SerialStream {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SerialStream")
			.field("port", &self.port.name())
			.finish()
	}
}

impl ByteStream for SerialStream {
	fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
		self.port.write(bytes)
	}

	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		match self.port.read(buf) {
			Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(0),
			res => res,
		}
	}

	fn bytes_available(&mut self) -> io::Result<usize> {
		let waiting = self.port.bytes_to_read()?;
		Ok(waiting as _)
	}

	fn flush(&mut self) -> io::Result<()> {
		self.port.flush()
	}
}

/// Whether an I/O error just means "not right now".
pub(crate) fn is_transient(err: &io::Error) -> bool {
	matches!(
		err.kind(),
		io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_port_config() {
		let config = PortConfig::default();
		assert_eq!(config.port, "/dev/ttyUSB1");
		assert_eq!(config.baud_rate, 19200);
	}

	#[test]
	fn test_port_config_fills_defaults() {
		let config: PortConfig =
			serde_json::from_str(r#"{ "port": "/dev/ttyACM0" }"#).unwrap();
		assert_eq!(config, PortConfig::new("/dev/ttyACM0", 19200));

		let config: PortConfig = serde_json::from_str(r#"{ "baud-rate": 115200 }"#).unwrap();
		assert_eq!(config, PortConfig::new("/dev/ttyUSB1", 115200));
	}

	#[test]
	fn test_opening_missing_port_fails() {
		let config = PortConfig::new("/dev/this-port-does-not-exist", 19200);
		assert!(config.open().is_err());
	}

	#[test]
	fn test_transient_errors() {
		assert!(is_transient(&io::ErrorKind::WouldBlock.into()));
		assert!(is_transient(&io::ErrorKind::TimedOut.into()));
		assert!(!is_transient(&io::ErrorKind::BrokenPipe.into()));
	}
}

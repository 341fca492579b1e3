use std::io::{self, Write as _};

use itertools::Itertools;
use matrix_orbital_driver::ByteStream;

/// A stand-in panel that prints every write to stdout as hex.
///
/// It never has anything to read, so listening on it just waits.
#[derive(Debug, Default)]
pub struct HexDump;

impl ByteStream for HexDump {
	fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
		let mut stdout = io::stdout().lock();
		writeln!(
			stdout,
			"{}",
			bytes.iter().format_with(" ", |b, f| f(&format_args!("{b:02X}")))
		)?;
		Ok(bytes.len())
	}

	fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
		Ok(0)
	}

	fn bytes_available(&mut self) -> io::Result<usize> {
		Ok(0)
	}

	fn flush(&mut self) -> io::Result<()> {
		io::stdout().flush()
	}
}

#![allow(dead_code)] // not every test file uses every helper

use std::{
	collections::VecDeque,
	io,
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use matrix_orbital_driver::{ByteStream, Connector, PanelSession};
use tokio::time::{sleep, timeout};

/// What the fake panel has seen, and how it should behave.
#[derive(Debug, Default)]
pub struct Wire {
	/// Bytes accepted by each write call.
	pub writes: Vec<Vec<u8>>,
	/// Bytes waiting to be read, as if keys were pressed.
	pub input: VecDeque<u8>,
	pub flushes: usize,
	pub closes: usize,
	/// Accept at most this many bytes per write.
	pub max_chunk: Option<usize>,
	/// Refuse every other write with `WouldBlock`.
	pub stall_alternate_writes: bool,
	stalled: bool,
	/// Fail any read.
	pub fail_reads: bool,
}

/// An in-memory panel, shared between the test and the session.
#[derive(Debug, Clone, Default)]
pub struct FakePanel(Arc<Mutex<Wire>>);

impl FakePanel {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn wire(&self) -> MutexGuard<'_, Wire> {
		self.0.lock().unwrap()
	}

	pub fn writes(&self) -> Vec<Vec<u8>> {
		self.wire().writes.clone()
	}

	/// Everything written, concatenated.
	pub fn sent(&self) -> Vec<u8> {
		self.wire().writes.concat()
	}

	pub fn press(&self, bytes: &[u8]) {
		self.wire().input.extend(bytes);
	}

	pub fn connector(&self) -> impl Connector {
		let panel = self.clone();
		move || -> io::Result<Box<dyn ByteStream>> { Ok(Box::new(panel.clone())) }
	}

	pub fn session(&self) -> PanelSession {
		let session = PanelSession::new();
		session.connect(&self.connector()).unwrap();
		session
	}
}

impl ByteStream for FakePanel {
	fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
		let mut wire = self.wire();
		if wire.stall_alternate_writes {
			wire.stalled = !wire.stalled;
			if wire.stalled {
				return Err(io::ErrorKind::WouldBlock.into());
			}
		}

		let n = wire.max_chunk.map_or(bytes.len(), |max| max.min(bytes.len()));
		wire.writes.push(bytes[..n].to_vec());
		Ok(n)
	}

	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let mut wire = self.wire();
		if wire.fail_reads {
			return Err(io::ErrorKind::BrokenPipe.into());
		}

		let mut n = 0;
		while n < buf.len() {
			let Some(byte) = wire.input.pop_front() else {
				break;
			};
			buf[n] = byte;
			n += 1;
		}
		Ok(n)
	}

	fn bytes_available(&mut self) -> io::Result<usize> {
		let wire = self.wire();
		if wire.fail_reads {
			return Ok(1);
		}
		Ok(wire.input.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		self.wire().flushes += 1;
		Ok(())
	}

	fn close(&mut self) -> io::Result<()> {
		self.wire().closes += 1;
		Ok(())
	}
}

/// Wait (for a bounded time) until a condition holds.
pub async fn eventually(mut check: impl FnMut() -> bool) {
	timeout(Duration::from_secs(5), async {
		while !check() {
			sleep(Duration::from_millis(2)).await;
		}
	})
	.await
	.expect("condition was not met in time");
}

use std::{
	error::Error as StdError,
	fmt, io,
	panic::{AssertUnwindSafe, catch_unwind},
	sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
	time::Duration,
};

use tokio::{
	runtime::Handle,
	sync::{Mutex as AsyncMutex, mpsc},
	task::{JoinHandle, yield_now},
	time::sleep,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{
	commands::{CommandBytes, LedColour, Operation},
	decode::{DecodeOutcome, decode_byte},
	error::{Result, SessionError},
	io::{ByteStream, Connector, PortConfig, is_transient},
};

/// How long the listener waits between polls when no input is waiting.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long the panel takes to come back after a soft reset.
pub const SOFT_RESET_QUIESCENCE: Duration = Duration::from_secs(4);

/// Error returned by a button callback.
pub type CallbackError = Box<dyn StdError + Send + Sync>;

type ButtonCallback = Arc<dyn Fn(char) -> Result<(), CallbackError> + Send + Sync>;

/// Lifecycle of a [`PanelSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
	/// No stream yet.
	Disconnected,

	/// Stream open, commands can be sent.
	Connected,

	/// Stream open, and the button listener is running.
	Listening,

	/// Stream released. Terminal.
	Closed,
}

/// Something the button listener couldn't handle.
///
/// These are logged as well as sent on the channel returned by
/// [`PanelSession::start_listening()`].
#[derive(Debug)]
pub enum ListenerReport {
	/// A byte that isn't a character on its own was received and dropped.
	Malformed(u8),

	/// A callback returned an error. Later callbacks still ran.
	CallbackFailed {
		index: usize,
		key: char,
		error: CallbackError,
	},

	/// A callback panicked. Later callbacks still ran.
	CallbackPanicked { index: usize, key: char },

	/// Reading from the stream failed. The listener has stopped.
	ReadFailed(io::Error),
}

impl fmt::Display for ListenerReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Malformed(byte) => write!(f, "received non-UTF-8 byte {byte:02X}"),
			Self::CallbackFailed { index, key, error } => {
				write!(f, "button callback #{index} failed on {key:?}: {error}")
			}
			Self::CallbackPanicked { index, key } => {
				write!(f, "button callback #{index} panicked on {key:?}")
			}
			Self::ReadFailed(err) => write!(f, "reading from panel failed: {err}"),
		}
	}
}

/// Receiving end of the listener's reports.
pub type ListenerReports = mpsc::UnboundedReceiver<ListenerReport>;

/// A connection to a panel.
///
/// All methods take `&self`, so a session can be shared (e.g. in an [`Arc`]) between tasks.
/// Writes are serialized: a command's bytes are never interleaved with another's on the wire.
pub struct PanelSession {
	shared: Arc<Shared>,
	writer: AsyncMutex<()>,
	listener: Mutex<Option<Listener>>,
}

/// State shared with the listener task.
struct Shared {
	state: Mutex<SessionState>,
	stream: Mutex<Option<Box<dyn ByteStream>>>,
	callbacks: RwLock<Vec<ButtonCallback>>,
}

struct Listener {
	cancel: CancellationToken,
	handle: JoinHandle<()>,
}

fn connectable(state: SessionState) -> Result<()> {
	match state {
		SessionState::Disconnected => Ok(()),
		SessionState::Closed => Err(SessionError::Closed),
		SessionState::Connected | SessionState::Listening => Err(SessionError::AlreadyConnected),
	}
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for PanelSession {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for PanelSession {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PanelSession")
			.field("state", &self.state())
			.field("callbacks", &self.shared.callback_count())
			.finish_non_exhaustive()
	}
}

impl PanelSession {
	/// Create a disconnected session.
	pub fn new() -> Self {
		Self {
			shared: Arc::new(Shared {
				state: Mutex::new(SessionState::Disconnected),
				stream: Mutex::new(None),
				callbacks: RwLock::new(Vec::new()),
			}),
			writer: AsyncMutex::new(()),
			listener: Mutex::new(None),
		}
	}

	/// Open a serial port and connect a new session to it.
	pub fn open(config: &PortConfig) -> Result<Self> {
		let session = Self::new();
		session.connect(config)?;
		Ok(session)
	}

	pub fn state(&self) -> SessionState {
		*lock(&self.shared.state)
	}

	/// Acquire the stream.
	///
	/// Only a [`Disconnected`](SessionState::Disconnected) session can be connected.
	#[instrument(level = "debug", skip(self, connector))]
	pub fn connect(&self, connector: &impl Connector) -> Result<()> {
		connectable(self.state())?;
		let mut stream = connector.connect()?;

		// the session may have been closed while the port was opening
		let mut state = lock(&self.shared.state);
		if let Err(err) = connectable(*state) {
			drop(state);
			stream.close()?;
			return Err(err);
		}

		*lock(&self.shared.stream) = Some(stream);
		*state = SessionState::Connected;
		debug!("panel session connected");
		Ok(())
	}

	fn ensure_connected(&self) -> Result<()> {
		match self.state() {
			SessionState::Connected | SessionState::Listening => Ok(()),
			SessionState::Disconnected | SessionState::Closed => Err(SessionError::NotConnected),
		}
	}

	/// Validate and send one operation.
	///
	/// Nothing is written if the parameters are out of range.
	#[instrument(level = "debug", skip(self, op), fields(op = op.name()))]
	pub async fn dispatch(&self, op: &Operation) -> Result<()> {
		let _writing = self.writer.lock().await;
		self.ensure_connected()?;
		let bytes = op.encode()?;
		self.transmit(&bytes).await
	}

	/// Write a whole command, looping over partial writes.
	///
	/// Must be called with the writer lock held.
	async fn transmit(&self, bytes: &CommandBytes) -> Result<()> {
		trace!(%bytes, "writing to panel");

		let mut remaining = bytes.as_bytes();
		while !remaining.is_empty() {
			let written = {
				let mut stream = lock(&self.shared.stream);
				let stream = stream.as_mut().ok_or(SessionError::NotConnected)?;
				match stream.write(remaining) {
					Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero).into()),
					Ok(n) => n,
					Err(err) if is_transient(&err) => 0,
					Err(err) => return Err(err.into()),
				}
			};

			if written == 0 {
				sleep(POLL_INTERVAL).await;
			} else {
				remaining = &remaining[written..];
			}
		}

		lock(&self.shared.stream)
			.as_mut()
			.ok_or(SessionError::NotConnected)?
			.flush()?;
		Ok(())
	}

	/// Reboot the panel, and wait for it to come back.
	///
	/// This returns after [`SOFT_RESET_QUIESCENCE`]. Commands sent before then are likely to be
	/// lost, but nothing stops other tasks from sending them. The button listener keeps running.
	#[instrument(level = "debug", skip(self))]
	pub async fn soft_reset(&self) -> Result<()> {
		self.dispatch(&Operation::SoftReset).await?;
		info!(wait=?SOFT_RESET_QUIESCENCE, "panel is rebooting");
		sleep(SOFT_RESET_QUIESCENCE).await;
		Ok(())
	}

	/// Write text at the start of a row, then send the cursor home.
	///
	/// The three commands are sent back to back, with nothing from other tasks in between. If
	/// the row is out of range, nothing is sent.
	#[instrument(level = "debug", skip(self, text))]
	pub async fn write_line(&self, row: i32, text: impl Into<String>) -> Result<()> {
		let sequence = Operation::write_line(row, text)
			.iter()
			.map(Operation::encode)
			.collect::<Result<Vec<_>, _>>()?;

		let _writing = self.writer.lock().await;
		self.ensure_connected()?;
		for bytes in &sequence {
			self.transmit(bytes).await?;
		}
		Ok(())
	}

	/// Add a callback for key presses.
	///
	/// Callbacks are called in the order they were registered, from the listener task, and
	/// should return quickly. They can't be removed.
	pub fn register_button_callback<F>(&self, callback: F)
	where
		F: Fn(char) -> Result<(), CallbackError> + Send + Sync + 'static,
	{
		self.shared
			.callbacks
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.push(Arc::new(callback));
		trace!(count = self.shared.callback_count(), "registered button callback");
	}

	/// Start the button listener.
	///
	/// This spawns a task, so must be called from within a Tokio runtime, or it fails with
	/// [`SessionError::NoRuntime`]. Problems the listener runs into are sent on the returned
	/// channel; it's fine to drop it.
	#[instrument(level = "debug", skip(self))]
	pub fn start_listening(&self) -> Result<ListenerReports> {
		let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
		let mut listener = lock(&self.listener);
		{
			let mut state = lock(&self.shared.state);
			match *state {
				SessionState::Connected => {}
				SessionState::Listening => return Err(SessionError::AlreadyListening),
				SessionState::Disconnected | SessionState::Closed => {
					return Err(SessionError::NotConnected);
				}
			}
			*state = SessionState::Listening;
		}

		let (reports, rx) = mpsc::unbounded_channel();
		let cancel = CancellationToken::new();
		let handle = runtime.spawn(listen(self.shared.clone(), cancel.clone(), reports));
		*listener = Some(Listener { cancel, handle });
		Ok(rx)
	}

	/// Stop the button listener, if it's running.
	///
	/// Returns once the listener task has exited, which is within one [`POLL_INTERVAL`] unless a
	/// callback is slow.
	#[instrument(level = "debug", skip(self))]
	pub async fn stop_listening(&self) {
		let listener = lock(&self.listener).take();
		if let Some(Listener { cancel, handle }) = listener {
			cancel.cancel();
			if let Err(err) = handle.await {
				error!("button listener task failed: {err}");
			}
		}

		let mut state = lock(&self.shared.state);
		if *state == SessionState::Listening {
			*state = SessionState::Connected;
		}
	}

	/// Stop listening, and release the stream.
	///
	/// Waits for any write in progress to finish first. Closing a closed session does nothing.
	#[instrument(level = "debug", skip(self))]
	pub async fn close(&self) -> Result<()> {
		{
			let mut state = lock(&self.shared.state);
			if *state == SessionState::Closed {
				trace!("session already closed");
				return Ok(());
			}
			*state = SessionState::Closed;
		}

		self.stop_listening().await;

		let _writing = self.writer.lock().await;
		let stream = lock(&self.shared.stream).take();
		if let Some(mut stream) = stream {
			stream.close()?;
			debug!("released panel stream");
		}
		Ok(())
	}

	pub async fn clear_display(&self) -> Result<()> {
		self.dispatch(&Operation::ClearDisplay).await
	}

	/// Send the text cursor to the top left.
	pub async fn reset_cursor(&self) -> Result<()> {
		self.dispatch(&Operation::ResetCursor).await
	}

	/// Move the text cursor, in character cells from 1.
	pub async fn set_cursor_position(&self, x: i32, y: i32) -> Result<()> {
		self.dispatch(&Operation::SetCursorPosition { x, y }).await
	}

	/// Move the graphics cursor, in pixels from 1.
	pub async fn set_cursor_pixel(&self, x: i32, y: i32) -> Result<()> {
		self.dispatch(&Operation::SetCursorPixel { x, y }).await
	}

	pub async fn keypad_backlight_on(&self) -> Result<()> {
		self.dispatch(&Operation::keypad_backlight_on()).await
	}

	pub async fn keypad_backlight_off(&self) -> Result<()> {
		self.dispatch(&Operation::KeypadBacklightOff).await
	}

	pub async fn set_keypad_backlight_brightness(&self, level: i32) -> Result<()> {
		self.dispatch(&Operation::SetKeypadBacklightBrightness { level })
			.await
	}

	/// Turn the display backlight on for some minutes, or 0 for good.
	pub async fn display_backlight_on(&self, minutes: i32) -> Result<()> {
		self.dispatch(&Operation::DisplayBacklightOn { minutes })
			.await
	}

	pub async fn display_backlight_off(&self) -> Result<()> {
		self.dispatch(&Operation::DisplayBacklightOff).await
	}

	pub async fn set_backlight_brightness(&self, level: i32) -> Result<()> {
		self.dispatch(&Operation::SetBacklightBrightness { level })
			.await
	}

	/// Set the backlight brightness used from power on.
	pub async fn set_startup_backlight_brightness(&self, level: i32) -> Result<()> {
		self.dispatch(&Operation::SetStartupBacklightBrightness { level })
			.await
	}

	pub async fn set_display_contrast(&self, level: i32) -> Result<()> {
		self.dispatch(&Operation::SetDisplayContrast { level })
			.await
	}

	/// Set the contrast used from power on.
	pub async fn set_startup_display_contrast(&self, level: i32) -> Result<()> {
		self.dispatch(&Operation::SetStartupDisplayContrast { level })
			.await
	}

	pub async fn set_device_led(&self, index: i32, colour: LedColour) -> Result<()> {
		self.dispatch(&Operation::device_led(index, colour)).await
	}

	/// Write text at the cursor.
	pub async fn write_text(&self, text: impl Into<String>) -> Result<()> {
		self.dispatch(&Operation::text(text)).await
	}

	pub async fn set_font(&self, id: i32) -> Result<()> {
		self.dispatch(&Operation::SetFont { id }).await
	}
}

impl Drop for PanelSession {
	fn drop(&mut self) {
		let listener = self
			.listener
			.get_mut()
			.unwrap_or_else(PoisonError::into_inner);
		if let Some(listener) = listener.take() {
			listener.cancel.cancel();
		}
	}
}

impl Shared {
	fn callback_count(&self) -> usize {
		self.callbacks
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.len()
	}

	/// Read one byte, if there's one waiting.
	fn poll_byte(&self) -> io::Result<Option<u8>> {
		let mut stream = lock(&self.stream);
		let Some(stream) = stream.as_mut() else {
			return Ok(None);
		};

		if stream.bytes_available()? == 0 {
			return Ok(None);
		}

		let mut buf = [0; 1];
		match stream.read(&mut buf) {
			Ok(0) => Ok(None),
			Ok(_) => Ok(Some(buf[0])),
			Err(err) if is_transient(&err) => Ok(None),
			Err(err) => Err(err),
		}
	}

	/// Decode a byte and hand it to every callback.
	fn deliver(&self, byte: u8, reports: &mpsc::UnboundedSender<ListenerReport>) {
		let key = match decode_byte(byte) {
			DecodeOutcome::Char(key) => key,
			DecodeOutcome::Malformed(byte) => {
				warn!(byte=%format!("{byte:02X}"), "received non-UTF-8 data from panel");
				let _ = reports.send(ListenerReport::Malformed(byte));
				return;
			}
		};

		trace!(?key, "button pressed");

		// snapshot so callbacks can register more callbacks
		let callbacks = self
			.callbacks
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone();

		for (index, callback) in callbacks.iter().enumerate() {
			match catch_unwind(AssertUnwindSafe(|| callback(key))) {
				Ok(Ok(())) => {}
				Ok(Err(error)) => {
					warn!(index, ?key, "button callback failed: {error}");
					let _ = reports.send(ListenerReport::CallbackFailed { index, key, error });
				}
				Err(_) => {
					error!(index, ?key, "button callback panicked");
					let _ = reports.send(ListenerReport::CallbackPanicked { index, key });
				}
			}
		}
	}
}

async fn listen(
	shared: Arc<Shared>,
	cancel: CancellationToken,
	reports: mpsc::UnboundedSender<ListenerReport>,
) {
	debug!("listening for button presses");

	while !cancel.is_cancelled() {
		match shared.poll_byte() {
			Ok(Some(byte)) => {
				shared.deliver(byte, &reports);
				yield_now().await;
				continue;
			}
			Ok(None) => {}
			Err(err) => {
				error!("failed to read from panel, stopping listener: {err}");
				let _ = reports.send(ListenerReport::ReadFailed(err));
				break;
			}
		}

		tokio::select! {
			_ = cancel.cancelled() => break,
			_ = sleep(POLL_INTERVAL) => {}
		}
	}

	let mut state = lock(&shared.state);
	if *state == SessionState::Listening {
		*state = SessionState::Connected;
	}
	debug!("stopped listening for button presses");
}

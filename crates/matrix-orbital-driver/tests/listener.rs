use std::{
	sync::{Arc, Mutex},
	time::Duration,
};

use matrix_orbital_driver::{
	CallbackError, ListenerReport, POLL_INTERVAL, SessionError, SessionState,
};
use tokio::time::{Instant, sleep, timeout};

mod common;
use common::{FakePanel, eventually};

type Log = Arc<Mutex<Vec<(&'static str, char)>>>;

fn recorder(log: &Log, name: &'static str) -> impl Fn(char) -> Result<(), CallbackError> + use<> {
	let log = log.clone();
	move |key| {
		log.lock().unwrap().push((name, key));
		Ok(())
	}
}

#[tokio::test]
async fn test_callbacks_run_in_registration_order() {
	let panel = FakePanel::new();
	let session = panel.session();
	let log = Log::default();

	session.register_button_callback(recorder(&log, "c1"));
	session.register_button_callback(recorder(&log, "c2"));
	let _reports = session.start_listening().unwrap();
	assert_eq!(session.state(), SessionState::Listening);

	panel.press(b"A");
	eventually(|| log.lock().unwrap().len() >= 2).await;
	sleep(POLL_INTERVAL * 3).await;

	assert_eq!(*log.lock().unwrap(), [("c1", 'A'), ("c2", 'A')]);
	session.close().await.unwrap();
}

#[tokio::test]
async fn test_keys_are_delivered_in_order() {
	let panel = FakePanel::new();
	let session = panel.session();
	let log = Log::default();

	session.register_button_callback(recorder(&log, "keys"));
	panel.press(b"UDLR");
	let _reports = session.start_listening().unwrap();

	eventually(|| log.lock().unwrap().len() == 4).await;
	let keys: String = log.lock().unwrap().iter().map(|(_, key)| key).collect();
	assert_eq!(keys, "UDLR");
	session.close().await.unwrap();
}

#[tokio::test]
async fn test_failing_callback_does_not_stop_others() {
	let panel = FakePanel::new();
	let session = panel.session();
	let log = Log::default();

	session.register_button_callback(|_| Err("nope".into()));
	session.register_button_callback(recorder(&log, "after"));
	let mut reports = session.start_listening().unwrap();

	panel.press(b"xy");
	eventually(|| log.lock().unwrap().len() == 2).await;
	assert_eq!(*log.lock().unwrap(), [("after", 'x'), ("after", 'y')]);

	let report = timeout(Duration::from_secs(5), reports.recv())
		.await
		.unwrap()
		.unwrap();
	assert!(matches!(
		report,
		ListenerReport::CallbackFailed { index: 0, key: 'x', ref error } if error.to_string() == "nope"
	));
	assert_eq!(session.state(), SessionState::Listening);
	session.close().await.unwrap();
}

#[tokio::test]
async fn test_panicking_callback_is_isolated() {
	let panel = FakePanel::new();
	let session = panel.session();
	let log = Log::default();

	session.register_button_callback(recorder(&log, "before"));
	session.register_button_callback(|key| panic!("callback exploded on {key}"));
	session.register_button_callback(recorder(&log, "after"));
	let mut reports = session.start_listening().unwrap();

	panel.press(b"1");
	eventually(|| log.lock().unwrap().len() == 2).await;
	assert_eq!(*log.lock().unwrap(), [("before", '1'), ("after", '1')]);

	let report = timeout(Duration::from_secs(5), reports.recv())
		.await
		.unwrap()
		.unwrap();
	assert!(matches!(
		report,
		ListenerReport::CallbackPanicked { index: 1, key: '1' }
	));
	session.close().await.unwrap();
}

#[tokio::test]
async fn test_malformed_bytes_are_reported_and_skipped() {
	let panel = FakePanel::new();
	let session = panel.session();
	let log = Log::default();

	session.register_button_callback(recorder(&log, "keys"));
	panel.press(&[0x80, b'b']);
	let mut reports = session.start_listening().unwrap();

	eventually(|| log.lock().unwrap().len() == 1).await;
	assert_eq!(*log.lock().unwrap(), [("keys", 'b')]);

	let report = timeout(Duration::from_secs(5), reports.recv())
		.await
		.unwrap()
		.unwrap();
	assert!(matches!(report, ListenerReport::Malformed(0x80)));
	session.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_silent_stream_closes_promptly() {
	let panel = FakePanel::new();
	let session = panel.session();
	let log = Log::default();

	session.register_button_callback(recorder(&log, "keys"));
	let _reports = session.start_listening().unwrap();
	sleep(POLL_INTERVAL * 5).await;

	let start = Instant::now();
	session.close().await.unwrap();
	assert!(
		start.elapsed() <= POLL_INTERVAL,
		"close took {:?}",
		start.elapsed()
	);

	assert!(log.lock().unwrap().is_empty());
	assert_eq!(session.state(), SessionState::Closed);
	assert_eq!(panel.wire().closes, 1);
}

#[test]
fn test_start_listening_without_runtime() {
	let panel = FakePanel::new();
	let session = panel.session();

	assert!(matches!(
		session.start_listening(),
		Err(SessionError::NoRuntime)
	));
	assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_stop_and_restart_listening() {
	let panel = FakePanel::new();
	let session = panel.session();
	let log = Log::default();

	session.register_button_callback(recorder(&log, "keys"));
	let _reports = session.start_listening().unwrap();
	assert!(matches!(
		session.start_listening(),
		Err(SessionError::AlreadyListening)
	));

	session.stop_listening().await;
	assert_eq!(session.state(), SessionState::Connected);

	panel.press(b"q");
	sleep(POLL_INTERVAL * 3).await;
	assert!(log.lock().unwrap().is_empty());

	let _reports = session.start_listening().unwrap();
	eventually(|| log.lock().unwrap().len() == 1).await;
	session.close().await.unwrap();
}

#[tokio::test]
async fn test_commands_can_be_sent_while_listening() {
	let panel = FakePanel::new();
	let session = panel.session();
	let _reports = session.start_listening().unwrap();

	session.clear_display().await.unwrap();
	assert_eq!(panel.writes(), [vec![0xFE, 0x58]]);
	session.close().await.unwrap();
}

#[tokio::test]
async fn test_read_failure_stops_listener() {
	let panel = FakePanel::new();
	let session = panel.session();
	panel.wire().fail_reads = true;
	let mut reports = session.start_listening().unwrap();

	let report = timeout(Duration::from_secs(5), reports.recv())
		.await
		.unwrap()
		.unwrap();
	assert!(matches!(report, ListenerReport::ReadFailed(_)));

	eventually(|| session.state() == SessionState::Connected).await;
	session.clear_display().await.unwrap();
	session.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_listener_keeps_running_during_soft_reset() {
	let panel = FakePanel::new();
	let session = panel.session();
	let log = Log::default();

	session.register_button_callback(recorder(&log, "keys"));
	let _reports = session.start_listening().unwrap();

	let presser = tokio::spawn({
		let panel = panel.clone();
		async move {
			sleep(Duration::from_secs(1)).await;
			panel.press(b"r");
		}
	});

	session.soft_reset().await.unwrap();
	presser.await.unwrap();

	assert_eq!(*log.lock().unwrap(), [("keys", 'r')]);
	session.close().await.unwrap();
}

//! Recording sessions: live capture plus periodic detection snapshots.
//!
use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use common::protocol::DetectionResult;
use detect_client::DetectClient;
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

use crate::{
    as_jpeg_stream_item,
    sensors::{self, CaptureFn, CapturedFrame},
    ResultSlot,
};

/// Period between two snapshots submitted for detection.
pub const SNAPSHOT_PERIOD: Duration = Duration::from_secs(2);

/// Filename under which camera snapshots are submitted.
pub const SNAPSHOT_FILE_NAME: &str = "snapshot.jpg";

const VIEW_CHANNEL_CAPACITY: usize = 20;

/// Toggle between idle and recording, owning at most one session at a time.
pub struct CaptureController {
    device: String,
    client: DetectClient,
    results: Arc<ResultSlot>,
    view_tx: broadcast::Sender<Bytes>,
    session: Mutex<Option<CaptureSession>>,
    snapshot_period: Duration,
}

/// Running recording session.
///
/// Owns the camera thread and the snapshot ticker. Both finish when the stop
/// flag flips; the camera is released when its thread returns.
struct CaptureSession {
    stop_tx: watch::Sender<bool>,
    camera: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

impl CaptureController {
    /// Create an idle controller for the given video device.
    pub fn new(device: impl Into<String>, client: DetectClient, results: Arc<ResultSlot>) -> Self {
        let (view_tx, _) = broadcast::channel(VIEW_CHANNEL_CAPACITY);
        Self {
            device: device.into(),
            client,
            results,
            view_tx,
            session: Mutex::new(None),
            snapshot_period: SNAPSHOT_PERIOD,
        }
    }

    /// Subscribe to live view frames, framed for `multipart/x-mixed-replace`.
    pub fn subscribe_view(&self) -> broadcast::Receiver<Bytes> {
        self.view_tx.subscribe()
    }

    /// Whether a recording session is active.
    pub async fn is_recording(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Flip between idle and recording; returns whether recording now.
    pub async fn toggle(&self) -> bool {
        if self.is_recording().await {
            self.stop().await;
            false
        } else {
            self.start().await
        }
    }

    /// Start recording from the configured device; returns whether recording.
    ///
    /// When the camera cannot be opened the controller stays idle and the
    /// error becomes the displayed result.
    pub async fn start(&self) -> bool {
        match sensors::open_capture_fn(&self.device) {
            Ok(capture) => self.start_with(capture).await,
            Err(err) => {
                let message = format!("{err:#}");
                log::error!("Error accessing camera: {message}");
                self.results
                    .replace(DetectionResult::failure(message))
                    .await;
                false
            }
        }
    }

    /// Start recording from an already-open frame source.
    pub async fn start_with(&self, capture: CaptureFn) -> bool {
        let mut session = self.session.lock().await;
        if session.is_some() {
            log::debug!("Recording already active");
            return true;
        }

        *session = Some(self.spawn_session(capture));
        log::info!("Recording started");
        true
    }

    /// Stop recording and wait until the camera is released. A no-op when
    /// already idle.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        let Some(active) = session.take() else {
            return;
        };

        active.shutdown().await;
        log::info!("Recording stopped");
    }

    fn spawn_session(&self, capture: CaptureFn) -> CaptureSession {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (frame_tx, frame_rx) = watch::channel::<Option<CapturedFrame>>(None);

        let camera = tokio::task::spawn_blocking({
            let stop_rx = stop_rx.clone();
            let view_tx = self.view_tx.clone();
            move || camera_loop(capture, stop_rx, frame_tx, view_tx)
        });

        let ticker = tokio::spawn(snapshot_loop(
            self.client.clone(),
            Arc::clone(&self.results),
            frame_rx,
            stop_rx,
            self.snapshot_period,
        ));

        CaptureSession {
            stop_tx,
            camera,
            ticker,
        }
    }
}

impl CaptureSession {
    /// Stop both workers and wait for them to finish.
    async fn shutdown(mut self) {
        self.stop_tx.send(true).ok();
        (&mut self.camera).await.ok();
        (&mut self.ticker).await.ok();
    }
}

impl Drop for CaptureSession {
    /// Teardown for sessions that were never stopped explicitly.
    fn drop(&mut self) {
        self.stop_tx.send(true).ok();
        self.ticker.abort();
    }
}

/// Blocking camera thread.
///
/// Captures continuously, publishes view frames to stream subscribers and
/// keeps the most recent frame available for snapshots.
fn camera_loop(
    capture: CaptureFn,
    stop_rx: watch::Receiver<bool>,
    frame_tx: watch::Sender<Option<CapturedFrame>>,
    view_tx: broadcast::Sender<Bytes>,
) {
    while !*stop_rx.borrow() {
        let Some(frame) = capture() else {
            // Brief backoff after a failed capture
            std::thread::sleep(Duration::from_millis(100));
            continue;
        };

        match sensors::view_jpeg(&frame) {
            Ok(jpeg) => {
                // Send errors just mean that nobody is watching
                view_tx.send(as_jpeg_stream_item(&jpeg)).ok();
            }
            Err(err) => log::warn!("Error encoding view frame: {err:#}"),
        }

        frame_tx.send_replace(Some(frame));
    }

    log::debug!("Camera loop finished");
}

/// Snapshot ticker.
///
/// Every period, encode the most recent frame and submit it for detection
/// without awaiting the outcome, so a slow endpoint cannot delay the
/// following ticks.
async fn snapshot_loop(
    client: DetectClient,
    results: Arc<ResultSlot>,
    frame_rx: watch::Receiver<Option<CapturedFrame>>,
    mut stop_rx: watch::Receiver<bool>,
    period: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick fires immediately; consume it so the first snapshot
    // happens one period after recording started
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        let latest = frame_rx.borrow().clone();
        let Some(frame) = latest else {
            log::debug!("No frame captured yet, skipping snapshot");
            continue;
        };

        let jpeg = match sensors::snapshot_jpeg(&frame) {
            Ok(jpeg) => jpeg,
            Err(err) => {
                log::warn!("Error encoding snapshot: {err:#}");
                continue;
            }
        };

        log::debug!("Submitting {SNAPSHOT_FILE_NAME} ({} bytes)", jpeg.len());

        let client = client.clone();
        let results = Arc::clone(&results);
        tokio::spawn(async move {
            let outcome = client.detect(jpeg, SNAPSHOT_FILE_NAME).await;
            results.replace(outcome).await;
        });
    }

    log::debug!("Snapshot loop finished");
}

//! Code capture contract.
//!
//! A [`CaptureSource`] produces decoded codes while armed. Sources may emit
//! the same code many times (one per camera frame, say); the session absorbs
//! repeats. [`CaptureGuard`] ties arming to a scope so the device is always
//! released.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Result, SessionError};
use crate::session::InventorySession;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    Unavailable(String),

    #[error("capture permission denied: {0}")]
    PermissionDenied(String),
}

#[async_trait]
pub trait CaptureSource: Send {
    /// Arm the source. Starting an armed source is a no-op.
    async fn start(&mut self) -> std::result::Result<(), CaptureError>;

    /// Disarm the source. Stopping a stopped source is a no-op.
    fn stop(&mut self);

    fn is_armed(&self) -> bool;

    /// Next decoded code. `None` once the source is exhausted or disarmed.
    async fn next_code(&mut self) -> Option<String>;
}

// ============================================================================
// Scoped arming
// ============================================================================

/// Armed source that is stopped when the guard goes out of scope.
pub struct CaptureGuard<'a, S: CaptureSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: CaptureSource + ?Sized> CaptureGuard<'a, S> {
    pub async fn arm(source: &'a mut S) -> std::result::Result<Self, CaptureError> {
        source.start().await?;
        debug!("capture armed");
        Ok(Self { source })
    }

    pub async fn next_code(&mut self) -> Option<String> {
        self.source.next_code().await
    }
}

impl<S: CaptureSource + ?Sized> Drop for CaptureGuard<'_, S> {
    fn drop(&mut self) {
        self.source.stop();
        debug!("capture stopped");
    }
}

/// Feed every code from `source` into an active session until the source
/// is exhausted. Returns the number of new scan entries.
pub async fn run_capture<S: CaptureSource + ?Sized>(
    session: &mut InventorySession,
    source: &mut S,
) -> Result<usize> {
    if !session.state().is_active() {
        return Err(SessionError::NotActive);
    }
    let mut guard = CaptureGuard::arm(source).await?;
    let mut appended = 0;
    while let Some(code) = guard.next_code().await {
        if session.ingest(&code).await?.is_appended() {
            appended += 1;
        }
    }
    Ok(appended)
}

// ============================================================================
// Channel source
// ============================================================================

/// Producer half of a [`ChannelCapture`]. Codes fed while the capture is
/// disarmed are discarded.
#[derive(Clone)]
pub struct CaptureFeeder {
    tx: mpsc::UnboundedSender<String>,
    armed: Arc<AtomicBool>,
}

impl CaptureFeeder {
    /// Returns whether the code was delivered.
    pub fn feed(&self, code: impl Into<String>) -> bool {
        if !self.armed.load(Ordering::SeqCst) {
            return false;
        }
        self.tx.send(code.into()).is_ok()
    }
}

/// Source backed by an in-process channel, for decoders running on their
/// own task. Exhausted once every [`CaptureFeeder`] is dropped.
pub struct ChannelCapture {
    rx: mpsc::UnboundedReceiver<String>,
    armed: Arc<AtomicBool>,
    start_error: Option<CaptureError>,
}

impl ChannelCapture {
    pub fn new() -> (CaptureFeeder, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let armed = Arc::new(AtomicBool::new(false));
        let feeder = CaptureFeeder {
            tx,
            armed: armed.clone(),
        };
        let capture = Self {
            rx,
            armed,
            start_error: None,
        };
        (feeder, capture)
    }

    /// A source whose `start` always fails with `error`.
    pub fn failing(error: CaptureError) -> (CaptureFeeder, Self) {
        let (feeder, mut capture) = Self::new();
        capture.start_error = Some(error);
        (feeder, capture)
    }
}

#[async_trait]
impl CaptureSource for ChannelCapture {
    async fn start(&mut self) -> std::result::Result<(), CaptureError> {
        if let Some(err) = &self.start_error {
            return Err(err.clone());
        }
        self.armed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.armed.store(false, Ordering::SeqCst);
        // Drop anything decoded before the stop.
        while self.rx.try_recv().is_ok() {}
    }

    fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    async fn next_code(&mut self) -> Option<String> {
        if !self.is_armed() {
            return None;
        }
        self.rx.recv().await
    }
}

// ============================================================================
// Line source
// ============================================================================

/// One code per line from any buffered reader (stdin, a file, a keyboard
/// wedge scanner). Blank lines are skipped and codes are trimmed.
pub struct LineCapture<R> {
    lines: Lines<R>,
    armed: bool,
}

impl<R: AsyncBufRead + Unpin + Send> LineCapture<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            armed: false,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> CaptureSource for LineCapture<R> {
    async fn start(&mut self) -> std::result::Result<(), CaptureError> {
        self.armed = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.armed = false;
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    async fn next_code(&mut self) -> Option<String> {
        while self.armed {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    let code = line.trim();
                    if !code.is_empty() {
                        return Some(code.to_string());
                    }
                }
                Ok(None) => return None,
                Err(err) => {
                    warn!(error = %err, "failed to read capture input");
                    return None;
                }
            }
        }
        None
    }
}

//! Inventory session core.
//!
//! A session reconciles what the backend says is registered at a location
//! against what was physically scanned there:
//!
//! ```text
//! ┌─────────────┐   snapshot   ┌──────────────────┐   report   ┌──────────────┐
//! │  Inventory  │─────────────▶│ InventorySession │───────────▶│ Discrepancies│
//! │   backend   │◀─── lookup ──│ (state machine)  │            │ + counts     │
//! └─────────────┘              └──────────────────┘            └──────────────┘
//!                                      ▲
//!                                      │ decoded codes
//!                              ┌───────┴───────┐
//!                              │ CaptureSource │
//!                              └───────────────┘
//! ```
//!
//! - **state**: Idle → Loading → Ready → Active, with transition history
//! - **scan_log**: ordered, de-duplicated scan entries
//! - **reconcile**: pure diff of snapshot vs scan log
//! - **session**: the orchestrator owning all of the above
//! - **capture**: the code-producer contract and scoped arming

pub mod capture;
pub mod error;
pub mod reconcile;
pub mod scan_log;
pub mod session;
pub mod state;

pub use capture::{
    run_capture, CaptureError, CaptureFeeder, CaptureGuard, CaptureSource, ChannelCapture,
    LineCapture,
};
pub use error::{Result, SessionError};
pub use reconcile::reconcile;
pub use scan_log::{IngestOutcome, ScanLog};
pub use session::{InventorySession, SessionReport, SharedSession};
pub use state::{SessionState, StateMachine, StateTransition};

//! Stocktake domain model.
//!
//! Read-only snapshots of what the inventory backend knows (locations and
//! assets), the scan log entries produced while walking a location, and the
//! discrepancy records that reconciliation derives from the two.

pub mod asset;
pub mod discrepancy;
pub mod location;
pub mod scan;
pub mod session_id;
pub mod wire;

pub use asset::{Asset, AssignedTo, NamedRef, StatusLabel, UNKNOWN_ASSET_ID, UNKNOWN_ASSET_NAME};
pub use discrepancy::{Discrepancy, DiscrepancyCounts, DiscrepancyKind};
pub use location::{Location, LocationId};
pub use scan::ScannedEntry;
pub use session_id::SessionId;
pub use wire::Page;

use serde::{Deserialize, Serialize};

use crate::location::LocationId;
use crate::wire::{lenient_date, lenient_text, null_as_default};

/// Id reserved for assets the backend does not know about.
pub const UNKNOWN_ASSET_ID: u64 = 0;

/// Display name given to the unknown-asset placeholder.
pub const UNKNOWN_ASSET_NAME: &str = "Unknown Asset";

/// `{ id, name }` reference to another backend record (model, category, location).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedRef {
    pub id: u64,
    pub name: String,
}

impl NamedRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Status label with its category (deployable, deployed, archived, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusLabel {
    pub id: u64,
    pub name: String,
    pub status_type: String,
}

/// Who an asset is checked out to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignedTo {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// An asset as recorded by the inventory backend.
///
/// Matching between scans and registered assets is always done on
/// `asset_tag`, never on the numeric `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub asset_tag: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub serial: Option<String>,
    #[serde(default)]
    pub model: Option<NamedRef>,
    #[serde(default)]
    pub status_label: Option<StatusLabel>,
    #[serde(default)]
    pub assigned_to: Option<AssignedTo>,
    #[serde(default)]
    pub location: Option<NamedRef>,
    #[serde(default)]
    pub category: Option<NamedRef>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub purchase_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub purchase_cost: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub last_checkout: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub updated_at: Option<String>,
}

impl Asset {
    pub fn new(id: u64, name: impl Into<String>, asset_tag: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            asset_tag: asset_tag.into(),
            serial: None,
            model: None,
            status_label: None,
            assigned_to: None,
            location: None,
            category: None,
            purchase_date: None,
            purchase_cost: None,
            notes: None,
            last_checkout: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Placeholder for a scanned code the backend could not resolve.
    pub fn unknown(code: impl Into<String>) -> Self {
        Self::new(UNKNOWN_ASSET_ID, UNKNOWN_ASSET_NAME, code)
    }

    pub fn is_unknown(&self) -> bool {
        self.id == UNKNOWN_ASSET_ID
    }

    /// Location the backend currently records for this asset.
    pub fn location_id(&self) -> Option<LocationId> {
        self.location.as_ref().map(|location| location.id)
    }

    pub fn with_location(mut self, id: LocationId, name: impl Into<String>) -> Self {
        self.location = Some(NamedRef::new(id, name));
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn with_model(mut self, id: u64, name: impl Into<String>) -> Self {
        self.model = Some(NamedRef::new(id, name));
        self
    }

    pub fn with_category(mut self, id: u64, name: impl Into<String>) -> Self {
        self.category = Some(NamedRef::new(id, name));
        self
    }

    pub fn with_status(
        mut self,
        id: u64,
        name: impl Into<String>,
        status_type: impl Into<String>,
    ) -> Self {
        self.status_label = Some(StatusLabel {
            id,
            name: name.into(),
            status_type: status_type.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_placeholder() {
        let asset = Asset::unknown("XYZ");
        assert_eq!(asset.id, UNKNOWN_ASSET_ID);
        assert_eq!(asset.name, "Unknown Asset");
        assert_eq!(asset.asset_tag, "XYZ");
        assert!(asset.is_unknown());
        assert!(asset.location_id().is_none());
    }

    #[test]
    fn test_deserialize_hardware_row_with_nulls() {
        let json = r#"{
            "id": 3,
            "name": "Server Rack #001",
            "asset_tag": "SR001",
            "serial": "SR345678",
            "model": {"id": 3, "name": "Dell PowerEdge R730"},
            "status_label": {"id": 2, "name": "Deployed", "status_type": "deployed", "status_meta": "deployed"},
            "assigned_to": null,
            "location": {"id": 2, "name": "Warehouse A"},
            "rtd_location": {"id": 2, "name": "Warehouse A"},
            "category": {"id": 3, "name": "Servers"},
            "purchase_date": {"date": "2022-05-01", "formatted": "2022-05-01"},
            "purchase_cost": "4,500.00",
            "notes": null,
            "last_checkout": null,
            "custom_fields": {}
        }"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.asset_tag, "SR001");
        assert_eq!(asset.location_id(), Some(2));
        assert!(asset.assigned_to.is_none());
        assert_eq!(asset.purchase_date.as_deref(), Some("2022-05-01"));
        assert_eq!(asset.status_label.unwrap().status_type, "deployed");
    }

    #[test]
    fn test_assigned_to_type_field() {
        let json = r#"{"id": 9, "name": null, "asset_tag": "LT009",
            "assigned_to": {"id": 4, "name": "Dana", "type": "user"}}"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.assigned_to.unwrap().kind, "user");
        assert_eq!(asset.name, "");
    }
}

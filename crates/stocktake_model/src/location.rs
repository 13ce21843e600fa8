use serde::{Deserialize, Serialize};

use crate::wire::{lenient_date, lenient_text};

/// Backend identifier of a location.
pub type LocationId = u64;

/// A physical place assets are registered at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub zip: Option<String>,
    /// Count reported by the backend. Only a hint; reconciliation always
    /// works from the fetched snapshot.
    #[serde(default)]
    pub assets_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub updated_at: Option<String>,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: None,
            city: None,
            state: None,
            country: None,
            zip: None,
            assets_count: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Stand-in used when the backend cannot describe a location by id.
    pub fn placeholder(id: LocationId) -> Self {
        Self::new(id, format!("Location {}", id))
    }

    pub fn with_address(
        mut self,
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.address = Some(address.into());
        self.city = Some(city.into());
        self.state = Some(state.into());
        self
    }

    pub fn with_assets_count(mut self, count: u64) -> Self {
        self.assets_count = Some(count);
        self
    }

    /// Single-line address, e.g. "123 Business St, San Francisco, CA".
    pub fn display_address(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.address, &self.city, &self.state, &self.zip, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// Case-insensitive substring match against name, address and city.
    /// An empty term matches every location.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [Some(&self.name), self.address.as_ref(), self.city.as_ref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

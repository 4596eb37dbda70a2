use serde::{Deserialize, Serialize};

use super::translations::TranslationsUpdate;

/// Messages the hosting frame posts to the overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostMessage {
    EnableEditMode {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        translations: Option<TranslationsUpdate>,
    },
    DisableEditMode,
}

impl HostMessage {
    /// Decode raw message data; anything that is not an overlay message is
    /// `None`, since the frame also carries unrelated traffic.
    pub fn from_data(data: &serde_json::Value) -> Option<Self> {
        Self::deserialize(data).ok()
    }
}

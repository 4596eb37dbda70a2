use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Partial translation update as sent by the hosting frame. `null` values
/// leave the current string in place.
pub type TranslationsUpdate = BTreeMap<String, Option<String>>;

/// Display strings used by the overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, fieldwork::Fieldwork)]
#[serde(rename_all = "camelCase")]
#[fieldwork(get)]
pub struct Translations {
    cancel: String,
    save: String,
    add_text: String,
    disabled_tooltip_text: String,
    /// Keys the overlay does not use itself
    #[serde(flatten)]
    extra: BTreeMap<String, String>,
}

impl Default for Translations {
    fn default() -> Self {
        Self {
            cancel: "Cancel".into(),
            save: "Save".into(),
            add_text: "Add text".into(),
            disabled_tooltip_text: "This text can be changed only through chat.".into(),
            extra: BTreeMap::new(),
        }
    }
}

impl Translations {
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "cancel" => Some(&self.cancel),
            "save" => Some(&self.save),
            "addText" => Some(&self.add_text),
            "disabledTooltipText" => Some(&self.disabled_tooltip_text),
            _ => self.extra.get(key).map(String::as_str),
        }
    }

    /// Merge a partial update; returns whether anything changed
    pub fn merge(&mut self, update: TranslationsUpdate) -> bool {
        let mut changed = false;
        for (key, value) in update {
            let Some(value) = value else { continue };
            let slot = match key.as_str() {
                "cancel" => &mut self.cancel,
                "save" => &mut self.save,
                "addText" => &mut self.add_text,
                "disabledTooltipText" => &mut self.disabled_tooltip_text,
                other => self.extra.entry(other.to_string()).or_default(),
            };
            if *slot != value {
                *slot = value;
                changed = true;
            }
        }
        changed
    }
}

use crate::storage::DEFAULT_STORAGE_KEY;
use web_sys::Element;

pub const STORAGE_KEY_ATTR: &str = "data-storage-key";
pub const AUTO_SEED_ATTR: &str = "data-auto-seed";
pub const KEEP_EMPTY_SLOTS_ATTR: &str = "data-keep-empty-slots";

/// Host-page settings, read once from the mount element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketConfig {
    pub storage_key: String,
    pub auto_seed: bool,
    pub keep_empty_slots: bool,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            auto_seed: true,
            keep_empty_slots: false,
        }
    }
}

impl BracketConfig {
    pub fn from_attributes<F>(attribute: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |name: &str, default: bool| {
            attribute(name).map_or(default, |value| value == "true")
        };

        Self {
            storage_key: attribute(STORAGE_KEY_ATTR)
                .filter(|key| !key.is_empty())
                .unwrap_or(defaults.storage_key),
            auto_seed: flag(AUTO_SEED_ATTR, defaults.auto_seed),
            keep_empty_slots: flag(KEEP_EMPTY_SLOTS_ATTR, defaults.keep_empty_slots),
        }
    }

    pub fn from_element(root: &Element) -> Self {
        Self::from_attributes(|name| root.get_attribute(name))
    }
}

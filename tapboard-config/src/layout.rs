// SPDX-License-Identifier: GPL-3.0-only

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declarative description of a keyboard layout, as stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct LayoutFile {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_view: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub outlines: IndexMap<String, Outline>,
    /// View name to rows; each row lists button identifiers separated by whitespace.
    pub views: IndexMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub buttons: IndexMap<String, ButtonDef>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Outline {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ButtonDef {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub outline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub keycode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub action: Option<ActionDef>,
    /// Level-invariant symbol, used when neither `levels` nor `groups` is given.
    #[serde(flatten)]
    pub symbol: SymbolDef,
    /// Symbols of group 0, indexed by level.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub levels: Option<Vec<Option<SymbolDef>>>,
    /// Full symbol matrix, indexed by group then level.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub groups: Option<Vec<Vec<Option<SymbolDef>>>>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SymbolDef {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub keysym: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub modifier: Vec<String>,
}

impl SymbolDef {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.icon.is_none()
            && self.text.is_none()
            && self.keysym.is_none()
            && self.modifier.is_empty()
    }
}

/// A button action: either a bare name (`erase`, `show_prefs` or a keysym name)
/// or a single-key map selecting a view switch.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ActionDef {
    Named(String),
    SetView { set_view: String },
    Locking { locking: LockingDef },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LockingDef {
    pub lock_view: String,
    pub unlock_view: String,
    /// First press shows `lock_view` for a single key only, the second one locks it.
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub latches: bool,
}

pub const ERASE_ACTION: &str = "erase";
pub const SHOW_PREFERENCES_ACTION: &str = "show_prefs";

// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

pub mod layout;

/// User settings of the on-screen keyboard.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TapboardConfig {
    /// Name of the layout file to look up in the keyboard data directories.
    pub layout: String,
    pub modifier_behavior: ModifierBehavior,
    /// Initial group (row of the symbol matrix) of every key.
    pub group: u32,
}

impl Default for TapboardConfig {
    fn default() -> TapboardConfig {
        TapboardConfig {
            layout: String::from("us"),
            modifier_behavior: ModifierBehavior::default(),
            group: 0,
        }
    }
}

/// How pressing a key carrying a modifier changes the modifier mask.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierBehavior {
    /// Modifiers are held only while their key is pressed.
    #[default]
    None,
    /// Modifiers apply to the next key press, then clear.
    Latch,
    /// Modifiers toggle on one press and off on the next.
    Lock,
}

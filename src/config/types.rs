// SPDX-License-Identifier: GPL-3.0-only

use tapboard_config::ModifierBehavior;
use tracing::warn;
use xkbcommon::xkb::{self, Keysym};

/// Looks up an xkbcommon keysym name, without the `XKB_KEY_` prefix.
///
/// Falls back to a case-insensitive match, with a warning.
pub fn keysym_from_name(name: &str) -> Option<Keysym> {
    match xkb::keysym_from_name(name, xkb::KEYSYM_NO_FLAGS) {
        x if x.raw() == xkb::keysyms::KEY_NoSymbol => {
            match xkb::keysym_from_name(name, xkb::KEYSYM_CASE_INSENSITIVE) {
                x if x.raw() == xkb::keysyms::KEY_NoSymbol => None,
                x => {
                    warn!(
                        "Keysym '{}' only matched case insensitive for {:?}",
                        name,
                        xkb::keysym_get_name(x)
                    );
                    Some(x)
                }
            }
        }
        x => Some(x),
    }
}

pub fn parse_modifier_behavior(name: &str) -> Option<ModifierBehavior> {
    match name.to_ascii_lowercase().as_str() {
        "none" => Some(ModifierBehavior::None),
        "latch" => Some(ModifierBehavior::Latch),
        "lock" => Some(ModifierBehavior::Lock),
        _ => None,
    }
}

// SPDX-License-Identifier: GPL-3.0-only

use super::{
    state::KeyboardState,
    symbol::{ModifierMask, Symbol},
};
use smallvec::SmallVec;
use tapboard_config::ModifierBehavior;
use xkbcommon::xkb::Keysym;

/// Behavior of a button beyond emitting its symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Action {
    /// Emit the symbol only.
    #[default]
    None,
    Erase,
    ShowPreferences,
    /// Submit this keysym, whatever the level.
    Keysym(Keysym),
    /// Switch to this view
    SetView(String),
    /// Toggle between a locked view and the view to return to.
    ///
    /// A latching lock goes through latched, locked and unlocked on
    /// consecutive presses. While latched, the next key that submits
    /// something or carries a modifier returns to the previous view.
    Locking {
        lock_view: String,
        unlock_view: String,
        latches: bool,
    },
}

impl Action {
    /// Views this action may switch to.
    pub fn target_views(&self) -> Vec<&str> {
        match self {
            Action::SetView(view) => vec![view.as_str()],
            Action::Locking {
                lock_view,
                unlock_view,
                ..
            } => vec![lock_view.as_str(), unlock_view.as_str()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Something the host has to be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Text(String),
    Keysym(Keysym),
    Erase,
    ShowPreferences,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    ModifierChanged(ModifierMask),
    SetLevel { group: u32, level: u32 },
    SetView(String),
    ToggleLock {
        lock_view: String,
        unlock_view: String,
        latches: bool,
    },
    /// Return from a latched view to the one it was latched from.
    Unlatch,
    /// `modifiers` is the mask the symbol was resolved under.
    Emit {
        emission: Emission,
        modifiers: ModifierMask,
    },
}

pub type Transitions = SmallVec<[Transition; 4]>;

/// Computes what a press or release of a key means in the given state.
///
/// `symbol` is the key's symbol at the current group and level. Without one
/// the event is meaningless and no transition is produced at all.
///
/// On press, a latching keyboard forgets its modifiers before the pressed
/// symbol contributes its own: latched modifiers apply to exactly one key.
/// A modifier symbol is then ORed into the mask, or XORed when modifiers lock.
/// On release, only the plain policy drops the symbol's modifiers again.
///
/// View switches happen on release, so that the key is released
/// in the view it was pressed in. Releasing a key that is not a view or
/// preferences key ends a latched view.
pub fn interpret(
    state: &KeyboardState,
    key_state: KeyState,
    action: &Action,
    symbol: Option<&Symbol>,
) -> Transitions {
    let mut transitions = Transitions::new();
    let Some(symbol) = symbol else {
        return transitions;
    };

    let behavior = state.modifier_behavior;
    let mut modifiers = state.modifiers;
    match key_state {
        KeyState::Pressed => {
            if behavior == ModifierBehavior::Latch {
                modifiers = ModifierMask::empty();
            }
            if symbol.is_modifier() {
                match behavior {
                    ModifierBehavior::None | ModifierBehavior::Latch => {
                        modifiers |= symbol.modifiers
                    }
                    ModifierBehavior::Lock => modifiers ^= symbol.modifiers,
                }
            }
            if let Some(emission) = press_emission(action, symbol) {
                transitions.push(Transition::Emit {
                    emission,
                    modifiers: state.modifiers,
                });
            }
        }
        KeyState::Released => {
            if symbol.is_modifier() && behavior == ModifierBehavior::None {
                modifiers &= !symbol.modifiers;
            }
            match action {
                Action::ShowPreferences => transitions.push(Transition::Emit {
                    emission: Emission::ShowPreferences,
                    modifiers: state.modifiers,
                }),
                Action::SetView(view) => transitions.push(Transition::SetView(view.clone())),
                Action::Locking {
                    lock_view,
                    unlock_view,
                    latches,
                } => transitions.push(Transition::ToggleLock {
                    lock_view: lock_view.clone(),
                    unlock_view: unlock_view.clone(),
                    latches: *latches,
                }),
                Action::None | Action::Erase | Action::Keysym(_) => {
                    if state.latched_from.is_some() {
                        transitions.push(Transition::Unlatch);
                    }
                }
            }
        }
    }

    if modifiers != state.modifiers {
        transitions.push(Transition::ModifierChanged(modifiers));
    }
    let level = modifiers.level();
    if level != state.level {
        transitions.push(Transition::SetLevel {
            group: state.group,
            level,
        });
    }
    transitions
}

fn press_emission(action: &Action, symbol: &Symbol) -> Option<Emission> {
    match action {
        Action::Erase => Some(Emission::Erase),
        Action::Keysym(keysym) => Some(Emission::Keysym(*keysym)),
        Action::ShowPreferences | Action::SetView(_) | Action::Locking { .. } => None,
        Action::None if symbol.is_modifier() => None,
        Action::None => symbol
            .text
            .clone()
            .map(Emission::Text)
            .or_else(|| symbol.keysym.map(Emission::Keysym)),
    }
}

// SPDX-License-Identifier: GPL-3.0-only

use super::{
    action::Transition,
    layout::Layout,
    symbol::{ModifierMask, MAX_LEVEL},
};
use tapboard_config::ModifierBehavior;
use tracing::{debug, warn};

/// Symbol index, modifier and view state of a keyboard session.
///
/// `level` always equals `modifiers.level()`, and a `locked_view`
/// is always the current view. A view is never locked and latched at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardState {
    pub group: u32,
    pub level: u32,
    pub modifiers: ModifierMask,
    pub modifier_behavior: ModifierBehavior,
    pub current_view: String,
    pub locked_view: Option<String>,
    /// View to return to once the current, latched, view was used.
    pub latched_from: Option<String>,
}

impl KeyboardState {
    pub fn new(view: impl Into<String>, modifier_behavior: ModifierBehavior) -> KeyboardState {
        KeyboardState {
            group: 0,
            level: 0,
            modifiers: ModifierMask::empty(),
            modifier_behavior,
            current_view: view.into(),
            locked_view: None,
            latched_from: None,
        }
    }

    fn notification(&self) -> Notification {
        Notification {
            group: self.group,
            level: self.level,
            view: self.current_view.clone(),
            locked_view: self.locked_view.clone(),
            latched: self.latched_from.is_some(),
        }
    }
}

/// What renderers need to know after the visible part of the state changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub group: u32,
    pub level: u32,
    pub view: String,
    pub locked_view: Option<String>,
    /// The view is shown for the next key only.
    pub latched: bool,
}

/// Result of applying one event's transitions.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Applied {
    /// Set when anything a [`Notification`] carries differs from before.
    pub notification: Option<Notification>,
    /// Set when the modifier mask differs from before.
    pub modifiers: Option<ModifierMask>,
}

#[derive(Debug)]
pub struct StateMachine {
    state: KeyboardState,
}

impl StateMachine {
    pub fn new(default_view: impl Into<String>, modifier_behavior: ModifierBehavior) -> Self {
        StateMachine {
            state: KeyboardState::new(default_view, modifier_behavior),
        }
    }

    pub fn state(&self) -> &KeyboardState {
        &self.state
    }

    /// Applies the transitions of a single press or release.
    ///
    /// The state is updated as a whole and compared once against the
    /// previous one. A view switch naming a view that the layout does not
    /// have is dropped on its own, the other transitions still apply.
    /// Emissions are not state and are left to the caller.
    pub fn apply(&mut self, transitions: &[Transition], layout: &Layout) -> Applied {
        let mut next = self.state.clone();
        for transition in transitions {
            match transition {
                Transition::ModifierChanged(modifiers) => next.modifiers = *modifiers,
                Transition::SetLevel { group, level } => {
                    debug_assert!(*level <= MAX_LEVEL, "level {} out of range", level);
                    next.group = *group;
                    next.level = *level;
                }
                Transition::SetView(view) => {
                    switch_view(&mut next, view, layout);
                }
                Transition::ToggleLock {
                    lock_view,
                    unlock_view,
                    latches,
                } => toggle_lock(&mut next, lock_view, unlock_view, *latches, layout),
                Transition::Unlatch => unlatch(&mut next, layout),
                Transition::Emit { .. } => {}
            }
        }
        debug_assert_eq!(next.level, next.modifiers.level());
        self.replace(next)
    }

    /// Selects another group. The mask starts over empty,
    /// since held modifier keys may have no symbol to be released with there.
    ///
    /// Groups no key of `layout` has are ignored.
    pub fn set_group(&mut self, group: u32, layout: &Layout) -> Applied {
        if group >= layout.groups() {
            warn!("Bad group {}, ignoring", group);
            return Applied::default();
        }
        if group == self.state.group {
            return Applied::default();
        }
        let next = KeyboardState {
            group,
            modifiers: ModifierMask::empty(),
            level: 0,
            ..self.state.clone()
        };
        self.replace(next)
    }

    /// Changes the modifier policy. The mask starts over empty,
    /// since modifiers locked under the old policy could not be released.
    pub fn set_modifier_behavior(&mut self, modifier_behavior: ModifierBehavior) -> Applied {
        let next = KeyboardState {
            modifier_behavior,
            modifiers: ModifierMask::empty(),
            level: 0,
            ..self.state.clone()
        };
        self.replace(next)
    }

    /// Back to the initial state of a freshly loaded layout, keeping the policy,
    /// and the group if the new layout has it.
    pub fn reset(&mut self, layout: &Layout) -> Applied {
        let group = if self.state.group < layout.groups() {
            self.state.group
        } else {
            0
        };
        let next = KeyboardState {
            group,
            ..KeyboardState::new(layout.default_view(), self.state.modifier_behavior)
        };
        self.replace(next)
    }

    fn replace(&mut self, next: KeyboardState) -> Applied {
        let prev = std::mem::replace(&mut self.state, next);
        let state = &self.state;
        if prev != *state {
            debug!(?state, "Keyboard state changed");
        }

        let modifiers = (prev.modifiers != state.modifiers).then_some(state.modifiers);
        let notification = state.notification();
        let notification = (prev.notification() != notification).then_some(notification);
        Applied {
            notification,
            modifiers,
        }
    }
}

/// Returns whether the view changed.
fn switch_view(state: &mut KeyboardState, view: &str, layout: &Layout) -> bool {
    if !layout.has_view(view) {
        warn!("Bad view {}, ignoring", view);
        return false;
    }
    state.current_view = view.to_owned();
    state.latched_from = None;
    if state.locked_view.as_deref() != Some(view) {
        state.locked_view = None;
    }
    true
}

/// Consecutive presses go from unlocked to locked and back, passing through
/// latched first when `latches` is set.
fn toggle_lock(
    state: &mut KeyboardState,
    lock_view: &str,
    unlock_view: &str,
    latches: bool,
    layout: &Layout,
) {
    if state.current_view != lock_view {
        // a view latched by another key keeps its way back
        let from = state
            .latched_from
            .clone()
            .unwrap_or_else(|| state.current_view.clone());
        if switch_view(state, lock_view, layout) {
            if latches {
                state.latched_from = Some(from);
            } else {
                state.locked_view = Some(lock_view.to_owned());
            }
        }
    } else if latches && state.latched_from.is_some() {
        state.latched_from = None;
        state.locked_view = Some(lock_view.to_owned());
    } else if state.locked_view.is_some() || state.latched_from.is_some() {
        switch_view(state, unlock_view, layout);
    } else {
        // reached through a plain view switch, pin it
        state.locked_view = Some(lock_view.to_owned());
    }
}

fn unlatch(state: &mut KeyboardState, layout: &Layout) {
    if let Some(from) = state.latched_from.clone() {
        if !switch_view(state, &from, layout) {
            warn!("Can't unlatch to {}", from);
        }
    }
}

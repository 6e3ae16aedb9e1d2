// SPDX-License-Identifier: GPL-3.0-only

use super::{
    action::{interpret, Emission, KeyState, Transition, Transitions},
    layout::{Layout, View},
    state::{Applied, KeyboardState, Notification, StateMachine},
    symbol::ModifierMask,
};
use indexmap::IndexMap;
use tapboard_config::ModifierBehavior;
use tracing::{debug, trace};

/// Receives what the keyboard wants delivered to the host.
pub trait Submission {
    fn submit(&mut self, emission: &Emission, modifiers: ModifierMask);
    fn set_modifiers(&mut self, modifiers: ModifierMask);
}

/// Receives the visible state after it changed.
pub trait ChangeListener {
    fn state_changed(&mut self, notification: &Notification);
}

/// Routes key events through the layout and the state machine.
///
/// Callers deliver events one at a time, in order.
#[derive(Debug)]
pub struct Dispatcher<B> {
    layout: Layout,
    machine: StateMachine,
    // keycode -> view it was pressed in, in press order
    pressed: IndexMap<u32, String>,
    backend: B,
}

impl<B: Submission + ChangeListener> Dispatcher<B> {
    pub fn new(layout: Layout, modifier_behavior: ModifierBehavior, backend: B) -> Self {
        let machine = StateMachine::new(layout.default_view(), modifier_behavior);
        Dispatcher {
            layout,
            machine,
            pressed: IndexMap::new(),
            backend,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn state(&self) -> &KeyboardState {
        self.machine.state()
    }

    pub fn current_view(&self) -> Option<&View> {
        self.layout.view(&self.machine.state().current_view)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn is_pressed(&self, keycode: u32) -> bool {
        self.pressed.contains_key(&keycode)
    }

    pub fn on_keycode_press(&mut self, keycode: u32) {
        if self.pressed.contains_key(&keycode) {
            debug!(keycode, "Key was already pressed");
            return;
        }
        let state = self.machine.state();
        let Some(key) = self
            .layout
            .view_mut(&state.current_view)
            .and_then(|view| view.find_key_by_keycode_mut(keycode))
        else {
            trace!(keycode, view = %state.current_view, "No key for keycode");
            return;
        };

        key.set_pressed(true);
        self.pressed.insert(keycode, state.current_view.clone());
        let transitions = interpret(
            state,
            KeyState::Pressed,
            key.action(),
            key.symbol_at(state.group, state.level),
        );
        self.apply(transitions);
    }

    pub fn on_keycode_release(&mut self, keycode: u32) {
        let Some(view) = self.pressed.shift_remove(&keycode) else {
            trace!(keycode, "Key was not pressed");
            return;
        };
        let state = self.machine.state();
        let Some(key) = self
            .layout
            .view_mut(&view)
            .and_then(|view| view.find_key_by_keycode_mut(keycode))
        else {
            trace!(keycode, view = %view, "Released key is gone");
            return;
        };

        key.set_pressed(false);
        let transitions = interpret(
            state,
            KeyState::Released,
            key.action(),
            key.symbol_at(state.group, state.level),
        );
        self.apply(transitions);
    }

    /// Releases every pressed key, oldest press first.
    pub fn release_all(&mut self) {
        let pressed = self.pressed.keys().copied().collect::<Vec<_>>();
        for keycode in pressed {
            self.on_keycode_release(keycode);
        }
    }

    /// Selects a group of the layout. Held modifiers are dropped.
    pub fn set_group(&mut self, group: u32) {
        let applied = self.machine.set_group(group, &self.layout);
        self.forward(applied);
    }

    pub fn set_modifier_behavior(&mut self, modifier_behavior: ModifierBehavior) {
        let applied = self.machine.set_modifier_behavior(modifier_behavior);
        self.forward(applied);
    }

    /// Replaces the layout.
    ///
    /// Keys still held are forgotten without being released: their release
    /// events will find nothing to act on. Modifiers are cleared and the
    /// state returns to the new layout's default view. The group is kept if
    /// the new layout has it.
    pub fn reload(&mut self, layout: Layout) {
        if !self.pressed.is_empty() {
            debug!(count = self.pressed.len(), "Dropping pressed keys on reload");
        }
        for (keycode, view) in self.pressed.drain(..) {
            if let Some(key) = self
                .layout
                .view_mut(&view)
                .and_then(|view| view.find_key_by_keycode_mut(keycode))
            {
                key.set_pressed(false);
            }
        }
        self.layout = layout;
        let applied = self.machine.reset(&self.layout);
        self.forward(applied);
    }

    fn apply(&mut self, transitions: Transitions) {
        let applied = self.machine.apply(&transitions, &self.layout);
        for transition in transitions {
            if let Transition::Emit {
                emission,
                modifiers,
            } = transition
            {
                self.backend.submit(&emission, modifiers);
            }
        }
        self.forward(applied);
    }

    fn forward(&mut self, applied: Applied) {
        if let Some(modifiers) = applied.modifiers {
            self.backend.set_modifiers(modifiers);
        }
        if let Some(notification) = applied.notification {
            self.backend.state_changed(&notification);
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::keyboard::{
        action::Action,
        key::Key,
        layout::{Section, View},
        symbol::{Label, Symbol, SymbolTable},
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Submit(Emission, ModifierMask),
        Modifiers(ModifierMask),
        Changed(Notification),
    }

    #[derive(Debug, Default)]
    pub struct Recorder {
        pub events: Vec<Event>,
    }

    impl Recorder {
        pub fn take(&mut self) -> Vec<Event> {
            std::mem::take(&mut self.events)
        }

        pub fn submitted(&self) -> Vec<Emission> {
            self.events
                .iter()
                .filter_map(|event| match event {
                    Event::Submit(emission, _) => Some(emission.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Submission for Recorder {
        fn submit(&mut self, emission: &Emission, modifiers: ModifierMask) {
            self.events.push(Event::Submit(emission.clone(), modifiers));
        }

        fn set_modifiers(&mut self, modifiers: ModifierMask) {
            self.events.push(Event::Modifiers(modifiers));
        }
    }

    impl ChangeListener for Recorder {
        fn state_changed(&mut self, notification: &Notification) {
            self.events.push(Event::Changed(notification.clone()));
        }
    }

    pub const SHIFT: u32 = 50;
    pub const ALTGR: u32 = 108;
    pub const A: u32 = 38;
    pub const NUMBERS: u32 = 200;
    pub const LOCK_UPPER: u32 = 201;
    pub const ABC: u32 = 202;
    pub const ONE: u32 = 10;
    pub const PREFERENCES: u32 = 203;
    pub const S: u32 = 39;

    fn label_only(label: &str) -> SymbolTable {
        SymbolTable::level_invariant(Symbol {
            label: Label::Text(label.into()),
            text: None,
            keysym: None,
            modifiers: ModifierMask::empty(),
        })
    }

    /// Views `base` and `upper` share the letter keys, `numbers` has its own.
    /// Only `s` has a second group.
    pub fn test_layout() -> Layout {
        let letters = || {
            Section::new(vec![
                Key::new(
                    A,
                    "a",
                    SymbolTable::from_levels([
                        Symbol::text("a"),
                        Symbol::text("A"),
                        Symbol::text("æ"),
                        Symbol::text("Æ"),
                    ]),
                ),
                Key::new(
                    SHIFT,
                    "Shift_L",
                    SymbolTable::level_invariant(Symbol::modifier("⇧", ModifierMask::SHIFT)),
                ),
                Key::new(
                    ALTGR,
                    "ISO_Level3_Shift",
                    SymbolTable::level_invariant(Symbol::modifier("AltGr", ModifierMask::MOD5)),
                ),
                Key::new(
                    LOCK_UPPER,
                    "caps",
                    label_only("⇪"),
                )
                .with_action(Action::Locking {
                    lock_view: "upper".into(),
                    unlock_view: "base".into(),
                    latches: false,
                }),
                Key::new(S, "s", {
                    let mut symbols = SymbolTable::from_levels([
                        Symbol::text("s"),
                        Symbol::text("S"),
                        Symbol::text("ß"),
                        Symbol::text("ẞ"),
                    ]);
                    symbols.set(1, 0, Symbol::text("σ"));
                    symbols.set(1, 1, Symbol::text("Σ"));
                    symbols
                }),
                Key::new(NUMBERS, "show_numbers", label_only("123"))
                    .with_action(Action::SetView("numbers".into())),
                Key::new(PREFERENCES, "preferences", label_only("⚙"))
                    .with_action(Action::ShowPreferences),
            ])
        };
        let numbers = View::new(
            "numbers",
            vec![Section::new(vec![
                Key::new(ONE, "1", SymbolTable::level_invariant(Symbol::text("1"))),
                Key::new(ABC, "show_letters", label_only("abc"))
                    .with_action(Action::SetView("base".into())),
            ])],
        );
        Layout::new(
            "base",
            vec![
                View::new("base", vec![letters()]),
                View::new("upper", vec![letters()]),
                numbers,
            ],
            IndexMap::new(),
        )
        .unwrap()
    }

    pub fn dispatcher(behavior: ModifierBehavior) -> Dispatcher<Recorder> {
        Dispatcher::new(test_layout(), behavior, Recorder::default())
    }

    fn tap(dispatcher: &mut Dispatcher<Recorder>, keycode: u32) {
        dispatcher.on_keycode_press(keycode);
        dispatcher.on_keycode_release(keycode);
    }

    fn text(text: &str) -> Emission {
        Emission::Text(text.into())
    }

    #[test]
    fn lock_shift_scenario() {
        let mut dispatcher = dispatcher(ModifierBehavior::Lock);

        tap(&mut dispatcher, SHIFT);
        assert_eq!(dispatcher.state().modifiers, ModifierMask::SHIFT);
        assert_eq!(dispatcher.state().level, 1);
        tap(&mut dispatcher, A);
        tap(&mut dispatcher, A);

        dispatcher.on_keycode_press(SHIFT);
        assert_eq!(dispatcher.state().modifiers, ModifierMask::empty());
        assert_eq!(dispatcher.state().level, 0);
        dispatcher.on_keycode_release(SHIFT);
        tap(&mut dispatcher, A);

        assert_eq!(
            dispatcher.backend().submitted(),
            vec![text("A"), text("A"), text("a")]
        );
    }

    #[test]
    fn plain_shift_release_notifies() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);

        dispatcher.on_keycode_press(SHIFT);
        tap(&mut dispatcher, A);
        dispatcher.backend_mut().take();

        dispatcher.on_keycode_release(SHIFT);
        assert_eq!(dispatcher.state().modifiers, ModifierMask::empty());
        assert_eq!(
            dispatcher.backend_mut().take(),
            vec![
                Event::Modifiers(ModifierMask::empty()),
                Event::Changed(Notification {
                    group: 0,
                    level: 0,
                    view: "base".into(),
                    locked_view: None,
                    latched: false,
                }),
            ]
        );
    }

    #[test]
    fn latch_is_one_shot() {
        let mut dispatcher = dispatcher(ModifierBehavior::Latch);

        tap(&mut dispatcher, SHIFT);
        assert_eq!(dispatcher.state().modifiers, ModifierMask::SHIFT);
        assert_eq!(dispatcher.state().level, 1);

        tap(&mut dispatcher, A);
        assert_eq!(dispatcher.state().modifiers, ModifierMask::empty());
        assert_eq!(dispatcher.state().level, 0);

        tap(&mut dispatcher, A);
        assert_eq!(
            dispatcher.backend().submitted(),
            vec![text("A"), text("a")]
        );
    }

    #[test]
    fn latch_collapses_to_last_modifier() {
        let mut dispatcher = dispatcher(ModifierBehavior::Latch);

        tap(&mut dispatcher, SHIFT);
        tap(&mut dispatcher, ALTGR);
        assert_eq!(dispatcher.state().modifiers, ModifierMask::MOD5);
        tap(&mut dispatcher, A);
        assert_eq!(dispatcher.backend().submitted(), vec![text("æ")]);
    }

    #[test]
    fn plain_modifiers_compose() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);

        dispatcher.on_keycode_press(SHIFT);
        dispatcher.on_keycode_press(ALTGR);
        assert_eq!(dispatcher.state().level, 3);
        tap(&mut dispatcher, A);
        dispatcher.on_keycode_release(ALTGR);
        tap(&mut dispatcher, A);
        dispatcher.on_keycode_release(SHIFT);

        assert_eq!(
            dispatcher.backend().submitted(),
            vec![text("Æ"), text("A")]
        );
        assert_eq!(dispatcher.state().level, 0);
    }

    #[test]
    fn emissions_carry_modifiers() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);

        dispatcher.on_keycode_press(SHIFT);
        dispatcher.backend_mut().take();
        dispatcher.on_keycode_press(A);
        assert_eq!(
            dispatcher.backend_mut().take(),
            vec![Event::Submit(text("A"), ModifierMask::SHIFT)]
        );
    }

    #[test]
    fn locking_view_toggles() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);

        for _ in 0..3 {
            tap(&mut dispatcher, LOCK_UPPER);
            assert_eq!(dispatcher.state().current_view, "upper");
            assert_eq!(dispatcher.state().locked_view.as_deref(), Some("upper"));

            tap(&mut dispatcher, LOCK_UPPER);
            assert_eq!(dispatcher.state().current_view, "base");
            assert_eq!(dispatcher.state().locked_view, None);
        }
        // view keys submit nothing, and group/level never moved
        assert!(dispatcher.backend().submitted().is_empty());
        assert_eq!(dispatcher.state().level, 0);
    }

    #[test]
    fn set_view_is_sticky() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);

        tap(&mut dispatcher, NUMBERS);
        assert_eq!(dispatcher.state().current_view, "numbers");
        assert_eq!(
            dispatcher.current_view().map(View::name),
            Some("numbers")
        );

        tap(&mut dispatcher, ONE);
        tap(&mut dispatcher, ONE);
        assert_eq!(dispatcher.state().current_view, "numbers");
        assert_eq!(dispatcher.backend().submitted(), vec![text("1"), text("1")]);

        // keys of other views are not reachable
        tap(&mut dispatcher, A);
        assert_eq!(dispatcher.backend().submitted().len(), 2);

        tap(&mut dispatcher, ABC);
        assert_eq!(dispatcher.state().current_view, "base");
    }

    #[test]
    fn view_key_released_where_pressed() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);

        tap(&mut dispatcher, NUMBERS);
        dispatcher.on_keycode_press(ABC);
        assert!(dispatcher
            .layout()
            .find_key_by_keycode("numbers", ABC)
            .is_some_and(|key| key.is_pressed()));
        dispatcher.on_keycode_release(ABC);

        assert_eq!(dispatcher.state().current_view, "base");
        assert!(!dispatcher
            .layout()
            .find_key_by_keycode("numbers", ABC)
            .is_some_and(|key| key.is_pressed()));
    }

    #[test]
    fn repeated_press_is_idempotent() {
        let mut dispatcher = dispatcher(ModifierBehavior::Lock);

        dispatcher.on_keycode_press(SHIFT);
        dispatcher.on_keycode_press(SHIFT);
        assert_eq!(dispatcher.state().modifiers, ModifierMask::SHIFT);
        assert!(dispatcher.is_pressed(SHIFT));

        dispatcher.on_keycode_release(SHIFT);
        dispatcher.on_keycode_release(SHIFT);
        assert!(!dispatcher.is_pressed(SHIFT));
        assert_eq!(dispatcher.state().modifiers, ModifierMask::SHIFT);

        dispatcher.on_keycode_press(A);
        dispatcher.on_keycode_press(A);
        assert_eq!(dispatcher.backend().submitted(), vec![text("A")]);
    }

    #[test]
    fn unknown_keycode_is_ignored() {
        let mut dispatcher = dispatcher(ModifierBehavior::Latch);
        tap(&mut dispatcher, SHIFT);
        dispatcher.backend_mut().take();

        let before = dispatcher.state().clone();
        tap(&mut dispatcher, 9999);
        // only present in the numbers view
        tap(&mut dispatcher, ONE);
        assert_eq!(*dispatcher.state(), before);
        assert!(dispatcher.backend().events.is_empty());
    }

    #[test]
    fn empty_cell_is_ignored() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);
        dispatcher.set_group(1);
        dispatcher.backend_mut().take();

        let before = dispatcher.state().clone();
        tap(&mut dispatcher, A);
        tap(&mut dispatcher, SHIFT);
        assert_eq!(*dispatcher.state(), before);
        assert!(dispatcher.backend().events.is_empty());
    }

    #[test]
    fn preferences_on_release() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);
        dispatcher.on_keycode_press(PREFERENCES);
        assert!(dispatcher.backend().submitted().is_empty());
        dispatcher.on_keycode_release(PREFERENCES);
        assert_eq!(
            dispatcher.backend().submitted(),
            vec![Emission::ShowPreferences]
        );
    }

    #[test]
    fn release_all_releases_modifiers() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);
        dispatcher.on_keycode_press(SHIFT);
        dispatcher.on_keycode_press(A);

        dispatcher.release_all();
        assert!(!dispatcher.is_pressed(SHIFT));
        assert!(!dispatcher.is_pressed(A));
        assert_eq!(dispatcher.state().modifiers, ModifierMask::empty());
    }

    #[test]
    fn reload_drops_pending_keys() {
        let mut dispatcher = dispatcher(ModifierBehavior::Lock);
        tap(&mut dispatcher, LOCK_UPPER);
        tap(&mut dispatcher, SHIFT);
        dispatcher.on_keycode_press(A);
        dispatcher.backend_mut().take();

        dispatcher.reload(test_layout());
        assert_eq!(
            dispatcher.backend_mut().take(),
            vec![
                Event::Modifiers(ModifierMask::empty()),
                Event::Changed(Notification {
                    group: 0,
                    level: 0,
                    view: "base".into(),
                    locked_view: None,
                    latched: false,
                }),
            ]
        );
        assert!(!dispatcher.is_pressed(A));

        // the stale release does nothing
        dispatcher.on_keycode_release(A);
        assert!(dispatcher.backend().events.is_empty());
        assert!(dispatcher.layout().views().all(|view| view.keys().all(|key| !key.is_pressed())));
    }

    #[test]
    fn behavior_switch_clears_modifiers() {
        let mut dispatcher = dispatcher(ModifierBehavior::Lock);
        tap(&mut dispatcher, SHIFT);
        dispatcher.set_modifier_behavior(ModifierBehavior::Latch);
        assert_eq!(dispatcher.state().modifiers, ModifierMask::empty());
        assert_eq!(dispatcher.state().level, 0);
        assert_eq!(dispatcher.state().modifier_behavior, ModifierBehavior::Latch);
    }

    #[test]
    fn group_change_drops_held_modifier() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);
        assert_eq!(dispatcher.layout().groups(), 2);

        dispatcher.on_keycode_press(SHIFT);
        assert_eq!(dispatcher.state().modifiers, ModifierMask::SHIFT);
        dispatcher.backend_mut().take();

        dispatcher.set_group(1);
        assert_eq!(
            dispatcher.backend_mut().take(),
            vec![
                Event::Modifiers(ModifierMask::empty()),
                Event::Changed(Notification {
                    group: 1,
                    level: 0,
                    view: "base".into(),
                    locked_view: None,
                    latched: false,
                }),
            ]
        );

        // Shift has no symbol in group 1, its release and taps do nothing
        dispatcher.on_keycode_release(SHIFT);
        tap(&mut dispatcher, SHIFT);
        assert_eq!(dispatcher.state().modifiers, ModifierMask::empty());
        assert_eq!(dispatcher.state().level, 0);

        tap(&mut dispatcher, S);
        assert_eq!(dispatcher.backend().submitted(), vec![text("σ")]);
    }

    #[test]
    fn unknown_group_is_ignored() {
        let mut dispatcher = dispatcher(ModifierBehavior::Lock);
        tap(&mut dispatcher, SHIFT);
        dispatcher.backend_mut().take();
        let before = dispatcher.state().clone();

        dispatcher.set_group(7);
        assert_eq!(*dispatcher.state(), before);
        assert!(dispatcher.backend().events.is_empty());

        dispatcher.on_keycode_press(SHIFT);
        dispatcher.on_keycode_release(SHIFT);
        tap(&mut dispatcher, SHIFT);
        tap(&mut dispatcher, S);
        assert_eq!(dispatcher.state().group, 0);
        assert_eq!(dispatcher.backend().submitted(), vec![text("S")]);
    }

    #[test]
    fn reload_keeps_group_only_if_present() {
        let mut dispatcher = dispatcher(ModifierBehavior::None);
        dispatcher.set_group(1);
        dispatcher.reload(test_layout());
        assert_eq!(dispatcher.state().group, 1);

        let single = Layout::new(
            "base",
            vec![View::new("base", vec![])],
            IndexMap::new(),
        )
        .unwrap();
        dispatcher.reload(single);
        assert_eq!(dispatcher.state().group, 0);
    }

    const SWITCH: u32 = 1;
    const SWITCH_AGAIN: u32 = 2;
    const UNSWITCH: u32 = 3;
    const ERASE: u32 = 4;

    /// Every view holds the same latching keys.
    fn latching_dispatcher() -> Dispatcher<Recorder> {
        let keys = || {
            Section::new(vec![
                Key::new(SWITCH, "switch", label_only("⇧")).with_action(Action::Locking {
                    lock_view: "locked".into(),
                    unlock_view: "base".into(),
                    latches: true,
                }),
                Key::new(SWITCH_AGAIN, "switch_again", label_only("ĄĘ")).with_action(
                    Action::Locking {
                        lock_view: "ĄĘ".into(),
                        unlock_view: "locked".into(),
                        latches: true,
                    },
                ),
                Key::new(UNSWITCH, "unswitch", label_only("⇩")).with_action(Action::Locking {
                    lock_view: "locked".into(),
                    unlock_view: "unlocked".into(),
                    latches: false,
                }),
                Key::new(ERASE, "BackSpace", label_only("⌫")).with_action(Action::Erase),
            ])
        };
        let layout = Layout::new(
            "base",
            ["base", "locked", "ĄĘ", "unlocked"]
                .into_iter()
                .map(|name| View::new(name, vec![keys()])),
            IndexMap::new(),
        )
        .unwrap();
        Dispatcher::new(layout, ModifierBehavior::None, Recorder::default())
    }

    #[test]
    fn latching_view_cycle() {
        let mut dispatcher = latching_dispatcher();

        tap(&mut dispatcher, SWITCH);
        assert_eq!(dispatcher.state().current_view, "locked");
        assert_eq!(dispatcher.state().latched_from.as_deref(), Some("base"));
        assert_eq!(dispatcher.state().locked_view, None);

        tap(&mut dispatcher, SWITCH);
        assert_eq!(dispatcher.state().current_view, "locked");
        assert_eq!(dispatcher.state().latched_from, None);
        assert_eq!(dispatcher.state().locked_view.as_deref(), Some("locked"));

        tap(&mut dispatcher, ERASE);
        assert_eq!(dispatcher.state().current_view, "locked");

        tap(&mut dispatcher, SWITCH);
        assert_eq!(dispatcher.state().current_view, "base");
        assert_eq!(dispatcher.state().locked_view, None);

        tap(&mut dispatcher, SWITCH);
        assert_eq!(dispatcher.state().current_view, "locked");
        tap(&mut dispatcher, ERASE);
        assert_eq!(dispatcher.state().current_view, "base");
        assert_eq!(dispatcher.state().latched_from, None);

        assert_eq!(
            dispatcher.backend().submitted(),
            vec![Emission::Erase, Emission::Erase]
        );
    }

    #[test]
    fn latched_view_emits_before_returning() {
        let mut dispatcher = latching_dispatcher();
        tap(&mut dispatcher, SWITCH);
        dispatcher.backend_mut().take();

        // the erase reaches the host while the latched view is still shown
        tap(&mut dispatcher, ERASE);
        assert_eq!(
            dispatcher.backend_mut().take(),
            vec![
                Event::Submit(Emission::Erase, ModifierMask::empty()),
                Event::Changed(Notification {
                    group: 0,
                    level: 0,
                    view: "base".into(),
                    locked_view: None,
                    latched: false,
                }),
            ]
        );
    }

    #[test]
    fn stacked_latches_return_to_first_view() {
        let mut dispatcher = latching_dispatcher();

        tap(&mut dispatcher, SWITCH);
        assert_eq!(dispatcher.state().current_view, "locked");
        tap(&mut dispatcher, SWITCH_AGAIN);
        assert_eq!(dispatcher.state().current_view, "ĄĘ");
        assert_eq!(dispatcher.state().latched_from.as_deref(), Some("base"));

        tap(&mut dispatcher, ERASE);
        assert_eq!(dispatcher.state().current_view, "base");
    }

    #[test]
    fn plain_lock_key_unlocks_latched_view() {
        let mut dispatcher = latching_dispatcher();

        tap(&mut dispatcher, SWITCH);
        assert_eq!(dispatcher.state().current_view, "locked");
        tap(&mut dispatcher, UNSWITCH);
        assert_eq!(dispatcher.state().current_view, "unlocked");
        assert_eq!(dispatcher.state().latched_from, None);
    }
}

use std::collections::HashMap;

use bitflags::bitflags;
use glfw::{Action, Key, Modifiers};

use crate::error::{Error, Result};
use crate::listeners::{ListenerId, Listeners};
use crate::registry::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Pressed,
    Released,
    Repeat,
}

impl KeyAction {
    pub fn from_raw(value: i32) -> Result<Self> {
        match value {
            glfw::ffi::PRESS => Ok(KeyAction::Pressed),
            glfw::ffi::RELEASE => Ok(KeyAction::Released),
            glfw::ffi::REPEAT => Ok(KeyAction::Repeat),
            _ => Err(Error::InvalidEnum { kind: "key action", value }),
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            KeyAction::Pressed => glfw::ffi::PRESS,
            KeyAction::Released => glfw::ffi::RELEASE,
            KeyAction::Repeat => glfw::ffi::REPEAT,
        }
    }

    /// Held down, including auto-repeat.
    pub fn is_down(&self) -> bool {
        *self != KeyAction::Released
    }
}

impl From<Action> for KeyAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Press => KeyAction::Pressed,
            Action::Release => KeyAction::Released,
            Action::Repeat => KeyAction::Repeat,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: i32 {
        const SHIFT = glfw::ffi::MOD_SHIFT;
        const CONTROL = glfw::ffi::MOD_CONTROL;
        const ALT = glfw::ffi::MOD_ALT;
        const SUPER = glfw::ffi::MOD_SUPER;
    }
}

impl KeyModifiers {
    /// Every modifier whose bit is set. Unknown bits are dropped.
    pub fn parse(bits: i32) -> Self {
        KeyModifiers::from_bits_truncate(bits)
    }
}

impl From<Modifiers> for KeyModifiers {
    fn from(mods: Modifiers) -> Self {
        KeyModifiers::parse(mods.bits() as i32)
    }
}

pub trait KeyListener {
    fn key_action_performed(&mut self, window: WindowId, key: Key, scancode: i32, action: KeyAction, mods: KeyModifiers);
}

impl<F> KeyListener for F
    where F: FnMut(WindowId, Key, i32, KeyAction, KeyModifiers) {
    fn key_action_performed(&mut self, window: WindowId, key: Key, scancode: i32, action: KeyAction, mods: KeyModifiers) {
        self(window, key, scancode, action, mods)
    }
}

pub trait KeyCharListener {
    fn char_type_performed(&mut self, window: WindowId, code: char);
}

impl<F> KeyCharListener for F
    where F: FnMut(WindowId, char) {
    fn char_type_performed(&mut self, window: WindowId, code: char) {
        self(window, code)
    }
}

/// Keyboard front-end of a window. Fans key and character events out to its
/// listeners and remembers the last action seen for every key.
#[derive(Default)]
pub struct Keyboard {
    key_listeners: Listeners<dyn KeyListener>,
    char_listeners: Listeners<dyn KeyCharListener>,
    key_states: HashMap<Key, KeyAction>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn add_key_listener<L: KeyListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.key_listeners.add(Box::new(listener))
    }

    pub fn add_char_listener<L: KeyCharListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.char_listeners.add(Box::new(listener))
    }

    pub fn add_all_key_listeners<I>(&mut self, listeners: I) -> Vec<ListenerId>
        where I: IntoIterator<Item = Box<dyn KeyListener>> {
        self.key_listeners.add_all(listeners)
    }

    pub fn add_all_char_listeners<I>(&mut self, listeners: I) -> Vec<ListenerId>
        where I: IntoIterator<Item = Box<dyn KeyCharListener>> {
        self.char_listeners.add_all(listeners)
    }

    pub fn remove_key_listener(&mut self, id: ListenerId) -> bool {
        self.key_listeners.remove(id)
    }

    pub fn remove_char_listener(&mut self, id: ListenerId) -> bool {
        self.char_listeners.remove(id)
    }

    pub fn remove_all_key_listeners(&mut self) {
        self.key_listeners.clear();
    }

    pub fn remove_all_char_listeners(&mut self) {
        self.char_listeners.clear();
    }

    pub fn key_listeners(&self) -> Vec<ListenerId> {
        self.key_listeners.ids()
    }

    pub fn char_listeners(&self) -> Vec<ListenerId> {
        self.char_listeners.ids()
    }

    pub fn last_action(&self, key: Key) -> Option<KeyAction> {
        self.key_states.get(&key).copied()
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        match self.key_states.get(&key) {
            None => false,
            Some(action) => action.is_down(),
        }
    }
}

impl KeyListener for Keyboard {
    fn key_action_performed(&mut self, window: WindowId, key: Key, scancode: i32, action: KeyAction, mods: KeyModifiers) {
        self.key_states.insert(key, action);
        self.key_listeners.for_each_mut(|l| l.key_action_performed(window, key, scancode, action, mods));
    }
}

impl KeyCharListener for Keyboard {
    fn char_type_performed(&mut self, window: WindowId, code: char) {
        self.char_listeners.for_each_mut(|l| l.char_type_performed(window, code));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn key_action_from_native() {
        assert_eq!(KeyAction::from_raw(glfw::ffi::PRESS).unwrap(), KeyAction::Pressed);
        assert_eq!(KeyAction::from_raw(glfw::ffi::RELEASE).unwrap(), KeyAction::Released);
        assert_eq!(KeyAction::from_raw(glfw::ffi::REPEAT).unwrap(), KeyAction::Repeat);
        assert!(matches!(
            KeyAction::from_raw(42),
            Err(Error::InvalidEnum { kind: "key action", value: 42 })));
        assert_eq!(KeyAction::from(Action::Repeat), KeyAction::Repeat);
        assert_eq!(KeyAction::Repeat.raw(), glfw::ffi::REPEAT);
    }

    #[test]
    fn modifiers_from_bitfield() {
        let mods = KeyModifiers::parse(glfw::ffi::MOD_SHIFT | glfw::ffi::MOD_ALT);
        assert!(mods.contains(KeyModifiers::SHIFT));
        assert!(mods.contains(KeyModifiers::ALT));
        assert!(!mods.contains(KeyModifiers::CONTROL));
        assert!(!mods.contains(KeyModifiers::SUPER));

        assert!(KeyModifiers::parse(0).is_empty());
        assert_eq!(KeyModifiers::parse(0x0F | 0x100), KeyModifiers::all());
        assert_eq!(KeyModifiers::from(Modifiers::Control), KeyModifiers::CONTROL);
    }

    #[test]
    fn keyboard_forwards_to_listeners_and_tracks_state() {
        let window = WindowId::next();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut keyboard = Keyboard::new();

        let sink = seen.clone();
        keyboard.add_key_listener(move |w: WindowId, key: Key, _scancode: i32, action: KeyAction, mods: KeyModifiers| {
            sink.borrow_mut().push((w, key, action, mods));
        });

        keyboard.key_action_performed(window, Key::W, 17, KeyAction::Pressed, KeyModifiers::SHIFT);
        assert!(keyboard.is_key_pressed(Key::W));
        keyboard.key_action_performed(window, Key::W, 17, KeyAction::Repeat, KeyModifiers::empty());
        assert!(keyboard.is_key_pressed(Key::W));
        keyboard.key_action_performed(window, Key::W, 17, KeyAction::Released, KeyModifiers::empty());
        assert!(!keyboard.is_key_pressed(Key::W));
        assert!(!keyboard.is_key_pressed(Key::S));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (window, Key::W, KeyAction::Pressed, KeyModifiers::SHIFT));
        assert_eq!(keyboard.last_action(Key::W), Some(KeyAction::Released));
    }

    #[test]
    fn removed_char_listener_is_not_called() {
        let window = WindowId::next();
        let typed = Rc::new(RefCell::new(String::new()));
        let mut keyboard = Keyboard::new();

        let sink = typed.clone();
        let id = keyboard.add_char_listener(move |_: WindowId, c: char| sink.borrow_mut().push(c));
        keyboard.char_type_performed(window, 'h');
        keyboard.char_type_performed(window, 'i');

        assert!(keyboard.remove_char_listener(id));
        keyboard.char_type_performed(window, '!');
        assert_eq!(*typed.borrow(), "hi");
        assert!(keyboard.char_listeners().is_empty());
    }
}

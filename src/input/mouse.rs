use std::convert::TryFrom;

use glfw::{Action, MouseButton};

use crate::error::{Error, Result};
use crate::input::keyboard::KeyModifiers;
use crate::listeners::{ListenerId, Listeners};
use crate::registry::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButtonAction {
    Pressed,
    Released,
}

impl MouseButtonAction {
    pub fn from_raw(value: i32) -> Result<Self> {
        match value {
            glfw::ffi::PRESS => Ok(MouseButtonAction::Pressed),
            glfw::ffi::RELEASE => Ok(MouseButtonAction::Released),
            _ => Err(Error::InvalidEnum { kind: "mouse button action", value }),
        }
    }
}

impl TryFrom<Action> for MouseButtonAction {
    type Error = Error;

    fn try_from(action: Action) -> Result<Self> {
        MouseButtonAction::from_raw(action as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEnteredStatus {
    Entered,
    Exited,
}

impl MouseEnteredStatus {
    pub fn from_raw(value: i32) -> Result<Self> {
        match value {
            1 => Ok(MouseEnteredStatus::Entered),
            0 => Ok(MouseEnteredStatus::Exited),
            _ => Err(Error::InvalidEnum { kind: "cursor enter status", value }),
        }
    }
}

impl From<bool> for MouseEnteredStatus {
    fn from(entered: bool) -> Self {
        if entered {
            MouseEnteredStatus::Entered
        } else {
            MouseEnteredStatus::Exited
        }
    }
}

pub trait MousePositionListener {
    fn mouse_position_action_performed(&mut self, window: WindowId, x: f64, y: f64);
}

impl<F> MousePositionListener for F
    where F: FnMut(WindowId, f64, f64) {
    fn mouse_position_action_performed(&mut self, window: WindowId, x: f64, y: f64) {
        self(window, x, y)
    }
}

pub trait MouseButtonListener {
    fn mouse_button_action_performed(&mut self, window: WindowId, button: MouseButton, action: MouseButtonAction, mods: KeyModifiers);
}

impl<F> MouseButtonListener for F
    where F: FnMut(WindowId, MouseButton, MouseButtonAction, KeyModifiers) {
    fn mouse_button_action_performed(&mut self, window: WindowId, button: MouseButton, action: MouseButtonAction, mods: KeyModifiers) {
        self(window, button, action, mods)
    }
}

pub trait MouseEnteredListener {
    fn mouse_entered_action_performed(&mut self, window: WindowId, status: MouseEnteredStatus);
}

impl<F> MouseEnteredListener for F
    where F: FnMut(WindowId, MouseEnteredStatus) {
    fn mouse_entered_action_performed(&mut self, window: WindowId, status: MouseEnteredStatus) {
        self(window, status)
    }
}

pub trait MouseScrollListener {
    fn mouse_scroll_action_performed(&mut self, window: WindowId, x_offset: f64, y_offset: f64);
}

impl<F> MouseScrollListener for F
    where F: FnMut(WindowId, f64, f64) {
    fn mouse_scroll_action_performed(&mut self, window: WindowId, x_offset: f64, y_offset: f64) {
        self(window, x_offset, y_offset)
    }
}

/// Mouse front-end of a window.
#[derive(Default)]
pub struct Mouse {
    entered_listeners: Listeners<dyn MouseEnteredListener>,
    position_listeners: Listeners<dyn MousePositionListener>,
    button_listeners: Listeners<dyn MouseButtonListener>,
    scroll_listeners: Listeners<dyn MouseScrollListener>,
    last_position: Option<(f64, f64)>,
    inside: bool,
}

impl Mouse {
    pub fn new() -> Self {
        Mouse::default()
    }

    pub fn add_entered_listener<L: MouseEnteredListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.entered_listeners.add(Box::new(listener))
    }

    pub fn remove_entered_listener(&mut self, id: ListenerId) -> bool {
        self.entered_listeners.remove(id)
    }

    pub fn add_position_listener<L: MousePositionListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.position_listeners.add(Box::new(listener))
    }

    pub fn remove_position_listener(&mut self, id: ListenerId) -> bool {
        self.position_listeners.remove(id)
    }

    pub fn add_button_listener<L: MouseButtonListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.button_listeners.add(Box::new(listener))
    }

    pub fn remove_button_listener(&mut self, id: ListenerId) -> bool {
        self.button_listeners.remove(id)
    }

    pub fn add_scroll_listener<L: MouseScrollListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.scroll_listeners.add(Box::new(listener))
    }

    pub fn remove_scroll_listener(&mut self, id: ListenerId) -> bool {
        self.scroll_listeners.remove(id)
    }

    pub fn clear_listeners(&mut self) {
        self.entered_listeners.clear();
        self.button_listeners.clear();
        self.position_listeners.clear();
        self.scroll_listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.entered_listeners.len()
            + self.button_listeners.len()
            + self.position_listeners.len()
            + self.scroll_listeners.len()
    }

    /// Last cursor position reported by the window, if any.
    pub fn last_position(&self) -> Option<(f64, f64)> {
        self.last_position
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

impl MouseButtonListener for Mouse {
    fn mouse_button_action_performed(&mut self, window: WindowId, button: MouseButton, action: MouseButtonAction, mods: KeyModifiers) {
        self.button_listeners.for_each_mut(|l| l.mouse_button_action_performed(window, button, action, mods));
    }
}

impl MousePositionListener for Mouse {
    fn mouse_position_action_performed(&mut self, window: WindowId, x: f64, y: f64) {
        self.last_position = Some((x, y));
        self.position_listeners.for_each_mut(|l| l.mouse_position_action_performed(window, x, y));
    }
}

impl MouseEnteredListener for Mouse {
    fn mouse_entered_action_performed(&mut self, window: WindowId, status: MouseEnteredStatus) {
        self.inside = status == MouseEnteredStatus::Entered;
        self.entered_listeners.for_each_mut(|l| l.mouse_entered_action_performed(window, status));
    }
}

impl MouseScrollListener for Mouse {
    fn mouse_scroll_action_performed(&mut self, window: WindowId, x_offset: f64, y_offset: f64) {
        self.scroll_listeners.for_each_mut(|l| l.mouse_scroll_action_performed(window, x_offset, y_offset));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn native_conversions() {
        assert_eq!(MouseButtonAction::from_raw(glfw::ffi::PRESS).unwrap(), MouseButtonAction::Pressed);
        assert_eq!(MouseButtonAction::try_from(Action::Release).unwrap(), MouseButtonAction::Released);
        assert!(MouseButtonAction::try_from(Action::Repeat).is_err());

        assert_eq!(MouseEnteredStatus::from_raw(1).unwrap(), MouseEnteredStatus::Entered);
        assert_eq!(MouseEnteredStatus::from_raw(0).unwrap(), MouseEnteredStatus::Exited);
        assert!(MouseEnteredStatus::from_raw(7).is_err());
        assert_eq!(MouseEnteredStatus::from(false), MouseEnteredStatus::Exited);
    }

    #[test]
    fn mouse_fans_out_each_event_kind() {
        let window = WindowId::next();
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let mut mouse = Mouse::new();

        let sink = log.clone();
        mouse.add_position_listener(move |_: WindowId, x: f64, y: f64| sink.borrow_mut().push(format!("pos {} {}", x, y)));
        let sink = log.clone();
        mouse.add_scroll_listener(move |_: WindowId, _x: f64, y: f64| sink.borrow_mut().push(format!("scroll {}", y)));
        let sink = log.clone();
        mouse.add_entered_listener(move |_: WindowId, status: MouseEnteredStatus| sink.borrow_mut().push(format!("{:?}", status)));
        let sink = log.clone();
        mouse.add_button_listener(move |_: WindowId, button: MouseButton, action: MouseButtonAction, _: KeyModifiers| {
            sink.borrow_mut().push(format!("{:?} {:?}", button, action))
        });
        assert_eq!(mouse.listener_count(), 4);

        mouse.mouse_entered_action_performed(window, MouseEnteredStatus::Entered);
        mouse.mouse_position_action_performed(window, 10.0, 20.0);
        mouse.mouse_scroll_action_performed(window, 0.0, -1.0);
        mouse.mouse_button_action_performed(window, MouseButton::Button1, MouseButtonAction::Pressed, KeyModifiers::empty());

        assert_eq!(*log.borrow(), vec![
            "Entered".to_string(),
            "pos 10 20".to_string(),
            "scroll -1".to_string(),
            "Button1 Pressed".to_string(),
        ]);
        assert_eq!(mouse.last_position(), Some((10.0, 20.0)));
        assert!(mouse.is_inside());
    }

    #[test]
    fn clear_listeners_drops_everything() {
        let mut mouse = Mouse::new();
        let id = mouse.add_scroll_listener(|_: WindowId, _: f64, _: f64| {});
        mouse.add_position_listener(|_: WindowId, _: f64, _: f64| {});
        assert!(mouse.remove_scroll_listener(id));
        assert!(!mouse.remove_scroll_listener(id));

        mouse.clear_listeners();
        assert_eq!(mouse.listener_count(), 0);
    }
}

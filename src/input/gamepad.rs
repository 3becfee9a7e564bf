use std::fmt;

use glfw::{Glfw, Joystick, JoystickId};

use crate::error::{Error, Result};

pub const JOYSTICK_IDS: [JoystickId; 16] = [
    JoystickId::Joystick1, JoystickId::Joystick2, JoystickId::Joystick3, JoystickId::Joystick4,
    JoystickId::Joystick5, JoystickId::Joystick6, JoystickId::Joystick7, JoystickId::Joystick8,
    JoystickId::Joystick9, JoystickId::Joystick10, JoystickId::Joystick11, JoystickId::Joystick12,
    JoystickId::Joystick13, JoystickId::Joystick14, JoystickId::Joystick15, JoystickId::Joystick16,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadState {
    Pressed,
    Released,
}

impl GamepadState {
    pub fn from_raw(value: i32) -> Result<Self> {
        match value {
            glfw::ffi::PRESS => Ok(GamepadState::Pressed),
            glfw::ffi::RELEASE => Ok(GamepadState::Released),
            _ => Err(Error::InvalidEnum { kind: "gamepad button state", value }),
        }
    }
}

/// Snapshot of a joystick's axes and buttons, refreshed by `update`.
/// The axis and button counts are fixed when the gamepad is first seen.
pub struct Gamepad {
    id: usize,
    name: String,
    axes: Vec<f32>,
    buttons: Vec<GamepadState>,
    joystick: Option<Joystick>,
}

impl Gamepad {
    pub fn open(glfw: &Glfw, index: usize) -> Option<Gamepad> {
        let joystick = glfw.get_joystick(*JOYSTICK_IDS.get(index)?);
        if !joystick.is_present() {
            return None;
        }
        let name: Option<String> = joystick.get_name().into();
        let mut gamepad = Gamepad::from_state(
            index,
            name.unwrap_or_default(),
            joystick.get_axes(),
            &joystick.get_buttons());
        gamepad.joystick = Some(joystick);
        Some(gamepad)
    }

    /// Gamepad detached from any native joystick. Unknown button values read
    /// as released.
    pub fn from_state(id: usize, name: String, axes: Vec<f32>, buttons: &[i32]) -> Gamepad {
        Gamepad {
            id,
            name,
            axes,
            buttons: buttons.iter()
                .map(|&b| GamepadState::from_raw(b).unwrap_or(GamepadState::Released))
                .collect(),
            joystick: None,
        }
    }

    /// Enumerates every joystick currently present.
    pub fn list(glfw: &Glfw) -> Vec<Gamepad> {
        (0..JOYSTICK_IDS.len())
            .filter_map(|index| Gamepad::open(glfw, index))
            .collect()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub fn axes_count(&self) -> usize {
        self.axes.len()
    }

    pub fn button_state(&self, button: usize) -> Option<GamepadState> {
        self.buttons.get(button).copied()
    }

    /// How far an axis is pushed, in [-1.0, 1.0].
    pub fn axis_state(&self, axis: usize) -> Option<f32> {
        self.axes.get(axis).copied()
    }

    /// Re-polls the joystick. Returns false if it is no longer connected.
    pub fn update(&mut self) -> bool {
        let (axes, buttons) = match &self.joystick {
            Some(joystick) if joystick.is_present() => (joystick.get_axes(), joystick.get_buttons()),
            _ => return false,
        };
        self.apply(&axes, &buttons);
        true
    }

    fn apply(&mut self, axes: &[f32], buttons: &[i32]) {
        for (slot, value) in self.axes.iter_mut().zip(axes) {
            *slot = *value;
        }
        for (slot, value) in self.buttons.iter_mut().zip(buttons) {
            *slot = GamepadState::from_raw(*value).unwrap_or(GamepadState::Released);
        }
    }
}

impl fmt::Display for Gamepad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gamepad[{}]: name={}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_counts_and_states() {
        let pad = Gamepad::from_state(
            2,
            "Test Pad".to_string(),
            vec![0.5, -1.0],
            &[glfw::ffi::PRESS, glfw::ffi::RELEASE, glfw::ffi::PRESS]);

        assert_eq!(pad.id(), 2);
        assert_eq!(pad.name(), "Test Pad");
        assert_eq!(pad.axes_count(), 2);
        assert_eq!(pad.button_count(), 3);
        assert_eq!(pad.button_state(0), Some(GamepadState::Pressed));
        assert_eq!(pad.button_state(1), Some(GamepadState::Released));
        assert_eq!(pad.button_state(3), None);
        assert_eq!(pad.axis_state(1), Some(-1.0));
        assert_eq!(pad.axis_state(2), None);
        assert_eq!(pad.to_string(), "Gamepad[2]: name=Test Pad");
    }

    #[test]
    fn apply_keeps_original_shape() {
        let mut pad = Gamepad::from_state(0, "pad".to_string(), vec![0.0, 0.0], &[glfw::ffi::RELEASE]);
        pad.apply(&[0.25, 0.75, 1.0], &[glfw::ffi::PRESS, glfw::ffi::PRESS]);
        assert_eq!(pad.axes_count(), 2);
        assert_eq!(pad.axis_state(1), Some(0.75));
        assert_eq!(pad.button_count(), 1);
        assert_eq!(pad.button_state(0), Some(GamepadState::Pressed));
    }

    #[test]
    fn detached_gamepad_does_not_update() {
        let mut pad = Gamepad::from_state(0, "pad".to_string(), vec![], &[]);
        assert!(!pad.update());
        assert!(GamepadState::from_raw(5).is_err());
    }
}

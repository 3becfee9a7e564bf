pub mod gamepad;
pub mod keyboard;
pub mod mouse;

pub use gamepad::{Gamepad, GamepadState};
pub use keyboard::{KeyAction, KeyCharListener, KeyListener, KeyModifiers, Keyboard};
pub use mouse::{
    Mouse, MouseButtonAction, MouseButtonListener, MouseEnteredListener, MouseEnteredStatus,
    MousePositionListener, MouseScrollListener,
};

use std::convert::TryFrom;

use glfw::{Context, WindowEvent};

use crate::input::keyboard::{KeyCharListener, KeyListener, Keyboard};
use crate::input::mouse::{
    Mouse, MouseButtonAction, MouseButtonListener, MouseEnteredListener, MousePositionListener,
    MouseScrollListener,
};
use crate::listeners::{ListenerId, Listeners};
use crate::registry::WindowId;
use crate::viewport::Viewport;

pub type WindowCallback = Box<dyn FnMut()>;
pub type BeforeCloseCallback = Box<dyn FnMut() -> CloseRequest>;

/// Answer of a before-close callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    Allow,
    Veto,
}

/// The native should-close flag a close request acts on.
pub trait CloseFlag {
    fn should_close(&self) -> bool;
    fn set_should_close(&mut self, value: bool);
}

impl CloseFlag for glfw::Window {
    fn should_close(&self) -> bool {
        Context::should_close(self)
    }

    fn set_should_close(&mut self, value: bool) {
        Context::set_should_close(self, value)
    }
}

pub trait FramebufferResizeListener {
    fn framebuffer_resized_action_performed(&mut self, window: WindowId, viewport: Viewport);
}

impl<F> FramebufferResizeListener for F
    where F: FnMut(WindowId, Viewport) {
    fn framebuffer_resized_action_performed(&mut self, window: WindowId, viewport: Viewport) {
        self(window, viewport)
    }
}

/// Routes polled GLFW events of one window to its listeners. The keyboard and
/// mouse front-ends only exist once something asked for them; events of their
/// kind are dropped until then.
pub struct EventDispatcher {
    window: WindowId,
    keyboard: Option<Keyboard>,
    mouse: Option<Mouse>,
    resize_listeners: Listeners<dyn FramebufferResizeListener>,
    before_close: Option<BeforeCloseCallback>,
    on_minimize: Option<WindowCallback>,
    on_restore: Option<WindowCallback>,
}

impl EventDispatcher {
    pub fn new(window: WindowId) -> Self {
        EventDispatcher {
            window,
            keyboard: None,
            mouse: None,
            resize_listeners: Listeners::default(),
            before_close: None,
            on_minimize: None,
            on_restore: None,
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn has_keyboard(&self) -> bool {
        self.keyboard.is_some()
    }

    pub fn has_mouse(&self) -> bool {
        self.mouse.is_some()
    }

    pub fn keyboard(&mut self) -> &mut Keyboard {
        let window = self.window;
        self.keyboard.get_or_insert_with(|| {
            trace!(target: "glwindow", "GlWindow[{}].keyboard is initialized!", window);
            Keyboard::new()
        })
    }

    pub fn mouse(&mut self) -> &mut Mouse {
        let window = self.window;
        self.mouse.get_or_insert_with(|| {
            trace!(target: "glwindow", "GlWindow[{}].mouse is initialized!", window);
            Mouse::new()
        })
    }

    pub fn keyboard_if_initialized(&self) -> Option<&Keyboard> {
        self.keyboard.as_ref()
    }

    pub fn mouse_if_initialized(&self) -> Option<&Mouse> {
        self.mouse.as_ref()
    }

    pub fn add_resize_listener<L: FramebufferResizeListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.resize_listeners.add(Box::new(listener))
    }

    pub fn remove_resize_listener(&mut self, id: ListenerId) -> bool {
        self.resize_listeners.remove(id)
    }

    pub fn clear_resize_listeners(&mut self) {
        self.resize_listeners.clear();
    }

    pub fn set_before_close(&mut self, callback: Option<BeforeCloseCallback>) {
        self.before_close = callback;
    }

    pub fn set_on_minimize(&mut self, callback: Option<WindowCallback>) {
        self.on_minimize = callback;
    }

    pub fn set_on_restore(&mut self, callback: Option<WindowCallback>) {
        self.on_restore = callback;
    }

    /// Asks the before-close callback whether a close request may proceed.
    pub fn before_close(&mut self) -> CloseRequest {
        match self.before_close.as_mut() {
            Some(callback) => callback(),
            None => CloseRequest::Allow,
        }
    }

    /// Answers a close request from the windowing system. A veto clears the
    /// should-close flag so the window stays open.
    pub fn handle_close_request(&mut self, flag: &mut dyn CloseFlag) -> CloseRequest {
        let request = self.before_close();
        if request == CloseRequest::Veto {
            debug!(target: "glwindow", "GlWindow[{}] close vetoed", self.window);
            flag.set_should_close(false);
        }
        request
    }

    /// Close requests go through `handle_close_request` instead.
    pub fn dispatch(&mut self, event: &WindowEvent) {
        let window = self.window;
        match *event {
            WindowEvent::Key(key, scancode, action, mods) => {
                if let Some(keyboard) = self.keyboard.as_mut() {
                    keyboard.key_action_performed(window, key, scancode, action.into(), mods.into());
                }
            }
            WindowEvent::Char(code) => {
                if let Some(keyboard) = self.keyboard.as_mut() {
                    keyboard.char_type_performed(window, code);
                }
            }
            WindowEvent::MouseButton(button, action, mods) => {
                if let Some(mouse) = self.mouse.as_mut() {
                    match MouseButtonAction::try_from(action) {
                        Ok(action) => mouse.mouse_button_action_performed(window, button, action, mods.into()),
                        Err(err) => warn!(target: "glwindow", "Dropping mouse button event: {}", err),
                    }
                }
            }
            WindowEvent::CursorPos(x, y) => {
                if let Some(mouse) = self.mouse.as_mut() {
                    mouse.mouse_position_action_performed(window, x, y);
                }
            }
            WindowEvent::CursorEnter(entered) => {
                if let Some(mouse) = self.mouse.as_mut() {
                    mouse.mouse_entered_action_performed(window, entered.into());
                }
            }
            WindowEvent::Scroll(x_offset, y_offset) => {
                if let Some(mouse) = self.mouse.as_mut() {
                    mouse.mouse_scroll_action_performed(window, x_offset, y_offset);
                }
            }
            WindowEvent::FramebufferSize(width, height) => {
                let view = Viewport::of_size(width, height);
                self.resize_listeners.for_each_mut(|l| l.framebuffer_resized_action_performed(window, view));
            }
            WindowEvent::Iconify(true) => {
                if let Some(callback) = self.on_minimize.as_mut() {
                    callback();
                }
            }
            WindowEvent::Iconify(false) => {
                if let Some(callback) = self.on_restore.as_mut() {
                    callback();
                }
            }
            _ => {}
        }
    }
}

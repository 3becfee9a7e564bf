use glfw::Glfw;

use crate::config::{WindowConfig, DEFAULT_CONFIG};
use crate::error::{Error, Result};
use crate::input::gamepad::Gamepad;
use crate::registry::{self, WindowSummary};
use crate::window::{GlWindow, WindowBuilder};

fn glfw_error_message(error: glfw::Error, description: &str) -> String {
    format!("GLFW Error #{}: {}", error as i32, description)
}

fn log_glfw_error(error: glfw::Error, description: String, _: &()) {
    error!(target: "glfw", "{}", glfw_error_message(error, &description));
}

/// An initialized GLFW library plus the state read at startup.
pub struct Platform {
    glfw: Glfw,
    config: WindowConfig,
    gamepads: Vec<Gamepad>,
}

impl Platform {
    pub fn init() -> Result<Platform> {
        Platform::with_config(DEFAULT_CONFIG.clone())
    }

    pub fn with_config(config: WindowConfig) -> Result<Platform> {
        let callback = glfw::Callback {
            f: log_glfw_error as fn(glfw::Error, String, &()),
            data: (),
        };
        let glfw = glfw::init(Some(callback))
            .map_err(|err| Error::Init(format!("{:?}", err)))?;
        trace!(target: "glfw", "GLFW successfully initialized!");

        let gamepads = Gamepad::list(&glfw);
        for gamepad in &gamepads {
            trace!(target: "glfw", "Registered gamepad: {}!", gamepad.name());
        }

        Ok(Platform { glfw, config, gamepads })
    }

    pub fn glfw(&self) -> &Glfw {
        &self.glfw
    }

    pub fn glfw_mut(&mut self) -> &mut Glfw {
        &mut self.glfw
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Seconds since GLFW was initialized.
    pub fn time(&self) -> f64 {
        self.glfw.get_time()
    }

    pub fn gamepads(&self) -> &[Gamepad] {
        &self.gamepads
    }

    pub fn gamepads_mut(&mut self) -> &mut [Gamepad] {
        &mut self.gamepads
    }

    /// Re-enumerates joysticks, picking up ones connected after startup.
    pub fn refresh_gamepads(&mut self) -> &[Gamepad] {
        self.gamepads = Gamepad::list(&self.glfw);
        &self.gamepads
    }

    pub fn active_windows(&self) -> Vec<WindowSummary> {
        registry::active_windows()
    }

    pub fn primary_monitor_size(&mut self) -> Result<(u32, u32)> {
        let mode = self.glfw.with_primary_monitor(|_, monitor| {
            monitor.and_then(|m| m.get_video_mode())
        });
        mode.map(|mode| (mode.width, mode.height)).ok_or(Error::NoVideoMode)
    }

    pub fn primary_monitor_width(&mut self) -> Result<u32> {
        Ok(self.primary_monitor_size()?.0)
    }

    pub fn primary_monitor_height(&mut self) -> Result<u32> {
        Ok(self.primary_monitor_size()?.1)
    }

    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    pub fn create_window(&mut self, width: i32, height: i32, title: &str) -> Result<GlWindow> {
        WindowBuilder::new()
            .size(width, height)
            .title(title)
            .build(self)
    }
}

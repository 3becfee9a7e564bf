#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod debugging;
pub mod config;
pub mod error;
pub mod events;
pub mod hints;
pub mod input;
pub mod lifecycle;
pub mod listeners;
pub mod platform;
pub mod registry;
pub mod thread;
pub mod viewport;
pub mod window;

pub use config::{ClientApi, WindowConfig};
pub use error::{Error, Result};
pub use events::{CloseRequest, FramebufferResizeListener};
pub use listeners::ListenerId;
pub use platform::Platform;
pub use registry::{WindowId, WindowSummary};
pub use thread::{GlThread, GlThreadHandle, TaskHandle, TaskQueue};
pub use viewport::{Viewport, ViewportStack};
pub use window::{GlWindow, WindowBuilder, WorkerContext};

use glfw::{ClientApiHint, ContextCreationApi, Glfw, OpenGlProfileHint, SwapInterval, WindowHint};

use crate::config::{ClientApi, WindowConfig};

/// Converts a "don't care" capable setting into GLFW's optional form.
pub fn dont_care(value: i32) -> Option<u32> {
    if value < 0 {
        None
    } else {
        Some(value as u32)
    }
}

/// The full hint sequence applied before a window is created.
/// Windows always start hidden and resizable.
pub fn window_hints(config: &WindowConfig) -> Vec<WindowHint> {
    let mut hints = vec![
        WindowHint::Visible(false),
        WindowHint::Resizable(true),
        WindowHint::ContextVersion(config.version_major, config.version_minor),
    ];

    if config.use_egl {
        hints.push(WindowHint::ContextCreationApi(ContextCreationApi::Egl));
    }

    match config.client_api {
        ClientApi::Vulkan => hints.push(WindowHint::ClientApi(ClientApiHint::NoApi)),
        ClientApi::OpenGl => {
            hints.push(WindowHint::ClientApi(ClientApiHint::OpenGl));
            if wants_core_profile(config.version_major, config.version_minor) {
                hints.push(WindowHint::OpenGlProfile(OpenGlProfileHint::Core));
            }
        }
        ClientApi::OpenGlEs => hints.push(WindowHint::ClientApi(ClientApiHint::OpenGlEs)),
    }

    hints.extend(vec![
        WindowHint::Samples(dont_care(config.samples)),
        WindowHint::RedBits(dont_care(config.red_bits)),
        WindowHint::BlueBits(dont_care(config.blue_bits)),
        WindowHint::GreenBits(dont_care(config.green_bits)),
        WindowHint::AlphaBits(dont_care(config.alpha_bits)),
        WindowHint::DepthBits(dont_care(config.depth_bits)),
        WindowHint::StencilBits(dont_care(config.stencil_bits)),
        WindowHint::RefreshRate(dont_care(config.refresh_rate)),
    ]);
    hints
}

// Profiles only exist from 3.2 onwards
fn wants_core_profile(major: u32, minor: u32) -> bool {
    match major {
        3 => minor == 2 || minor == 3,
        m => m > 3,
    }
}

pub fn apply_hints(glfw: &mut Glfw, config: &WindowConfig) {
    glfw.default_window_hints();
    for hint in window_hints(config) {
        trace!(target: "glfw", "glfwWindowHint({:?})", hint);
        glfw.window_hint(hint);
    }
}

pub fn swap_interval(interval: i32) -> SwapInterval {
    match interval {
        0 => SwapInterval::None,
        i if i < 0 => SwapInterval::Adaptive,
        i => SwapInterval::Sync(i as u32),
    }
}

#[macro_use]
extern crate log;

use std::cell::Cell;
use std::rc::Rc;

use glfw::{Key, MouseButton};

use glwindow::gl_call;
use glwindow::input::{KeyAction, KeyModifiers, MouseButtonAction};
use glwindow::{CloseRequest, Platform, Viewport, WindowBuilder, WindowId};

fn main() {
    pretty_env_logger::init();

    if let Err(err) = run() {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> glwindow::Result<()> {
    let mut platform = Platform::init()?;
    for gamepad in platform.gamepads() {
        info!("{}", gamepad);
    }

    let mut window = WindowBuilder::new()
        .size(800, 800)
        .title("glwindow demo")
        .build(&mut platform)?;

    let quit_requested = Rc::new(Cell::new(false));
    let quit = quit_requested.clone();
    window.keyboard()?.add_key_listener(move |_: WindowId, key: Key, _: i32, action: KeyAction, _: KeyModifiers| {
        if key == Key::Escape && action == KeyAction::Pressed {
            quit.set(true);
        }
    });
    window.keyboard()?.add_char_listener(|window: WindowId, c: char| trace!("{} typed {:?}", window, c));
    window.mouse()?.add_button_listener(|window: WindowId, button: MouseButton, action: MouseButtonAction, _: KeyModifiers| {
        debug!("{} {:?} {:?}", window, button, action);
    });
    window.add_window_resize_listener(|window: WindowId, view: Viewport| {
        info!("{} resized to {}x{}", window, view.width, view.height);
    });

    // Closing through the title bar asks twice
    let mut asked = false;
    window.set_on_before_close(move || {
        if asked {
            CloseRequest::Allow
        } else {
            asked = true;
            warn!("Close again to quit");
            CloseRequest::Veto
        }
    });
    window.set_on_close(|| info!("Bye!"));

    let handle = window.gl_thread_handle();
    std::thread::spawn(move || {
        if let Err(err) = handle.submit(|window| info!("Hello from the GL thread of {}", window)) {
            warn!("{}", err);
        }
    });

    window.set_visible(true)?;
    while window.is_valid() {
        if quit_requested.get() {
            window.close()?;
        }
        gl_call!(gl::ClearColor(0.74, 0.84, 1.0, 1.0));
        gl_call!(gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT));
        window.update()?;
    }

    Ok(())
}

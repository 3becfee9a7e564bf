use std::convert::TryFrom;
use std::fmt;
use std::sync::mpsc::Receiver;

use glfw::{Context, Cursor, Glfw, Key, MouseButton, RenderContext, StandardCursor, WindowEvent, WindowMode};

use crate::config::{ClientApi, WindowConfig};
use crate::error::{Error, Result};
use crate::events::{CloseRequest, EventDispatcher, FramebufferResizeListener};
use crate::hints::{apply_hints, swap_interval};
use crate::input::keyboard::{KeyAction, Keyboard};
use crate::input::mouse::{Mouse, MouseButtonAction};
use crate::lifecycle::{Lease, LeaseToken, Lifecycle};
use crate::listeners::ListenerId;
use crate::platform::Platform;
use crate::registry::{self, WindowId, WindowSummary};
use crate::thread::{GlThread, GlThreadHandle};
use crate::viewport::Viewport;

pub const DEFAULT_WIDTH: i32 = 640;
pub const DEFAULT_HEIGHT: i32 = 480;
pub const DEFAULT_TITLE: &str = "GLOOP App";

const WORKER_TITLE: &str = "WORKER";

/// Millimeters per inch
const MM_PER_INCH: f64 = 25.4;

/// Dots per inch of a monitor `video_width` pixels wide and `physical_width_mm` millimeters wide.
pub fn compute_dpi(video_width: u32, physical_width_mm: i32) -> Option<f64> {
    if physical_width_mm <= 0 {
        return None;
    }
    Some(video_width as f64 / (physical_width_mm as f64 / MM_PER_INCH))
}

/// Fullscreen size to request, falling back to the window's own size for
/// negative ("don't care") preferences.
pub fn preferred_size(preferred: (i32, i32), fallback: (i32, i32)) -> (u32, u32) {
    let pick = |preferred: i32, fallback: i32| if preferred < 0 { fallback } else { preferred };
    (
        pick(preferred.0, fallback.0).max(0) as u32,
        pick(preferred.1, fallback.1).max(0) as u32,
    )
}

pub struct WindowBuilder<'a> {
    width: i32,
    height: i32,
    title: String,
    config: Option<WindowConfig>,
    shared: Option<&'a GlWindow>,
}

impl<'a> Default for WindowBuilder<'a> {
    fn default() -> Self {
        WindowBuilder {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            title: DEFAULT_TITLE.to_string(),
            config: None,
            shared: None,
        }
    }
}

impl<'a> WindowBuilder<'a> {
    pub fn new() -> Self {
        WindowBuilder::default()
    }

    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Overrides the platform's context settings for this window.
    pub fn config(mut self, config: WindowConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Shares GL objects with `parent`'s context.
    pub fn shared(mut self, parent: &'a GlWindow) -> Self {
        self.shared = Some(parent);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidSize { width: self.width, height: self.height });
        }
        if let Some(parent) = self.shared {
            if !parent.is_valid() {
                return Err(Error::InvalidWindow);
            }
        }
        Ok(())
    }

    /// Creates the window on the calling thread, which becomes its GL thread.
    pub fn build(self, platform: &mut Platform) -> Result<GlWindow> {
        self.validate()?;
        trace!(target: "glwindow", "Constructed GlWindow! {}", self);

        let parent = match self.shared {
            Some(parent) => Some(parent.native()?),
            None => None,
        };
        let config = self.config.unwrap_or_else(|| platform.config().clone());
        let mut window = GlWindow::unopened(platform.glfw().clone(), self.width, self.height, self.title, config, false);
        window.open(parent)?;
        Ok(window)
    }
}

impl<'a> fmt::Display for WindowBuilder<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parent = self.shared.map(|p| p.title()).unwrap_or("null");
        write!(f, "[width={}, height={}, title={}, parent={}]", self.width, self.height, self.title, parent)
    }
}

/// A context borrowed from a hidden worker window, for use on another thread.
///
/// The owning window waits for every worker context to be dropped before it
/// destroys the worker, so drop these before closing the window.
pub struct WorkerContext {
    window: WindowId,
    context: RenderContext,
    _token: LeaseToken,
}

impl WorkerContext {
    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn make_current(&mut self) {
        self.context.make_current();
    }

    pub fn is_current(&self) -> bool {
        self.context.is_current()
    }

    pub fn swap_buffers(&mut self) {
        self.context.swap_buffers();
    }

    pub fn render_context(&mut self) -> &mut RenderContext {
        &mut self.context
    }
}

impl Drop for WorkerContext {
    fn drop(&mut self) {
        if self.context.is_current() {
            glfw::make_context_current(None);
        }
    }
}

struct Worker {
    window: GlWindow,
    lease: Lease,
}

/// One native window and its GL context.
///
/// Every method must be called on the window's GL thread, the thread that
/// built it. Other threads go through `gl_thread_handle`, whose tasks run at
/// the start of the next `update`.
pub struct GlWindow {
    id: WindowId,
    glfw: Glfw,
    window: Option<glfw::Window>,
    events: Option<Receiver<(f64, WindowEvent)>>,
    width: i32,
    height: i32,
    title: String,
    config: WindowConfig,
    is_worker: bool,
    lifecycle: Lifecycle,
    thread: GlThread,
    dispatcher: EventDispatcher,
    workers: Vec<Worker>,
}

impl GlWindow {
    pub fn new(platform: &mut Platform) -> Result<GlWindow> {
        WindowBuilder::new().build(platform)
    }

    pub fn with_size(platform: &mut Platform, width: i32, height: i32) -> Result<GlWindow> {
        WindowBuilder::new().size(width, height).build(platform)
    }

    fn unopened(glfw: Glfw, width: i32, height: i32, title: String, config: WindowConfig, is_worker: bool) -> GlWindow {
        let id = WindowId::next();
        GlWindow {
            id,
            glfw,
            window: None,
            events: None,
            width,
            height,
            title,
            config,
            is_worker,
            lifecycle: Lifecycle::new(),
            thread: GlThread::new(),
            dispatcher: EventDispatcher::new(id),
            workers: Vec::new(),
        }
    }

    fn open(&mut self, shared: Option<&glfw::Window>) -> Result<()> {
        apply_hints(&mut self.glfw, &self.config);

        trace!(target: "glfw", "glfwCreateWindow({}, {}, {}, shared={})",
               self.width, self.height, self.title, shared.is_some());
        let created = match shared {
            Some(parent) => parent.create_shared(self.width as u32, self.height as u32, &self.title, WindowMode::Windowed),
            None => self.glfw.create_window(self.width as u32, self.height as u32, &self.title, WindowMode::Windowed),
        };
        let (mut window, events) = created.ok_or(Error::WindowCreation)?;

        if self.has_context() && !self.is_worker {
            window.make_current();
            gl::load_with(|s| window.get_proc_address(s) as *const _);
            trace!(target: "glfw", "glfwSwapInterval({})", self.config.swap_interval);
            self.glfw.set_swap_interval(swap_interval(self.config.swap_interval));
        }

        let (fb_width, fb_height) = window.get_framebuffer_size();
        self.thread.viewports_mut().set_current(Viewport::of_size(fb_width, fb_height));

        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);
        window.set_iconify_polling(true);

        self.window = Some(window);
        self.events = Some(events);
        registry::register(WindowSummary {
            id: self.id,
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            is_worker: self.is_worker,
        });
        self.lifecycle.mark_initialized();
        Ok(())
    }

    fn has_context(&self) -> bool {
        self.config.client_api != ClientApi::Vulkan
    }

    /// Initialized and not yet destroyed.
    pub fn is_valid(&self) -> bool {
        self.lifecycle.is_valid() && self.window.is_some()
    }

    fn native(&self) -> Result<&glfw::Window> {
        match self.window.as_ref() {
            Some(window) if self.lifecycle.is_valid() => Ok(window),
            _ => Err(Error::InvalidWindow),
        }
    }

    fn native_mut(&mut self) -> Result<&mut glfw::Window> {
        match self.window.as_mut() {
            Some(window) if self.lifecycle.is_valid() => Ok(window),
            _ => Err(Error::InvalidWindow),
        }
    }

    /// The underlying GLFW window, for calls this type doesn't wrap.
    pub fn glfw_window(&self) -> Option<&glfw::Window> {
        self.window.as_ref()
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Makes this window's context current on the calling thread. Several
    /// windows may share one GL thread, so everything that touches GL state
    /// goes through here first.
    pub fn make_current(&mut self) -> Result<()> {
        if !self.has_context() {
            return Ok(());
        }
        let window = self.native_mut()?;
        if !window.is_current() {
            window.make_current();
        }
        Ok(())
    }

    pub fn gl_thread(&self) -> &GlThread {
        &self.thread
    }

    pub fn gl_thread_handle(&self) -> GlThreadHandle {
        self.thread.handle()
    }

    pub fn current_viewport(&self) -> Viewport {
        self.thread.current_viewport()
    }

    /// Makes `viewport` current, remembering the previous one.
    pub fn push_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.make_current()?;
        self.thread.push_viewport(viewport);
        Ok(())
    }

    /// Restores the previous viewport, returning the one that was popped.
    pub fn pop_viewport(&mut self) -> Result<Option<Viewport>> {
        self.make_current()?;
        Ok(self.thread.pop_viewport())
    }

    pub fn keyboard(&mut self) -> Result<&mut Keyboard> {
        if !self.dispatcher.has_keyboard() {
            let window = self.native_mut()?;
            window.set_key_polling(true);
            window.set_char_polling(true);
        } else if !self.is_valid() {
            return Err(Error::InvalidWindow);
        }
        Ok(self.dispatcher.keyboard())
    }

    pub fn mouse(&mut self) -> Result<&mut Mouse> {
        if !self.dispatcher.has_mouse() {
            let window = self.native_mut()?;
            window.set_mouse_button_polling(true);
            window.set_cursor_pos_polling(true);
            window.set_cursor_enter_polling(true);
            window.set_scroll_polling(true);
        } else if !self.is_valid() {
            return Err(Error::InvalidWindow);
        }
        Ok(self.dispatcher.mouse())
    }

    /// Current state of a key as reported by GLFW.
    pub fn key_state(&self, key: Key) -> Result<KeyAction> {
        Ok(self.native()?.get_key(key).into())
    }

    pub fn mouse_button_state(&self, button: MouseButton) -> Result<MouseButtonAction> {
        MouseButtonAction::try_from(self.native()?.get_mouse_button(button))
    }

    pub fn cursor_position(&self) -> Result<(f64, f64)> {
        Ok(self.native()?.get_cursor_pos())
    }

    pub fn set_cursor_position(&mut self, x: f64, y: f64) -> Result<()> {
        self.native_mut()?.set_cursor_pos(x, y);
        Ok(())
    }

    pub fn set_clipboard_string(&mut self, contents: &str) -> Result<()> {
        trace!(target: "glfw", "glfwSetClipboardString({}, {})", self.id, contents);
        self.native_mut()?.set_clipboard_string(contents);
        Ok(())
    }

    pub fn clipboard_string(&self) -> Result<Option<String>> {
        trace!(target: "glfw", "glfwGetClipboardString({})", self.id);
        let contents: Option<String> = self.native()?.get_clipboard_string().into();
        Ok(contents)
    }

    /// Seconds since GLFW was initialized.
    pub fn time(&self) -> f64 {
        self.glfw.get_time()
    }

    pub fn set_on_before_close<F: FnMut() -> CloseRequest + 'static>(&mut self, callback: F) {
        self.dispatcher.set_before_close(Some(Box::new(callback)));
    }

    pub fn set_on_close<F: FnMut() + 'static>(&mut self, callback: F) {
        self.lifecycle.set_on_close(Some(Box::new(callback)));
    }

    pub fn set_on_minimize<F: FnMut() + 'static>(&mut self, callback: F) {
        self.dispatcher.set_on_minimize(Some(Box::new(callback)));
    }

    pub fn set_on_restore<F: FnMut() + 'static>(&mut self, callback: F) {
        self.dispatcher.set_on_restore(Some(Box::new(callback)));
    }

    pub fn clear_window_callbacks(&mut self) {
        self.dispatcher.set_before_close(None);
        self.dispatcher.set_on_minimize(None);
        self.dispatcher.set_on_restore(None);
        self.lifecycle.set_on_close(None);
    }

    /// Called once the window's GL context is gone.
    pub fn add_context_lost_listener<F: FnMut() + 'static>(&mut self, callback: F) -> ListenerId {
        self.lifecycle.add_context_lost_listener(Box::new(callback))
    }

    pub fn remove_context_lost_listener(&mut self, id: ListenerId) -> bool {
        self.lifecycle.remove_context_lost_listener(id)
    }

    pub fn add_window_resize_listener<L: FramebufferResizeListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.dispatcher.add_resize_listener(listener)
    }

    pub fn remove_window_resize_listener(&mut self, id: ListenerId) -> bool {
        self.dispatcher.remove_resize_listener(id)
    }

    pub fn clear_window_listeners(&mut self) {
        self.dispatcher.clear_resize_listeners();
    }

    /// Width over height, using the size the window was created with.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn size(&self) -> Result<(i32, i32)> {
        Ok(self.native()?.get_size())
    }

    pub fn width(&self) -> Result<i32> {
        Ok(self.size()?.0)
    }

    pub fn height(&self) -> Result<i32> {
        Ok(self.size()?.1)
    }

    pub fn set_size(&mut self, width: i32, height: i32) -> Result<()> {
        if width < 0 || height < 0 {
            return Err(Error::InvalidSize { width, height });
        }
        self.native_mut()?.set_size(width, height);
        Ok(())
    }

    pub fn position(&self) -> Result<(i32, i32)> {
        Ok(self.native()?.get_pos())
    }

    pub fn x(&self) -> Result<i32> {
        Ok(self.position()?.0)
    }

    pub fn y(&self) -> Result<i32> {
        Ok(self.position()?.1)
    }

    pub fn set_position(&mut self, x: i32, y: i32) -> Result<()> {
        self.native_mut()?.set_pos(x, y);
        Ok(())
    }

    /// Decoration sizes as (left, top, right, bottom).
    pub fn frame_size(&self) -> Result<(i32, i32, i32, i32)> {
        Ok(self.native()?.get_frame_size())
    }

    pub fn framebuffer_size(&self) -> Result<(i32, i32)> {
        Ok(self.native()?.get_framebuffer_size())
    }

    pub fn framebuffer_width(&self) -> Result<i32> {
        Ok(self.framebuffer_size()?.0)
    }

    pub fn framebuffer_height(&self) -> Result<i32> {
        Ok(self.framebuffer_size()?.1)
    }

    /// DPI of the primary monitor.
    pub fn dpi(&mut self) -> Result<f64> {
        self.native()?;
        let measured = self.glfw.with_primary_monitor(|_, monitor| {
            monitor.and_then(|m| {
                let mode = m.get_video_mode()?;
                let (width_mm, _) = m.get_physical_size();
                compute_dpi(mode.width, width_mm)
            })
        });
        measured.ok_or(Error::NoVideoMode)
    }

    pub fn set_visible(&mut self, visible: bool) -> Result<()> {
        let window = self.native_mut()?;
        if visible {
            window.show();
        } else {
            window.hide();
        }
        Ok(())
    }

    /// `None` restores the default arrow cursor.
    pub fn set_cursor(&mut self, shape: Option<StandardCursor>) -> Result<()> {
        let cursor = shape.map(Cursor::standard);
        self.native_mut()?.set_cursor(cursor);
        Ok(())
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()> {
        self.set_fullscreen_with_size(fullscreen, -1, -1)
    }

    /// Moves the window onto the primary monitor, or back to windowed mode.
    /// Negative sizes fall back to the size the window was created with.
    pub fn set_fullscreen_with_size(&mut self, fullscreen: bool, preferred_width: i32, preferred_height: i32) -> Result<()> {
        let (width, height) = preferred_size((preferred_width, preferred_height), (self.width, self.height));
        let mut glfw = self.glfw.clone();
        let window = self.native_mut()?;

        if !fullscreen {
            window.set_monitor(WindowMode::Windowed, 0, 0, width, height, None);
            return Ok(());
        }

        glfw.with_primary_monitor_mut(|_, monitor| -> Result<()> {
            let monitor = monitor.ok_or(Error::NoVideoMode)?;
            let mode = monitor.get_video_mode().ok_or(Error::NoVideoMode)?;
            window.set_monitor(WindowMode::FullScreen(monitor), 0, 0, width, height, Some(mode.refresh_rate));
            Ok(())
        })
    }

    pub fn set_should_close(&mut self, should_close: bool) -> Result<()> {
        self.native_mut()?.set_should_close(should_close);
        Ok(())
    }

    /// Requests the window to close; it is destroyed on the next `update`.
    pub fn close(&mut self) -> Result<()> {
        self.set_should_close(true)
    }

    /// Runs deferred tasks, then either tears the window down (if a close was
    /// requested) or presents the frame and dispatches pending input.
    pub fn update(&mut self) -> Result<()> {
        if !self.is_valid() {
            return Err(Error::InvalidWindow);
        }
        self.make_current()?;

        let tasks = self.thread.tasks().take_pending();
        for task in tasks {
            task(self);
        }

        if self.native()?.should_close() {
            self.cleanup();
            return Ok(());
        }

        // A task may have switched contexts
        self.make_current()?;
        if self.has_context() {
            self.native_mut()?.swap_buffers();
        }
        self.glfw.poll_events();
        self.process_events()
    }

    /// Handles every polled event, even past a failing one. The first
    /// failure is returned once the batch is done.
    fn process_events(&mut self) -> Result<()> {
        let events: Vec<WindowEvent> = match self.events.as_ref() {
            Some(events) => glfw::flush_messages(events).map(|(_, event)| event).collect(),
            None => return Ok(()),
        };
        let mut first_error = None;
        for event in events {
            if let Err(err) = self.handle_event(event) {
                warn!(target: "glwindow", "GlWindow[{}]: {}", self.id, err);
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn handle_event(&mut self, event: WindowEvent) -> Result<()> {
        let mut outcome = Ok(());
        match event {
            WindowEvent::FramebufferSize(width, height) => {
                match self.thread.viewports_mut().resize(width, height) {
                    Ok(view) => {
                        self.make_current()?;
                        if self.has_context() {
                            view.apply();
                        }
                    }
                    Err(err) => outcome = Err(err),
                }
            }
            WindowEvent::Close => {
                let GlWindow { window, dispatcher, .. } = self;
                if let Some(window) = window.as_mut() {
                    dispatcher.handle_close_request(window);
                }
                return Ok(());
            }
            _ => {}
        }
        self.dispatcher.dispatch(&event);
        outcome
    }

    fn cleanup(&mut self) {
        debug!(target: "glwindow", "Cleaning up GlWindow[{}] ({})", self.id, self.title);

        let GlWindow { id, glfw, window, events, lifecycle, thread, workers, .. } = self;
        let id = *id;
        lifecycle.teardown(
            || {
                for worker in workers.drain(..) {
                    worker.close();
                }
            },
            || {
                *events = None;
                if let Some(window) = window.take() {
                    if window.is_current() {
                        glfw.make_context_current(None);
                    }
                    trace!(target: "glfw", "glfwDestroyWindow({})", id);
                    drop(window);
                }
            },
            || {
                registry::unregister(id);
                thread.shutdown();
            });
    }

    /// Cleanup tasks run once, in order, when the window is destroyed.
    pub fn append_to_cleanup<F: FnMut() + 'static>(&mut self, task: F) -> ListenerId {
        self.lifecycle.append_cleanup(Box::new(task))
    }

    pub fn remove_from_cleanup(&mut self, id: ListenerId) -> bool {
        self.lifecycle.remove_cleanup(id)
    }

    pub fn clear_cleanup(&mut self) {
        self.lifecycle.clear_cleanup();
    }

    /// Creates a hidden window sharing this window's context and hands out
    /// its context for use on another thread. The worker is destroyed
    /// together with this window, which blocks until the returned
    /// `WorkerContext` has been dropped.
    pub fn new_worker_context(&mut self) -> Result<WorkerContext> {
        let parent = self.native()?;
        let mut worker = GlWindow::unopened(self.glfw.clone(), 1, 1, WORKER_TITLE.to_string(), self.config.clone(), true);
        worker.open(Some(parent))?;

        let context = match worker.window.as_mut() {
            Some(window) => window.render_context(),
            None => return Err(Error::WindowCreation),
        };
        debug!(target: "glwindow", "GlWindow[{}] spawned worker context {}", self.id, worker.id);

        let lease = Lease::new();
        let handed_out = WorkerContext { window: worker.id, context, _token: lease.token() };
        self.workers.push(Worker { window: worker, lease });
        Ok(handed_out)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Worker {
    fn close(mut self) {
        let outstanding = self.lease.outstanding();
        if outstanding > 0 {
            warn!(target: "glwindow", "Waiting for {} context(s) of worker {} to be dropped", outstanding, self.window.id);
        }
        self.window.cleanup();
    }
}

impl fmt::Display for GlWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlWindow: {}", self.id)
    }
}

impl Drop for GlWindow {
    fn drop(&mut self) {
        if self.window.is_some() {
            registry::unregister(self.id);
            self.thread.shutdown();
        }
    }
}

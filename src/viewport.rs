use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Viewport { x, y, width, height }
    }

    /// Viewport covering a whole framebuffer.
    pub fn of_size(width: i32, height: i32) -> Self {
        Viewport::new(0, 0, width, height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Requires a current GL context.
    pub fn apply(&self) {
        gl_call!(gl::Viewport(self.x, self.y, self.width, self.height));
    }
}

/// The current viewport of a context plus the ones pushed over it.
/// Only bookkeeping; callers issue `apply` for whatever comes back.
#[derive(Debug, Default)]
pub struct ViewportStack {
    current: Viewport,
    saved: Vec<Viewport>,
}

impl ViewportStack {
    pub fn new(current: Viewport) -> Self {
        ViewportStack { current, saved: Vec::new() }
    }

    pub fn current(&self) -> Viewport {
        self.current
    }

    pub fn set_current(&mut self, viewport: Viewport) {
        self.current = viewport;
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self, viewport: Viewport) {
        self.saved.push(self.current);
        self.current = viewport;
    }

    /// Restores the previous viewport and returns it.
    pub fn pop(&mut self) -> Option<Viewport> {
        let previous = self.saved.pop()?;
        self.current = previous;
        Some(previous)
    }

    /// A resized framebuffer replaces the current viewport, which is only
    /// allowed while nothing is pushed.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<Viewport> {
        if !self.is_empty() {
            return Err(Error::ViewportStackNotEmpty);
        }
        self.current = Viewport::of_size(width, height);
        Ok(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_framebuffer_viewport() {
        let view = Viewport::of_size(800, 400);
        assert_eq!(view, Viewport { x: 0, y: 0, width: 800, height: 400 });
        assert_eq!(view.aspect_ratio(), 2.0);
        assert_eq!(Viewport::of_size(10, 0).aspect_ratio(), 0.0);
    }

    #[test]
    fn push_and_pop_restore_previous() {
        let mut stack = ViewportStack::new(Viewport::of_size(640, 480));
        stack.push(Viewport::new(10, 10, 100, 100));
        stack.push(Viewport::new(0, 0, 32, 32));
        assert_eq!(stack.depth(), 2);

        assert_eq!(stack.pop(), Some(Viewport::new(10, 10, 100, 100)));
        assert_eq!(stack.pop(), Some(Viewport::of_size(640, 480)));
        assert_eq!(stack.current(), Viewport::of_size(640, 480));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn resize_rejected_while_viewports_are_pushed() {
        let mut stack = ViewportStack::new(Viewport::of_size(640, 480));
        stack.push(Viewport::of_size(64, 64));

        assert!(matches!(stack.resize(1024, 768), Err(Error::ViewportStackNotEmpty)));
        assert_eq!(stack.current(), Viewport::of_size(64, 64));

        stack.pop();
        assert_eq!(stack.resize(1024, 768).unwrap(), Viewport::of_size(1024, 768));
        assert_eq!(stack.current(), Viewport::of_size(1024, 768));
    }
}

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// The Frame is indexed as [y][x]; a lit pixel is 1 and a dark one 0.
pub type Frame = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// # Frame Buffer
/// The 64x32 monochrome display surface.
///
/// Only the clear and draw instructions change it. Coordinates wrap around both edges, so
/// a sprite drawn past the right edge reappears on the left.
///
/// The `dirty` flag is raised whenever the contents change and is lowered by whoever renders it.
#[derive(Clone)]
pub struct FrameBuffer {
    pixels: Frame,
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            dirty: false,
        }
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        self.pixels = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    /// Flips the pixel at `(x, y)` and returns whether it was lit beforehand.
    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH];
        let was_lit = *pixel == 1;
        *pixel ^= 1;
        was_lit
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH] == 1
    }

    /// A copy of the current contents.
    pub fn snapshot(&self) -> Frame {
        self.pixels
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_dark_and_clean() {
        let frame_buffer = FrameBuffer::new();
        assert!(!frame_buffer.is_dirty());
        assert!(frame_buffer.snapshot().iter().flatten().all(|&p| p == 0));
    }

    #[test]
    fn test_toggle_returns_prior_state() {
        let mut frame_buffer = FrameBuffer::new();
        assert!(!frame_buffer.toggle(3, 4));
        assert!(frame_buffer.pixel(3, 4));
        assert!(frame_buffer.toggle(3, 4));
        assert!(!frame_buffer.pixel(3, 4));
    }

    #[test]
    fn test_toggle_wraps() {
        let mut frame_buffer = FrameBuffer::new();
        frame_buffer.toggle(DISPLAY_WIDTH + 1, DISPLAY_HEIGHT + 2);
        assert_eq!(frame_buffer.snapshot()[2][1], 1);
    }

    #[test]
    fn test_clear() {
        let mut frame_buffer = FrameBuffer::new();
        frame_buffer.toggle(0, 0);
        frame_buffer.toggle(63, 31);
        frame_buffer.clear();
        assert!(frame_buffer.is_dirty());
        assert!(frame_buffer.snapshot().iter().flatten().all(|&p| p == 0));
    }

    #[test]
    fn test_dirty_flag() {
        let mut frame_buffer = FrameBuffer::new();
        frame_buffer.mark_dirty();
        assert!(frame_buffer.is_dirty());
        frame_buffer.clear_dirty();
        assert!(!frame_buffer.is_dirty());
    }
}

use anyhow::Result;
use log::debug;

use ch8vm_core::Frame;

use crate::run::{Frontend, HostEvent};

/// A frontend with no window and no input. It keeps the last frame it was given.
#[derive(Default)]
pub struct Headless {
    last_frame: Option<Frame>,
}

impl Headless {
    pub fn new() -> Self {
        Headless::default()
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }
}

impl Frontend for Headless {
    fn poll_events(&mut self) -> Vec<HostEvent> {
        Vec::new()
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        self.last_frame = Some(*frame);
        Ok(())
    }

    fn set_sound(&mut self, on: bool) {
        debug!("sound {}", if on { "on" } else { "off" });
    }
}

/// Formats a Frame as text, one line per row, `#` for a lit pixel and `.` for a dark one.
///
/// # Arguments
/// * `frame` a Chip-8 Frame
pub fn frame_to_text(frame: &Frame) -> String {
    frame
        .iter()
        .map(|row| {
            row.iter()
                .map(|&pixel| if pixel == 1 { '#' } else { '.' })
                .chain(std::iter::once('\n'))
                .collect::<String>()
        })
        .collect()
}

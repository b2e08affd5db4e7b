use anyhow::{anyhow, Result};
use log::warn;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::WindowCanvas;
use sdl2::EventPump;

use ch8vm_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use ch8vm_core::Frame;

use crate::run::{Frontend, HostEvent};

const TITLE: &str = "ch8vm";

/// Host keys in hex keypad order, row by row, so the left four alphanumeric columns stand
/// in for the keypad.
/// ```text
/// |1|2|3|4|      |1|2|3|C|
/// |Q|W|E|R|  ->  |4|5|6|D|
/// |A|S|D|F|  ->  |7|8|9|E|
/// |Z|X|C|V|      |A|0|B|F|
/// ```
const LAYOUT: [(Keycode, u8); 16] = [
    (Keycode::Num1, 0x1),
    (Keycode::Num2, 0x2),
    (Keycode::Num3, 0x3),
    (Keycode::Num4, 0xC),
    (Keycode::Q, 0x4),
    (Keycode::W, 0x5),
    (Keycode::E, 0x6),
    (Keycode::R, 0xD),
    (Keycode::A, 0x7),
    (Keycode::S, 0x8),
    (Keycode::D, 0x9),
    (Keycode::F, 0xE),
    (Keycode::Z, 0xA),
    (Keycode::X, 0x0),
    (Keycode::C, 0xB),
    (Keycode::V, 0xF),
];

/// The keypad value a host key stands for, if any.
pub fn keymap(key: Keycode) -> Option<u8> {
    LAYOUT
        .iter()
        .find(|&&(host, _)| host == key)
        .map(|&(_, value)| value)
}

/// Expands a Frame into RGB24 bytes for a streaming texture, white where lit.
fn frame_to_rgb24(frame: &Frame) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(DISPLAY_WIDTH * DISPLAY_HEIGHT * 3);
    for &pixel in frame.iter().flatten() {
        let level = if pixel == 0 { 0x00 } else { 0xFF };
        rgb.extend_from_slice(&[level; 3]);
    }
    rgb
}

/// # SDL Frontend
/// A window showing the 64x32 display scaled up, fed by the keyboard.
///
/// `Space` pauses and resumes, `Escape` or closing the window quits. While the sound timer
/// runs the window title carries a note since there is no tone generator.
pub struct SdlFrontend {
    // Subsystems stay alive as long as the context does
    _sdl: sdl2::Sdl,
    canvas: WindowCanvas,
    events: EventPump,
}

impl SdlFrontend {
    /// Opens a window bound to a fresh sdl2 context.
    ///
    /// # Arguments
    /// * `scale` the size multiplier for each pixel
    pub fn new(scale: u32) -> Result<Self> {
        let sdl = sdl2::init().map_err(|e| anyhow!("unable to start SDL: {}", e))?;
        let video = sdl
            .video()
            .map_err(|e| anyhow!("unable to start SDL video: {}", e))?;
        let window = video
            .window(
                TITLE,
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()?;
        let canvas = window.into_canvas().build()?;
        let events = sdl
            .event_pump()
            .map_err(|e| anyhow!("unable to read SDL events: {}", e))?;

        Ok(SdlFrontend {
            _sdl: sdl,
            canvas,
            events,
        })
    }
}

impl Frontend for SdlFrontend {
    fn poll_events(&mut self) -> Vec<HostEvent> {
        self.events
            .poll_iter()
            .filter_map(|event| match event {
                Event::Quit { .. } => Some(HostEvent::Quit),
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => Some(HostEvent::KeyDown(kc)),
                    (Keycode::Space, _) => Some(HostEvent::TogglePause),
                    (Keycode::Escape, _) => Some(HostEvent::Quit),
                    _ => None,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => keymap(key).map(HostEvent::KeyUp),
                _ => None,
            })
            .collect()
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGB24,
            DISPLAY_WIDTH as u32,
            DISPLAY_HEIGHT as u32,
        )?;

        let pixels = frame_to_rgb24(frame);
        texture
            .with_lock(None, |buffer: &mut [u8], _pitch: usize| {
                buffer.copy_from_slice(&pixels);
            })
            .map_err(|e| anyhow!("unable to update texture: {}", e))?;

        self.canvas
            .copy(&texture, None, None)
            .map_err(|e| anyhow!("unable to draw frame: {}", e))?;
        self.canvas.present();
        Ok(())
    }

    fn set_sound(&mut self, on: bool) {
        let title = if on {
            format!("{} \u{266a}", TITLE)
        } else {
            TITLE.to_string()
        };
        if let Err(e) = self.canvas.window_mut().set_title(&title) {
            warn!("unable to set window title: {}", e);
        }
    }
}

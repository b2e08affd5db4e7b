use std::io::Read;

use log::{debug, error, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{Config, Quirks};
use crate::error::{ExecError, Fault, LoadError};
use crate::frame::{Frame, FrameBuffer};
use crate::instruction::{Flow, Instruction};
use crate::keypad::Keypad;
use crate::state::State;
use crate::timers::Timers;

/// Where the engine is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Fetching and executing instructions.
    Running,
    /// Stepping is suspended on request; timers and rendering carry on.
    Paused,
    /// Blocked in `FX0A` until a key is latched into the given register.
    AwaitingKey { register: u8 },
    /// Stopped for good, either by a fault or by running off the end of memory.
    Halted,
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - the machine `state`
///  - the latched key on the `keypad`
///  - whether it is running, paused, waiting on a key or halted
///
/// Supplies interfaces for:
/// - loading programs
/// - pressing and releasing keys
/// - stepping the CPU and pausing or resuming it
/// - ticking its timers
/// - inspecting its frame buffer for rendering by some display
///
/// The host owns the clock: it decides how often `step` and `tick_timers` run, and it must
/// keep ticking timers while the engine is waiting on a key.
pub struct Chip8 {
    state: State,
    status: Status,
    // Status to return to when unpaused
    resume_to: Status,
    keypad: Keypad,
    quirks: Quirks,
    rng: StdRng,
    fault: Option<ExecError>,
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Chip8 {
            state: State::new(),
            status: Status::Running,
            resume_to: Status::Running,
            keypad: Keypad::default(),
            quirks: config.quirks,
            rng,
            fault: None,
        }
    }

    /// Loads a program image at `PROGRAM_START`.
    ///
    /// # Arguments
    /// * `image` the raw program bytes
    pub fn load(&mut self, image: &[u8]) -> Result<(), LoadError> {
        self.state.memory.load(image)
    }

    /// Loads a program image from a reader.
    ///
    /// # Arguments
    /// * `reader` a source that contains a program image, read until it ends
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), LoadError> {
        let mut image = Vec::new();
        reader.read_to_end(&mut image)?;
        self.load(&image)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The fault that halted the engine, if one did.
    pub fn fault(&self) -> Option<&ExecError> {
        self.fault.as_ref()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Returns the Frame if the display should be redrawn, and marks it as drawn.
    pub fn take_frame(&mut self) -> Option<Frame> {
        let frame_buffer = &mut self.state.frame_buffer;
        if frame_buffer.is_dirty() {
            frame_buffer.clear_dirty();
            Some(frame_buffer.snapshot())
        } else {
            None
        }
    }

    pub fn timers(&self) -> Timers {
        self.state.timers
    }

    /// Whether the sound timer wants a beep right now.
    pub fn sound_active(&self) -> bool {
        self.state.timers.sound_active()
    }

    /// Counts both timers down by one; called by the host at `TIMER_HZ`.
    pub fn tick_timers(&mut self) {
        self.state.timers.tick();
    }

    /// Latches a key.
    ///
    /// # Arguments
    /// * `key` the keypad value (0..=0xF) of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.keypad.press(key);
    }

    /// Clears the latch if `key` is the latched key.
    ///
    /// # Arguments
    /// * `key` the keypad value (0..=0xF) of the key that was released
    pub fn key_release(&mut self, key: u8) {
        self.keypad.release(key);
    }

    /// Suspends stepping. Has no effect once halted.
    pub fn pause(&mut self) {
        match self.status {
            Status::Running | Status::AwaitingKey { .. } => {
                self.resume_to = self.status;
                self.status = Status::Paused;
                debug!("paused");
            }
            Status::Paused | Status::Halted => {}
        }
    }

    /// Picks up where `pause` left off, including any key wait.
    pub fn resume(&mut self) {
        if self.status == Status::Paused {
            self.status = self.resume_to;
            debug!("resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.status == Status::Paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Advances the CPU by a single step
    /// - executes the next instruction when running
    /// - checks for a latched key when awaiting one
    /// - does nothing when paused or halted
    ///
    /// A fault halts the engine and is returned once; later steps are no-ops.
    pub fn step(&mut self) -> Result<Status, ExecError> {
        match self.status {
            Status::Running => self.advance_cpu()?,
            Status::AwaitingKey { register } => self.poll_key(register),
            Status::Paused | Status::Halted => {}
        }
        Ok(self.status)
    }

    fn poll_key(&mut self, register: u8) {
        if let Some(key) = self.keypad.take() {
            self.state.set_reg(register, key);
            self.status = Status::Running;
            debug!("V{:X} = key {:X}, resuming", register, key);
        }
    }

    fn advance_cpu(&mut self) -> Result<(), ExecError> {
        let pc = self.state.pc;
        let op = match self.get_op() {
            Some(op) => op,
            None => {
                info!("pc {:#05X} is past the last instruction, halting", pc);
                self.status = Status::Halted;
                return Ok(());
            }
        };
        self.state.pc = pc + 0x2;

        let result = match Instruction::decode(op) {
            Some(instruction) => {
                trace!(
                    "{:03X}: {:04X}  {:<16} v{:02X?} i{:04X}",
                    pc,
                    op,
                    instruction.to_string(),
                    self.state.v,
                    self.state.i
                );
                instruction.execute(
                    &mut self.state,
                    self.keypad.current(),
                    self.quirks,
                    &mut self.rng,
                )
            }
            None => Err(Fault::UnknownOpcode),
        };

        match result {
            Ok(Flow::Next) => Ok(()),
            Ok(Flow::AwaitKey(register)) => {
                debug!("waiting on a key for V{:X}", register);
                self.status = Status::AwaitingKey { register };
                Ok(())
            }
            Err(fault) => {
                let err = ExecError { pc, op, fault };
                error!("halting: {}", err);
                self.status = Status::Halted;
                self.fault = Some(err);
                Err(err)
            }
        }
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    fn get_op(&self) -> Option<u16> {
        self.state.memory.word(self.state.pc)
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

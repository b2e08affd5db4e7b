pub use chip8::{Chip8, Status};
pub use config::{Config, Quirks};
pub use constants::{CPU_HZ, TIMER_HZ};
pub use error::{ExecError, Fault, LoadError};
pub use frame::{Frame, FrameBuffer};
pub use instruction::{disassemble, Instruction, Line};
pub use state::State;
pub use timers::{Cadence, Timers};

mod chip8;
mod config;
pub mod constants;
mod error;
mod frame;
mod instruction;
mod keypad;
mod memory;
mod opcode;
mod operations;
pub mod state;
mod timers;

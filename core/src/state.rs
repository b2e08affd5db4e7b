use crate::constants::{FLAG_REGISTER, PROGRAM_START, REGISTER_COUNT, STACK_DEPTH};
use crate::error::Fault;
use crate::frame::FrameBuffer;
use crate::memory::Memory;
use crate::timers::Timers;

/// The machine's internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry, borrow and collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter; starts at `PROGRAM_START`
///
/// Timers
/// - 2 8-bit timers (delay & sound)
///
/// ## Memory
/// - a 16 entry call stack of return addresses
/// - 4096 bytes of addressable memory
/// - a 64x32 frame buffer
#[derive(Clone)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub stack: Stack,
    pub memory: Memory,
    pub timers: Timers,
    pub frame_buffer: FrameBuffer,
}

impl State {
    pub fn new() -> Self {
        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            stack: Stack::new(),
            memory: Memory::new(),
            timers: Timers::default(),
            frame_buffer: FrameBuffer::new(),
        }
    }

    /// Reads Vx.
    pub fn reg(&self, x: u8) -> u8 {
        debug_assert!((x as usize) < REGISTER_COUNT, "no register V{:X}", x);
        self.v[x as usize]
    }

    /// Writes Vx.
    pub fn set_reg(&mut self, x: u8, value: u8) {
        debug_assert!((x as usize) < REGISTER_COUNT, "no register V{:X}", x);
        self.v[x as usize] = value;
    }

    /// Sets VF to 1 or 0.
    pub fn set_flag(&mut self, set: bool) {
        self.v[FLAG_REGISTER as usize] = u8::from(set);
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG_REGISTER as usize]
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// # Stack
/// A LIFO of up to `STACK_DEPTH` return addresses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stack {
    frames: [u16; STACK_DEPTH],
    len: usize,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            frames: [0; STACK_DEPTH],
            len: 0,
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        let slot = self.frames.get_mut(self.len).ok_or(Fault::StackOverflow)?;
        *slot = addr;
        self.len += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        if self.len == 0 {
            return Err(Fault::StackUnderflow);
        }
        self.len -= 1;
        Ok(self.frames[self.len])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return addresses from the outermost call inwards.
    pub fn frames(&self) -> &[u16] {
        &self.frames[..self.len]
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_at_program() {
        let state = State::new();
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.i, 0x0);
        assert_eq!(state.v, [0; 16]);
        assert!(state.stack.is_empty());
    }

    #[test]
    fn test_set_flag() {
        let mut state = State::new();
        state.set_flag(true);
        assert_eq!(state.v[0xF], 0x1);
        state.set_flag(false);
        assert_eq!(state.flag(), 0x0);
    }

    #[test]
    fn test_stack_holds_sixteen() {
        let mut stack = Stack::new();
        for addr in 0..16 {
            stack.push(0x200 + addr * 2).unwrap();
        }
        assert_eq!(stack.len(), 16);
        assert_eq!(stack.push(0x300), Err(Fault::StackOverflow));
        assert_eq!(stack.len(), 16);
    }

    #[test]
    fn test_stack_underflow() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), Err(Fault::StackUnderflow));
    }

    #[test]
    fn test_stack_is_lifo() {
        let mut stack = Stack::new();
        stack.push(0x202).unwrap();
        stack.push(0x404).unwrap();
        stack.push(0x606).unwrap();
        assert_eq!(stack.frames(), &[0x202, 0x404, 0x606]);
        assert_eq!(stack.pop(), Ok(0x606));
        assert_eq!(stack.pop(), Ok(0x404));
        assert_eq!(stack.pop(), Ok(0x202));
        assert_eq!(stack.pop(), Err(Fault::StackUnderflow));
    }
}

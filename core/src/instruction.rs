use std::fmt;

use rand::Rng;

use crate::config::Quirks;
use crate::error::Fault;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// A decoded instruction.
///
/// Register operands are nibbles (0..=0xF), addresses are 12 bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `0NNN` machine code routine; treated as a subroutine call
    Sys { addr: u16 },
    /// `00E0`
    Clear,
    /// `00EE`
    Return,
    /// `1NNN`
    Jump { addr: u16 },
    /// `2NNN`
    Call { addr: u16 },
    /// `3XNN`
    SkipEqImm { x: u8, nn: u8 },
    /// `4XNN`
    SkipNeImm { x: u8, nn: u8 },
    /// `5XY0`
    SkipEqReg { x: u8, y: u8 },
    /// `6XNN`
    LoadImm { x: u8, nn: u8 },
    /// `7XNN`
    AddImm { x: u8, nn: u8 },
    /// `8XY0`
    Move { x: u8, y: u8 },
    /// `8XY1`
    Or { x: u8, y: u8 },
    /// `8XY2`
    And { x: u8, y: u8 },
    /// `8XY3`
    Xor { x: u8, y: u8 },
    /// `8XY4`
    AddReg { x: u8, y: u8 },
    /// `8XY5`
    Sub { x: u8, y: u8 },
    /// `8XY6`
    ShiftRight { x: u8, y: u8 },
    /// `8XY7`
    SubReverse { x: u8, y: u8 },
    /// `8XYE`
    ShiftLeft { x: u8, y: u8 },
    /// `9XY0`
    SkipNeReg { x: u8, y: u8 },
    /// `ANNN`
    LoadIndex { addr: u16 },
    /// `BNNN`
    JumpOffset { addr: u16 },
    /// `CXNN`
    Random { x: u8, nn: u8 },
    /// `DXYN`
    Draw { x: u8, y: u8, n: u8 },
    /// `EX9E`
    SkipKeyPressed { x: u8 },
    /// `EXA1`
    SkipKeyNotPressed { x: u8 },
    /// `FX07`
    LoadDelay { x: u8 },
    /// `FX0A`
    AwaitKey { x: u8 },
    /// `FX15`
    SetDelay { x: u8 },
    /// `FX18`
    SetSound { x: u8 },
    /// `FX1E`
    AddIndex { x: u8 },
    /// `FX29`
    LoadGlyph { x: u8 },
    /// `FX33`
    StoreBcd { x: u8 },
    /// `FX55`
    StoreRegisters { x: u8 },
    /// `FX65`
    LoadRegisters { x: u8 },
}

/// What the engine should do after an instruction completes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Carry on fetching.
    Next,
    /// Block until a key is latched, then store it in the given register.
    AwaitKey(u8),
}

impl Instruction {
    /// Selects the Instruction for a raw opcode, or `None` if it isn't one.
    pub fn decode(op: u16) -> Option<Instruction> {
        use Instruction::*;

        let (x, y, n, nn, addr) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
        let instruction = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Clear,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x0, ..) => Sys { addr },
            (0x1, ..) => Jump { addr },
            (0x2, ..) => Call { addr },
            (0x3, ..) => SkipEqImm { x, nn },
            (0x4, ..) => SkipNeImm { x, nn },
            (0x5, .., 0x0) => SkipEqReg { x, y },
            (0x6, ..) => LoadImm { x, nn },
            (0x7, ..) => AddImm { x, nn },
            (0x8, .., 0x0) => Move { x, y },
            (0x8, .., 0x1) => Or { x, y },
            (0x8, .., 0x2) => And { x, y },
            (0x8, .., 0x3) => Xor { x, y },
            (0x8, .., 0x4) => AddReg { x, y },
            (0x8, .., 0x5) => Sub { x, y },
            (0x8, .., 0x6) => ShiftRight { x, y },
            (0x8, .., 0x7) => SubReverse { x, y },
            (0x8, .., 0xE) => ShiftLeft { x, y },
            (0x9, .., 0x0) => SkipNeReg { x, y },
            (0xA, ..) => LoadIndex { addr },
            (0xB, ..) => JumpOffset { addr },
            (0xC, ..) => Random { x, nn },
            (0xD, ..) => Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => SkipKeyPressed { x },
            (0xE, _, 0xA, 0x1) => SkipKeyNotPressed { x },
            (0xF, _, 0x0, 0x7) => LoadDelay { x },
            (0xF, _, 0x0, 0xA) => AwaitKey { x },
            (0xF, _, 0x1, 0x5) => SetDelay { x },
            (0xF, _, 0x1, 0x8) => SetSound { x },
            (0xF, _, 0x1, 0xE) => AddIndex { x },
            (0xF, _, 0x2, 0x9) => LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => StoreBcd { x },
            (0xF, _, 0x5, 0x5) => StoreRegisters { x },
            (0xF, _, 0x6, 0x5) => LoadRegisters { x },
            _ => return None,
        };
        Some(instruction)
    }

    /// Runs the instruction against `state`, which should already have its PC advanced
    /// past it.
    ///
    /// # Arguments
    /// * `key` the currently latched key, if any
    /// * `quirks` compatibility switches
    /// * `rng` source of randomness for `CXNN`
    pub fn execute<R: Rng>(
        self,
        state: &mut State,
        key: Option<u8>,
        quirks: Quirks,
        rng: &mut R,
    ) -> Result<Flow, Fault> {
        use Instruction::*;

        match self {
            Sys { addr } | Call { addr } => call(state, addr)?,
            Clear => clr(state),
            Return => rts(state)?,
            Jump { addr } => jump(state, addr)?,
            SkipEqImm { x, nn } => ske(state, x, nn),
            SkipNeImm { x, nn } => skne(state, x, nn),
            SkipEqReg { x, y } => skre(state, x, y),
            LoadImm { x, nn } => load(state, x, nn),
            AddImm { x, nn } => add(state, x, nn),
            Move { x, y } => mv(state, x, y),
            Or { x, y } => or(state, x, y),
            And { x, y } => and(state, x, y),
            Xor { x, y } => xor(state, x, y),
            AddReg { x, y } => addr(state, x, y),
            Sub { x, y } => sub(state, x, y),
            ShiftRight { x, y } => shr(state, x, y, quirks),
            SubReverse { x, y } => subn(state, x, y),
            ShiftLeft { x, y } => shl(state, x, y, quirks),
            SkipNeReg { x, y } => skrne(state, x, y),
            LoadIndex { addr } => loadi(state, addr),
            JumpOffset { addr } => jumpi(state, addr)?,
            Random { x, nn } => rnd(state, x, nn, rng),
            Draw { x, y, n } => draw(state, x, y, n)?,
            SkipKeyPressed { x } => skpr(state, x, key),
            SkipKeyNotPressed { x } => skup(state, x, key),
            LoadDelay { x } => moved(state, x),
            AwaitKey { x } => return Ok(Flow::AwaitKey(x)),
            SetDelay { x } => setd(state, x),
            SetSound { x } => sets(state, x),
            AddIndex { x } => addi(state, x),
            LoadGlyph { x } => ldspr(state, x),
            StoreBcd { x } => bcd(state, x)?,
            StoreRegisters { x } => stor(state, x)?,
            LoadRegisters { x } => read(state, x)?,
        }
        Ok(Flow::Next)
    }
}

/// Conventional assembler mnemonics, e.g. `LD V1, 0x22` or `DRW V0, V1, 5`.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Instruction::*;

        match *self {
            Sys { addr } => write!(f, "SYS {:#05X}", addr),
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { addr } => write!(f, "JP {:#05X}", addr),
            Call { addr } => write!(f, "CALL {:#05X}", addr),
            SkipEqImm { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            SkipNeImm { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            AddImm { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { addr } => write!(f, "LD I, {:#05X}", addr),
            JumpOffset { addr } => write!(f, "JP V0, {:#05X}", addr),
            Random { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyPressed { x } => write!(f, "SKP V{:X}", x),
            SkipKeyNotPressed { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            AwaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

/// One row of a disassembly listing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub addr: u16,
    pub op: u16,
    pub instruction: Option<Instruction>,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.instruction {
            Some(instruction) => {
                write!(f, "{:03X}: {:04X}  {}", self.addr, self.op, instruction)
            }
            None => write!(f, "{:03X}: {:04X}  ???", self.addr, self.op),
        }
    }
}

/// Decodes `image` word by word as if it were loaded at `origin`.
///
/// Data mixed in with code is decoded too; words that aren't instructions get `None`.
/// A trailing odd byte is padded with a zero low byte.
pub fn disassemble(image: &[u8], origin: u16) -> Vec<Line> {
    image
        .chunks(2)
        .enumerate()
        .map(|(index, word)| {
            let high = u16::from(word[0]);
            let low = word.get(1).map_or(0, |&b| u16::from(b));
            let op = high << 8 | low;
            Line {
                addr: origin.wrapping_add(index as u16 * 2),
                op,
                instruction: Instruction::decode(op),
            }
        })
        .collect()
}

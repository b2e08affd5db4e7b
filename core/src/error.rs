use std::io;

use thiserror::Error;

use crate::constants::STACK_DEPTH;

/// Failures while placing a program image in memory.
///
/// These leave the machine untouched, so the caller may try another image.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program image is {size} bytes but only {max} bytes fit in memory")]
    ImageTooLarge { size: usize, max: usize },

    #[error("unable to read program image")]
    Io(#[from] io::Error),
}

/// Conditions that stop the machine while executing a single instruction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("call stack overflow (more than {} nested calls)", STACK_DEPTH)]
    StackOverflow,

    #[error("return with an empty call stack")]
    StackUnderflow,

    #[error("jump target {target:#06X} is outside memory")]
    OutOfRangeJumpTarget { target: u16 },

    #[error("unknown opcode")]
    UnknownOpcode,

    #[error("memory access at {addr:#06X} is outside memory")]
    AddressOutOfRange { addr: usize },
}

/// A [`Fault`] along with the instruction that raised it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{fault} (opcode {op:04X} at pc {pc:#05X})")]
pub struct ExecError {
    /// Address the faulting instruction was fetched from.
    pub pc: u16,
    /// The raw instruction word.
    pub op: u16,
    pub fault: Fault,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_error_names_pc_and_opcode() {
        let err = ExecError {
            pc: 0x204,
            op: 0x00EE,
            fault: Fault::StackUnderflow,
        };
        assert_eq!(
            err.to_string(),
            "return with an empty call stack (opcode 00EE at pc 0x204)"
        );
    }

    #[test]
    fn test_image_too_large_message() {
        let err = LoadError::ImageTooLarge {
            size: 3585,
            max: 3584,
        };
        assert_eq!(
            err.to_string(),
            "program image is 3585 bytes but only 3584 bytes fit in memory"
        );
    }
}

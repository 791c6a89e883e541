//! The error taxonomy of the machine. Every failure is terminal for the run;
//! nothing is retried.

use thiserror::Error;

use crate::bytecode::Opcode;

pub type Result<T> = std::result::Result<T, MachineError>;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum MachineError {
  /// The byte fetched as an instruction register value has no handler.
  #[error("unsupported opcode 0b{opcode:08b} at address 0x{address:02X}")]
  UnsupportedOpcode {
    opcode: u8,
    address: u8
  },

  /// An opcode outside the ALU subset was routed into the ALU. Not reachable
  /// from any program image, only from a dispatch bug.
  #[error("unsupported ALU operation {0}")]
  UnsupportedAluOperation(Opcode),

  /// A listing line that is neither blank, a comment, nor eight binary digits.
  #[error("malformed listing on line {line}: {text:?}")]
  MalformedListing {
    line: usize,
    text: String
  },

  /// The parsed program does not fit in the 256-cell memory.
  #[error("program of {0} bytes does not fit in memory")]
  ProgramTooLarge(usize),
}

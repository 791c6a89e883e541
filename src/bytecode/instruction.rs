
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

/**
  Opcodes of the machine.

  The opcode byte is self-describing: its top two bits encode the number of
  operand bytes that follow it, so an opcode's instruction width can be
  computed from the byte alone with a trivial shift. The remaining bits
  distinguish the operations. The discriminants below are the wire values
  and must not be reordered or renumbered.
*/
#[derive(
StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,    Debug,         Hash
)]
#[strum(serialize_all = "shouty_snake_case")]
#[repr(u8)]
pub enum Opcode {
  // Nullary //
  Hlt  = 0b0000_0001,
  Ret  = 0b0001_0001,

  // Unary //
  Push = 0b0100_0101,
  Pop  = 0b0100_0110,
  Prn  = 0b0100_0111,
  Call = 0b0101_0000,
  Jmp  = 0b0101_0100,
  Jeq  = 0b0101_0101,
  Jne  = 0b0101_0110,

  // Binary //
  Ldi  = 0b1000_0010,
  Add  = 0b1010_0000,
  Mul  = 0b1010_0010,
  Cmp  = 0b1010_0111,
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// The operand count, encoded in the top two bits of the opcode byte.
  pub fn arity(&self) -> u8 {
    self.code() >> 6
  }

  /// The full instruction width in bytes: the opcode byte plus its operands.
  pub fn width(&self) -> u8 {
    self.arity() + 1
  }
}

/// Holds the unencoded components of an instruction. As such, it enumerates the possible
/// instruction argument combinations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [OpCode:8][Operand:8][Operand:8]
  Binary {
    opcode    :  Opcode,
    operand_a :  u8,
    operand_b :  u8
  },
  /// [OpCode:8][Operand:8]
  Unary {
    opcode  :  Opcode,
    operand :  u8
  },
  /// [OpCode:8]
  Nullary(Opcode),
}

impl Instruction {
  /**
    Decodes the fixed 3-byte instruction slot fetched at the program counter.
    The variant is selected by the opcode's arity; the unused trailing bytes
    of the slot are discarded. Returns `None` if the first byte is not an
    opcode.
  */
  pub fn try_decode(slot: [u8; 3]) -> Option<Instruction> {
    let opcode = match Opcode::try_from(slot[0]) {
      Ok(opcode) => opcode,
      Err(_e)    => { return None; }
    };

    let instruction =
      match opcode.arity() {
        2 => Instruction::Binary { opcode, operand_a: slot[1], operand_b: slot[2] },
        1 => Instruction::Unary  { opcode, operand: slot[1] },
        _ => Instruction::Nullary(opcode)
      };

    Some(instruction)
  }

  /// Encodes the instruction into its byte sequence, opcode first.
  pub fn encode(&self) -> Vec<u8> {
    match self {

      Instruction::Binary { opcode, operand_a, operand_b } => {
        vec![opcode.code(), *operand_a, *operand_b]
      },

      Instruction::Unary { opcode, operand } => {
        vec![opcode.code(), *operand]
      },

      Instruction::Nullary(opcode) => {
        vec![opcode.code()]
      },
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Instruction::Binary { opcode, operand_a, operand_b } => {
        write!(f, "{}({}, {})", opcode, operand_a, operand_b)
      }

      Instruction::Unary { opcode, operand } => {
        write!(f, "{}({})", opcode, operand)
      }

      Instruction::Nullary(opcode) => {
        write!(f, "{}", opcode)
      }

    }
  }
}

/*!

  Instructions occupy a fixed 3-byte decode slot: one opcode byte followed by
  up to two operand bytes. The engine always fetches all three slot bytes at
  the program counter and lets the opcode decide how many of them are
  meaningful; the top two bits of the opcode byte encode its operand count,
  so the width of every instruction is recoverable from the opcode alone.

  The textual form of a program is a listing, one instruction byte per line
  written as eight binary digits. See the `assembly` module.

  One design decision that needed to be made is whether to store instructions
  in memory as enum values, one variant per opcode. Memory is a flat array of
  bytes that the program is free to overwrite at run time (the stack lives in
  the same address space), so instructions only exist as typed values for the
  single slot currently being decoded. An enum is used for the opcode itself
  and inhabits a single byte.

*/

mod assembly;
mod instruction;

pub use assembly::{parse_listing, COMMENT_MARKER};
pub use instruction::{Instruction, Opcode};

//! Structures and functions for the machine itself: the memory and register
//! state together with the fetch-decode-dispatch loop and the ALU.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};
use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumIter};

use crate::bytecode::{Instruction, Opcode};
use crate::error::{MachineError, Result};

/// Cells of flat byte-addressable memory. Addresses are `u8`, so every
/// address a program can produce is in range; address arithmetic wraps.
pub const MEMORY_SIZE: usize = 256;
pub const REGISTER_COUNT: usize = 8;
pub const FLAG_COUNT: usize = 3;

/// Register reserved by convention as the stack pointer for CALL/RET.
pub const SP_REGISTER: usize = 0x07;
/// Initial value of the scalar stack pointer moved by PUSH/POP.
const SP_INIT: u8 = 0x07;

/**
  Comparison flags, set by CMP and read by the conditional jumps. The
  discriminants are the flag's position in the flag file. After every CMP
  exactly one flag is set.
*/
#[derive(StrumDisplay, EnumIter, Clone, Copy, Eq, PartialEq, Debug)]
#[strum(serialize_all = "shouty_snake_case")]
pub enum Flag {
  Greater = 0,
  Less    = 1,
  Equal   = 2,
}

pub struct Machine {

  // Memory stores
  ram : [u8; MEMORY_SIZE],       // Flat memory, also holds both stacks

  // Registers //
  reg   : [u8; REGISTER_COUNT],  // General purpose register file
  flags : [bool; FLAG_COUNT],    // Comparison flags, see `Flag`
  pc    : u8,                    // Program counter, a cursor into `ram`
  // PUSH/POP move this scalar pointer; CALL/RET move `reg[SP_REGISTER]`.
  // The two tracks never interact.
  sp    : u8,

  output_buffer : String,        // Every line PRN has emitted

}

impl Machine {

  // region Display methods

  fn make_register_table(name: char, cells: &[u8], highlight: usize) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);

    for (i, value) in cells.iter().enumerate() {
      match i == highlight {

        true  => {
          table.add_row(
            row![r->format!("* --> {}[{}] =", name, i), format!("0x{:02X}", value)]
          );
        }

        false => {
          table.add_row(
            row![r->format!("{}[{}] =", name, i), format!("0x{:02X}", value)]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  fn make_flag_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Flag", ubl->"Set"]);

    for flag in Flag::iter() {
      table.add_row(row![r->format!("{} =", flag), self.flags[flag as usize]]);
    }
    table
  }

  /**
    Renders one line of execution trace: the program counter, the three raw
    bytes of the instruction slot at the program counter, and the whole
    register file, all in two-digit hex.
  */
  pub fn trace_line(&self) -> String {
    let mut line = format!(
      "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
      self.pc,
      self.read(self.pc),
      self.read(self.pc.wrapping_add(1)),
      self.read(self.pc.wrapping_add(2))
    );

    for value in self.reg.iter() {
      line.push_str(&format!(" {:02X}", value));
    }

    line
  }

  // endregion

  // region Low-level utility methods

  pub fn new() -> Machine {
    Machine {
      ram           :  [0; MEMORY_SIZE],
      reg           :  [0; REGISTER_COUNT],
      flags         :  [false; FLAG_COUNT],
      pc            :  0,
      sp            :  SP_INIT,
      output_buffer :  String::new(),
    }
  }

  /// Returns the value stored at `address`. No side effect.
  pub fn read(&self, address: u8) -> u8 {
    self.ram[address as usize]
  }

  /// Overwrites the byte at `address`.
  pub fn write(&mut self, address: u8, value: u8) {
    self.ram[address as usize] = value;
  }

  pub fn register(&self, index: u8) -> u8 {
    self.reg[index as usize]
  }

  pub fn set_register(&mut self, index: u8, value: u8) {
    self.reg[index as usize] = value;
  }

  pub fn flag(&self, flag: Flag) -> bool {
    self.flags[flag as usize]
  }

  /// Everything PRN has emitted so far, one line per instruction.
  pub fn output(&self) -> &str {
    &self.output_buffer
  }

  /**
    Writes a sequence of already-decoded instruction bytes into memory
    starting at address 0, advancing the write cursor by one per byte.
    The parsing of the textual listing format lives in
    `bytecode::parse_listing`; the machine only sees bytes.
  */
  pub fn load(&mut self, program: &[u8]) -> Result<()> {
    if program.len() > MEMORY_SIZE {
      return Err(MachineError::ProgramTooLarge(program.len()));
    }

    let mut address: u8 = 0;
    for byte in program {
      self.write(address, *byte);
      address = address.wrapping_add(1);
    }
    Ok(())
  }

  /// Moves the program counter past the instruction's own width.
  fn advance(&mut self, opcode: Opcode) {
    self.pc = self.pc.wrapping_add(opcode.width());
  }

  // endregion

  // region Fetch/decode/dispatch loop

  /**
    Runs the fetch-decode-dispatch loop until HLT or a fault.

    Each iteration fetches the instruction register byte at the program
    counter and, unconditionally, the next two memory cells as candidate
    operands; instructions that use fewer operands ignore the extra reads.
    Every handler advances the program counter by its own width, except the
    control-transfer instructions, which set it directly.
  */
  pub fn run(&mut self) -> Result<()> {
    loop {
      let instruction_register = self.read(self.pc);
      let operand_a = self.read(self.pc.wrapping_add(1));
      let operand_b = self.read(self.pc.wrapping_add(2));

      #[cfg(feature = "trace_execution")] println!("{}", self.trace_line());

      match Opcode::try_from(instruction_register) {

        Ok(Opcode::Hlt) => {
          return Ok(());
        }

        Ok(opcode) => {
          self.execute(opcode, operand_a, operand_b)?;
        }

        Err(_e) => {
          return Err(MachineError::UnsupportedOpcode {
            opcode: instruction_register,
            address: self.pc
          });
        }

      }
    }
  }

  fn execute(&mut self, opcode: Opcode, operand_a: u8, operand_b: u8) -> Result<()> {
    match opcode {

      Opcode::Ldi  => self.ldi(operand_a, operand_b),
      Opcode::Prn  => self.prn(operand_a),
      Opcode::Push => self.push(operand_a),
      Opcode::Pop  => self.pop(operand_a),

      | Opcode::Add
      | Opcode::Mul
      | Opcode::Cmp => {
        self.alu(opcode, operand_a, operand_b)?;
        self.advance(opcode);
      }

      Opcode::Call => self.call(operand_a),
      Opcode::Ret  => self.ret(),
      Opcode::Jmp  => self.jmp(operand_a),
      Opcode::Jeq  => self.jeq(operand_a),
      Opcode::Jne  => self.jne(operand_a),

      Opcode::Hlt  => unreachable!("HLT is intercepted by the fetch loop."),

    }
    Ok(())
  }

  // endregion

  // region Machine instruction methods

  /**
    Arithmetic on the two named registers, result into the first. ADD and MUL
    wrap at the 8 bit register width. CMP clears all three flags and then
    sets the one matching the comparison. Opcodes outside the ALU subset are
    a programming error in the dispatcher, not something a program can reach.
  */
  fn alu(&mut self, operation: Opcode, reg_a: u8, reg_b: u8) -> Result<()> {
    let a = self.reg[reg_a as usize];
    let b = self.reg[reg_b as usize];

    match operation {

      Opcode::Add => {
        self.reg[reg_a as usize] = a.wrapping_add(b);
      }

      Opcode::Mul => {
        self.reg[reg_a as usize] = a.wrapping_mul(b);
      }

      Opcode::Cmp => {
        self.flags = [false; FLAG_COUNT];
        if a > b {
          self.flags[Flag::Greater as usize] = true;
        } else if a < b {
          self.flags[Flag::Less as usize] = true;
        } else {
          self.flags[Flag::Equal as usize] = true;
        }
      }

      _operation => {
        return Err(MachineError::UnsupportedAluOperation(operation));
      }

    }
    Ok(())
  }

  fn ldi(&mut self, register: u8, value: u8) {
    self.reg[register as usize] = value;
    self.advance(Opcode::Ldi);
  }

  fn prn(&mut self, register: u8) {
    let line = format!("{}", self.reg[register as usize]);
    println!("{}", line);
    self.output_buffer.push_str(&line);
    self.output_buffer.push('\n');
    self.advance(Opcode::Prn);
  }

  fn push(&mut self, register: u8) {
    self.sp = self.sp.wrapping_sub(1);
    self.ram[self.sp as usize] = self.reg[register as usize];
    self.advance(Opcode::Push);
  }

  fn pop(&mut self, register: u8) {
    self.reg[register as usize] = self.ram[self.sp as usize];
    self.sp = self.sp.wrapping_add(1);
    self.advance(Opcode::Pop);
  }

  fn call(&mut self, register: u8) {
    let return_address = self.pc.wrapping_add(Opcode::Call.width());
    self.reg[SP_REGISTER] = self.reg[SP_REGISTER].wrapping_sub(1);
    self.ram[self.reg[SP_REGISTER] as usize] = return_address;
    self.pc = self.reg[register as usize];
  }

  fn ret(&mut self) {
    let return_address = self.ram[self.reg[SP_REGISTER] as usize];
    self.reg[SP_REGISTER] = self.reg[SP_REGISTER].wrapping_add(1);
    self.pc = return_address;
  }

  fn jmp(&mut self, register: u8) {
    self.pc = self.reg[register as usize];
  }

  fn jeq(&mut self, register: u8) {
    match self.flags[Flag::Equal as usize] {
      true  => self.jmp(register),
      false => self.advance(Opcode::Jeq),
    }
  }

  fn jne(&mut self, register: u8) {
    match self.flags[Flag::Equal as usize] {
      false => self.jmp(register),
      true  => self.advance(Opcode::Jne),
    }
  }

  // endregion

}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let slot = [
      self.read(self.pc),
      self.read(self.pc.wrapping_add(1)),
      self.read(self.pc.wrapping_add(2))
    ];
    let next = match Instruction::try_decode(slot) {
      Some(instruction) => format!("{}", instruction),
      None              => format!("0b{:08b} (not an opcode)", slot[0])
    };

    let r_table = Machine::make_register_table('R', &self.reg, SP_REGISTER);
    let f_table = self.make_flag_table();

    let mut combined_table = table!([r_table, f_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Flags"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(
      f,
      "PC: 0x{:02X}  SP: 0x{:02X}  Next: {}\n{}",
      self.pc, self.sp, next, combined_table
    )
  }
}

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;
extern crate strum;
extern crate strum_macros;

mod bytecode;
mod error;
mod machine;

use std::env;
use std::fs;
use std::process;

use crate::machine::Machine;

fn main() {
  let mut args = env::args();
  args.next(); // executable name

  let path = match args.next() {
    Some(path) => path,
    None => {
      eprintln!("A program name is required.");
      process::exit(1);
    }
  };

  let text = match fs::read_to_string(&path) {
    Ok(text) => text,
    Err(error) => {
      eprintln!("Cannot read {}: {}", path, error);
      process::exit(1);
    }
  };

  let program = match bytecode::parse_listing(&text) {
    Ok(program) => program,
    Err(error) => {
      eprintln!("{}", error);
      process::exit(1);
    }
  };

  let mut machine = Machine::new();
  if let Err(error) = machine.load(&program) {
    eprintln!("{}", error);
    process::exit(1);
  }

  if let Err(error) = machine.run() {
    eprintln!("{}", error);
    eprintln!("{}", machine);
    process::exit(1);
  }
}

/*!
  The human readable textual form of a program is a listing: one instruction
  byte per line, written as eight binary digits in big-endian bit order. Only
  the leftmost eight characters of an instruction line are significant, so a
  line may carry trailing annotations. A line whose first character is `#` is
  a comment, and blank lines are skipped. The loader parses a listing into the
  byte sequence that `Machine::load` copies into memory.
*/

use nom::{
  IResult,
  bytes::complete::take_while_m_n,
  combinator::map_res
};

use crate::error::{MachineError, Result};

/// First character of a comment line.
pub const COMMENT_MARKER: char = '#';

/// Parses the leftmost eight binary digits of an instruction line into a byte.
fn instruction_byte(line: &str) -> IResult<&str, u8> {
  map_res(
    take_while_m_n(8, 8, |c: char| c == '0' || c == '1'),
    |digits: &str| u8::from_str_radix(digits, 2)
  )(line)
}

/**
  Parses a complete program listing into the byte sequence it encodes.

  Fails on the first line that is neither blank, a comment, nor an
  instruction line, naming the offending 1-based line number.
*/
pub fn parse_listing(text: &str) -> Result<Vec<u8>> {
  let mut bytes = Vec::new();

  for (number, line) in text.lines().enumerate() {
    if line.starts_with(COMMENT_MARKER) || line.trim().is_empty() {
      continue;
    }
    match instruction_byte(line) {
      Ok((_rest, byte)) => bytes.push(byte),
      Err(_e) => {
        return Err(MachineError::MalformedListing {
          line: number + 1,
          text: line.to_string()
        });
      }
    }
  }

  Ok(bytes)
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_one_byte_per_line() {
    let listing = "10000010\n00000000\n00001000\n00000001\n";
    assert_eq!(parse_listing(listing).unwrap(), vec![0b1000_0010, 0, 8, 1]);
  }

  #[test]
  fn comments_and_blank_lines_do_not_change_the_image() {
    let annotated = "# load 8 into R0\n10000010\n00000000\n\n00001000\n   \n# done\n00000001\n";
    let stripped  = "10000010\n00000000\n00001000\n00000001\n";
    assert_eq!(
      parse_listing(annotated).unwrap(),
      parse_listing(stripped).unwrap()
    );
  }

  #[test]
  fn only_the_leftmost_eight_characters_are_significant() {
    let listing = "10000010 this text is ignored\n";
    assert_eq!(parse_listing(listing).unwrap(), vec![0b1000_0010]);
  }

  #[test]
  fn a_final_line_without_a_newline_still_counts() {
    assert_eq!(parse_listing("00000001").unwrap(), vec![1]);
  }

  #[test]
  fn malformed_lines_are_reported_with_their_line_number() {
    let listing = "10000010\n0000100\n";
    match parse_listing(listing) {
      Err(MachineError::MalformedListing { line, text }) => {
        assert_eq!(line, 2);
        assert_eq!(text, "0000100");
      }
      other => panic!("expected a malformed listing error, got {:?}", other)
    }
  }

  #[test]
  fn non_binary_digits_are_malformed() {
    assert!(parse_listing("20000000\n").is_err());
  }

  #[test]
  fn an_empty_listing_is_an_empty_program() {
    assert_eq!(parse_listing("").unwrap(), Vec::<u8>::new());
  }
}

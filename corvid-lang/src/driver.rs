//! The console I/O driver loop: repeatedly forces a program's entry
//! point and dispatches on its alternative, per `SPEC_FULL.md` §6.1's
//! `done`/`putc(char, next)`/`getc(fn)` sugar scheme. Grounded on Go
//! `run.go`'s `Run(main)` orchestration, adapted to this crate's
//! `value::Value` wrapper instead of `runtime/box.go`'s `Box`.
use std::io::{Read, Write};

use crate::value::{mk_char, Value};

const DONE: usize = 0;
const PUTC: usize = 1;
const GETC: usize = 2;

/// Runs `program` to completion against `stdin`/`stdout`, emitting
/// every `putc` rune and feeding every `getc` request one rune read
/// from `input`. Returns an error if the program's output doesn't
/// match the `done`/`putc`/`getc` shape this driver understands.
pub fn run_console(entry: Value, input: &mut impl Read, output: &mut impl Write) -> std::io::Result<()> {
    let mut current = entry;
    loop {
        let alt = current.alternative().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, "entry point did not reduce to a union value")
        })?;
        match alt {
            DONE => return Ok(()),
            PUTC => {
                let c = current.field(0).and_then(|v| v.char()).ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::InvalidData, "putc's first field is not a Char")
                })?;
                let mut buf = [0u8; 4];
                output.write_all(c.encode_utf8(&mut buf).as_bytes())?;
                current = current.field(1).ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::InvalidData, "putc is missing its continuation field")
                })?;
            }
            GETC => {
                let cont = current.field(0).ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::InvalidData, "getc is missing its continuation field")
                })?;
                let rune = read_one_char(input)?;
                current = cont.apply(mk_char(rune));
            }
            other => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("unrecognized console-program alternative: {other}"),
                ))
            }
        }
        output.flush()?;
    }
}

/// Reads one UTF-8 scalar value from `input`, or `'\0'` at end of
/// stream, matching the common `getc` convention of signalling EOF
/// with a sentinel rune rather than a separate alternative.
fn read_one_char(input: &mut impl Read) -> std::io::Result<char> {
    let mut first = [0u8; 1];
    if input.read(&mut first)? == 0 {
        return Ok('\0');
    }
    let len = utf8_len(first[0]);
    let mut buf = vec![first[0]];
    buf.resize(len, 0);
    if len > 1 {
        input.read_exact(&mut buf[1..])?;
    }
    std::str::from_utf8(&buf)
        .ok()
        .and_then(|s| s.chars().next())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidData, "invalid UTF-8 on stdin"))
}

fn utf8_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{mk_bool, mk_union};

    #[test]
    fn done_program_produces_no_output() {
        let mut input: &[u8] = &[];
        let mut output = Vec::new();
        run_console(mk_union(DONE, Vec::new()), &mut input, &mut output).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn putc_chain_writes_each_rune_then_stops() {
        let done = mk_union(DONE, Vec::new());
        let hi = mk_union(PUTC, vec![mk_char('h'), mk_union(PUTC, vec![mk_char('i'), done])]);
        let mut input: &[u8] = &[];
        let mut output = Vec::new();
        run_console(hi, &mut input, &mut output).unwrap();
        assert_eq!(output, b"hi");
    }

    #[test]
    fn unrecognized_alternative_is_reported() {
        let mut input: &[u8] = &[];
        let mut output = Vec::new();
        let bogus = mk_bool(true);
        let err = run_console(bogus, &mut input, &mut output).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}

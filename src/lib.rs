//! Two-pass cross-assembler for the MOS 6502.
//!
//! The main entry point provided by this crate is [`assemble`](fn.assemble.html),
//! which accepts source text in the assembler dialect described below and
//! returns the flat binary image together with the listing, the symbol
//! export text, any MSG output and the diagnostics from pass 2. The
//! [`Assembler`](struct.Assembler.html) type gives the command-line front
//! end the same pipeline over a file on disk.
//!
//! Argument fields are parsed with [pest]; the grammar lives next to the
//! sources in `asm65.pest`.
//!
//! # Source format
//!
//! Each line is `[label[:]] [mnemonic [operands]] [; comment]`. A label
//! starts in column 0; a mnemonic must be preceded by blank space.
//! Identifiers are case-insensitive. A label whose name starts with `.`
//! is local and is qualified by the most recent global label.
//!
//! Numbers are decimal by default; `$` introduces hexadecimal, `%` binary,
//! `@` octal, and `'c'` is the ordinal of a character.
//!
//! # Addressing modes
//!
//!  Syntax      | Mode
//! -------------|----------------------------
//! (nothing)    | implied/inherent
//! `A`          | accumulator
//! `#expr`      | immediate
//! `expr`       | zero page or absolute
//! `expr,X`     | indexed by X
//! `expr,Y`     | indexed by Y
//! `(expr)`     | indirect (JMP only)
//! `(expr,X)`   | indexed indirect
//! `(expr),Y`   | indirect indexed
//!
//! A value that fits the zero page uses the short encoding unless the
//! operand carries a forward reference or a leading `!`, which forces the
//! absolute form.
//!
//! # Expressions
//!
//! Binary operators by falling precedence: `*` `/` `MOD` `SHL` `SHR`,
//! then `+` `-`, then `=` `EQ` `NE` `<` `LT` `LE` `>` `GT` `GE` (yielding
//! 0 or all-ones), then `AND`, then `OR` `XOR`. Unary operators `-`,
//! `NOT`, and the byte selectors `<`/`LOW` and `>`/`HIGH` bind tighter
//! than any binary operator. Parentheses (or `[` `]`) group. All
//! arithmetic is unsigned modulo 2^16.
//!
//! # Pseudo-ops
//!
//!  Directive     | Effect
//! ---------------|--------------------------------------------------------
//! `DB ...`       | emit bytes; string arguments emit their raw characters
//! `DW ...`       | emit little-endian words; empty slots emit zero
//! `DS "..."`     | emit string bytes only
//! `RMB n`        | reserve `n` bytes of zero
//! `ORG n`        | set the location counter, padding the image with zero
//! `BASE n`       | set the location counter without padding
//! `ALIGN n`      | pad to the next multiple of `n`
//! `lbl EQU e`    | define `lbl` once
//! `lbl SET e`    | define `lbl`, redefinable
//! `IF e` / `ELSE` / `ENDI` | conditional assembly
//! `INCL "path"`  | include a source file
//! `INCB "path"`  | include a binary file verbatim
//! `MSG ...`      | write strings and values to the console during pass 2
//! `TITL "t"`     | set the listing title
//! `PAGE [n]`     | force a page break, optionally setting the page length
//! `EXP name`     | write the symbol to the export file
//! `END`          | end of program
//!
//! [pest]: https://docs.rs/pest/

mod assembler;
mod encode;
mod error;
mod expr;
mod instructions;
mod int_util;
mod operand;
mod output;
mod parser;
mod symbols;

#[cfg(test)]
mod test;

pub use assembler::Assembler;
pub use error::{Diagnostic, ErrorCode, FatalError};

/// Which of the two passes is running.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pass {
    First,
    Second,
}

/// Everything a run produces. The binary is the flat image in emission
/// order; listing and export are complete file bodies; diagnostics carry
/// the per-line error codes reported during pass 2.
#[derive(Debug)]
pub struct Output {
    pub binary: Vec<u8>,
    pub listing: String,
    pub export: String,
    pub messages: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub errors: u32,
}

/// Assembles in-memory source text through both passes.
pub fn assemble(source: &str) -> Result<Output, FatalError> {
    Assembler::from_source(source).run()
}

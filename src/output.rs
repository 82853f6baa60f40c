//! Output sinks: the flat binary image, the listing and the symbol-export
//! text. All three accumulate in memory; the command-line front end writes
//! them to disk once the second pass completes.

use crate::symbols::{Symbol, SymbolTable};
use std::fmt::Write;

/// Symbol-table columns in the listing.
pub const SYMCOLS: usize = 4;

/// Flat binary image in encoder-emission order. No header, no checksums.
#[derive(Debug, Default)]
pub struct BinarySink {
    data: Vec<u8>,
}

impl BinarySink {
    pub fn new() -> BinarySink {
        BinarySink::default()
    }

    pub fn push(&mut self, byte: u8) {
        self.data.push(byte);
    }

    pub fn pad(&mut self, count: u16) {
        self.data.resize(self.data.len() + count as usize, 0);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Listing writer. Each source line becomes one or more rows of
/// `C  AAAA  XX XX XX XX   <source>`; pagination is driven by the PAGE and
/// TITL directives through the page length and title.
#[derive(Debug, Default)]
pub struct Listing {
    text: String,
    title: String,
    page_len: u16,
    list_left: u16,
    eject: bool,
    col: usize,
}

impl Listing {
    pub fn new() -> Listing {
        Listing::default()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    pub fn set_page_len(&mut self, len: u16) {
        self.page_len = len;
    }

    pub fn force_eject(&mut self) {
        self.eject = true;
    }

    pub fn put_line(&mut self, code: char, address: u16, obj: &[u8], listhex: bool, source: &str) {
        let mut remaining = obj.len();
        let mut bytes = obj.iter();
        let mut addr = address;
        let mut first = true;
        loop {
            self.text.push(code);
            self.text.push_str("  ");
            if listhex {
                write!(self.text, "{:04x}  ", addr).unwrap();
                for _ in 0..4 {
                    if remaining > 0 {
                        remaining -= 1;
                        addr = addr.wrapping_add(1);
                        write!(self.text, " {:02x}", bytes.next().unwrap()).unwrap();
                    } else {
                        self.text.push_str("   ");
                    }
                }
            } else {
                self.text.push_str(&" ".repeat(18));
            }
            self.text.push_str("   ");
            if first {
                self.text.push_str(source);
            }
            self.text.push('\n');
            self.check_page();
            if !(listhex && remaining > 0) {
                break;
            }
            first = false;
        }
    }

    fn check_page(&mut self) {
        if self.page_len > 0 {
            self.list_left = self.list_left.wrapping_sub(1);
            if self.list_left == 0 {
                self.eject = true;
            }
        }
        if self.eject {
            self.eject = false;
            self.list_left = self.page_len;
            self.text.push('\u{0C}');
            if !self.title.is_empty() {
                self.list_left = self.list_left.wrapping_sub(2);
                writeln!(self.text, "{}\n", self.title).unwrap();
            }
        }
    }

    /// Appends the symbol table in alphabetical order and closes out the
    /// final page.
    pub fn close(&mut self, symbols: &SymbolTable) {
        if !symbols.is_empty() {
            for sym in symbols.iter() {
                write!(self.text, "{:04x}  {:<10}", sym.value, sym.name).unwrap();
                self.col += 1;
                if self.col % SYMCOLS != 0 {
                    self.text.push_str("    ");
                } else {
                    self.text.push('\n');
                    self.check_page();
                }
            }
            if self.col % SYMCOLS != 0 {
                self.text.push('\n');
            }
        }
        self.text.push('\u{0C}');
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Symbol-export writer: one `name\tequ\t$HEX` line per EXP directive.
#[derive(Debug)]
pub struct Export {
    text: String,
}

impl Export {
    pub fn new() -> Export {
        Export {
            text: "; Autogenerated export file - do not modify!\n\n".to_owned(),
        }
    }

    pub fn put(&mut self, sym: &Symbol) {
        writeln!(self.text, "{}\tequ\t${:X}", sym.name, sym.value).unwrap();
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn listing_row_format() {
        let mut listing = Listing::new();
        listing.put_line(' ', 0x0200, &[0xA9, 0x05], true, "\tLDA #$05");
        assert_eq!(listing.into_text(), "   0200   a9 05         \tLDA #$05\n");
    }

    #[test]
    fn listing_wraps_long_emissions() {
        let mut listing = Listing::new();
        listing.put_line(' ', 0x0000, &[1, 2, 3, 4, 5], true, "\tDB 1,2,3,4,5");
        let text = listing.into_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("   0000   01 02 03 04"));
        assert!(lines[1].starts_with("   0004   05"));
    }

    #[test]
    fn listing_without_hex_blanks_the_columns() {
        let mut listing = Listing::new();
        listing.put_line('I', 0x0000, &[], false, "\tENDI");
        assert_eq!(listing.into_text(), format!("I  {}   \tENDI\n", " ".repeat(18)));
    }

    #[test]
    fn export_format() {
        let mut export = Export::new();
        export.put(&Symbol {
            name: "VRAM".to_owned(),
            value: 0x2400,
            forward: false,
            soft: false,
        });
        assert_eq!(
            export.into_text(),
            "; Autogenerated export file - do not modify!\n\nVRAM\tequ\t$2400\n"
        );
    }
}

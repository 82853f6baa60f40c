//! Line assembly and the two-pass driver. The first pass walks the source
//! building the symbol table; the second re-walks it with every label
//! known, verifies that addresses have not moved, and feeds the sinks.
//! All of the per-run state lives in one `Assembler` value.

use crate::encode;
use crate::error::{Diagnostic, ErrorCode, FatalError};
use crate::expr::{eval, EvalCtx};
use crate::instructions::{self, Family, OpEntry, OpKind, Pseudo, BIGINST, NOP};
use crate::int_util::{high, low};
use crate::operand::{process_operand, Operand};
use crate::output::{BinarySink, Export, Listing};
use crate::parser::{classify_error, AsmParser, Rule};
use crate::symbols::SymbolTable;
use crate::{Output, Pass};
use byteorder::{ByteOrder, LittleEndian};
use pest::Parser;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Depth of the include-file stack, the top-level source included.
const FILES: usize = 8;

/// Depth of the conditional-assembly stack. Slot 0 is permanently ON.
const IFDEPTH: usize = 16;

const ON: i8 = 1;
const OFF: i8 = -1;

enum SourceSpec {
    Text(String),
    File(PathBuf),
}

enum FrameKind {
    Text(std::vec::IntoIter<String>),
    File(BufReader<File>),
}

/// One entry of the include stack.
struct Frame {
    name: String,
    kind: FrameKind,
    line_num: u32,
}

impl Frame {
    fn next_line(&mut self) -> Option<String> {
        let line = match &mut self.kind {
            FrameKind::Text(lines) => lines.next()?,
            FrameKind::File(reader) => {
                let mut buf = String::new();
                match reader.read_line(&mut buf) {
                    Ok(0) | Err(_) => return None,
                    Ok(_) => buf,
                }
            }
        };
        self.line_num += 1;
        Some(line.trim_end_matches(&['\n', '\r'][..]).to_owned())
    }
}

/// The statement field of a line after the mnemonic scan.
enum Stmt {
    None,
    Bad(ErrorCode),
    Op(&'static OpEntry),
}

pub struct Assembler {
    source: SourceSpec,
    source_name: String,
    /// Console mode: echo diagnostics to stderr and MSG output to stdout.
    report: bool,

    symbols: SymbolTable,
    pass: Pass,
    pc: u16,
    address: u16,
    obj: Vec<u8>,
    line: String,
    listhex: bool,
    forward: bool,
    force_abs: bool,
    errcode: Option<ErrorCode>,
    errors: u32,
    done: bool,
    if_stack: Vec<i8>,
    off: bool,
    frames: Vec<Frame>,

    binary: BinarySink,
    listing: Listing,
    export: Export,
    messages: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

fn is_alph(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '.'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Prepares a raw line for field scanning: tabs become blanks, other
/// control characters are dropped, and a `;` outside string and character
/// literals ends the line.
fn strip_line(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if !in_string && c == ';' {
            break;
        }
        let mapped = if c == '\t' { ' ' } else { c };
        if mapped.is_control() {
            continue;
        }
        out.push(mapped);
        if c == '"' {
            in_string = !in_string;
        } else if !in_string && c == '\'' {
            if let Some(&quoted) = chars.peek() {
                chars.next();
                let quoted = if quoted == '\t' { ' ' } else { quoted };
                if !quoted.is_control() {
                    out.push(quoted);
                }
            }
        }
    }
    out
}

impl Assembler {
    pub fn from_source(source: &str) -> Assembler {
        Assembler::new(SourceSpec::Text(source.to_owned()), "<input>".to_owned())
    }

    pub fn from_file(path: &Path) -> Assembler {
        Assembler::new(
            SourceSpec::File(path.to_owned()),
            path.display().to_string(),
        )
    }

    fn new(source: SourceSpec, source_name: String) -> Assembler {
        Assembler {
            source,
            source_name,
            report: false,
            symbols: SymbolTable::new(),
            pass: Pass::First,
            pc: 0,
            address: 0,
            obj: Vec::new(),
            line: String::new(),
            listhex: false,
            forward: false,
            force_abs: false,
            errcode: None,
            errors: 0,
            done: false,
            if_stack: vec![ON],
            off: false,
            frames: Vec::new(),
            binary: BinarySink::new(),
            listing: Listing::new(),
            export: Export::new(),
            messages: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn report_to_console(mut self, enable: bool) -> Assembler {
        self.report = enable;
        self
    }

    /// Runs both passes and collects the sinks.
    pub fn run(mut self) -> Result<Output, FatalError> {
        self.pass = Pass::First;
        self.run_pass()?;
        self.pass = Pass::Second;
        self.run_pass()?;
        self.listing.close(&self.symbols);
        Ok(Output {
            binary: self.binary.into_bytes(),
            listing: self.listing.into_text(),
            export: self.export.into_text(),
            messages: self.messages,
            diagnostics: self.diagnostics,
            errors: self.errors,
        })
    }

    fn run_pass(&mut self) -> Result<(), FatalError> {
        self.pc = 0;
        self.errors = 0;
        self.done = false;
        self.off = false;
        self.if_stack = vec![ON];
        self.symbols.reset_scope();
        self.binary = BinarySink::new();
        self.listing = Listing::new();
        let root = self.open_root()?;
        self.frames = vec![root];

        while !self.done {
            self.errcode = None;
            match self.next_line() {
                Some(text) => {
                    self.line = text;
                    self.asm_line()?;
                }
                None => {
                    // Source ran out without END.
                    self.error(ErrorCode::Statement);
                    self.line = "\tEND".to_owned();
                    self.address = self.pc;
                    self.obj.clear();
                    self.listhex = false;
                    self.done = true;
                    self.listing.force_eject();
                }
            }
            self.pc = self.pc.wrapping_add(self.obj.len() as u16);
            if self.pass == Pass::Second {
                let code = self.errcode.map(ErrorCode::letter).unwrap_or(' ');
                self.listing
                    .put_line(code, self.address, &self.obj, self.listhex, &self.line);
                for &byte in &self.obj {
                    self.binary.push(byte);
                }
            }
        }
        Ok(())
    }

    fn open_root(&self) -> Result<Frame, FatalError> {
        let kind = match &self.source {
            SourceSpec::Text(text) => FrameKind::Text(
                text.lines()
                    .map(String::from)
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            SourceSpec::File(path) => {
                let file =
                    File::open(path).map_err(|_| FatalError::SourceOpen(path.clone()))?;
                FrameKind::File(BufReader::new(file))
            }
        };
        Ok(Frame {
            name: self.source_name.clone(),
            kind,
            line_num: 0,
        })
    }

    fn next_line(&mut self) -> Option<String> {
        loop {
            let frame = self.frames.last_mut().unwrap();
            if let Some(line) = frame.next_line() {
                return Some(line);
            }
            if self.frames.len() > 1 {
                self.frames.pop();
            } else {
                return None;
            }
        }
    }

    /// Records the first error on the current line. During pass 2 the
    /// error also goes to the diagnostic stream.
    fn error(&mut self, code: ErrorCode) {
        if self.errcode.is_some() {
            return;
        }
        self.errcode = Some(code);
        self.errors += 1;
        if self.pass == Pass::Second {
            let frame = self.frames.last();
            let diag = Diagnostic {
                file: frame.map(|f| f.name.clone()).unwrap_or_default(),
                line: frame.map(|f| f.line_num).unwrap_or(0),
                code,
            };
            if self.report {
                eprintln!("{}", diag);
            }
            self.diagnostics.push(diag);
        }
    }

    /// Runs an evaluation against the symbol table, then folds the
    /// flags and any error back into the line state.
    fn with_ctx<T>(&mut self, f: impl FnOnce(&mut EvalCtx) -> T) -> T {
        let mut ctx = EvalCtx::new(&self.symbols, self.pass);
        let out = f(&mut ctx);
        let EvalCtx {
            forward,
            force_abs,
            error,
            ..
        } = ctx;
        self.forward |= forward;
        self.force_abs |= force_abs;
        if let Some(code) = error {
            self.error(code);
        }
        out
    }

    fn check_trailing(&mut self, input: &str, end: usize) {
        if !input[end..].trim().is_empty() {
            self.error(ErrorCode::TooManyArgs);
        }
    }

    /// Parses and evaluates a single-expression argument field.
    fn eval_args(&mut self, args: &str) -> u16 {
        if args.is_empty() {
            self.error(ErrorCode::Expression);
            return 0;
        }
        match AsmParser::parse(Rule::expr, args) {
            Err(err) => {
                let code = classify_error(&err, ErrorCode::Expression);
                self.error(code);
                0
            }
            Ok(mut pairs) => {
                let pair = pairs.next().unwrap();
                self.check_trailing(args, pair.as_span().end());
                self.with_ctx(|ctx| eval(pair, ctx))
            }
        }
    }

    /// Strips the quotes from a string literal, flagging a missing
    /// terminator.
    fn unquote(&mut self, text: &str) -> String {
        let inner = &text[1..];
        match inner.strip_suffix('"') {
            Some(stripped) => stripped.to_owned(),
            None => {
                self.error(ErrorCode::Quote);
                inner.to_owned()
            }
        }
    }

    /// Assembles one source line.
    fn asm_line(&mut self) -> Result<(), FatalError> {
        self.address = self.pc;
        self.obj.clear();
        self.listhex = false;
        self.forward = false;
        self.force_abs = false;

        let work = strip_line(&self.line);
        let mut rest = work.as_str();

        // Label field: anything starting in column 0.
        let mut label: Option<String> = None;
        let mut label_err: Option<ErrorCode> = None;
        match rest.chars().next() {
            Some(first) if first != ' ' => {
                if is_alph(first) {
                    let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
                    let name = &rest[..end];
                    rest = &rest[end..];
                    if let Some(tail) = rest.strip_prefix(':') {
                        rest = tail;
                    }
                    if instructions::find_operator(name) {
                        label_err = Some(ErrorCode::Label);
                    } else {
                        label = Some(name.to_owned());
                    }
                } else {
                    label_err = Some(ErrorCode::Label);
                    let end = rest.find(' ').unwrap_or(rest.len());
                    rest = &rest[end..];
                }
            }
            _ => {}
        }

        // Mnemonic field.
        rest = rest.trim_start();
        let mut args = "";
        let stmt = if rest.is_empty() {
            Stmt::None
        } else if !is_alph(rest.chars().next().unwrap()) {
            Stmt::Bad(ErrorCode::Syntax)
        } else {
            let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
            let name = &rest[..end];
            args = rest[end..].trim();
            match instructions::find_code(name) {
                Some(entry) => Stmt::Op(entry),
                None => Stmt::Bad(ErrorCode::Opcode),
            }
        };

        // Conditional directives run even while a false IF suppresses the
        // surrounding lines; everything else in a suppressed region is
        // read and dropped without being assembled or flagged.
        let conditional = matches!(
            &stmt,
            Stmt::Op(OpEntry {
                kind: OpKind::Pseudo(p),
                ..
            }) if p.is_conditional()
        );
        if conditional {
            if label.is_some() || label_err.is_some() {
                self.error(ErrorCode::Label);
            }
        } else if self.off {
            return Ok(());
        } else if let Some(code) = label_err {
            self.error(code);
        }

        match stmt {
            Stmt::None => self.do_label(&label),
            Stmt::Bad(code) => {
                self.error(code);
                self.listhex = true;
                self.obj = vec![NOP; BIGINST];
                self.do_label(&label);
            }
            Stmt::Op(entry) => {
                self.listhex = true;
                match entry.kind {
                    OpKind::Machine { family, base } => self.normal_op(family, base, &label, args),
                    OpKind::Pseudo(pseudo) => self.pseudo_op(pseudo, &label, args)?,
                }
            }
        }
        Ok(())
    }

    /// Defines the line's label at the current location counter. Pass 1
    /// inserts; pass 2 clears the forward mark and verifies the address.
    fn do_label(&mut self, label: &Option<String>) {
        let name = match label {
            Some(name) => name,
            None => return,
        };
        self.listhex = true;
        let qualified = self.symbols.qualify(name);
        if !name.starts_with('.') {
            self.symbols.set_scope(name);
        }
        let pc = self.pc;
        match self.pass {
            Pass::First => {
                let (created, sym) = self.symbols.enter(&qualified);
                if created {
                    sym.value = pc;
                    sym.forward = true;
                }
            }
            Pass::Second => {
                let found = match self.symbols.lookup_mut(&qualified) {
                    Some(sym) => {
                        sym.forward = false;
                        Some(sym.value == pc)
                    }
                    None => None,
                };
                match found {
                    Some(true) => {}
                    Some(false) => self.error(ErrorCode::MultiplyDefined),
                    None => self.error(ErrorCode::Phase),
                }
            }
        }
    }

    /// Encodes a machine instruction. A line that fails to encode keeps a
    /// NOP-filled buffer of maximum length so the location counter moves
    /// identically in both passes.
    fn normal_op(&mut self, family: Family, base: u8, label: &Option<String>, args: &str) {
        self.do_label(label);
        let pc = self.pc;
        let parsed = if args.is_empty() {
            Ok(None)
        } else {
            match AsmParser::parse(Rule::operand, args) {
                Ok(mut pairs) => Ok(Some(pairs.next().unwrap())),
                Err(err) => Err(classify_error(&err, ErrorCode::AddrMode)),
            }
        };
        let encoding = match parsed {
            Err(code) => {
                self.error(code);
                None
            }
            Ok(pair) => {
                if let Some(pair) = &pair {
                    self.check_trailing(args, pair.as_span().end());
                }
                self.with_ctx(|ctx| {
                    let operand = match pair {
                        Some(pair) => process_operand(pair, ctx),
                        None => Operand::None,
                    };
                    encode::encode(family, base, &operand, pc, ctx)
                })
            }
        };
        match encoding {
            Some(enc) => {
                self.obj.push(enc.opcode);
                if enc.bytes > 1 {
                    self.obj.push(low(enc.operand));
                }
                if enc.bytes > 2 {
                    self.obj.push(high(enc.operand));
                }
            }
            None => self.obj = vec![NOP; BIGINST],
        }
    }

    fn pseudo_op(
        &mut self,
        pseudo: Pseudo,
        label: &Option<String>,
        args: &str,
    ) -> Result<(), FatalError> {
        match pseudo {
            Pseudo::Db => {
                self.do_label(label);
                self.data_bytes(args);
            }

            Pseudo::Ds => {
                self.do_label(label);
                if !args.is_empty() {
                    self.data_strings(args);
                }
            }

            Pseudo::Dw => {
                self.do_label(label);
                self.data_words(args);
            }

            Pseudo::Msg => {
                self.do_label(label);
                if self.pass == Pass::Second {
                    self.message(args);
                }
            }

            Pseudo::Equ => self.define_symbol(label, args, false),
            Pseudo::Set => self.define_symbol(label, args, true),

            Pseudo::If => {
                if self.if_stack.len() == IFDEPTH {
                    return Err(FatalError::IfOverflow);
                }
                let mut value = self.eval_args(args);
                if self.forward {
                    self.error(ErrorCode::Phase);
                    value = 1;
                }
                self.address = value;
                if self.off {
                    self.listhex = false;
                    self.if_stack.push(0);
                } else {
                    self.if_stack.push(if value != 0 { ON } else { OFF });
                    if value == 0 {
                        self.off = true;
                    }
                }
            }

            Pseudo::Else => {
                self.listhex = false;
                if self.if_stack.len() > 1 {
                    let top = self.if_stack.last_mut().unwrap();
                    *top = -*top;
                    self.off = *top != ON;
                } else {
                    self.error(ErrorCode::IfNesting);
                }
            }

            Pseudo::Endi => {
                self.listhex = false;
                if self.if_stack.len() > 1 {
                    self.if_stack.pop();
                    self.off = *self.if_stack.last().unwrap() != ON;
                } else {
                    self.error(ErrorCode::IfNesting);
                }
            }

            Pseudo::End => {
                self.do_label(label);
                if self.frames.len() > 1 {
                    self.listhex = false;
                    self.error(ErrorCode::Statement);
                } else {
                    self.done = true;
                    self.listing.force_eject();
                    if self.if_stack.len() > 1 {
                        self.error(ErrorCode::IfNesting);
                    }
                }
            }

            Pseudo::Org => {
                let value = self.eval_args(args);
                if self.forward {
                    self.error(ErrorCode::Phase);
                } else {
                    if self.pass == Pass::Second {
                        self.binary.pad(value.wrapping_sub(self.pc));
                    }
                    self.pc = value;
                    self.address = value;
                }
                self.do_label(label);
            }

            Pseudo::Base => {
                let value = self.eval_args(args);
                if self.forward {
                    self.error(ErrorCode::Phase);
                } else {
                    self.pc = value;
                    self.address = value;
                }
                self.do_label(label);
            }

            Pseudo::Align => {
                let value = self.eval_args(args);
                if self.forward {
                    self.error(ErrorCode::Phase);
                } else if value == 0 {
                    self.error(ErrorCode::Value);
                } else {
                    let rem = self.pc % value;
                    let count = if rem != 0 { value - rem } else { 0 };
                    if self.pass == Pass::Second {
                        self.binary.pad(count);
                    }
                    self.pc = self.pc.wrapping_add(count);
                    self.address = self.pc;
                }
                self.do_label(label);
            }

            Pseudo::Rmb => {
                self.do_label(label);
                let value = self.eval_args(args);
                if self.forward {
                    self.error(ErrorCode::Phase);
                } else {
                    if self.pass == Pass::Second {
                        self.binary.pad(value);
                    }
                    self.pc = self.pc.wrapping_add(value);
                }
            }

            Pseudo::Page => {
                self.listhex = false;
                self.do_label(label);
                if !args.is_empty() {
                    let mut value = self.eval_args(args);
                    if value > 0 && value < 3 {
                        self.error(ErrorCode::Value);
                        value = 0;
                    }
                    self.listing.set_page_len(value);
                }
                self.listing.force_eject();
            }

            Pseudo::Titl => {
                self.listhex = false;
                self.do_label(label);
                if args.is_empty() {
                    self.listing.set_title("");
                } else {
                    match AsmParser::parse(Rule::string, args) {
                        Err(_) => self.error(ErrorCode::Syntax),
                        Ok(mut pairs) => {
                            let pair = pairs.next().unwrap();
                            self.check_trailing(args, pair.as_span().end());
                            let title = self.unquote(pair.as_str());
                            self.listing.set_title(&title);
                        }
                    }
                }
            }

            Pseudo::Exp => {
                self.do_label(label);
                if self.pass == Pass::Second && !args.is_empty() {
                    match AsmParser::parse(Rule::identifier, args) {
                        Err(_) => self.error(ErrorCode::Syntax),
                        Ok(mut pairs) => {
                            let pair = pairs.next().unwrap();
                            self.check_trailing(args, pair.as_span().end());
                            let qualified = self.symbols.qualify(pair.as_str());
                            match self.symbols.lookup(&qualified) {
                                Some(sym) => self.export.put(sym),
                                None => self.error(ErrorCode::Value),
                            }
                        }
                    }
                }
            }

            Pseudo::Incl => {
                self.listhex = false;
                self.do_label(label);
                match AsmParser::parse(Rule::string, args) {
                    Err(_) => self.error(ErrorCode::Syntax),
                    Ok(mut pairs) => {
                        let pair = pairs.next().unwrap();
                        self.check_trailing(args, pair.as_span().end());
                        let path = self.unquote(pair.as_str());
                        if self.frames.len() == FILES {
                            return Err(FatalError::IncludeOverflow);
                        }
                        match File::open(&path) {
                            Err(_) => self.error(ErrorCode::Value),
                            Ok(file) => self.frames.push(Frame {
                                name: path,
                                kind: FrameKind::File(BufReader::new(file)),
                                line_num: 0,
                            }),
                        }
                    }
                }
            }

            Pseudo::Incb => {
                self.do_label(label);
                match AsmParser::parse(Rule::string, args) {
                    Err(_) => self.error(ErrorCode::Syntax),
                    Ok(mut pairs) => {
                        let pair = pairs.next().unwrap();
                        self.check_trailing(args, pair.as_span().end());
                        let path = self.unquote(pair.as_str());
                        let mut bytes = Vec::new();
                        match File::open(&path).and_then(|mut f| f.read_to_end(&mut bytes)) {
                            Err(_) => self.error(ErrorCode::Value),
                            Ok(_) => self.obj.extend(bytes),
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// EQU and SET. EQU symbols are frozen after their first definition;
    /// SET symbols stay soft and take a new value each time.
    fn define_symbol(&mut self, label: &Option<String>, args: &str, soft: bool) {
        let name = match label {
            Some(name) => name,
            None => {
                self.error(ErrorCode::Label);
                return;
            }
        };
        let value = self.eval_args(args);
        self.address = value;
        let forward = self.forward;
        let qualified = self.symbols.qualify(name);
        if !name.starts_with('.') {
            self.symbols.set_scope(name);
        }
        match self.pass {
            Pass::First => {
                let (created, sym) = self.symbols.enter(&qualified);
                if created || (soft && sym.soft) {
                    sym.forward = true;
                    sym.soft = soft;
                    if !forward {
                        sym.value = value;
                    }
                }
            }
            Pass::Second => {
                enum Outcome {
                    Ok,
                    Mismatch,
                    NotSoft,
                    Missing,
                }
                let outcome = match self.symbols.lookup_mut(&qualified) {
                    None => Outcome::Missing,
                    Some(sym) => {
                        if soft {
                            if sym.soft {
                                sym.forward = false;
                                sym.value = value;
                                Outcome::Ok
                            } else {
                                Outcome::NotSoft
                            }
                        } else {
                            sym.forward = false;
                            if sym.value == value {
                                Outcome::Ok
                            } else {
                                Outcome::Mismatch
                            }
                        }
                    }
                };
                if forward {
                    self.error(ErrorCode::Phase);
                }
                match outcome {
                    Outcome::Ok => {}
                    Outcome::Mismatch | Outcome::NotSoft => {
                        self.error(ErrorCode::MultiplyDefined)
                    }
                    Outcome::Missing => self.error(ErrorCode::Phase),
                }
            }
        }
    }

    fn data_bytes(&mut self, args: &str) {
        if args.is_empty() {
            self.error(ErrorCode::Expression);
            return;
        }
        match AsmParser::parse(Rule::data_list, args) {
            Err(err) => {
                let code = classify_error(&err, ErrorCode::Syntax);
                self.error(code);
            }
            Ok(mut pairs) => {
                let list = pairs.next().unwrap();
                self.check_trailing(args, list.as_span().end());
                for item in list.into_inner() {
                    let inner = item.into_inner().next().unwrap();
                    match inner.as_rule() {
                        Rule::string => {
                            let text = self.unquote(inner.as_str());
                            self.obj.extend(text.bytes());
                        }
                        Rule::expr => {
                            let mut value = self.with_ctx(|ctx| eval(inner, ctx));
                            if value > 0x00FF && value < 0xFF80 {
                                self.error(ErrorCode::Value);
                                value = 0;
                            }
                            self.obj.push(low(value));
                        }
                        _ => unreachable!(),
                    }
                }
            }
        }
    }

    fn data_strings(&mut self, args: &str) {
        match AsmParser::parse(Rule::data_list, args) {
            Err(err) => {
                let code = classify_error(&err, ErrorCode::Syntax);
                self.error(code);
            }
            Ok(mut pairs) => {
                let list = pairs.next().unwrap();
                self.check_trailing(args, list.as_span().end());
                for item in list.into_inner() {
                    let inner = item.into_inner().next().unwrap();
                    match inner.as_rule() {
                        Rule::string => {
                            let text = self.unquote(inner.as_str());
                            self.obj.extend(text.bytes());
                        }
                        _ => self.error(ErrorCode::Syntax),
                    }
                }
            }
        }
    }

    fn data_words(&mut self, args: &str) {
        if args.is_empty() {
            self.error(ErrorCode::Expression);
            return;
        }
        match AsmParser::parse(Rule::word_list, args) {
            Err(err) => {
                let code = classify_error(&err, ErrorCode::Expression);
                self.error(code);
            }
            Ok(mut pairs) => {
                let list = pairs.next().unwrap();
                self.check_trailing(args, list.as_span().end());
                for slot in list.into_inner() {
                    let value = match slot.into_inner().next() {
                        Some(expr_pair) => self.with_ctx(|ctx| eval(expr_pair, ctx)),
                        None => 0,
                    };
                    let mut word = [0u8; 2];
                    LittleEndian::write_u16(&mut word, value);
                    self.obj.extend(&word);
                }
            }
        }
    }

    fn message(&mut self, args: &str) {
        if args.is_empty() {
            self.error(ErrorCode::Expression);
            return;
        }
        match AsmParser::parse(Rule::data_list, args) {
            Err(err) => {
                let code = classify_error(&err, ErrorCode::Syntax);
                self.error(code);
            }
            Ok(mut pairs) => {
                let list = pairs.next().unwrap();
                self.check_trailing(args, list.as_span().end());
                let mut out = String::new();
                for item in list.into_inner() {
                    let inner = item.into_inner().next().unwrap();
                    match inner.as_rule() {
                        Rule::string => {
                            let text = self.unquote(inner.as_str());
                            out.push_str(&text);
                        }
                        Rule::expr => {
                            let value = self.with_ctx(|ctx| eval(inner, ctx));
                            out.push_str(&value.to_string());
                        }
                        _ => unreachable!(),
                    }
                }
                if self.report {
                    println!("{}", out);
                }
                self.messages.push(out);
            }
        }
    }
}

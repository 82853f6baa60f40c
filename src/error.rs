use std::fmt;
use std::io;
use std::path::PathBuf;

/// Single-letter code recorded on a source line. Only the first code per
/// line survives; assembly continues after any of these.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    Statement,
    Paren,
    Quote,
    AddrMode,
    Branch,
    Digit,
    Expression,
    IfNesting,
    Label,
    MultiplyDefined,
    Opcode,
    Phase,
    Register,
    Syntax,
    TooManyArgs,
    Undefined,
    Value,
}

impl ErrorCode {
    pub fn letter(self) -> char {
        match self {
            ErrorCode::Statement => '*',
            ErrorCode::Paren => '(',
            ErrorCode::Quote => '"',
            ErrorCode::AddrMode => 'A',
            ErrorCode::Branch => 'B',
            ErrorCode::Digit => 'D',
            ErrorCode::Expression => 'E',
            ErrorCode::IfNesting => 'I',
            ErrorCode::Label => 'L',
            ErrorCode::MultiplyDefined => 'M',
            ErrorCode::Opcode => 'O',
            ErrorCode::Phase => 'P',
            ErrorCode::Register => 'R',
            ErrorCode::Syntax => 'S',
            ErrorCode::TooManyArgs => 'T',
            ErrorCode::Undefined => 'U',
            ErrorCode::Value => 'V',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::Statement => "illegal or missing statement",
            ErrorCode::Paren => "parenthesis imbalance",
            ErrorCode::Quote => "unterminated string",
            ErrorCode::AddrMode => "illegal addressing mode",
            ErrorCode::Branch => "branch target out of range",
            ErrorCode::Digit => "illegal digit",
            ErrorCode::Expression => "illegal expression",
            ErrorCode::IfNesting => "IF/ENDI imbalance",
            ErrorCode::Label => "illegal label",
            ErrorCode::MultiplyDefined => "multiply defined symbol",
            ErrorCode::Opcode => "illegal opcode",
            ErrorCode::Phase => "phasing error",
            ErrorCode::Register => "illegal register usage",
            ErrorCode::Syntax => "syntax error",
            ErrorCode::TooManyArgs => "too many arguments",
            ErrorCode::Undefined => "undefined symbol",
            ErrorCode::Value => "illegal value",
        }
    }
}

/// One recoverable error as reported on stderr during pass 2.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub code: ErrorCode,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} -- {}",
            self.file,
            self.line,
            self.code.letter(),
            self.code.description()
        )
    }
}

/// Conditions that terminate the assembler immediately.
#[derive(Debug)]
pub enum FatalError {
    SourceOpen(PathBuf),
    OutputOpen(PathBuf),
    ListingOpen(PathBuf),
    ExportOpen(PathBuf),
    IncludeOverflow,
    IfOverflow,
    Write(io::Error),
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::SourceOpen(path) => {
                write!(f, "cannot open source file \"{}\"", path.display())
            }
            FatalError::OutputOpen(path) => {
                write!(f, "cannot open object file \"{}\"", path.display())
            }
            FatalError::ListingOpen(path) => {
                write!(f, "cannot open listing file \"{}\"", path.display())
            }
            FatalError::ExportOpen(path) => {
                write!(f, "cannot open export file \"{}\"", path.display())
            }
            FatalError::IncludeOverflow => write!(f, "include file stack overflow"),
            FatalError::IfOverflow => write!(f, "IF stack overflow"),
            FatalError::Write(err) => write!(f, "disk or device full: {}", err),
        }
    }
}

impl From<io::Error> for FatalError {
    fn from(err: io::Error) -> FatalError {
        FatalError::Write(err)
    }
}

//! Opcode and operator tables. Both are static, sorted case-insensitively
//! and searched with the standard binary search, matching the immutable
//! table-driven lookup of the instruction set.

/// Longest machine instruction in bytes.
pub const BIGINST: usize = 3;

/// Filler byte for lines that fail to assemble.
pub const NOP: u8 = 0xEA;

/// Encoding family of a machine mnemonic. The family selects how the mode
/// bits adjust the base opcode and how many bytes are emitted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Family {
    /// ADC AND CMP EOR LDA ORA SBC STA: the full eight-mode matrix.
    TwoOp,
    /// LDX LDY: immediate or memory, with the opposite index register.
    Ldxy,
    /// STX STY: memory only, indexed forms restricted to the zero page.
    Stxy,
    /// CPX CPY: immediate or zero-page/absolute.
    Cpxy,
    /// ASL LSR ROL ROR: shift/rotate memory forms plus the accumulator.
    LogOp,
    /// INC DEC: zero-page/absolute, optionally X-indexed.
    IncOp,
    /// Implied/inherent, single byte.
    InhOp,
    /// JMP, including the `(addr)` indirect special case.
    Jump,
    /// JSR: absolute only.
    Call,
    /// Conditional branches: relative, signed 8-bit displacement.
    RelBr,
    /// BIT: zero-page/absolute, no immediate.
    BitOp,
}

/// Directives consumed by the assembler rather than encoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pseudo {
    Align,
    Base,
    Db,
    Ds,
    Dw,
    Else,
    End,
    Endi,
    Equ,
    Exp,
    If,
    Incb,
    Incl,
    Msg,
    Org,
    Page,
    Rmb,
    Set,
    Titl,
}

impl Pseudo {
    /// IF/ELSE/ENDI are processed even inside a suppressed conditional
    /// region and refuse a label field.
    pub fn is_conditional(self) -> bool {
        matches!(self, Pseudo::If | Pseudo::Else | Pseudo::Endi)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpKind {
    Machine { family: Family, base: u8 },
    Pseudo(Pseudo),
}

pub struct OpEntry {
    pub name: &'static str,
    pub kind: OpKind,
}

macro_rules! machine {
    ($name:expr, $family:ident, $base:expr) => {
        OpEntry {
            name: $name,
            kind: OpKind::Machine {
                family: Family::$family,
                base: $base,
            },
        }
    };
}

macro_rules! pseudo {
    ($name:expr, $which:ident) => {
        OpEntry {
            name: $name,
            kind: OpKind::Pseudo(Pseudo::$which),
        }
    };
}

/// Machine mnemonics and pseudo-ops, sorted by name. Machine base values
/// are the zero-page (or canonical) encodings the family rules adjust.
static OPCODES: &[OpEntry] = &[
    machine!("ADC", TwoOp, 0x61),
    pseudo!("ALIGN", Align),
    machine!("AND", TwoOp, 0x21),
    machine!("ASL", LogOp, 0x06),
    machine!("ASLA", InhOp, 0x0A),
    pseudo!("BASE", Base),
    machine!("BCC", RelBr, 0x90),
    machine!("BCS", RelBr, 0xB0),
    machine!("BEQ", RelBr, 0xF0),
    machine!("BIT", BitOp, 0x24),
    machine!("BMI", RelBr, 0x30),
    machine!("BNE", RelBr, 0xD0),
    machine!("BPL", RelBr, 0x10),
    machine!("BRK", InhOp, 0x00),
    machine!("BVC", RelBr, 0x50),
    machine!("BVS", RelBr, 0x70),
    machine!("CLC", InhOp, 0x18),
    machine!("CLD", InhOp, 0xD8),
    machine!("CLI", InhOp, 0x58),
    machine!("CLV", InhOp, 0xB8),
    machine!("CMP", TwoOp, 0xC1),
    machine!("CPX", Cpxy, 0xE0),
    machine!("CPY", Cpxy, 0xC0),
    pseudo!("DB", Db),
    machine!("DEC", IncOp, 0xC6),
    machine!("DEX", InhOp, 0xCA),
    machine!("DEY", InhOp, 0x88),
    pseudo!("DS", Ds),
    pseudo!("DW", Dw),
    pseudo!("ELSE", Else),
    pseudo!("END", End),
    pseudo!("ENDI", Endi),
    machine!("EOR", TwoOp, 0x41),
    pseudo!("EQU", Equ),
    pseudo!("EXP", Exp),
    pseudo!("IF", If),
    machine!("INC", IncOp, 0xE6),
    pseudo!("INCB", Incb),
    pseudo!("INCL", Incl),
    machine!("INX", InhOp, 0xE8),
    machine!("INY", InhOp, 0xC8),
    machine!("JMP", Jump, 0x4C),
    machine!("JSR", Call, 0x20),
    machine!("LDA", TwoOp, 0xA1),
    machine!("LDX", Ldxy, 0xA2),
    machine!("LDY", Ldxy, 0xA0),
    machine!("LSR", LogOp, 0x46),
    machine!("LSRA", InhOp, 0x4A),
    pseudo!("MSG", Msg),
    machine!("NOP", InhOp, 0xEA),
    machine!("ORA", TwoOp, 0x01),
    pseudo!("ORG", Org),
    pseudo!("PAGE", Page),
    machine!("PHA", InhOp, 0x48),
    machine!("PHP", InhOp, 0x08),
    machine!("PLA", InhOp, 0x68),
    machine!("PLP", InhOp, 0x28),
    pseudo!("RMB", Rmb),
    machine!("ROL", LogOp, 0x26),
    machine!("ROLA", InhOp, 0x2A),
    machine!("ROR", LogOp, 0x66),
    machine!("RORA", InhOp, 0x6A),
    machine!("RTI", InhOp, 0x40),
    machine!("RTS", InhOp, 0x60),
    machine!("SBC", TwoOp, 0xE1),
    machine!("SEC", InhOp, 0x38),
    machine!("SED", InhOp, 0xF8),
    machine!("SEI", InhOp, 0x78),
    pseudo!("SET", Set),
    machine!("STA", TwoOp, 0x81),
    machine!("STX", Stxy, 0x86),
    machine!("STY", Stxy, 0x84),
    machine!("TAX", InhOp, 0xAA),
    machine!("TAY", InhOp, 0xA8),
    pseudo!("TITL", Titl),
    machine!("TSX", InhOp, 0xBA),
    machine!("TXA", InhOp, 0x8A),
    machine!("TXS", InhOp, 0x9A),
    machine!("TYA", InhOp, 0x98),
];

/// Word-named operators. A label may not take one of these names; the
/// grammar never parses them as symbols either. The registers A, X and Y
/// are legal symbol names and only act as registers by position.
static OPERATORS: &[&str] = &[
    "AND", "EQ", "GE", "GT", "HIGH", "LE", "LOW", "LT", "MOD", "NE", "NOT", "OR", "SHL", "SHR",
    "XOR",
];

pub fn find_code(name: &str) -> Option<&'static OpEntry> {
    let upper = name.to_ascii_uppercase();
    OPCODES
        .binary_search_by(|entry| entry.name.cmp(upper.as_str()))
        .ok()
        .map(|i| &OPCODES[i])
}

pub fn find_operator(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    OPERATORS.binary_search(&upper.as_str()).is_ok()
}

pub fn is_register(name: &str) -> bool {
    name.eq_ignore_ascii_case("A") || name.eq_ignore_ascii_case("X") || name.eq_ignore_ascii_case("Y")
}

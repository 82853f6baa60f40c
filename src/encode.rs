//! Machine-instruction encoding. Each family adjusts its base opcode from
//! the mode the operand decoder produced and decides how many bytes the
//! line emits. `None` means the line failed to encode; the caller keeps
//! its NOP-filled buffer so both passes stay in phase.

use crate::error::ErrorCode;
use crate::expr::EvalCtx;
use crate::instructions::Family;
use crate::operand::{Index, Operand};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Encoding {
    pub opcode: u8,
    pub operand: u16,
    pub bytes: usize,
}

fn enc(opcode: u8, operand: u16, bytes: usize) -> Option<Encoding> {
    Some(Encoding {
        opcode,
        operand,
        bytes,
    })
}

/// Immediate operands must fit a signed or unsigned byte.
fn check_immediate(value: u16, ctx: &mut EvalCtx) -> u16 {
    if value > 0x00FF && value < 0xFF80 {
        ctx.error(ErrorCode::Value);
        0
    } else {
        value
    }
}

/// Universal zero-page selection: a value known at encoding time to fit
/// the zero page uses the 2-byte form, anything else widens to absolute.
fn zero_page(opcode: u8, addr: u16, ctx: &EvalCtx) -> (u8, usize) {
    if !ctx.force_abs && !ctx.forward && addr <= 0x00FF {
        (opcode, 2)
    } else {
        (opcode + 0x08, 3)
    }
}

fn zero_page_only(addr: u16, ctx: &mut EvalCtx) -> u16 {
    if addr > 0x00FF {
        ctx.error(ErrorCode::Value);
        0
    } else {
        addr
    }
}

fn addr_error(ctx: &mut EvalCtx) -> Option<Encoding> {
    ctx.error(ErrorCode::AddrMode);
    None
}

/// Zero-page/absolute memory operand, optionally X-indexed. INC and DEC
/// use this directly; the shift/rotate family falls through to it for its
/// memory forms.
fn inc_op(base: u8, operand: &Operand, ctx: &mut EvalCtx) -> Option<Encoding> {
    match *operand {
        Operand::Direct { addr, index } if index.is_none() || index == Some(Index::X) => {
            let opcode = base + if index.is_some() { 0x10 } else { 0 };
            let (opcode, bytes) = zero_page(opcode, addr, ctx);
            enc(opcode, addr, bytes)
        }
        _ => addr_error(ctx),
    }
}

pub fn encode(
    family: Family,
    base: u8,
    operand: &Operand,
    pc: u16,
    ctx: &mut EvalCtx,
) -> Option<Encoding> {
    match family {
        Family::InhOp => {
            if *operand != Operand::None {
                ctx.error(ErrorCode::TooManyArgs);
            }
            enc(base, 0, 1)
        }

        Family::RelBr => match *operand {
            Operand::Direct { addr, index: None } => {
                let mut disp = addr.wrapping_sub(pc.wrapping_add(2));
                if disp > 0x007F && disp < 0xFF80 {
                    ctx.error(ErrorCode::Branch);
                    disp = 0xFFFE;
                }
                enc(base, disp, 2)
            }
            _ => addr_error(ctx),
        },

        Family::Jump => match *operand {
            Operand::Indirect { addr, index: None } => enc(base + 0x20, addr, 3),
            Operand::Direct { addr, index: None } => enc(base, addr, 3),
            _ => addr_error(ctx),
        },

        Family::Call => match *operand {
            Operand::Direct { addr, index: None } => enc(base, addr, 3),
            _ => addr_error(ctx),
        },

        Family::LogOp => match *operand {
            Operand::Accumulator => enc(base + 0x04, 0, 1),
            _ => inc_op(base, operand, ctx),
        },

        Family::IncOp => inc_op(base, operand, ctx),

        Family::BitOp => match *operand {
            Operand::Direct { addr, index: None } => {
                let (opcode, bytes) = zero_page(base, addr, ctx);
                enc(opcode, addr, bytes)
            }
            _ => addr_error(ctx),
        },

        Family::Cpxy => match *operand {
            Operand::Immediate(value) => enc(base, check_immediate(value, ctx), 2),
            Operand::Direct { addr, index: None } => {
                let (opcode, bytes) = zero_page(base + 0x04, addr, ctx);
                enc(opcode, addr, bytes)
            }
            _ => addr_error(ctx),
        },

        Family::Ldxy => {
            // LDX indexes with Y and LDY with X; the indexed bit is the
            // same either way.
            let is_ldx = base == 0xA2;
            match *operand {
                Operand::Immediate(value) => enc(base, check_immediate(value, ctx), 2),
                Operand::Direct { addr, index } => {
                    let indexed = match index {
                        None => false,
                        Some(Index::Y) if is_ldx => true,
                        Some(Index::X) if !is_ldx => true,
                        Some(_) => return addr_error(ctx),
                    };
                    let opcode = base + 0x04 + if indexed { 0x10 } else { 0 };
                    let (opcode, bytes) = zero_page(opcode, addr, ctx);
                    enc(opcode, addr, bytes)
                }
                _ => addr_error(ctx),
            }
        }

        Family::Stxy => {
            // STX indexes with Y and STY with X; indexed forms exist in
            // the zero page only.
            let is_stx = base == 0x86;
            match *operand {
                Operand::Direct { addr, index: None } => {
                    let (opcode, bytes) = zero_page(base, addr, ctx);
                    enc(opcode, addr, bytes)
                }
                Operand::Direct {
                    addr,
                    index: Some(index),
                } if (is_stx && index == Index::Y) || (!is_stx && index == Index::X) => {
                    enc(base + 0x10, zero_page_only(addr, ctx), 2)
                }
                _ => addr_error(ctx),
            }
        }

        Family::TwoOp => match *operand {
            Operand::Immediate(value) => {
                if base == 0x81 {
                    // STA has no immediate form.
                    addr_error(ctx)
                } else {
                    enc(base + 0x08, check_immediate(value, ctx), 2)
                }
            }
            Operand::Indirect { addr, index } => match index {
                Some(Index::X) => enc(base, zero_page_only(addr, ctx), 2),
                Some(Index::Y) => enc(base + 0x10, zero_page_only(addr, ctx), 2),
                None => addr_error(ctx),
            },
            Operand::Direct {
                addr,
                index: Some(Index::Y),
            } => enc(base + 0x18, addr, 3),
            Operand::Direct { addr, index } => {
                let opcode = base + 0x04 + if index == Some(Index::X) { 0x10 } else { 0 };
                let (opcode, bytes) = zero_page(opcode, addr, ctx);
                enc(opcode, addr, bytes)
            }
            _ => addr_error(ctx),
        },
    }
}

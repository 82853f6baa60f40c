//! Expression evaluation over the parse tree. Values are unsigned 16-bit
//! and every operation wraps modulo 2^16. Relational operators yield 0 or
//! all-ones. The precedence ladder is encoded in the grammar; this module
//! only folds the already-shaped tree.

use crate::error::ErrorCode;
use crate::instructions;
use crate::int_util::fold_radix;
use crate::parser::Rule;
use crate::symbols::SymbolTable;
use crate::Pass;
use pest::iterators::Pair;

/// Evaluation context threaded through one argument field. The forward
/// flag is raised when any operand reduces a symbol whose definition has
/// not been seen yet this pass; callers that must choose between zero-page
/// and absolute encodings do not trust the numeric result while it is set.
pub struct EvalCtx<'a> {
    pub symbols: &'a SymbolTable,
    pub pass: Pass,
    pub forward: bool,
    pub force_abs: bool,
    pub error: Option<ErrorCode>,
}

impl<'a> EvalCtx<'a> {
    pub fn new(symbols: &'a SymbolTable, pass: Pass) -> EvalCtx<'a> {
        EvalCtx {
            symbols,
            pass,
            forward: false,
            force_abs: false,
            error: None,
        }
    }

    pub fn error(&mut self, code: ErrorCode) {
        if self.error.is_none() {
            self.error = Some(code);
        }
    }
}

pub fn eval(pair: Pair<Rule>, ctx: &mut EvalCtx) -> u16 {
    match pair.as_rule() {
        Rule::expr | Rule::log1 | Rule::relat | Rule::sum | Rule::term => fold_binary(pair, ctx),
        Rule::unary => eval_unary(pair, ctx),
        Rule::primary => eval_primary(pair, ctx),
        Rule::number => eval_number(pair, ctx),
        Rule::symbol => eval_symbol(pair, ctx),
        _ => unreachable!("expression rule {:?}", pair.as_rule()),
    }
}

fn fold_binary(pair: Pair<Rule>, ctx: &mut EvalCtx) -> u16 {
    let mut inner = pair.into_inner();
    let mut value = eval(inner.next().unwrap(), ctx);
    while let Some(op) = inner.next() {
        let rhs = eval(inner.next().unwrap(), ctx);
        value = apply_binary(op.as_str(), value, rhs, ctx);
    }
    value
}

fn truth(cond: bool) -> u16 {
    if cond {
        0xFFFF
    } else {
        0
    }
}

fn apply_binary(op: &str, lhs: u16, rhs: u16, ctx: &mut EvalCtx) -> u16 {
    match op.to_ascii_uppercase().as_str() {
        "*" => lhs.wrapping_mul(rhs),
        "/" => {
            if rhs == 0 {
                ctx.error(ErrorCode::Expression);
                0
            } else {
                lhs / rhs
            }
        }
        "MOD" => {
            if rhs == 0 {
                ctx.error(ErrorCode::Expression);
                0
            } else {
                lhs % rhs
            }
        }
        "SHL" => {
            if rhs < 16 {
                lhs << rhs
            } else {
                0
            }
        }
        "SHR" => {
            if rhs < 16 {
                lhs >> rhs
            } else {
                0
            }
        }
        "+" => lhs.wrapping_add(rhs),
        "-" => lhs.wrapping_sub(rhs),
        "=" | "EQ" => truth(lhs == rhs),
        "NE" => truth(lhs != rhs),
        "<" | "LT" => truth(lhs < rhs),
        "LE" => truth(lhs <= rhs),
        ">" | "GT" => truth(lhs > rhs),
        "GE" => truth(lhs >= rhs),
        "AND" => lhs & rhs,
        "OR" => lhs | rhs,
        "XOR" => lhs ^ rhs,
        _ => unreachable!("binary operator {}", op),
    }
}

fn eval_unary(pair: Pair<Rule>, ctx: &mut EvalCtx) -> u16 {
    let pairs: Vec<Pair<Rule>> = pair.into_inner().collect();
    let (primary, ops) = pairs.split_last().unwrap();
    let mut value = eval(primary.clone(), ctx);
    for op in ops.iter().rev() {
        value = match op.as_rule() {
            Rule::op_neg => value.wrapping_neg(),
            Rule::op_low => value & 0x00FF,
            Rule::op_high => value >> 8,
            Rule::op_not => !value,
            _ => unreachable!(),
        };
    }
    value
}

fn eval_primary(pair: Pair<Rule>, ctx: &mut EvalCtx) -> u16 {
    let inner = pair.into_inner().next().unwrap();
    eval(inner, ctx)
}

fn eval_number(pair: Pair<Rule>, ctx: &mut EvalCtx) -> u16 {
    let inner = pair.into_inner().next().unwrap();
    let text = inner.as_str();
    let folded = match inner.as_rule() {
        Rule::hex_lit => fold_radix(&text[1..], 16),
        Rule::bin_lit => fold_radix(&text[1..], 2),
        Rule::oct_lit => fold_radix(&text[1..], 8),
        Rule::dec_lit => fold_radix(text, 10),
        Rule::char_lit => text.chars().nth(1).map(|c| c as u32 as u16),
        _ => unreachable!(),
    };
    match folded {
        Some(value) => value,
        None => {
            ctx.error(ErrorCode::Digit);
            0
        }
    }
}

fn eval_symbol(pair: Pair<Rule>, ctx: &mut EvalCtx) -> u16 {
    let name = pair.as_str();
    let qualified = ctx.symbols.qualify(name);
    match ctx.symbols.lookup(&qualified) {
        Some(sym) => {
            if ctx.pass == Pass::Second && sym.forward {
                ctx.forward = true;
            }
            sym.value
        }
        None => {
            // The value cannot be trusted either way; pass 2 also
            // reports the miss.
            ctx.forward = true;
            if ctx.pass == Pass::Second {
                if instructions::is_register(name) {
                    ctx.error(ErrorCode::Register);
                } else {
                    ctx.error(ErrorCode::Undefined);
                }
            }
            0
        }
    }
}

//! Machine-instruction argument decoding. The grammar has already picked
//! the surface form; this reduces it to an `Operand` the encoder can match
//! on, evaluating the embedded expression along the way.

use crate::expr::{eval, EvalCtx};
use crate::parser::Rule;
use matches::debug_assert_matches;
use pest::iterators::Pair;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Index {
    X,
    Y,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operand {
    None,
    Accumulator,
    Immediate(u16),
    Direct { addr: u16, index: Option<Index> },
    Indirect { addr: u16, index: Option<Index> },
}

fn index_of(pair: Pair<Rule>) -> Index {
    match pair.into_inner().next().unwrap().as_rule() {
        Rule::reg_x => Index::X,
        Rule::reg_y => Index::Y,
        _ => unreachable!(),
    }
}

pub fn process_operand(pair: Pair<Rule>, ctx: &mut EvalCtx) -> Operand {
    debug_assert_matches!(pair.as_rule(), Rule::operand);
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::immediate => {
            let value = eval(inner.into_inner().next().unwrap(), ctx);
            Operand::Immediate(value)
        }
        Rule::indirect => {
            let mut pairs = inner.into_inner();
            let addr = eval(pairs.next().unwrap(), ctx);
            let index = match pairs.next().unwrap().as_rule() {
                Rule::pre_index => Some(Index::X),
                Rule::post_index => Some(Index::Y),
                Rule::rparen => None,
                _ => unreachable!(),
            };
            Operand::Indirect { addr, index }
        }
        Rule::accumulator => Operand::Accumulator,
        Rule::direct => {
            let mut addr = 0;
            let mut index = None;
            for p in inner.into_inner() {
                match p.as_rule() {
                    Rule::force_abs => ctx.force_abs = true,
                    Rule::expr => addr = eval(p, ctx),
                    Rule::index => index = Some(index_of(p)),
                    _ => unreachable!(),
                }
            }
            Operand::Direct { addr, index }
        }
        _ => unreachable!(),
    }
}

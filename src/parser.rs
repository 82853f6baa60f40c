use crate::error::ErrorCode;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "asm65.pest"]
pub struct AsmParser;

pub type ParseError = pest::error::Error<Rule>;

/// Reduces a parse failure to the single-letter code recorded on the line.
/// A failure while a closing delimiter was expected is a parenthesis
/// imbalance; a failure where an expression operand could have started is
/// an expression error; anything else gets the caller's default.
pub fn classify_error(err: &ParseError, default: ErrorCode) -> ErrorCode {
    if let pest::error::ErrorVariant::ParsingError { positives, .. } = &err.variant {
        if positives
            .iter()
            .any(|r| matches!(r, Rule::rparen | Rule::rbrack | Rule::pre_index | Rule::post_index))
        {
            return ErrorCode::Paren;
        }
        if positives.iter().any(|r| {
            matches!(
                r,
                Rule::expr
                    | Rule::primary
                    | Rule::number
                    | Rule::symbol
                    | Rule::hex_lit
                    | Rule::bin_lit
                    | Rule::oct_lit
                    | Rule::dec_lit
                    | Rule::char_lit
            )
        }) {
            return ErrorCode::Expression;
        }
    }
    default
}

use crate::error::ErrorCode;
use crate::expr::{eval, EvalCtx};
use crate::parser::{AsmParser, Rule};
use crate::symbols::SymbolTable;
use crate::{assemble, Pass};
use ::pest::iterators::Pair;
use ::pest::Parser;
use std::env;
use std::fs;


pub fn parse_rule(rule: Rule, input: &str) -> Result<Pair<Rule>, crate::parser::ParseError> {
    Ok(AsmParser::parse(rule, input)?.next().unwrap())
}

fn eval_str(input: &str, symbols: &SymbolTable, pass: Pass) -> (u16, bool, Option<ErrorCode>) {
    let pair = parse_rule(Rule::expr, input).unwrap();
    let mut ctx = EvalCtx::new(symbols, pass);
    let value = eval(pair, &mut ctx);
    (value, ctx.forward, ctx.error)
}

fn eval_ok(input: &str) -> u16 {
    let symbols = SymbolTable::new();
    let (value, forward, error) = eval_str(input, &symbols, Pass::First);
    assert!(!forward, "unexpected forward flag for {}", input);
    assert_eq!(error, None, "unexpected error for {}", input);
    value
}

fn codes(output: &crate::Output) -> Vec<ErrorCode> {
    output.diagnostics.iter().map(|d| d.code).collect()
}

// ---- expression evaluator ----

#[test]
fn expr_precedence() {
    assert_eq!(eval_ok("2+3*4"), 14);
    assert_eq!(eval_ok("(2+3)*4"), 20);
    assert_eq!(eval_ok("[2+3]*4"), 20);
    assert_eq!(eval_ok("10/4"), 2);
    assert_eq!(eval_ok("7 MOD 4"), 3);
    assert_eq!(eval_ok("1 SHL 4"), 16);
    assert_eq!(eval_ok("$FF00 SHR 8"), 0x00FF);
    assert_eq!(eval_ok("1 SHL 16"), 0);
}

#[test]
fn expr_relational_yields_all_ones() {
    assert_eq!(eval_ok("1 LT 2"), 0xFFFF);
    assert_eq!(eval_ok("2<1"), 0);
    assert_eq!(eval_ok("5 = 5"), 0xFFFF);
    assert_eq!(eval_ok("5 NE 5"), 0);
    assert_eq!(eval_ok("3 GE 3"), 0xFFFF);
    assert_eq!(eval_ok("1 = 1 AND 2 = 2"), 0xFFFF);
}

#[test]
fn expr_byte_selectors() {
    assert_eq!(eval_ok("<$1234"), 0x34);
    assert_eq!(eval_ok(">$1234"), 0x12);
    assert_eq!(eval_ok("LOW $1234"), 0x34);
    assert_eq!(eval_ok("HIGH $1234"), 0x12);
}

#[test]
fn expr_unary_and_bitwise() {
    assert_eq!(eval_ok("-1"), 0xFFFF);
    assert_eq!(eval_ok("--2"), 2);
    assert_eq!(eval_ok("NOT $FF00"), 0x00FF);
    assert_eq!(eval_ok("$F0 AND $FF"), 0xF0);
    assert_eq!(eval_ok("$0F OR $F0"), 0xFF);
    assert_eq!(eval_ok("$FF XOR $0F"), 0xF0);
}

#[test]
fn expr_wraps_modulo_64k() {
    assert_eq!(eval_ok("$FFFF+2"), 1);
    assert_eq!(eval_ok("0-1"), 0xFFFF);
}

#[test]
fn expr_character_ordinal() {
    assert_eq!(eval_ok("'A'"), 0x41);
    assert_eq!(eval_ok("'A'+1"), 0x42);
}

#[test]
fn expr_division_by_zero() {
    let symbols = SymbolTable::new();
    let (value, _, error) = eval_str("5/0", &symbols, Pass::First);
    assert_eq!(value, 0);
    assert_eq!(error, Some(ErrorCode::Expression));
}

#[test]
fn expr_digit_errors() {
    let symbols = SymbolTable::new();
    for input in &["$1G2", "%2", "@8"] {
        let (value, _, error) = eval_str(input, &symbols, Pass::First);
        assert_eq!(value, 0);
        assert_eq!(error, Some(ErrorCode::Digit), "for {}", input);
    }
}

#[test]
fn expr_symbol_resolution() {
    let mut symbols = SymbolTable::new();
    let (_, sym) = symbols.enter("FOO");
    sym.value = 0x1234;

    let (value, forward, error) = eval_str("FOO+1", &symbols, Pass::First);
    assert_eq!((value, forward, error), (0x1235, false, None));

    // Unknown in pass 1 raises the forward flag; in pass 2 it is an error.
    let (value, forward, error) = eval_str("BAR", &symbols, Pass::First);
    assert_eq!((value, forward, error), (0, true, None));
    let (value, _, error) = eval_str("BAR", &symbols, Pass::Second);
    assert_eq!((value, error), (0, Some(ErrorCode::Undefined)));
}

// ---- whole-program scenarios ----

#[test]
fn basic_instructions() {
    let output = assemble("\tLDA #$05\n\tSTA $00\n\tRTS\n").unwrap();
    assert_eq!(output.binary, vec![0xA9, 0x05, 0x85, 0x00, 0x60]);
    // The missing END is the only complaint.
    assert_eq!(codes(&output), vec![ErrorCode::Statement]);
}

#[test]
fn org_pads_the_image() {
    let output = assemble("\tORG $0200\nL:\tJMP L\n").unwrap();
    assert_eq!(output.binary.len(), 515);
    assert!(output.binary[..512].iter().all(|&b| b == 0));
    assert_eq!(&output.binary[512..], &[0x4C, 0x00, 0x02]);
    // The symbol table in the listing shows L at its origin.
    assert!(output.listing.contains("0200  L"));
}

#[test]
fn forward_branch() {
    let output = assemble("\tBEQ AHEAD\n\tNOP\nAHEAD:\tRTS\n").unwrap();
    assert_eq!(output.binary, vec![0xF0, 0x01, 0xEA, 0x60]);
}

#[test]
fn zero_page_and_forced_absolute() {
    let output = assemble("\tORG $0000\n\tLDA $80,X\n\tLDA !$0080,X\n").unwrap();
    assert_eq!(output.binary, vec![0xB5, 0x80, 0xBD, 0x80, 0x00]);
}

#[test]
fn high_low_selectors() {
    let output = assemble("X\tEQU $1234\n\tLDA #<X\n\tLDA #>X\n").unwrap();
    assert_eq!(output.binary, vec![0xA9, 0x34, 0xA9, 0x12]);
}

#[test]
fn inc_dec_memory_forms() {
    let source = "\tINC $80\n\tINC $80,X\n\tDEC $0300\n\tDEC $0300,X\n\tEND\n";
    let output = assemble(source).unwrap();
    assert_eq!(
        output.binary,
        vec![0xE6, 0x80, 0xF6, 0x80, 0xCE, 0x00, 0x03, 0xDE, 0x00, 0x03]
    );
    assert_eq!(output.errors, 0);
}

#[test]
fn shift_rotate_memory_and_accumulator() {
    let source = "\tASL A\n\tASL $80\n\tASL $0300,X\n\tLSR $10\n\tROL $10,X\n\tROR $0300\n\tEND\n";
    let output = assemble(source).unwrap();
    assert_eq!(
        output.binary,
        vec![0x0A, 0x06, 0x80, 0x1E, 0x00, 0x03, 0x46, 0x10, 0x36, 0x10, 0x6E, 0x00, 0x03]
    );
    assert_eq!(output.errors, 0);
}

#[test]
fn inc_rejects_y_indexing() {
    let output = assemble("\tINC $80,Y\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0xEA, 0xEA, 0xEA]);
    assert_eq!(codes(&output), vec![ErrorCode::AddrMode]);
}

#[test]
fn conditional_else() {
    let output = assemble("\tIF 0\n\tNOP\n\tELSE\n\tBRK\n\tENDI\n").unwrap();
    assert_eq!(output.binary, vec![0x00]);
}

// ---- data pseudo-ops ----

#[test]
fn db_string_round_trip() {
    let from_values = assemble("\tDB $41,$42,$43\n\tEND\n").unwrap();
    let from_string = assemble("\tDB \"ABC\"\n\tEND\n").unwrap();
    assert_eq!(from_values.binary, vec![0x41, 0x42, 0x43]);
    assert_eq!(from_values.binary, from_string.binary);
    assert_eq!(from_values.errors, 0);
}

#[test]
fn dw_words_little_endian() {
    let output = assemble("\tDW $1234,,$AABB\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0x34, 0x12, 0x00, 0x00, 0xBB, 0xAA]);
}

#[test]
fn ds_takes_strings_only() {
    let output = assemble("\tDS \"HI\"\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0x48, 0x49]);
    let output = assemble("\tDS 5\n\tEND\n").unwrap();
    assert_eq!(codes(&output), vec![ErrorCode::Syntax]);
}

#[test]
fn unterminated_string() {
    let output = assemble("\tDB \"AB\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0x41, 0x42]);
    assert_eq!(codes(&output), vec![ErrorCode::Quote]);
}

// ---- symbols ----

#[test]
fn local_labels_qualify_under_globals() {
    let output = assemble("MAIN:\tNOP\n.loop:\tDEX\n\tBNE .loop\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0xEA, 0xCA, 0xD0, 0xFD]);
    assert_eq!(output.errors, 0);
}

#[test]
fn forward_reference_widens_in_both_passes() {
    let output = assemble("\tLDA FOO\nFOO\tEQU $10\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0xAD, 0x10, 0x00]);
    assert_eq!(output.errors, 0);
}

#[test]
fn equ_forward_expression_is_a_phase_error() {
    let output = assemble("A1\tEQU B1\nB1\tEQU 5\n\tEND\n").unwrap();
    assert_eq!(codes(&output), vec![ErrorCode::Phase]);
}

#[test]
fn duplicate_label_is_multiply_defined() {
    let output = assemble("L:\tNOP\nL:\tNOP\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0xEA, 0xEA]);
    assert_eq!(codes(&output), vec![ErrorCode::MultiplyDefined]);
}

#[test]
fn equ_refuses_redefinition() {
    let output = assemble("C1\tEQU 1\nC1\tEQU 2\n\tEND\n").unwrap();
    assert_eq!(codes(&output), vec![ErrorCode::MultiplyDefined]);
}

#[test]
fn set_allows_redefinition() {
    let output = assemble("V\tSET 1\n\tDB V\nV\tSET 2\n\tDB V\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0x01, 0x02]);
    assert_eq!(output.errors, 0);
}

#[test]
fn undefined_symbol() {
    let output = assemble("\tLDA MISSING\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0xAD, 0x00, 0x00]);
    assert_eq!(codes(&output), vec![ErrorCode::Undefined]);
}

#[test]
fn bare_register_as_value() {
    let output = assemble("\tLDA #<Y\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0xA9, 0x00]);
    assert_eq!(codes(&output), vec![ErrorCode::Register]);
}

#[test]
fn operator_keyword_label() {
    let output = assemble("AND:\tNOP\n\tEND\n").unwrap();
    assert_eq!(codes(&output), vec![ErrorCode::Label]);
}

#[test]
fn labels_are_case_insensitive() {
    let output = assemble("foo:\tnop\n\tjmp FOO\n\tend\n").unwrap();
    assert_eq!(output.binary, vec![0xEA, 0x4C, 0x00, 0x00]);
    assert_eq!(output.errors, 0);
}

// ---- conditional assembly ----

#[test]
fn nested_conditionals() {
    let source = "\tIF 1\n\tIF 0\n\tDB 1\n\tENDI\n\tDB 2\n\tENDI\n\tEND\n";
    let output = assemble(source).unwrap();
    assert_eq!(output.binary, vec![0x02]);
    assert_eq!(output.errors, 0);
}

#[test]
fn else_inside_dead_region_stays_off() {
    let source = "\tIF 0\n\tIF 1\n\tDB 1\n\tELSE\n\tDB 2\n\tENDI\n\tDB 3\n\tENDI\n\tDB 4\n\tEND\n";
    let output = assemble(source).unwrap();
    assert_eq!(output.binary, vec![0x04]);
    assert_eq!(output.errors, 0);
}

#[test]
fn if_imbalance_at_end() {
    let output = assemble("\tIF 1\n\tEND\n").unwrap();
    assert_eq!(codes(&output), vec![ErrorCode::IfNesting]);
    let output = assemble("\tENDI\n\tEND\n").unwrap();
    assert_eq!(codes(&output), vec![ErrorCode::IfNesting]);
}

// ---- location counter directives ----

#[test]
fn align_pads_to_boundary() {
    let output = assemble("\tDB 1\n\tALIGN 4\n\tDB 2\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0x01, 0x00, 0x00, 0x00, 0x02]);
}

#[test]
fn rmb_reserves_zeroed_bytes() {
    let output = assemble("\tDB 1\n\tRMB 3\n\tDB 2\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0x01, 0x00, 0x00, 0x00, 0x02]);
}

#[test]
fn base_moves_the_counter_without_padding() {
    let output = assemble("\tDB 1\n\tBASE $1000\nL1:\tDB 2\n\tEXP L1\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0x01, 0x02]);
    assert!(output.export.contains("L1\tequ\t$1000\n"));
}

#[test]
fn branch_out_of_range() {
    let output = assemble("\tBASE $0300\n\tBEQ 0\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0xF0, 0xFE]);
    assert_eq!(codes(&output), vec![ErrorCode::Branch]);
}

// ---- statement-level errors ----

#[test]
fn inherent_with_argument() {
    let output = assemble("\tNOP 5\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0xEA]);
    assert_eq!(codes(&output), vec![ErrorCode::TooManyArgs]);
}

#[test]
fn unknown_opcode_fills_with_nops() {
    let output = assemble("\tFOO\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0xEA, 0xEA, 0xEA]);
    assert_eq!(codes(&output), vec![ErrorCode::Opcode]);
}

#[test]
fn sta_immediate_is_rejected() {
    let output = assemble("\tSTA #1\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0xEA, 0xEA, 0xEA]);
    assert_eq!(codes(&output), vec![ErrorCode::AddrMode]);
}

#[test]
fn comments_are_ignored_outside_strings() {
    let output = assemble("\tDB 1 ; a comment\n\tDB \";\"\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0x01, b';']);
    assert_eq!(output.errors, 0);
}

// ---- MSG, listing, export ----

#[test]
fn msg_concatenates_strings_and_values() {
    let output = assemble("\tMSG \"X=\",$12\n\tEND\n").unwrap();
    assert_eq!(output.messages, vec!["X=18".to_owned()]);
}

#[test]
fn listing_rows_carry_address_and_bytes() {
    let output = assemble("\tLDA #$05\n\tEND\n").unwrap();
    let first = output.listing.lines().next().unwrap();
    assert_eq!(first, "   0000   a9 05         \tLDA #$05");
}

#[test]
fn title_appears_on_page_break() {
    let output = assemble("\tTITL \"DEMO\"\n\tPAGE 10\n\tNOP\n\tEND\n").unwrap();
    assert!(output.listing.contains("\u{c}DEMO\n\n"));
}

#[test]
fn assembly_is_idempotent() {
    let source = "\tORG $0200\nSTART:\tLDX #$FF\n\tTXS\n\tJMP START\n\tEND\n";
    let first = assemble(source).unwrap();
    let second = assemble(source).unwrap();
    assert_eq!(first.binary, second.binary);
    assert_eq!(first.listing, second.listing);
    assert_eq!(first.errors, second.errors);
}

// ---- file inclusion ----

#[test]
fn include_source_and_binary_files() {
    let dir = env::temp_dir();
    let incl = dir.join("asm65_test_include.asm");
    let incb = dir.join("asm65_test_include.bin");
    fs::write(&incl, "\tDB 2\n").unwrap();
    fs::write(&incb, &[0xDE, 0xAD]).unwrap();

    let source = format!(
        "\tDB 1\n\tINCL \"{}\"\n\tINCB \"{}\"\n\tDB 3\n\tEND\n",
        incl.display(),
        incb.display()
    );
    let output = assemble(&source).unwrap();
    assert_eq!(output.binary, vec![0x01, 0x02, 0xDE, 0xAD, 0x03]);
    assert_eq!(output.errors, 0);

    let _ = fs::remove_file(&incl);
    let _ = fs::remove_file(&incb);
}

#[test]
fn end_inside_include_is_flagged() {
    let dir = env::temp_dir();
    let incl = dir.join("asm65_test_early_end.asm");
    fs::write(&incl, "\tDB 2\n\tEND\n").unwrap();

    let source = format!("\tDB 1\n\tINCL \"{}\"\n\tDB 3\n\tEND\n", incl.display());
    let output = assemble(&source).unwrap();
    assert_eq!(output.binary, vec![0x01, 0x02, 0x03]);
    assert_eq!(codes(&output), vec![ErrorCode::Statement]);

    let _ = fs::remove_file(&incl);
}

#[test]
fn missing_include_is_recoverable() {
    let output = assemble("\tDB 1\n\tINCL \"/nonexistent/include.asm\"\n\tDB 2\n\tEND\n").unwrap();
    assert_eq!(output.binary, vec![0x01, 0x02]);
    assert_eq!(codes(&output), vec![ErrorCode::Value]);
}

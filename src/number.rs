//! Number, character-literal and `EQU` expression parsing (spec.md §4.3, §4.6).
//!
//! Grammar lives in `number.pest`; this module turns the pest parse tree
//! into the small set of values the rest of the assembler needs.

use matches::debug_assert_matches;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "number.pest"]
struct NumberParser;

/// A token failed to parse as a number of any recognized radix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NumberError;

/// Parses one number token: `'c'`, `nnnnH`, `nnnnQ`, `nnnnB` or plain decimal.
/// Returns the raw value; range-checking against the byte/address window is
/// the caller's job (spec.md §4.3: width is chosen by the caller).
pub fn parse_number(token: &str) -> Result<u32, NumberError> {
    let pair = NumberParser::parse(Rule::number_token, token)
        .map_err(|_| NumberError)?
        .next()
        .ok_or(NumberError)?;
    debug_assert_matches!(pair.as_rule(), Rule::number_token);
    let number = pair.into_inner().next().ok_or(NumberError)?;
    debug_assert_matches!(number.as_rule(), Rule::number);
    let literal = number.into_inner().next().ok_or(NumberError)?;
    eval_number(literal)
}

fn eval_number(pair: Pair<Rule>) -> Result<u32, NumberError> {
    let text = pair.as_str();
    match pair.as_rule() {
        Rule::char_lit => {
            let ch = text.as_bytes().get(1).copied().ok_or(NumberError)?;
            Ok(ch as u32)
        }
        Rule::hex_lit => u32::from_str_radix(&text[..text.len() - 1], 16).map_err(|_| NumberError),
        Rule::oct_lit => u32::from_str_radix(&text[..text.len() - 1], 8).map_err(|_| NumberError),
        Rule::bin_lit => u32::from_str_radix(&text[..text.len() - 1], 2).map_err(|_| NumberError),
        Rule::dec_lit => text.parse().map_err(|_| NumberError),
        _ => unreachable!("number rule only ever contains a literal variant"),
    }
}

/// Binary operator supported by `EQU` (spec.md §4.4: single operator, no precedence).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

/// `EQU` expression AST (spec.md §9 design note): a term, or two terms joined
/// by a single operator. Kept as a tree rather than a flat pair so it reads
/// the way the design note describes it, even though the grammar never
/// nests deeper than one level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExprAst {
    Num(u32),
    Sym(String),
    Bin(Op, Box<ExprAst>, Box<ExprAst>),
}

/// Parses an `EQU` operand into an expression AST. Does not evaluate it —
/// symbols may still be undefined at this point in pass 1.
pub fn parse_expr(text: &str) -> Result<ExprAst, NumberError> {
    let pair = NumberParser::parse(Rule::expr, text)
        .map_err(|_| NumberError)?
        .next()
        .ok_or(NumberError)?;
    let mut inner = pair.into_inner();
    let lhs = term_to_ast(inner.next().ok_or(NumberError)?)?;

    match inner.next() {
        None => Ok(lhs),
        Some(op_pair) => {
            let op = match op_pair.as_str() {
                "+" => Op::Add,
                "-" => Op::Sub,
                "*" => Op::Mul,
                "/" => Op::Div,
                _ => unreachable!("operator rule only matches +,-,*,/"),
            };
            let rhs = term_to_ast(inner.next().ok_or(NumberError)?)?;
            Ok(ExprAst::Bin(op, Box::new(lhs), Box::new(rhs)))
        }
    }
}

fn term_to_ast(term: Pair<Rule>) -> Result<ExprAst, NumberError> {
    let inner = term.into_inner().next().ok_or(NumberError)?;
    match inner.as_rule() {
        Rule::number => Ok(ExprAst::Num(eval_number(
            inner.into_inner().next().ok_or(NumberError)?,
        )?)),
        Rule::identifier => Ok(ExprAst::Sym(inner.as_str().to_owned())),
        _ => unreachable!("term only contains number or identifier"),
    }
}

/// Result of evaluating an `EQU` expression against the symbol table so far.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EvalResult {
    Resolved(u32),
    Unresolved,
    /// Value out of range, or division by zero.
    Invalid,
}

/// Evaluates an expression AST, looking up symbols with `lookup`.
pub fn eval_expr(ast: &ExprAst, lookup: impl Fn(&str) -> Option<u32>) -> EvalResult {
    fn eval_term(ast: &ExprAst, lookup: &impl Fn(&str) -> Option<u32>) -> Option<Option<u32>> {
        match ast {
            ExprAst::Num(n) => Some(Some(*n)),
            ExprAst::Sym(name) => Some(lookup(name)),
            ExprAst::Bin(..) => None,
        }
    }

    match ast {
        ExprAst::Num(_) | ExprAst::Sym(_) => match eval_term(ast, &lookup) {
            Some(Some(v)) => EvalResult::Resolved(v),
            Some(None) => EvalResult::Unresolved,
            None => unreachable!(),
        },
        ExprAst::Bin(op, lhs, rhs) => {
            let lhs = match eval_term(lhs, &lookup) {
                Some(Some(v)) => v,
                Some(None) => return EvalResult::Unresolved,
                None => unreachable!("EQU expressions are never nested past one operator"),
            };
            let rhs = match eval_term(rhs, &lookup) {
                Some(Some(v)) => v,
                Some(None) => return EvalResult::Unresolved,
                None => unreachable!("EQU expressions are never nested past one operator"),
            };
            match op {
                Op::Add => EvalResult::Resolved(lhs.wrapping_add(rhs)),
                Op::Sub => EvalResult::Resolved(lhs.wrapping_sub(rhs)),
                Op::Mul => EvalResult::Resolved(lhs.wrapping_mul(rhs)),
                Op::Div => {
                    if rhs == 0 {
                        EvalResult::Invalid
                    } else {
                        EvalResult::Resolved(lhs / rhs)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decimal() {
        assert_eq!(parse_number("255"), Ok(255));
    }

    #[test]
    fn hexadecimal_requires_leading_digit() {
        assert_eq!(parse_number("0A1H"), Ok(0xA1));
        assert_eq!(parse_number("0FFFFH"), Ok(0xFFFF));
        assert!(parse_number("FFH").is_err());
    }

    #[test]
    fn octal_and_binary() {
        assert_eq!(parse_number("377Q"), Ok(0o377));
        assert_eq!(parse_number("01000001B"), Ok(0b01000001));
    }

    #[test]
    fn char_literal() {
        assert_eq!(parse_number("'A'"), Ok(65));
    }

    #[test]
    fn equ_expression_with_single_operator() {
        let ast = parse_expr("5+3").unwrap();
        assert_eq!(eval_expr(&ast, |_| None), EvalResult::Resolved(8));
    }

    #[test]
    fn equ_division_by_zero_is_invalid() {
        let ast = parse_expr("5/0").unwrap();
        assert_eq!(eval_expr(&ast, |_| None), EvalResult::Invalid);
    }

    #[test]
    fn equ_unresolved_symbol() {
        let ast = parse_expr("VAL+1").unwrap();
        assert_eq!(eval_expr(&ast, |_| None), EvalResult::Unresolved);
        assert_eq!(eval_expr(&ast, |n| (n == "VAL").then(|| 4)), EvalResult::Resolved(5));
    }
}

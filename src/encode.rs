//! Operand encoder (spec.md §4.4): turns operand text plus an
//! [`OperandKind`](crate::instructions::OperandKind) into emitted bytes, or
//! into a label-shaped hole for pass 2 to fill in.

use crate::instructions::{self, OperandKind};
use crate::number::{self, ExprAst, NumberError};
use crate::record::{BytePart, ByteValue, EquHole, ErrorCode, LabelRef};
use crate::util;

/// What one encode() call produced, before pass 1 turns it into listing rows.
pub enum EncodeResult {
    /// Ordinary instruction or pseudo-op emitting 1-3 bytes in a single row.
    Bytes(Vec<ByteValue>),
    /// `DB` only: a fully resolved, arbitrary-length byte list, chunked
    /// into rows of up to 3 by the pass 1 driver.
    DbBytes(Vec<u8>),
    /// `DS`: advance the program counter without emitting anything.
    Ds(u16),
    /// `ORG`: set the program counter absolutely.
    Org(u16),
    /// `EQU` whose expression resolved immediately (no symbol operands).
    EquResolved(u16),
    /// `EQU` whose expression references a symbol; resolved in pass 2.
    Equ(EquHole),
    /// Comment-only/label-only line, or a pseudo-op with no side effect.
    Empty,
}

pub fn encode(mnemonic: &str, base: u8, kind: OperandKind, label: &str, operand_text: &str) -> (ErrorCode, EncodeResult) {
    match kind {
        OperandKind::None => (ErrorCode::None, EncodeResult::Bytes(vec![ByteValue::Known(base)])),
        OperandKind::Register => encode_register(mnemonic, base, operand_text),
        OperandKind::ImmByte if mnemonic == "DB" => encode_db(operand_text),
        OperandKind::ImmByte => encode_imm_byte(base, operand_text),
        OperandKind::Address if mnemonic == "DW" => encode_dw(operand_text),
        OperandKind::Address if mnemonic == "DS" => encode_ds(operand_text),
        OperandKind::Address if mnemonic == "ORG" => encode_org(operand_text),
        OperandKind::Address => encode_address(base, operand_text),
        OperandKind::Expression => encode_equ(label, operand_text),
        OperandKind::RegPair => encode_reg_pair(base, operand_text),
        OperandKind::RegPairBD => encode_reg_pair_bd(base, operand_text),
        OperandKind::RegReg => encode_reg_reg(base, operand_text),
        OperandKind::RegPairWord => encode_reg_pair_word(base, operand_text),
        OperandKind::RegImmByte => encode_reg_imm_byte(base, operand_text),
        OperandKind::RstIndex => encode_rst(base, operand_text),
    }
}

enum ByteOrLabel {
    Known(u8),
    Label(LabelRef, BytePart),
}

fn is_label_start(text: &str) -> bool {
    text.chars().next().map_or(false, |c| c.is_ascii_alphabetic())
}

/// Parses one byte-sized value that may also be a bare label or a
/// `HIGH`/`LOW label` form deferred to pass 2 (spec.md §4.6, scenario 5).
fn parse_byte_or_label(text: &str) -> Result<ByteOrLabel, ErrorCode> {
    let text = text.trim();
    if let Ok(value) = number::parse_number(text) {
        return if value <= 0xFF {
            Ok(ByteOrLabel::Known(value as u8))
        } else {
            Err(ErrorCode::IllegalValue)
        };
    }

    let (part, label_text) = match strip_high_low(text) {
        Some((part, rest)) => (part, rest),
        None => (BytePart::Low, text),
    };

    if is_label_start(label_text) {
        Ok(ByteOrLabel::Label(LabelRef { name: label_text.to_owned(), offset: 0 }, part))
    } else {
        Err(ErrorCode::IllegalValue)
    }
}

fn strip_high_low(text: &str) -> Option<(BytePart, &str)> {
    let lower = text.to_ascii_uppercase();
    if let Some(rest) = lower.strip_prefix("HIGH") {
        if rest.starts_with(char::is_whitespace) {
            return Some((BytePart::High, text[4..].trim_start()));
        }
    }
    if let Some(rest) = lower.strip_prefix("LOW") {
        if rest.starts_with(char::is_whitespace) {
            return Some((BytePart::Low, text[3..].trim_start()));
        }
    }
    None
}

/// Parses a label possibly followed by a `+decimal` or `-decimal` offset
/// (spec.md §9's resolved ambiguity).
fn parse_label_ref(text: &str) -> Option<LabelRef> {
    let text = text.trim();
    if !is_label_start(text) {
        return None;
    }
    match text.find(['+', '-']) {
        None => Some(LabelRef { name: text.to_owned(), offset: 0 }),
        Some(pos) => {
            let (name, rest) = text.split_at(pos);
            let (sign, digits) = rest.split_at(1);
            let magnitude: i32 = digits.parse().ok()?;
            let offset = if sign == "-" { -magnitude } else { magnitude };
            Some(LabelRef { name: name.to_owned(), offset })
        }
    }
}

/// Parses a full 16-bit address operand: a number, or a label reference.
enum AddressOrLabel {
    Known(u16),
    Label(LabelRef),
}

fn parse_address_or_label(text: &str) -> Result<AddressOrLabel, ErrorCode> {
    let text = text.trim();
    if is_label_start(text) {
        return parse_label_ref(text).map(AddressOrLabel::Label).ok_or(ErrorCode::IllegalValue);
    }
    match number::parse_number(text) {
        Ok(value) if value <= 0xFFFF => Ok(AddressOrLabel::Known(value as u16)),
        _ => Err(ErrorCode::IllegalValue),
    }
}

fn encode_register(mnemonic: &str, base: u8, operand_text: &str) -> (ErrorCode, EncodeResult) {
    match instructions::register_code(operand_text.trim()) {
        Some(code) => {
            let adder = if mnemonic == "INR" || mnemonic == "DCR" { 8 * code } else { code };
            (ErrorCode::None, EncodeResult::Bytes(vec![ByteValue::Known(base.wrapping_add(adder))]))
        }
        None => (ErrorCode::IllegalRegister, EncodeResult::Bytes(vec![ByteValue::Known(base)])),
    }
}

fn encode_imm_byte(base: u8, operand_text: &str) -> (ErrorCode, EncodeResult) {
    match parse_byte_or_label(operand_text) {
        Ok(ByteOrLabel::Known(value)) => {
            (ErrorCode::None, EncodeResult::Bytes(vec![ByteValue::Known(base), ByteValue::Known(value)]))
        }
        Ok(ByteOrLabel::Label(label, part)) => (
            ErrorCode::None,
            EncodeResult::Bytes(vec![ByteValue::Known(base), ByteValue::SingleByte(label, part)]),
        ),
        Err(err) => (err, EncodeResult::Bytes(vec![ByteValue::Known(base), ByteValue::Known(0)])),
    }
}

fn encode_address(base: u8, operand_text: &str) -> (ErrorCode, EncodeResult) {
    match parse_address_or_label(operand_text) {
        Ok(AddressOrLabel::Known(addr)) => {
            let (lo, hi) = util::split_address(addr);
            (
                ErrorCode::None,
                EncodeResult::Bytes(vec![ByteValue::Known(base), ByteValue::Known(lo), ByteValue::Known(hi)]),
            )
        }
        Ok(AddressOrLabel::Label(label_ref)) => (
            ErrorCode::None,
            EncodeResult::Bytes(vec![
                ByteValue::Known(base),
                ByteValue::AddressLow(label_ref.clone()),
                ByteValue::AddressHigh(label_ref),
            ]),
        ),
        Err(err) => (
            err,
            EncodeResult::Bytes(vec![ByteValue::Known(base), ByteValue::Known(0), ByteValue::Known(0)]),
        ),
    }
}

fn encode_dw(operand_text: &str) -> (ErrorCode, EncodeResult) {
    match parse_address_or_label(operand_text) {
        Ok(AddressOrLabel::Known(addr)) => {
            let (lo, hi) = util::split_address(addr);
            (ErrorCode::None, EncodeResult::Bytes(vec![ByteValue::Known(lo), ByteValue::Known(hi)]))
        }
        Ok(AddressOrLabel::Label(label_ref)) => (
            ErrorCode::None,
            EncodeResult::Bytes(vec![ByteValue::AddressLow(label_ref.clone()), ByteValue::AddressHigh(label_ref)]),
        ),
        Err(err) => (err, EncodeResult::Bytes(vec![ByteValue::Known(0), ByteValue::Known(0)])),
    }
}

fn encode_ds(operand_text: &str) -> (ErrorCode, EncodeResult) {
    match number::parse_number(operand_text.trim()) {
        Ok(value) if value <= 0xFFFF => (ErrorCode::None, EncodeResult::Ds(value as u16)),
        _ => (ErrorCode::IllegalValue, EncodeResult::Empty),
    }
}

fn encode_org(operand_text: &str) -> (ErrorCode, EncodeResult) {
    match number::parse_number(operand_text.trim()) {
        Ok(value) if value <= 0xFFFF => (ErrorCode::None, EncodeResult::Org(value as u16)),
        _ => (ErrorCode::IllegalValue, EncodeResult::Empty),
    }
}

fn encode_reg_pair(base: u8, operand_text: &str) -> (ErrorCode, EncodeResult) {
    match instructions::register_pair_code(operand_text.trim()) {
        Some(code) => (ErrorCode::None, EncodeResult::Bytes(vec![ByteValue::Known(base.wrapping_add(16 * code))])),
        None => (ErrorCode::IllegalRegister, EncodeResult::Bytes(vec![ByteValue::Known(base)])),
    }
}

fn encode_reg_pair_bd(base: u8, operand_text: &str) -> (ErrorCode, EncodeResult) {
    match instructions::register_pair_bd_code(operand_text.trim()) {
        Some(code) => (ErrorCode::None, EncodeResult::Bytes(vec![ByteValue::Known(base.wrapping_add(16 * code))])),
        None => (ErrorCode::IllegalRegister, EncodeResult::Bytes(vec![ByteValue::Known(base)])),
    }
}

fn encode_reg_reg(base: u8, operand_text: &str) -> (ErrorCode, EncodeResult) {
    let parts: Vec<&str> = operand_text.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return (ErrorCode::IllegalRegister, EncodeResult::Bytes(vec![ByteValue::Known(base)]));
    }
    let ddd = instructions::register_code(parts[0]);
    let sss = instructions::register_code(parts[1]);
    match (ddd, sss) {
        (Some(6), Some(6)) | (None, _) | (_, None) => {
            (ErrorCode::IllegalRegister, EncodeResult::Bytes(vec![ByteValue::Known(base)]))
        }
        (Some(ddd), Some(sss)) => {
            (ErrorCode::None, EncodeResult::Bytes(vec![ByteValue::Known(base.wrapping_add(8 * ddd + sss))]))
        }
    }
}

fn encode_reg_pair_word(base: u8, operand_text: &str) -> (ErrorCode, EncodeResult) {
    let mut parts = operand_text.splitn(2, ',');
    let rp_text = parts.next().unwrap_or("").trim();
    let addr_text = parts.next();

    let rp = instructions::register_pair_code(rp_text);
    let mut error = ErrorCode::None;
    let base = match rp {
        Some(code) => base.wrapping_add(16 * code),
        None => {
            error = ErrorCode::IllegalRegister;
            base
        }
    };

    let addr = match addr_text {
        Some(text) => parse_address_or_label(text),
        None => Err(ErrorCode::IllegalValue),
    };

    match addr {
        Ok(AddressOrLabel::Known(addr)) => {
            let (lo, hi) = util::split_address(addr);
            (
                error,
                EncodeResult::Bytes(vec![ByteValue::Known(base), ByteValue::Known(lo), ByteValue::Known(hi)]),
            )
        }
        Ok(AddressOrLabel::Label(label_ref)) => (
            error,
            EncodeResult::Bytes(vec![
                ByteValue::Known(base),
                ByteValue::AddressLow(label_ref.clone()),
                ByteValue::AddressHigh(label_ref),
            ]),
        ),
        Err(value_err) => {
            if !error.is_error() {
                error = value_err;
            }
            (
                error,
                EncodeResult::Bytes(vec![ByteValue::Known(base), ByteValue::Known(0), ByteValue::Known(0)]),
            )
        }
    }
}

fn encode_reg_imm_byte(base: u8, operand_text: &str) -> (ErrorCode, EncodeResult) {
    let mut parts = operand_text.splitn(2, ',');
    let reg_text = parts.next().unwrap_or("").trim();
    let byte_text = parts.next();

    let ddd = instructions::register_code(reg_text);
    let mut error = ErrorCode::None;
    let base = match ddd {
        Some(code) => base.wrapping_add(8 * code),
        None => {
            error = ErrorCode::IllegalRegister;
            base
        }
    };

    let byte = match byte_text {
        Some(text) => parse_byte_or_label(text),
        None => Err(ErrorCode::IllegalValue),
    };

    match byte {
        Ok(ByteOrLabel::Known(value)) => {
            (error, EncodeResult::Bytes(vec![ByteValue::Known(base), ByteValue::Known(value)]))
        }
        Ok(ByteOrLabel::Label(label, part)) => {
            (error, EncodeResult::Bytes(vec![ByteValue::Known(base), ByteValue::SingleByte(label, part)]))
        }
        Err(value_err) => {
            if !error.is_error() {
                error = value_err;
            }
            (error, EncodeResult::Bytes(vec![ByteValue::Known(base), ByteValue::Known(0)]))
        }
    }
}

fn encode_rst(base: u8, operand_text: &str) -> (ErrorCode, EncodeResult) {
    let text = operand_text.trim();
    let mut chars = text.chars();
    let digit = match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_digit() => c.to_digit(10).unwrap(),
        _ => 8, // force the range check below to fail
    };
    if digit <= 7 {
        (ErrorCode::None, EncodeResult::Bytes(vec![ByteValue::Known(base.wrapping_add(8 * digit as u8))]))
    } else {
        (ErrorCode::IllegalValue, EncodeResult::Bytes(vec![ByteValue::Known(base)]))
    }
}

fn contains_symbol(ast: &ExprAst) -> bool {
    match ast {
        ExprAst::Num(_) => false,
        ExprAst::Sym(_) => true,
        ExprAst::Bin(_, lhs, rhs) => contains_symbol(lhs) || contains_symbol(rhs),
    }
}

/// A pure-numeric `EQU` (no symbol operands) resolves during pass 1; one
/// that references a symbol always defers to pass 2, even if that symbol
/// happens to already be defined (spec.md §9: mirrors the original, which
/// never attempts a pass-1 lookup for label operands).
fn encode_equ(label: &str, operand_text: &str) -> (ErrorCode, EncodeResult) {
    let ast = match number::parse_expr(operand_text.trim()) {
        Ok(ast) => ast,
        Err(NumberError) => return (ErrorCode::IllegalValue, EncodeResult::Empty),
    };

    if contains_symbol(&ast) {
        return (ErrorCode::None, EncodeResult::Equ(EquHole { label: label.to_owned(), ast }));
    }

    match number::eval_expr(&ast, |_| None) {
        number::EvalResult::Resolved(value) if value <= 0xFFFF => {
            (ErrorCode::None, EncodeResult::EquResolved(value as u16))
        }
        _ => (ErrorCode::IllegalValue, EncodeResult::Empty),
    }
}

/// `DB` operand list: numbers and quoted strings mixed with commas, with
/// commas inside `'...'` ignored (spec.md §4.4 table, §4.2 rule 5).
fn encode_db(operand_text: &str) -> (ErrorCode, EncodeResult) {
    let mut error = ErrorCode::None;
    let mut bytes = Vec::new();

    for element in split_db_elements(operand_text) {
        if let Some(literal) = element.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            // An empty quoted string contributes zero bytes, matching the
            // original's char-expansion loop running zero times over it.
            bytes.extend(literal.bytes());
            continue;
        }
        match number::parse_number(element.trim()) {
            Ok(value) if value <= 0xFF => bytes.push(value as u8),
            _ => {
                error = ErrorCode::IllegalValue;
                bytes.push(0);
            }
        }
    }

    (error, EncodeResult::DbBytes(bytes))
}

/// Splits a `DB` operand list on commas, treating commas inside a `'...'`
/// literal as literal characters rather than separators.
fn split_db_elements(text: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for c in text.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                current.push(c);
            }
            ',' if !in_quote => {
                elements.push(current.trim().to_owned());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    elements.push(current.trim().to_owned());
    elements
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn db_mixed_string_and_numeric_literals_all_equal() {
        let (err, result) = encode_db("'AB', 41H, 65, 101Q, 01000001B");
        assert_eq!(err, ErrorCode::None);
        match result {
            EncodeResult::DbBytes(bytes) => assert_eq!(bytes, vec![0x41, 0x42, 0x41, 0x41, 0x41, 0x41]),
            _ => panic!("expected DbBytes"),
        }
    }

    #[test]
    fn db_out_of_range_is_illegal_value() {
        let (err, _) = encode_db("256");
        assert_eq!(err, ErrorCode::IllegalValue);
    }

    #[test]
    fn rst_boundary() {
        assert_eq!(encode_rst(0xC7, "7").0, ErrorCode::None);
        assert_eq!(encode_rst(0xC7, "8").0, ErrorCode::IllegalValue);
    }

    #[test]
    fn mov_rejects_m_m() {
        let (err, _) = encode_reg_reg(0x40, "M,M");
        assert_eq!(err, ErrorCode::IllegalRegister);
    }

    #[test]
    fn high_low_defers_to_label_hole() {
        let (err, result) = encode_reg_imm_byte(0x06, "A, HIGH TBL");
        assert_eq!(err, ErrorCode::None);
        match result {
            EncodeResult::Bytes(bytes) => {
                assert_eq!(bytes[1], ByteValue::SingleByte(LabelRef { name: "TBL".into(), offset: 0 }, BytePart::High));
            }
            _ => panic!("expected Bytes"),
        }
    }
}

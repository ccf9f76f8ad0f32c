//! Pass 2 (spec.md §4.6): resolves every typed hole left by pass 1 against
//! the now-complete symbol table, and drops `EQU` symbols that never did.

use crate::number::{self, EvalResult};
use crate::record::{
    ByteValue, EmittedRow, ErrorCode, FinalRecord, LabelRef, ResolvedByte, ResolvedRow, SourceRecord,
};
use crate::symbols::SymbolTable;

pub struct Pass2Output {
    pub records: Vec<FinalRecord>,
    pub error_count: u32,
}

pub fn run(records: Vec<SourceRecord>, mut symbols: SymbolTable) -> (Pass2Output, SymbolTable) {
    // Resolve every EQU hole first; a later line may reference an earlier
    // one's label, but never the other way around (spec.md §4.6 scenario 3
    // only resolves symbols already defined, so a single left-to-right pass
    // over the pending holes mirrors the original's behavior).
    let mut pending_equ: Vec<(String, crate::number::ExprAst)> = Vec::new();
    for record in &records {
        if let Some(hole) = &record.equ {
            pending_equ.push((hole.label.clone(), hole.ast.clone()));
        }
    }
    for (label, ast) in pending_equ {
        match number::eval_expr(&ast, |name| symbols.lookup(name).map(u32::from)) {
            EvalResult::Resolved(value) if value <= 0xFFFF => symbols.set_value(&label, value as u16),
            _ => symbols.remove(&label),
        }
    }

    let mut error_count = 0;
    let mut out_records = Vec::with_capacity(records.len());

    for mut record in records {
        let equ_was_pending = record.equ.is_some();
        let equ_unresolved = match &record.equ {
            Some(hole) => symbols.lookup(&hole.label).is_none(),
            None => false,
        };
        if equ_was_pending && equ_unresolved {
            record.set_error(ErrorCode::UndefinedSymbol);
        }

        let rows: Vec<ResolvedRow> = record.rows.drain(..).map(|row| resolve_row(row, &symbols, &mut record.error)).collect();

        if record.error.is_error() {
            error_count += 1;
        }

        out_records.push(FinalRecord {
            line_no: record.line_no,
            error: record.error,
            label: record.label,
            mnemonic: record.mnemonic,
            operand_text: record.operand_text,
            comment: record.comment,
            rows,
        });
    }

    (Pass2Output { records: out_records, error_count }, symbols)
}

fn resolve_row(row: EmittedRow, symbols: &SymbolTable, error: &mut ErrorCode) -> ResolvedRow {
    let bytes = row
        .bytes
        .into_iter()
        .map(|value| resolve_byte(value, symbols, error))
        .collect();
    ResolvedRow { address: row.address, bytes }
}

fn resolve_label(label_ref: &LabelRef, symbols: &SymbolTable) -> Option<u16> {
    symbols.lookup(&label_ref.name).map(|base| base.wrapping_add(label_ref.offset as u16))
}

fn resolve_byte(value: ByteValue, symbols: &SymbolTable, error: &mut ErrorCode) -> ResolvedByte {
    match value {
        ByteValue::Known(b) => ResolvedByte::Value(b),
        ByteValue::AddressLow(label_ref) => match resolve_label(&label_ref, symbols) {
            Some(addr) => ResolvedByte::Value((addr & 0xFF) as u8),
            None => {
                set_undefined(error);
                ResolvedByte::Missing
            }
        },
        ByteValue::AddressHigh(label_ref) => match resolve_label(&label_ref, symbols) {
            Some(addr) => ResolvedByte::Value((addr >> 8) as u8),
            None => {
                set_undefined(error);
                ResolvedByte::Missing
            }
        },
        ByteValue::SingleByte(label_ref, part) => match resolve_label(&label_ref, symbols) {
            Some(addr) => {
                let byte = match part {
                    crate::record::BytePart::High => (addr >> 8) as u8,
                    crate::record::BytePart::Low => (addr & 0xFF) as u8,
                };
                ResolvedByte::Value(byte)
            }
            None => {
                set_undefined(error);
                ResolvedByte::Missing
            }
        },
    }
}

fn set_undefined(error: &mut ErrorCode) {
    if !error.is_error() {
        *error = ErrorCode::UndefinedSymbol;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pass1;

    #[test]
    fn forward_reference_resolves_to_the_label_defined_later() {
        let out1 = pass1::run("JMP LOOP\nLOOP: NOP");
        let (out2, _) = run(out1.records, out1.symbols);
        assert_eq!(out2.error_count, 0);
        let row = &out2.records[0].rows[0];
        assert_eq!(row.bytes[1], ResolvedByte::Value(1));
        assert_eq!(row.bytes[2], ResolvedByte::Value(0));
    }

    #[test]
    fn undefined_label_sets_error_and_leaves_placeholder_bytes() {
        let out1 = pass1::run("JMP NOWHERE");
        let (out2, _) = run(out1.records, out1.symbols);
        assert_eq!(out2.error_count, 1);
        assert_eq!(out2.records[0].error, ErrorCode::UndefinedSymbol);
        let row = &out2.records[0].rows[0];
        assert_eq!(row.bytes[1], ResolvedByte::Missing);
    }

    #[test]
    fn equ_referencing_undefined_symbol_is_dropped_from_the_table() {
        let out1 = pass1::run("VAL: EQU GHOST+1");
        let (out2, symbols) = run(out1.records, out1.symbols);
        assert_eq!(symbols.lookup("VAL"), None);
        assert_eq!(out2.records[0].error, ErrorCode::UndefinedSymbol);
    }

    #[test]
    fn equ_can_reference_an_earlier_equs_resolved_value() {
        let out1 = pass1::run("A: EQU 5\nB: EQU A+1");
        let (_, symbols) = run(out1.records, out1.symbols);
        assert_eq!(symbols.lookup("B"), Some(6));
    }
}

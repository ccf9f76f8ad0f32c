//! Pass 1 (spec.md §4.3): walks the source top to bottom, assigns every
//! label its address, encodes every instruction it can, and defers the rest
//! to pass 2 as typed holes.

use crate::encode::{self, EncodeResult};
use crate::instructions;
use crate::line;
use crate::record::{EmittedRow, ErrorCode, SourceRecord};
use crate::symbols::{InsertOutcome, SymbolTable};

/// Maximum bytes shown on one listing row; `DB` lists longer than this
/// spill onto continuation rows (spec.md §4.5 rule 3).
const MAX_ROW_BYTES: usize = 3;

pub struct Pass1Output {
    pub records: Vec<SourceRecord>,
    pub symbols: SymbolTable,
    pub error_count: u32,
}

pub fn run(source: &str) -> Pass1Output {
    let mut symbols = SymbolTable::new();
    let mut records = Vec::new();
    let mut pc: u16 = 0;
    let mut error_count: u32 = 0;

    for (i, raw) in source.lines().enumerate() {
        let line_no = (i + 1) as u32;
        let parsed = line::parse_line(raw);
        let mut record = SourceRecord::empty(line_no);
        record.comment = parsed.comment;

        let label_outcome = parsed.label.as_ref().map(|label| {
            record.label = label.clone();
            let outcome = symbols.insert(label, pc);
            if outcome == InsertOutcome::Duplicate {
                record.set_error(ErrorCode::DuplicateSymbol);
            }
            outcome
        });

        if let Some(mnemonic) = parsed.mnemonic {
            record.mnemonic = mnemonic.clone();
            record.operand_text = parsed.operand_text.clone();

            match instructions::lookup(&mnemonic) {
                None => record.set_error(ErrorCode::UndefinedOpcode),
                Some((base, kind)) => {
                    let (err, result) = encode::encode(&mnemonic, base, kind, &record.label, &parsed.operand_text);
                    record.set_error(err);
                    apply_result(result, &mut pc, &mut symbols, &mut record, label_outcome);

                    // A failed EQU (bad expression, division by zero, out-of-range
                    // result) leaves no hole to resolve in pass 2, so nothing would
                    // otherwise stop its label from keeping the pc value it was
                    // provisionally inserted with. Remove it instead of leaving a
                    // value the source line never actually assigned.
                    if mnemonic == "EQU" && record.error.is_error() && record.equ.is_none() {
                        if label_outcome == Some(InsertOutcome::Fresh) {
                            symbols.remove(&record.label);
                        }
                    }
                }
            }
        }

        if record.error.is_error() {
            error_count += 1;
        }
        records.push(record);
    }

    Pass1Output { records, symbols, error_count }
}

fn apply_result(
    result: EncodeResult,
    pc: &mut u16,
    symbols: &mut SymbolTable,
    record: &mut SourceRecord,
    label_outcome: Option<InsertOutcome>,
) {
    match result {
        EncodeResult::Bytes(bytes) => {
            let row = EmittedRow { address: *pc, bytes };
            *pc = pc.wrapping_add(row.bytes.len() as u16);
            record.rows.push(row);
        }
        EncodeResult::DbBytes(bytes) => {
            for chunk in bytes.chunks(MAX_ROW_BYTES) {
                let row = EmittedRow {
                    address: *pc,
                    bytes: chunk.iter().map(|&b| crate::record::ByteValue::Known(b)).collect(),
                };
                *pc = pc.wrapping_add(row.bytes.len() as u16);
                record.rows.push(row);
            }
        }
        EncodeResult::Ds(count) => *pc = pc.wrapping_add(count),
        EncodeResult::Org(address) => *pc = address,
        EncodeResult::EquResolved(value) => {
            // A duplicate label keeps its first value (spec.md §9); only a
            // fresh definition's EQU actually sets anything.
            if label_outcome == Some(InsertOutcome::Fresh) {
                symbols.set_value(&record.label, value);
            }
        }
        EncodeResult::Equ(hole) => {
            if label_outcome == Some(InsertOutcome::Fresh) {
                record.equ = Some(hole);
            }
        }
        EncodeResult::Empty => {}
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::ByteValue;

    #[test]
    fn label_gets_current_pc_before_its_own_instruction_advances_it() {
        let out = run("START: NOP\nLOOP: JMP START");
        assert_eq!(out.symbols.lookup("START"), Some(0));
        assert_eq!(out.symbols.lookup("LOOP"), Some(1));
    }

    #[test]
    fn undefined_opcode_sets_error_and_emits_nothing() {
        let out = run("FROB A,B");
        assert_eq!(out.error_count, 1);
        assert_eq!(out.records[0].error, ErrorCode::UndefinedOpcode);
        assert!(out.records[0].rows.is_empty());
    }

    #[test]
    fn db_list_longer_than_three_spills_to_continuation_rows() {
        let out = run("DB 1,2,3,4,5");
        let rows = &out.records[0].rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].address, 0);
        assert_eq!(rows[1].address, 3);
        assert_eq!(rows[0].bytes.len(), 3);
        assert_eq!(rows[1].bytes.len(), 2);
        assert_eq!(rows[1].bytes[0], ByteValue::Known(4));
    }

    #[test]
    fn org_sets_pc_and_ds_advances_it() {
        let out = run("ORG 100H\nDS 10\nHERE: NOP");
        assert_eq!(out.symbols.lookup("HERE"), Some(0x10A));
    }

    #[test]
    fn equ_resolves_immediately_when_operand_is_purely_numeric() {
        let out = run("VAL: EQU 5+3");
        assert_eq!(out.symbols.lookup("VAL"), Some(8));
        assert!(out.records[0].equ.is_none());
    }

    #[test]
    fn equ_with_symbol_operand_defers_to_pass_two() {
        let out = run("VAL: EQU OTHER+1");
        assert!(out.records[0].equ.is_some());
    }

    #[test]
    fn duplicate_label_keeps_first_equ_value() {
        let out = run("VAL: EQU 1\nVAL: EQU 2");
        assert_eq!(out.symbols.lookup("VAL"), Some(1));
        assert_eq!(out.records[1].error, ErrorCode::DuplicateSymbol);
    }
}

//! Two-pass assembler for the Intel 8080 and 8085 (spec.md §1-§2).
//!
//! [`assemble`] is the pure core: source text in, a complete
//! [`AssemblyOutput`] out. It never returns an `Err` — per-line problems are
//! data (the `ERR` column), not control flow (spec.md §7). Only file I/O,
//! performed by the `asm8080` binary, can fail.

pub mod encode;
pub mod error;
pub mod hex;
pub mod instructions;
pub mod line;
pub mod listing;
pub mod number;
pub mod pass1;
pub mod pass2;
pub mod record;
pub mod symbols;
pub mod util;

use record::{FinalRecord, SourceRecord};
use symbols::SymbolTable;

pub struct AssemblyOutput {
    /// Pass 1 records, kept around to materialize the provisional `.tmp`
    /// listing (spec.md §3: an inspection-only side effect, not reread).
    pub provisional_records: Vec<SourceRecord>,
    pub final_records: Vec<FinalRecord>,
    pub symbols: SymbolTable,
    pub error_count: u32,
}

impl AssemblyOutput {
    pub fn assembled_lines(&self) -> u32 {
        self.final_records.len() as u32
    }

    pub fn provisional_listing(&self) -> Vec<String> {
        self.provisional_records.iter().flat_map(listing::render_provisional).collect()
    }

    pub fn final_listing(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.final_records.iter().flat_map(listing::render_final).collect();
        lines.extend(listing::render_trailer(&self.symbols, self.error_count));
        lines
    }

    pub fn hex(&self) -> Option<Vec<String>> {
        hex::emit(&self.final_records, self.error_count)
    }
}

pub fn assemble(source: &str) -> AssemblyOutput {
    let pass1_output = pass1::run(source);
    let provisional_records = pass1_output.records.clone();
    let (pass2_output, symbols) = pass2::run(pass1_output.records, pass1_output.symbols);

    AssemblyOutput {
        provisional_records,
        final_records: pass2_output.records,
        symbols,
        error_count: pass2_output.error_count,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mvi_then_jmp_scenario() {
        let out = assemble("START: MVI   C,0A1H   ;load\n       JMP   START\n");
        assert_eq!(out.error_count, 0);
        assert_eq!(out.final_records[0].rows[0].address, 0);
        assert_eq!(out.final_records[1].rows[0].address, 2);
        let hex = out.hex().unwrap();
        assert_eq!(hex[0], ":020000000EA14F");
        assert_eq!(hex[1], ":03000200C3000038");
        assert_eq!(hex[2], ":00000001FF");
    }

    #[test]
    fn org_then_ds_then_hlt() {
        let out = assemble("ORG 100H\nDS 3\nHLT");
        assert_eq!(out.final_records[2].rows[0].address, 0x0103);
    }

    #[test]
    fn equ_with_arithmetic_then_use() {
        let out = assemble("VAL:  EQU 5+3\n      MVI A,VAL\n");
        assert_eq!(out.symbols.lookup("VAL"), Some(8));
        let row = &out.final_records[1].rows[0];
        assert_eq!(row.bytes[1], record::ResolvedByte::Value(0x08));
    }

    #[test]
    fn lxi_then_forward_referenced_db() {
        // TBL is defined right after the 3-byte LXI, so it resolves to address 3.
        let out = assemble("LXI H,TBL\nTBL: DB 1,2,3\n");
        let first = &out.final_records[0].rows[0];
        assert_eq!(first.bytes[1], record::ResolvedByte::Value(0x03));
        assert_eq!(first.bytes[2], record::ResolvedByte::Value(0x00));
        assert_eq!(out.final_records[1].rows[0].address, 3);
    }

    #[test]
    fn undefined_opcode_suppresses_hex_output() {
        let out = assemble("FROB A,B\n");
        assert_eq!(out.error_count, 1);
        assert!(out.hex().is_none());
        assert!(!out.final_listing().join("\n").is_empty());
    }
}

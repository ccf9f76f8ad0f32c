//! Intel HEX emitter (spec.md §4.7). Runs only when the assembly carries no
//! errors; one data record per emitted row, terminated by an EOF record.

use crate::record::{FinalRecord, ResolvedByte};

fn checksum(bytes: &[u8]) -> u8 {
    let sum: u8 = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (!sum).wrapping_add(1)
}

fn row_bytes(bytes: &[ResolvedByte]) -> Option<Vec<u8>> {
    bytes
        .iter()
        .map(|b| match b {
            ResolvedByte::Value(v) => Some(*v),
            ResolvedByte::Missing => None,
        })
        .collect()
}

fn data_record(address: u16, data: &[u8]) -> String {
    let mut payload = Vec::with_capacity(4 + data.len());
    payload.push(data.len() as u8);
    payload.push((address >> 8) as u8);
    payload.push((address & 0xFF) as u8);
    payload.push(0x00); // record type: data
    payload.extend_from_slice(data);

    let mut text = String::with_capacity(2 + payload.len() * 2 + 2);
    text.push(':');
    for b in &payload {
        text.push_str(&format!("{:02X}", b));
    }
    text.push_str(&format!("{:02X}", checksum(&payload)));
    text
}

/// Builds the Intel HEX records for a fully resolved assembly, or `None` if
/// any line carries an error (spec.md §4.7/§7: HEX emission is suppressed
/// entirely when `error_count != 0`).
pub fn emit(records: &[FinalRecord], error_count: u32) -> Option<Vec<String>> {
    if error_count != 0 {
        return None;
    }

    let mut lines = Vec::new();
    for record in records {
        for row in &record.rows {
            if let Some(data) = row_bytes(&row.bytes) {
                if !data.is_empty() && data.len() <= 3 {
                    lines.push(data_record(row.address, &data));
                }
            }
        }
    }
    lines.push(":00000001FF".to_owned());
    Some(lines)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::ResolvedRow;

    fn record(line_no: u32, address: u16, bytes: Vec<u8>) -> FinalRecord {
        FinalRecord {
            line_no,
            error: crate::record::ErrorCode::None,
            label: String::new(),
            mnemonic: String::new(),
            operand_text: String::new(),
            comment: String::new(),
            rows: vec![ResolvedRow { address, bytes: bytes.into_iter().map(ResolvedByte::Value).collect() }],
        }
    }

    #[test]
    fn mvi_then_jmp_scenario_matches_spec_example() {
        let records = vec![record(1, 0x0000, vec![0x0E, 0xA1]), record(2, 0x0002, vec![0xC3, 0x00, 0x00])];
        let lines = emit(&records, 0).unwrap();
        assert_eq!(lines[0], ":020000000EA14F");
        assert_eq!(lines[1], ":03000200C3000038");
        assert_eq!(lines[2], ":00000001FF");
    }

    #[test]
    fn every_record_checksums_to_zero() {
        let records = vec![record(1, 0x1234, vec![0xAB, 0xCD, 0xEF])];
        let lines = emit(&records, 0).unwrap();
        let hex = &lines[0][1..];
        let bytes: Vec<u8> = (0..hex.len()).step_by(2).map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap()).collect();
        let sum: u8 = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        assert_eq!(sum, 0);
    }

    #[test]
    fn errors_suppress_hex_output_entirely() {
        let records = vec![record(1, 0, vec![0x00])];
        assert!(emit(&records, 1).is_none());
    }

    #[test]
    fn terminates_with_eof_record() {
        let lines = emit(&[], 0).unwrap();
        assert_eq!(lines, vec![":00000001FF".to_owned()]);
    }
}

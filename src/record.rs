//! Source line record (spec.md §3) and the typed holes that stand in for
//! the original tool's textual `??` placeholders (spec.md §9 design note).

use crate::number::ExprAst;

/// One of the five error codes a line can carry, or none.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    None,
    UndefinedOpcode,
    IllegalValue,
    IllegalRegister,
    UndefinedSymbol,
    DuplicateSymbol,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::None => "",
            ErrorCode::UndefinedOpcode => "*O*",
            ErrorCode::IllegalValue => "*V*",
            ErrorCode::IllegalRegister => "*R*",
            ErrorCode::UndefinedSymbol => "*U*",
            ErrorCode::DuplicateSymbol => "*D*",
        }
    }

    pub fn is_error(self) -> bool {
        !matches!(self, ErrorCode::None)
    }
}

/// Which byte of a resolved 16-bit address a `SingleByte` hole wants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BytePart {
    High,
    Low,
}

/// A symbolic reference with an optional `+`/`-` decimal offset, e.g.
/// `TBL+2` (spec.md §9: adopts the "label [+|-] decimal_offset" rule).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LabelRef {
    pub name: String,
    pub offset: i32,
}

/// One emitted byte position: either already known, or waiting on a label
/// that pass 2 will have resolved by the time it reaches this record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ByteValue {
    Known(u8),
    AddressLow(LabelRef),
    AddressHigh(LabelRef),
    SingleByte(LabelRef, BytePart),
}

/// One printed listing row: an address and up to 3 (primary row) or more
/// (DB continuation rows are also capped at 3) byte positions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmittedRow {
    pub address: u16,
    pub bytes: Vec<ByteValue>,
}

/// A pending `EQU` definition: the label it defines and the expression that
/// must resolve before the symbol table holds a final value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EquHole {
    pub label: String,
    pub ast: ExprAst,
}

/// Pass 1 output for one source line; consumed by pass 2 (spec.md §3).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceRecord {
    pub line_no: u32,
    pub error: ErrorCode,
    pub label: String,
    pub mnemonic: String,
    pub operand_text: String,
    pub comment: String,
    /// Emitted rows in source order; empty when the line produces no bytes
    /// (comment-only, label-only, `ORG`, `DS`, resolved `EQU`).
    pub rows: Vec<EmittedRow>,
    /// Set only for `EQU` lines that could not be resolved during pass 1.
    pub equ: Option<EquHole>,
}

/// A byte position after pass 2: either resolved, or still missing because
/// its label was never defined (rendered as `--`, not `??` — spec.md §8's
/// "no final listing line contains '?'" invariant takes precedence over
/// the narrower "leave placeholder" wording in spec.md §4.6).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolvedByte {
    Value(u8),
    Missing,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedRow {
    pub address: u16,
    pub bytes: Vec<ResolvedByte>,
}

/// Pass 2 output for one source line: every hole has been replaced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FinalRecord {
    pub line_no: u32,
    pub error: ErrorCode,
    pub label: String,
    pub mnemonic: String,
    pub operand_text: String,
    pub comment: String,
    pub rows: Vec<ResolvedRow>,
}

impl SourceRecord {
    pub fn empty(line_no: u32) -> Self {
        SourceRecord {
            line_no,
            error: ErrorCode::None,
            label: String::new(),
            mnemonic: String::new(),
            operand_text: String::new(),
            comment: String::new(),
            rows: Vec::new(),
            equ: None,
        }
    }

    /// First error wins; a line with several error conditions still
    /// counts once toward the global total (spec.md §9 ambiguity list).
    pub fn set_error(&mut self, code: ErrorCode) {
        if !self.error.is_error() {
            self.error = code;
        }
    }
}

use serde::Serialize;

/// Per-line assembly failure. Collected by the assembler, never fatal to the pass.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AsmError {
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    #[error("{mnemonic} expects {expected} operand(s), got {got}")]
    BadOperandCount {
        mnemonic: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid register `{0}`")]
    InvalidRegister(String),
    #[error("invalid immediate `{0}`")]
    InvalidImmediate(String),
    #[error("immediate {value} out of range for {mnemonic}")]
    ImmediateOutOfRange { mnemonic: String, value: i64 },
    #[error("unsupported format for {0}")]
    UnsupportedFormat(String),
}

/// A catalog that would make decoding ambiguous, or a malformed entry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate mnemonic `{0}`")]
    DuplicateMnemonic(String),
    #[error("`{a}` and `{b}` both match word {word:#06x}")]
    Overlap { a: String, b: String, word: u16 },
    #[error("`{0}` is missing a field its format requires")]
    Incomplete(String),
}

/// A machine-code text line that is not a 16-bit hex word.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("line {line}: {text:?} is wider than 16 bits")]
    TooWide { line: usize, text: String },
    #[error("line {line}: bad machine word {text:?}")]
    BadWord { line: usize, text: String },
}

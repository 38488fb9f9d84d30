use thiserror::Error;

/// Every failure the core can report.
///
/// Operand errors are raised before any register or memory write, so the
/// CPU state is unchanged when one is returned. Table construction errors
/// leave no table behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Z80Error {
    #[error("invalid operand {operand}: {reason}")]
    InvalidOperand { operand: String, reason: String },

    #[error("no instruction decoded for opcode 0x{opcode:02X} at 0x{pc:04X}")]
    DecodeFailure { opcode: u8, pc: u16 },

    #[error("unknown register-code category '{0}'")]
    UnknownCategory(String),

    #[error("opcode pattern '{pattern}' expands to {bits} bits, expected 8")]
    PatternWidth { pattern: String, bits: usize },

    #[error("opcode key {key} of '{assembler}' is already registered")]
    TableConflict { key: String, assembler: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialize(String),
}

impl Z80Error {
    pub(crate) fn operand(operand: impl Into<String>, reason: impl Into<String>) -> Self {
        Z80Error::InvalidOperand {
            operand: operand.into(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for Z80Error {
    fn from(err: toml::de::Error) -> Self {
        Z80Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Z80Error {
    fn from(err: serde_json::Error) -> Self {
        Z80Error::Serialize(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Z80Error>;

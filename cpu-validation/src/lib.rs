use serde::{Deserialize, Serialize};

// --- Z80 scenario vectors ---

/// One scenario: registers and memory before, the number of instructions
/// to step, and the expected registers, memory and total T-states after.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Z80TestCase {
    pub name: String,
    pub initial: Z80CpuState,
    #[serde(rename = "final")]
    pub final_state: Z80CpuState,
    #[serde(default = "one")]
    pub steps: usize,
    pub cycles: u32,
}

fn one() -> usize {
    1
}

/// Register file as stored in the vectors. Missing fields are zero, so a
/// final state must list every register the scenario leaves non-zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Z80CpuState {
    pub pc: u16,
    pub sp: u16,
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub i: u8,
    pub r: u8,
    pub ix: u16,
    pub iy: u16,
    pub af_prime: u16,
    pub bc_prime: u16,
    pub de_prime: u16,
    pub hl_prime: u16,
    pub iff1: u8,
    pub iff2: u8,
    pub im: u8,
    pub halted: bool,
    /// `(address, value)` pairs. Initial entries are loaded, final entries
    /// are checked.
    pub ram: Vec<(u16, u8)>,
}

/// Parse a JSON array of scenarios.
pub fn parse_cases(json: &str) -> Result<Vec<Z80TestCase>, serde_json::Error> {
    serde_json::from_str(json)
}

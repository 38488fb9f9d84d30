//! Declarative instruction templates and their expansion.
//!
//! A template describes a family of opcodes sharing one bit-pattern
//! skeleton, e.g. `LD {0},{1}` with opcode `01{0}{1}` over categories
//! `["r", "r"]`. Expansion walks the Cartesian product of the categories,
//! substituting binary codes into the opcode patterns and names into the
//! assembler and operation text.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::cpu::z80::registers::{Flag, Reg8, Reg16};
use crate::cpu::z80::{Flow, Z80};
use crate::error::{Result, Z80Error};

/// Operation body: runs against the CPU with the expanded arguments.
pub type Exec = for<'a> fn(&mut Z80, Args<'a>) -> Result<Flow>;

/// Operand bytes that follow or sit between opcode bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Operand {
    #[serde(rename = "n")]
    N, // Immediate byte
    #[serde(rename = "d")]
    D, // Index displacement
    #[serde(rename = "e")]
    E, // Relative jump offset
    #[serde(rename = "nl")]
    Nl, // Low byte of a 16-bit immediate
    #[serde(rename = "nh")]
    Nh, // High byte of a 16-bit immediate
}

impl Operand {
    pub fn marker(self) -> &'static str {
        match self {
            Operand::N => "n",
            Operand::D => "d",
            Operand::E => "e",
            Operand::Nl => "nl",
            Operand::Nh => "nh",
        }
    }
}

/// One byte position of a template's encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Byte(u8),
    Pattern(&'static str),
    Operand(Operand),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Byte(b) => write!(f, "{:02x}", b),
            Slot::Pattern(p) => f.write_str(p),
            Slot::Operand(op) => f.write_str(op.marker()),
        }
    }
}

pub const N: Slot = Slot::Operand(Operand::N);
pub const D: Slot = Slot::Operand(Operand::D);
pub const E: Slot = Slot::Operand(Operand::E);
pub const NL: Slot = Slot::Operand(Operand::Nl);
pub const NH: Slot = Slot::Operand(Operand::Nh);

/// One byte position of an expanded instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Code {
    Byte(u8),
    Operand(Operand),
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Byte(b) => write!(f, "{:02x}", b),
            Code::Operand(op) => write!(f, "{:2}", op.marker()),
        }
    }
}

/// T-states reported for one execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    Fixed(u8),
    /// `taken` applies when the body jumped or repeated.
    Branch { taken: u8, not_taken: u8 },
}

impl Timing {
    pub fn cycles(self, flow: Flow) -> u32 {
        match self {
            Timing::Fixed(t) => t as u32,
            Timing::Branch { taken, not_taken } => match flow {
                Flow::Advance => not_taken as u32,
                Flow::Repeat | Flow::Jump => taken as u32,
            },
        }
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timing::Fixed(t) => write!(f, "{}", t),
            Timing::Branch { taken, not_taken } => write!(f, "{}/{}", taken, not_taken),
        }
    }
}

/// Branch and return conditions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    NZ,
    Z,
    NC,
    C,
    PO,
    PE,
    P,
    M,
}

impl Condition {
    pub fn holds(self, f: u8) -> bool {
        let set = |flag: Flag| f & flag as u8 != 0;
        match self {
            Condition::NZ => !set(Flag::Z),
            Condition::Z => set(Flag::Z),
            Condition::NC => !set(Flag::C),
            Condition::C => set(Flag::C),
            Condition::PO => !set(Flag::PV),
            Condition::PE => set(Flag::PV),
            Condition::P => !set(Flag::S),
            Condition::M => set(Flag::S),
        }
    }
}

/// Value a category name expands to, handed to the operation body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arg {
    Reg(Reg8),
    Bit(u8),
    Pair(Reg16),
    Cond(Condition),
    Vector(u8),
}

/// Register-code categories a template can expand over.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Category {
    R,
    B,
    Dd,
    Qq,
    Ss,
    Pp,
    Rr,
    Ii,
    Cc,
    Jj,
    P,
}

const R_CODES: &[(&str, &str, Arg)] = &[
    ("B", "000", Arg::Reg(Reg8::B)),
    ("C", "001", Arg::Reg(Reg8::C)),
    ("D", "010", Arg::Reg(Reg8::D)),
    ("E", "011", Arg::Reg(Reg8::E)),
    ("H", "100", Arg::Reg(Reg8::H)),
    ("L", "101", Arg::Reg(Reg8::L)),
    ("A", "111", Arg::Reg(Reg8::A)),
];

const B_CODES: &[(&str, &str, Arg)] = &[
    ("0", "000", Arg::Bit(0)),
    ("1", "001", Arg::Bit(1)),
    ("2", "010", Arg::Bit(2)),
    ("3", "011", Arg::Bit(3)),
    ("4", "100", Arg::Bit(4)),
    ("5", "101", Arg::Bit(5)),
    ("6", "110", Arg::Bit(6)),
    ("7", "111", Arg::Bit(7)),
];

// dd and ss share codes; they differ only in where the manual uses them.
const DD_CODES: &[(&str, &str, Arg)] = &[
    ("BC", "00", Arg::Pair(Reg16::BC)),
    ("DE", "01", Arg::Pair(Reg16::DE)),
    ("HL", "10", Arg::Pair(Reg16::HL)),
    ("SP", "11", Arg::Pair(Reg16::SP)),
];

const QQ_CODES: &[(&str, &str, Arg)] = &[
    ("BC", "00", Arg::Pair(Reg16::BC)),
    ("DE", "01", Arg::Pair(Reg16::DE)),
    ("HL", "10", Arg::Pair(Reg16::HL)),
    ("AF", "11", Arg::Pair(Reg16::AF)),
];

const PP_CODES: &[(&str, &str, Arg)] = &[
    ("BC", "00", Arg::Pair(Reg16::BC)),
    ("DE", "01", Arg::Pair(Reg16::DE)),
    ("IX", "10", Arg::Pair(Reg16::IX)),
    ("SP", "11", Arg::Pair(Reg16::SP)),
];

const RR_CODES: &[(&str, &str, Arg)] = &[
    ("BC", "00", Arg::Pair(Reg16::BC)),
    ("DE", "01", Arg::Pair(Reg16::DE)),
    ("IY", "10", Arg::Pair(Reg16::IY)),
    ("SP", "11", Arg::Pair(Reg16::SP)),
];

// Fills "11{0}101" to produce the 0xDD / 0xFD prefixes.
const II_CODES: &[(&str, &str, Arg)] = &[
    ("IX", "011", Arg::Pair(Reg16::IX)),
    ("IY", "111", Arg::Pair(Reg16::IY)),
];

const CC_CODES: &[(&str, &str, Arg)] = &[
    ("NZ", "000", Arg::Cond(Condition::NZ)),
    ("Z", "001", Arg::Cond(Condition::Z)),
    ("NC", "010", Arg::Cond(Condition::NC)),
    ("C", "011", Arg::Cond(Condition::C)),
    ("PO", "100", Arg::Cond(Condition::PO)),
    ("PE", "101", Arg::Cond(Condition::PE)),
    ("P", "110", Arg::Cond(Condition::P)),
    ("M", "111", Arg::Cond(Condition::M)),
];

const JJ_CODES: &[(&str, &str, Arg)] = &[
    ("NZ", "00", Arg::Cond(Condition::NZ)),
    ("Z", "01", Arg::Cond(Condition::Z)),
    ("NC", "10", Arg::Cond(Condition::NC)),
    ("C", "11", Arg::Cond(Condition::C)),
];

const P_CODES: &[(&str, &str, Arg)] = &[
    ("00H", "000", Arg::Vector(0x00)),
    ("08H", "001", Arg::Vector(0x08)),
    ("10H", "010", Arg::Vector(0x10)),
    ("18H", "011", Arg::Vector(0x18)),
    ("20H", "100", Arg::Vector(0x20)),
    ("28H", "101", Arg::Vector(0x28)),
    ("30H", "110", Arg::Vector(0x30)),
    ("38H", "111", Arg::Vector(0x38)),
];

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::R => "r",
            Category::B => "b",
            Category::Dd => "dd",
            Category::Qq => "qq",
            Category::Ss => "ss",
            Category::Pp => "pp",
            Category::Rr => "rr",
            Category::Ii => "ii",
            Category::Cc => "cc",
            Category::Jj => "jj",
            Category::P => "p",
        }
    }

    /// `(name, binary code, argument)` for every member of the category.
    pub fn codes(self) -> &'static [(&'static str, &'static str, Arg)] {
        match self {
            Category::R => R_CODES,
            Category::B => B_CODES,
            Category::Dd | Category::Ss => DD_CODES,
            Category::Qq => QQ_CODES,
            Category::Pp => PP_CODES,
            Category::Rr => RR_CODES,
            Category::Ii => II_CODES,
            Category::Cc => CC_CODES,
            Category::Jj => JJ_CODES,
            Category::P => P_CODES,
        }
    }
}

impl FromStr for Category {
    type Err = Z80Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" => Ok(Category::R),
            "b" => Ok(Category::B),
            "dd" => Ok(Category::Dd),
            "qq" => Ok(Category::Qq),
            "ss" => Ok(Category::Ss),
            "pp" => Ok(Category::Pp),
            "rr" => Ok(Category::Rr),
            "ii" => Ok(Category::Ii),
            "cc" => Ok(Category::Cc),
            "jj" => Ok(Category::Jj),
            "p" => Ok(Category::P),
            _ => Err(Z80Error::UnknownCategory(s.to_string())),
        }
    }
}

/// Expanded arguments as seen by an operation body.
#[derive(Copy, Clone, Debug)]
pub struct Args<'a>(pub &'a [Arg]);

impl Args<'_> {
    fn get(&self, i: usize) -> Result<Arg> {
        self.0
            .get(i)
            .copied()
            .ok_or_else(|| Z80Error::operand(format!("{{{}}}", i), "missing template argument"))
    }

    pub fn reg(&self, i: usize) -> Result<Reg8> {
        match self.get(i)? {
            Arg::Reg(r) => Ok(r),
            other => Err(Z80Error::operand(format!("{:?}", other), "expected an 8-bit register")),
        }
    }

    pub fn bit(&self, i: usize) -> Result<u8> {
        match self.get(i)? {
            Arg::Bit(b) if b < 8 => Ok(b),
            other => Err(Z80Error::operand(format!("{:?}", other), "expected a bit index 0..=7")),
        }
    }

    pub fn pair(&self, i: usize) -> Result<Reg16> {
        match self.get(i)? {
            Arg::Pair(r) => Ok(r),
            other => Err(Z80Error::operand(format!("{:?}", other), "expected a 16-bit register")),
        }
    }

    pub fn cond(&self, i: usize) -> Result<Condition> {
        match self.get(i)? {
            Arg::Cond(c) => Ok(c),
            other => Err(Z80Error::operand(format!("{:?}", other), "expected a condition")),
        }
    }

    pub fn vector(&self, i: usize) -> Result<u8> {
        match self.get(i)? {
            Arg::Vector(v) => Ok(v),
            other => Err(Z80Error::operand(format!("{:?}", other), "expected a restart vector")),
        }
    }
}

/// Immutable description of an opcode family.
#[derive(Clone, Copy)]
pub struct Template {
    pub assembler: &'static str,
    pub opcode: &'static [Slot],
    pub expand: &'static [&'static str],
    pub timing: Timing,
    pub operation: &'static str,
    pub exec: Exec,
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("assembler", &self.assembler)
            .field("opcode", &self.opcode)
            .field("expand", &self.expand)
            .field("timing", &self.timing)
            .finish()
    }
}

/// A named list of templates, registered together.
#[derive(Debug, Clone, Copy)]
pub struct Group {
    pub name: &'static str,
    pub templates: &'static [Template],
}

/// One tuple of the Cartesian product, fully substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub assembler: String,
    pub operation: String,
    pub opcode: Vec<Code>,
    /// `(offset, byte)` of every opcode byte, in stream order.
    pub key: Vec<(u16, u8)>,
    pub size: u16,
    pub args: Vec<Arg>,
}

/// Replace `{i}` with `values[i]`. Unknown indexes are left as written.
pub(crate) fn fill(pattern: &str, values: &[&str]) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let value = tail
            .find('}')
            .and_then(|end| tail[1..end].parse::<usize>().ok().map(|i| (i, end)))
            .and_then(|(i, end)| values.get(i).map(|v| (*v, end)));
        match value {
            Some((v, end)) => {
                out.push_str(v);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn encode_pattern(pattern: &str, codes: &[&str]) -> Result<u8> {
    let bits = fill(pattern, codes);
    if bits.len() != 8 || !bits.chars().all(|c| c == '0' || c == '1') {
        return Err(Z80Error::PatternWidth { bits: bits.len(), pattern: bits });
    }
    u8::from_str_radix(&bits, 2).map_err(|_| Z80Error::PatternWidth { bits: 8, pattern: bits })
}

impl Template {
    pub const fn new(
        assembler: &'static str,
        opcode: &'static [Slot],
        expand: &'static [&'static str],
        timing: Timing,
        operation: &'static str,
        exec: Exec,
    ) -> Self {
        Self { assembler, opcode, expand, timing, operation, exec }
    }

    pub fn categories(&self) -> Result<Vec<Category>> {
        self.expand.iter().map(|name| name.parse()).collect()
    }

    /// Expand into one concrete encoding per category tuple, first category
    /// varying slowest.
    pub fn expand(&self) -> Result<Vec<Expansion>> {
        let categories = self.categories()?;

        let mut tuples: Vec<Vec<(&'static str, &'static str, Arg)>> = vec![Vec::new()];
        for category in &categories {
            tuples = tuples
                .into_iter()
                .flat_map(|prefix| {
                    category.codes().iter().map(move |&entry| {
                        let mut next = prefix.clone();
                        next.push(entry);
                        next
                    })
                })
                .collect();
        }

        tuples
            .into_iter()
            .map(|tuple| -> Result<Expansion> {
                let names: Vec<&str> = tuple.iter().map(|(name, _, _)| *name).collect();
                let codes: Vec<&str> = tuple.iter().map(|(_, code, _)| *code).collect();

                let mut opcode = Vec::with_capacity(self.opcode.len());
                let mut key = Vec::new();
                for (offset, slot) in self.opcode.iter().enumerate() {
                    let code = match *slot {
                        Slot::Byte(b) => Code::Byte(b),
                        Slot::Pattern(p) => Code::Byte(encode_pattern(p, &codes)?),
                        Slot::Operand(op) => Code::Operand(op),
                    };
                    if let Code::Byte(b) = code {
                        key.push((offset as u16, b));
                    }
                    opcode.push(code);
                }

                Ok(Expansion {
                    assembler: fill(self.assembler, &names),
                    operation: fill(self.operation, &names),
                    size: opcode.len() as u16,
                    opcode,
                    key,
                    args: tuple.iter().map(|(_, _, arg)| *arg).collect(),
                })
            })
            .collect()
    }
}

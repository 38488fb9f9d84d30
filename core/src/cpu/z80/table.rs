//! Dispatch table built from instruction templates.
//!
//! The table is a byte trie. Each nested node remembers the
//! instruction-relative offset of the byte that selects among its children:
//! offset 1 below the `CB`/`ED`/`DD`/`FD` prefixes, offset 3 below
//! `DD CB` / `FD CB` where the displacement sits between the prefix pair and
//! the final opcode byte.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use log::debug;

use crate::cpu::z80::template::{Arg, Args, Code, Exec, Group, Timing};
use crate::cpu::z80::{Flow, GROUPS, Z80};
use crate::error::{Result, Z80Error};

/// Group name reported for undefined prefixed opcodes.
pub const UNDEFINED_GROUP: &str = "undefined";

/// One fully resolved opcode.
pub struct Instruction {
    pub assembler: String,
    pub operation: String,
    pub opcode: Vec<Code>,
    pub size: u16,
    pub timing: Timing,
    pub group: &'static str,
    /// Opcode bytes fetched through the M1 cycle, counted for R refresh.
    pub fetches: u8,
    args: Vec<Arg>,
    exec: Exec,
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("assembler", &self.assembler)
            .field("opcode", &self.opcode)
            .field("size", &self.size)
            .field("timing", &self.timing)
            .finish()
    }
}

impl Instruction {
    pub fn args(&self) -> Args<'_> {
        Args(&self.args)
    }

    pub fn execute(&self, cpu: &mut Z80) -> Result<Flow> {
        (self.exec)(cpu, self.args())
    }

    pub fn is_undefined(&self) -> bool {
        self.group == UNDEFINED_GROUP
    }

    /// Opcode bytes as "dd 7e d " style text.
    pub fn opcode_text(&self) -> String {
        self.opcode.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" ")
    }
}

fn undefined_nop(_: &mut Z80, _: Args<'_>) -> Result<Flow> {
    Ok(Flow::Advance)
}

enum Node {
    Leaf(usize),
    Branch(Box<Branch>),
}

struct Branch {
    offset: u16,
    children: Vec<Option<Node>>,
}

impl Branch {
    fn new(offset: u16) -> Self {
        Self {
            offset,
            children: (0..256).map(|_| None).collect(),
        }
    }
}

/// Templates as registered, with the indexes of their instructions.
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub group: &'static str,
    pub template: crate::cpu::z80::template::Template,
    pub instructions: Vec<usize>,
}

pub struct OpcodeTable {
    root: Branch,
    /// Template instructions first, then the undefined placeholders.
    instructions: Vec<Instruction>,
    defined: usize,
    templates: Vec<TemplateEntry>,
    groups: Vec<&'static str>,
    /// Placeholder index keyed by size.
    undefined: BTreeMap<u16, usize>,
}

/// Shared handle to one instruction of a table.
#[derive(Clone)]
pub struct Fetched {
    table: Arc<OpcodeTable>,
    id: usize,
}

impl Fetched {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Deref for Fetched {
    type Target = Instruction;

    fn deref(&self) -> &Instruction {
        &self.table.instructions[self.id]
    }
}

impl fmt::Debug for Fetched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

impl fmt::Debug for OpcodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpcodeTable")
            .field("groups", &self.groups)
            .field("instructions", &self.instructions.len())
            .finish()
    }
}

fn format_key(key: &[(u16, u8)]) -> String {
    key.iter().map(|(_, b)| format!("{:02X}", b)).collect::<Vec<_>>().join(" ")
}

static STANDARD: OnceLock<Result<Arc<OpcodeTable>>> = OnceLock::new();

impl OpcodeTable {
    /// Expand every template of every group and register the results.
    ///
    /// Fails on an unknown category, a pattern of the wrong width, or two
    /// encodings claiming the same key.
    pub fn build(groups: &[Group]) -> Result<Self> {
        let mut table = Self {
            root: Branch::new(0),
            instructions: Vec::new(),
            defined: 0,
            templates: Vec::new(),
            groups: Vec::new(),
            undefined: BTreeMap::new(),
        };

        for group in groups {
            let before = table.instructions.len();
            table.groups.push(group.name);
            for template in group.templates {
                let mut ids = Vec::new();
                for expansion in template.expand()? {
                    let instruction = Instruction {
                        fetches: expansion.key.iter().take(2).count() as u8,
                        assembler: expansion.assembler,
                        operation: expansion.operation,
                        opcode: expansion.opcode,
                        size: expansion.size,
                        timing: template.timing,
                        group: group.name,
                        args: expansion.args,
                        exec: template.exec,
                    };
                    let id = table.instructions.len();
                    table.insert(&expansion.key, id, &instruction.assembler)?;
                    table.instructions.push(instruction);
                    ids.push(id);
                }
                table.templates.push(TemplateEntry {
                    group: group.name,
                    template: *template,
                    instructions: ids,
                });
            }
            debug!("{}: {} instructions", group.name, table.instructions.len() - before);
        }

        table.defined = table.instructions.len();
        let mut sizes = Vec::new();
        Self::collect_branch_sizes(&table.root, &mut sizes);
        for size in sizes {
            if table.undefined.contains_key(&size) {
                continue;
            }
            table.undefined.insert(size, table.instructions.len());
            table.instructions.push(Instruction {
                assembler: format!("NOP{}", size),
                operation: String::new(),
                opcode: Vec::new(),
                size,
                timing: Timing::Fixed(8),
                group: UNDEFINED_GROUP,
                fetches: 2,
                args: Vec::new(),
                exec: undefined_nop,
            });
        }

        debug!("opcode table: {} instructions", table.defined);
        Ok(table)
    }

    /// The full instruction set, built on first use and shared afterwards.
    pub fn standard() -> Result<Arc<OpcodeTable>> {
        STANDARD
            .get_or_init(|| OpcodeTable::build(GROUPS).map(Arc::new))
            .clone()
    }

    fn insert(&mut self, key: &[(u16, u8)], id: usize, assembler: &str) -> Result<()> {
        let conflict = || Z80Error::TableConflict {
            key: format_key(key),
            assembler: assembler.to_string(),
        };
        let Some((&last, path)) = key.split_last() else {
            return Err(conflict());
        };

        let mut node = &mut self.root;
        for (i, &(offset, byte)) in path.iter().enumerate() {
            if node.offset != offset {
                return Err(conflict());
            }
            let next_offset = key[i + 1].0;
            let slot = &mut node.children[byte as usize];
            if slot.is_none() {
                *slot = Some(Node::Branch(Box::new(Branch::new(next_offset))));
            }
            node = match slot {
                Some(Node::Branch(branch)) => &mut **branch,
                _ => return Err(conflict()),
            };
        }

        let (offset, byte) = last;
        if node.offset != offset {
            return Err(conflict());
        }
        let slot = &mut node.children[byte as usize];
        if slot.is_some() {
            return Err(conflict());
        }
        *slot = Some(Node::Leaf(id));
        Ok(())
    }

    fn collect_branch_sizes(branch: &Branch, sizes: &mut Vec<u16>) {
        for child in branch.children.iter().flatten() {
            if let Node::Branch(nested) = child {
                sizes.push(nested.offset + 1);
                Self::collect_branch_sizes(nested, sizes);
            }
        }
    }

    /// Resolve the instruction whose first byte is at `pc`.
    ///
    /// `read` returns the byte at an address. A nested node without an entry
    /// yields the no-op placeholder sized to cover the whole prefixed form; a
    /// primary byte without an entry is a decode failure.
    pub fn decode(&self, pc: u16, read: impl Fn(u16) -> u8) -> Result<&Instruction> {
        let id = self.decode_id(pc, read)?;
        Ok(&self.instructions[id])
    }

    /// Like [`decode`](Self::decode), returning a handle that keeps the
    /// table alive.
    pub fn fetch(self: &Arc<Self>, pc: u16, read: impl Fn(u16) -> u8) -> Result<Fetched> {
        let id = self.decode_id(pc, read)?;
        Ok(Fetched { table: Arc::clone(self), id })
    }

    fn decode_id(&self, pc: u16, read: impl Fn(u16) -> u8) -> Result<usize> {
        let mut branch = &self.root;
        loop {
            let byte = read(pc.wrapping_add(branch.offset));
            match &branch.children[byte as usize] {
                Some(Node::Leaf(id)) => return Ok(*id),
                Some(Node::Branch(nested)) => branch = &**nested,
                None if branch.offset == 0 => {
                    return Err(Z80Error::DecodeFailure { opcode: byte, pc });
                }
                None => {
                    return self
                        .undefined
                        .get(&(branch.offset + 1))
                        .copied()
                        .ok_or(Z80Error::DecodeFailure { opcode: byte, pc });
                }
            }
        }
    }

    /// Decode from a byte slice holding one encoding, starting at index 0.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<&Instruction> {
        self.decode(0, |addr| bytes.get(addr as usize).copied().unwrap_or(0))
    }

    pub fn groups(&self) -> &[&'static str] {
        &self.groups
    }

    pub fn templates(&self) -> &[TemplateEntry] {
        &self.templates
    }

    /// Every instruction expanded from a template, in registration order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions[..self.defined]
    }

    pub fn instruction(&self, id: usize) -> Option<&Instruction> {
        self.instructions().get(id)
    }

    pub fn len(&self) -> usize {
        self.defined
    }

    pub fn is_empty(&self) -> bool {
        self.defined == 0
    }
}

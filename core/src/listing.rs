//! Read-only views of an [`OpcodeTable`] for inspection front ends.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cpu::z80::table::{Instruction, OpcodeTable};
use crate::cpu::z80::template::{Code, Timing, fill};
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct InstructionListing {
    pub opcode: Vec<Code>,
    pub assembler: String,
    pub operation: String,
    pub size: u16,
    pub timing: Timing,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateListing {
    /// Assembler pattern with category names in place of `{i}`.
    pub assembler: String,
    pub opcode: Vec<String>,
    pub expand: Vec<&'static str>,
    pub timing: Timing,
    pub instructions: Vec<InstructionListing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupListing {
    pub name: &'static str,
    pub templates: Vec<TemplateListing>,
}

/// Assembler tokens: mnemonic, then each operand.
#[derive(Debug, Clone, Default)]
struct TokenTree(BTreeMap<String, TokenTree>);

impl TokenTree {
    fn insert(&mut self, tokens: &[&str]) {
        if let Some((first, rest)) = tokens.split_first() {
            self.0.entry(first.to_string()).or_default().insert(rest);
        }
    }
}

fn tokens(assembler: &str) -> Vec<&str> {
    match assembler.split_once(' ') {
        Some((mnemonic, operands)) => {
            let mut out = vec![mnemonic];
            out.extend(operands.split(','));
            out
        }
        None => vec![assembler],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub groups: Vec<GroupListing>,
    #[serde(skip)]
    tree: TokenTree,
}

impl InstructionListing {
    fn new(instr: &Instruction) -> Self {
        Self {
            opcode: instr.opcode.clone(),
            assembler: instr.assembler.clone(),
            operation: instr.operation.clone(),
            size: instr.size,
            timing: instr.timing,
        }
    }
}

impl Listing {
    pub fn new(table: &OpcodeTable) -> Self {
        let mut groups: Vec<GroupListing> = table
            .groups()
            .iter()
            .map(|&name| GroupListing { name, templates: Vec::new() })
            .collect();

        for entry in table.templates() {
            let template = &entry.template;
            let listing = TemplateListing {
                assembler: fill(template.assembler, template.expand),
                opcode: template.opcode.iter().map(|slot| slot.to_string()).collect(),
                expand: template.expand.to_vec(),
                timing: template.timing,
                instructions: entry
                    .instructions
                    .iter()
                    .filter_map(|&id| table.instruction(id))
                    .map(InstructionListing::new)
                    .collect(),
            };
            if let Some(group) = groups.iter_mut().find(|g| g.name == entry.group) {
                group.templates.push(listing);
            }
        }

        let mut tree = TokenTree::default();
        for instr in table.instructions() {
            tree.insert(&tokens(&instr.assembler));
        }

        Self { groups, tree }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.groups)?)
    }

    /// Boxed group names, underlined template headers and one row per
    /// instruction.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        for group in &self.groups {
            if !out.is_empty() {
                out.push('\n');
            }
            let rule = format!("+-{}-+\n", "-".repeat(group.name.len()));
            out.push_str(&rule);
            out.push_str(&format!("| {} |\n", group.name));
            out.push_str(&rule);
            for template in &group.templates {
                let underline = "-".repeat(template.assembler.len());
                out.push_str(&format!("\n{}\n{}\n", template.assembler, underline));
                for instr in &template.instructions {
                    let codes: Vec<String> = instr.opcode.iter().map(|c| c.to_string()).collect();
                    out.push_str(&format!("{:12} {:<15} \n", codes.join(" "), instr.assembler));
                }
            }
        }
        out
    }

    /// Candidates for the token being typed at the end of `line`.
    ///
    /// Tokens are whitespace separated: mnemonic first, then one token per
    /// operand. A line ending in whitespace asks for the next token.
    pub fn complete(&self, line: &str) -> Vec<String> {
        let mut words: Vec<&str> = line.split_whitespace().collect();
        if line.is_empty() || line.ends_with(char::is_whitespace) {
            words.push("");
        }
        let Some((partial, path)) = words.split_last() else {
            return Vec::new();
        };

        let mut node = &self.tree;
        for word in path {
            match node.0.get(*word) {
                Some(next) => node = next,
                None => return Vec::new(),
            }
        }
        node.0.keys().filter(|k| k.starts_with(partial)).cloned().collect()
    }
}

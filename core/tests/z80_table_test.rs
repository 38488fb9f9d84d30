use std::sync::Arc;

use z80table_core::cpu::z80::{Args, Code, Flow, GROUPS, Group, OpcodeTable, Slot, Template, Timing, Z80};
use z80table_core::error::{Result, Z80Error};

fn encoding(opcode: &[Code]) -> Vec<u8> {
    opcode
        .iter()
        .map(|code| match code {
            Code::Byte(b) => *b,
            Code::Operand(_) => 0x00,
        })
        .collect()
}

// ============================================================
// Standard table
// ============================================================

#[test]
fn test_standard_table_groups_in_order() {
    let table = OpcodeTable::standard().expect("standard table should build");
    assert_eq!(
        table.groups(),
        &[
            "8 bit load group",
            "16 bit load group",
            "exchange group",
            "block transfer group",
            "search group",
            "8 bit arithmetic group",
            "general purpose group",
            "16 bit arithmetic group",
            "rotate and shift group",
            "bit set reset test group",
            "jump group",
            "call and return group",
        ]
    );
    assert_eq!(table.groups().len(), GROUPS.len());
}

#[test]
fn test_standard_table_is_shared() {
    let a = OpcodeTable::standard().unwrap();
    let b = OpcodeTable::standard().unwrap();
    assert!(Arc::ptr_eq(&a, &b), "the standard table is built once");
}

#[test]
fn test_ld_r_r_expansion_order() {
    let table = OpcodeTable::standard().unwrap();
    let entry = &table.templates()[0];
    assert_eq!(entry.template.assembler, "LD {0},{1}");
    assert_eq!(entry.instructions.len(), 49);

    let first = table.instruction(entry.instructions[0]).unwrap();
    assert_eq!(first.assembler, "LD B,B");
    assert_eq!(first.opcode, vec![Code::Byte(0x40)]);
    assert_eq!(first.operation, "B <- B");

    let second = table.instruction(entry.instructions[1]).unwrap();
    assert_eq!(second.assembler, "LD B,C", "second category varies fastest");
}

#[test]
fn test_every_instruction_decodes_to_itself() {
    let table = OpcodeTable::standard().unwrap();
    assert!(!table.is_empty());
    for instr in table.instructions() {
        let bytes = encoding(&instr.opcode);
        let decoded = table.decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.opcode, instr.opcode, "{} should decode from its own encoding", instr.assembler);
        assert_eq!(decoded.size as usize, bytes.len());
    }
}

#[test]
fn test_only_in_and_out_are_missing_from_primary_map() {
    let table = OpcodeTable::standard().unwrap();
    let missing: Vec<u8> = (0..=255u8)
        .filter(|&b| table.decode_bytes(&[b, 0x00, 0x00, 0x00]).is_err())
        .collect();
    assert_eq!(missing, vec![0xD3, 0xDB]);
}

#[test]
fn test_decode_sizes() {
    let table = OpcodeTable::standard().unwrap();
    let cases: &[(&[u8], &str, u16)] = &[
        (&[0x00], "NOP", 1),
        (&[0x06, 0x00], "LD B,n", 2),
        (&[0xDD, 0x36, 0x00, 0x00], "LD (IX+d),n", 4),
        (&[0xED, 0x4B, 0x00, 0x00], "LD BC,(nn)", 4),
        (&[0xFD, 0xCB, 0x00, 0x46], "BIT 0,(IY+d)", 4),
        (&[0xCB, 0x7E], "BIT 7,(HL)", 2),
        (&[0xC7], "RST 00H", 1),
        (&[0xED, 0xB0], "LDIR", 2),
    ];
    for &(bytes, assembler, size) in cases {
        let instr = table.decode_bytes(bytes).unwrap();
        assert_eq!(instr.assembler, assembler);
        assert_eq!(instr.size, size, "size of {}", assembler);
    }
}

#[test]
fn test_timings_are_reported() {
    let table = OpcodeTable::standard().unwrap();
    assert_eq!(table.decode_bytes(&[0x10, 0x00]).unwrap().timing, Timing::Branch { taken: 13, not_taken: 8 });
    assert_eq!(table.decode_bytes(&[0xED, 0xB1]).unwrap().timing, Timing::Branch { taken: 21, not_taken: 16 });
    assert_eq!(table.decode_bytes(&[0xDD, 0x09]).unwrap().timing, Timing::Fixed(15));
}

// ============================================================
// Custom tables
// ============================================================

fn inc_a(cpu: &mut Z80, _: Args<'_>) -> Result<Flow> {
    cpu.a = cpu.a.wrapping_add(1);
    Ok(Flow::Advance)
}

const INC_A: Template = Template::new("INCA", &[Slot::Byte(0x00)], &[], Timing::Fixed(3), "A <- A + 1", inc_a);

#[test]
fn test_cpu_runs_custom_table() {
    let table = OpcodeTable::build(&[Group { name: "tiny", templates: &[INC_A] }]).unwrap();
    assert_eq!(table.len(), 1);

    let mut cpu = Z80::with_table(Arc::new(table));
    cpu.memory.load(0, &[0x00, 0x00, 0x76]);
    assert_eq!(cpu.step().unwrap(), 3);
    assert_eq!(cpu.step().unwrap(), 3);
    assert_eq!(cpu.a, 2);
    assert_eq!(
        cpu.step().unwrap_err(),
        Z80Error::DecodeFailure { opcode: 0x76, pc: 0x0002 },
        "HALT is not in this table"
    );
}

#[test]
fn test_conflicting_templates_fail() {
    const NOP_AGAIN: Template = Template::new("NOP", &[Slot::Byte(0x00)], &[], Timing::Fixed(4), "", inc_a);
    let err = OpcodeTable::build(&[Group { name: "clash", templates: &[INC_A, NOP_AGAIN] }]).unwrap_err();
    assert!(matches!(err, Z80Error::TableConflict { .. }), "got {:?}", err);
}

#[test]
fn test_unknown_category_fails_build() {
    const BAD: Template = Template::new("LD {0}", &[Slot::Pattern("01{0}000")], &["xyz"], Timing::Fixed(4), "", inc_a);
    let err = OpcodeTable::build(&[Group { name: "bad", templates: &[BAD] }]).unwrap_err();
    assert_eq!(err, Z80Error::UnknownCategory("xyz".to_string()));
}

#[test]
fn test_standard_groups_conflict_with_themselves() {
    let doubled: Vec<Group> = GROUPS.iter().chain(GROUPS.iter()).copied().collect();
    assert!(matches!(OpcodeTable::build(&doubled), Err(Z80Error::TableConflict { .. })));
}

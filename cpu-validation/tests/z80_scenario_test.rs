use std::path::Path;

use z80table_core::cpu::z80::Z80;
use z80table_validation::{Z80CpuState, Z80TestCase, parse_cases};

fn load_initial_state(cpu: &mut Z80, s: &Z80CpuState) {
    cpu.a = s.a;
    cpu.f = s.f;
    cpu.b = s.b;
    cpu.c = s.c;
    cpu.d = s.d;
    cpu.e = s.e;
    cpu.h = s.h;
    cpu.l = s.l;
    cpu.i = s.i;
    cpu.r = s.r;
    cpu.ix = s.ix;
    cpu.iy = s.iy;
    cpu.sp = s.sp;
    cpu.pc = s.pc;
    cpu.iff1 = s.iff1 != 0;
    cpu.iff2 = s.iff2 != 0;
    cpu.im = s.im;
    cpu.halted = s.halted;

    // Alternate registers: stored as 16-bit pairs in JSON
    cpu.a_prime = (s.af_prime >> 8) as u8;
    cpu.f_prime = s.af_prime as u8;
    cpu.b_prime = (s.bc_prime >> 8) as u8;
    cpu.c_prime = s.bc_prime as u8;
    cpu.d_prime = (s.de_prime >> 8) as u8;
    cpu.e_prime = s.de_prime as u8;
    cpu.h_prime = (s.hl_prime >> 8) as u8;
    cpu.l_prime = s.hl_prime as u8;

    for &(addr, val) in &s.ram {
        cpu.memory.write(addr, val);
    }
}

fn run_test_case(tc: &Z80TestCase) -> Option<String> {
    let mut cpu = Z80::new();
    load_initial_state(&mut cpu, &tc.initial);

    let mut total_cycles = 0;
    for _ in 0..tc.steps {
        match cpu.step() {
            Ok(cycles) => total_cycles += cycles,
            Err(err) => return Some(format!("{}: {}", tc.name, err)),
        }
    }

    let fs = &tc.final_state;

    // Check registers — return first mismatch
    macro_rules! check {
        ($got:expr, $exp:expr, $name:expr) => {
            if $got != $exp {
                return Some(format!(
                    "{}: {} (got 0x{:X} exp 0x{:X})", tc.name, $name, $got as u64, $exp as u64
                ));
            }
        };
    }

    check!(cpu.a, fs.a, "A");
    check!(cpu.f, fs.f, "F");
    check!(cpu.b, fs.b, "B");
    check!(cpu.c, fs.c, "C");
    check!(cpu.d, fs.d, "D");
    check!(cpu.e, fs.e, "E");
    check!(cpu.h, fs.h, "H");
    check!(cpu.l, fs.l, "L");
    check!(cpu.i, fs.i, "I");
    check!(cpu.r, fs.r, "R");
    check!(cpu.ix, fs.ix, "IX");
    check!(cpu.iy, fs.iy, "IY");
    check!(cpu.sp, fs.sp, "SP");
    check!(cpu.pc, fs.pc, "PC");
    check!(cpu.iff1 as u8, fs.iff1, "IFF1");
    check!(cpu.iff2 as u8, fs.iff2, "IFF2");
    check!(cpu.im, fs.im, "IM");
    check!(cpu.halted as u8, fs.halted as u8, "HALT");

    let af_prime = ((cpu.a_prime as u16) << 8) | cpu.f_prime as u16;
    let bc_prime = ((cpu.b_prime as u16) << 8) | cpu.c_prime as u16;
    let de_prime = ((cpu.d_prime as u16) << 8) | cpu.e_prime as u16;
    let hl_prime = ((cpu.h_prime as u16) << 8) | cpu.l_prime as u16;
    check!(af_prime, fs.af_prime, "AF'");
    check!(bc_prime, fs.bc_prime, "BC'");
    check!(de_prime, fs.de_prime, "DE'");
    check!(hl_prime, fs.hl_prime, "HL'");

    for &(addr, expected) in &fs.ram {
        let got = cpu.memory.read(addr);
        if got != expected {
            return Some(format!(
                "{}: RAM[0x{:04X}] (got 0x{:02X} exp 0x{:02X})",
                tc.name, addr, got, expected
            ));
        }
    }

    if total_cycles != tc.cycles {
        return Some(format!(
            "{}: cycles (got {} exp {})",
            tc.name, total_cycles, tc.cycles
        ));
    }

    None
}

#[test]
fn test_all_z80_scenarios() {
    let test_dir = Path::new("test_data/z80");

    let mut entries: Vec<_> = std::fs::read_dir(test_dir)
        .expect("Failed to read test directory")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort_by_key(|e| e.file_name());
    assert!(!entries.is_empty(), "no scenario files in {:?}", test_dir);

    let mut total_tests = 0;
    let mut failures: Vec<String> = Vec::new();

    for entry in &entries {
        let json_path = entry.path();
        let json = std::fs::read_to_string(&json_path)
            .unwrap_or_else(|e| panic!("Failed to read {:?}: {}", json_path, e));
        let tests = parse_cases(&json)
            .unwrap_or_else(|e| panic!("Failed to parse {:?}: {}", json_path, e));

        assert!(!tests.is_empty(), "Test file {:?} is empty", json_path);

        for tc in &tests {
            if let Some(err) = run_test_case(tc) {
                failures.push(err);
            }
        }
        total_tests += tests.len();
    }

    eprintln!(
        "\nZ80 scenarios: {} passed, {} failed across {} files",
        total_tests - failures.len(),
        failures.len(),
        entries.len()
    );
    for err in &failures {
        eprintln!("  {}", err);
    }

    assert!(failures.is_empty(), "{} scenario(s) failed", failures.len());
}

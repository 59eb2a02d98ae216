use crate::{
    bus::Bus,
    cpu::{
        cpu::CPU,
        flags::{
            FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_NEGATIVE, FLAG_OVERFLOW, FLAG_UNUSED,
            FLAG_ZERO,
        },
        opcodes::OPCODES,
    },
};

struct TestBus {
    mem: [u8; 65536],
    clocks: usize,
    reads: Vec<u16>,
    writes: Vec<(u16, u8)>,
}

impl TestBus {
    fn new() -> Self {
        Self {
            mem: [0; 65536],
            clocks: 0,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    fn load(&mut self, addr: u16, program: &[u8]) {
        let start = addr as usize;
        self.mem[start..start + program.len()].copy_from_slice(program);
    }
}

impl Bus for TestBus {
    fn peek(&mut self, addr: u16) -> u8 {
        self.reads.push(addr);
        self.mem[addr as usize]
    }

    fn poke(&mut self, addr: u16, data: u8) {
        self.writes.push((addr, data));
        self.mem[addr as usize] = data;
    }

    fn clock(&mut self, cycles: usize) {
        self.clocks += cycles;
    }
}

fn new_cpu(bus: TestBus) -> CPU<TestBus> {
    CPU {
        a: 0,
        x: 0,
        y: 0,
        sp: 0xFF,
        pc: 0x1000,
        status: FLAG_UNUSED,
        cycles: 0,
        bus,
    }
}

fn run(program: &[u8]) -> CPU<TestBus> {
    let mut bus = TestBus::new();
    bus.load(0x1000, program);
    new_cpu(bus)
}

#[test]
fn lda_immediate_takes_two_cycles() {
    let mut cpu = run(&[0xA9, 0x05]); // LDA #$05

    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.a, 0x05);
    assert_eq!(cpu.pc, 0x1002);
    assert_eq!(cpu.status & (FLAG_ZERO | FLAG_NEGATIVE), 0);
    assert_eq!(cpu.bus.clocks, 2);
}

#[test]
fn loads_set_zero_and_negative() {
    let mut cpu = run(&[0xA9, 0x00, 0xA2, 0x80]); // LDA #$00; LDX #$80
    cpu.step();
    assert!(cpu.status & FLAG_ZERO != 0);
    cpu.step();
    assert!(cpu.status & FLAG_ZERO == 0);
    assert!(cpu.status & FLAG_NEGATIVE != 0);
}

#[test]
fn reset_reads_vector() {
    let mut bus = TestBus::new();
    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0xF0;
    let mut cpu = new_cpu(bus);
    cpu.sp = 0x12;

    cpu.reset();
    assert_eq!(cpu.pc, 0xF000);
    assert_eq!(cpu.sp, 0xFF);
}

#[test]
fn zero_page_store_and_indexed_wrap() {
    // LDA #$33; STA $10; LDX #$20; LDA $F0,X
    let mut cpu = run(&[0xA9, 0x33, 0x85, 0x10, 0xA2, 0x20, 0xA9, 0x00, 0xB5, 0xF0]);
    cpu.step();
    assert_eq!(cpu.step(), 3);
    assert_eq!(cpu.bus.mem[0x0010], 0x33);

    cpu.step();
    cpu.step();
    assert_eq!(cpu.step(), 4);
    assert_eq!(cpu.a, 0x33);
}

#[test]
fn indexed_read_pays_for_page_cross() {
    let mut cpu = run(&[0xBD, 0xFF, 0x20]); // LDA $20FF,X
    cpu.bus.mem[0x2100] = 0x42;
    cpu.x = 1;

    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.a, 0x42);
    // the high byte is fixed up only after a read of the wrong page
    assert!(cpu.bus.reads.contains(&0x2000));

    let mut cpu = run(&[0xBD, 0x00, 0x20]);
    cpu.x = 1;
    assert_eq!(cpu.step(), 4);
    assert!(!cpu.bus.reads.contains(&0x2000));
}

#[test]
fn indexed_store_has_fixed_cost() {
    let mut cpu = run(&[0x9D, 0xFF, 0x20, 0x9D, 0x00, 0x20]); // STA $20FF,X; STA $2000,X
    cpu.a = 0x77;
    cpu.x = 1;
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.bus.mem[0x2100], 0x77);
    assert_eq!(cpu.bus.mem[0x2001], 0x77);
}

#[test]
fn indirect_indexed_reads_through_zero_page() {
    let mut cpu = run(&[0xB1, 0x80]); // LDA ($80),Y
    cpu.bus.mem[0x80] = 0xF0;
    cpu.bus.mem[0x81] = 0x20;
    cpu.bus.mem[0x2110] = 0x99;
    cpu.y = 0x20;

    assert_eq!(cpu.step(), 6);
    assert_eq!(cpu.a, 0x99);
}

#[test]
fn branch_timing() {
    // not taken
    let mut cpu = run(&[0xD0, 0x02]);
    cpu.status |= FLAG_ZERO;
    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.pc, 0x1002);

    // taken, same page
    let mut cpu = run(&[0xD0, 0x02]);
    assert_eq!(cpu.step(), 3);
    assert_eq!(cpu.pc, 0x1004);

    // taken backwards across a page
    let mut cpu = run(&[0xD0, 0xF0]);
    assert_eq!(cpu.step(), 4);
    assert_eq!(cpu.pc, 0x0FF2);
}

#[test]
fn bne_loops_until_zero() {
    // LDX #3; DEX; BNE -3
    let mut cpu = run(&[0xA2, 0x03, 0xCA, 0xD0, 0xFD]);
    for _ in 0..7 {
        cpu.step();
    }
    assert_eq!(cpu.x, 0x00);
    assert_eq!(cpu.pc, 0x1005);
}

#[test]
fn jmp_indirect_does_not_cross_pages() {
    let mut cpu = run(&[0x6C, 0xFF, 0x20]); // JMP ($20FF)
    cpu.bus.mem[0x20FF] = 0x34;
    cpu.bus.mem[0x2000] = 0x12;
    cpu.bus.mem[0x2100] = 0x56;

    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn read_modify_write_writes_twice() {
    let mut cpu = run(&[0xE6, 0x80]); // INC $80
    cpu.bus.mem[0x80] = 0x7F;

    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.bus.writes, vec![(0x80, 0x7F), (0x80, 0x80)]);
    assert!(cpu.status & FLAG_NEGATIVE != 0);
}

#[test]
fn shifts_and_rotates_through_carry() {
    // SEC; ROR A; ASL A; ROL A
    let mut cpu = run(&[0x38, 0x6A, 0x0A, 0x2A]);
    cpu.a = 0x01;
    cpu.step();
    cpu.step();
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.status & FLAG_CARRY != 0);
    cpu.step();
    assert_eq!(cpu.a, 0x00);
    assert!(cpu.status & FLAG_ZERO != 0);
    cpu.step();
    assert_eq!(cpu.a, 0x01);
    assert!(cpu.status & FLAG_CARRY == 0);
}

#[test]
fn jsr_and_rts_use_the_stack() {
    let mut cpu = run(&[0x20, 0x00, 0x20]); // JSR $2000
    cpu.bus.mem[0x2000] = 0x60; // RTS

    assert_eq!(cpu.step(), 6);
    assert_eq!(cpu.pc, 0x2000);
    assert_eq!(cpu.sp, 0xFD);
    assert_eq!(cpu.bus.mem[0x01FF], 0x10);
    assert_eq!(cpu.bus.mem[0x01FE], 0x02);

    assert_eq!(cpu.step(), 6);
    assert_eq!(cpu.pc, 0x1003);
    assert_eq!(cpu.sp, 0xFF);
}

#[test]
fn brk_and_rti() {
    let mut cpu = run(&[0x00, 0xEA]);
    cpu.bus.mem[0xFFFE] = 0x00;
    cpu.bus.mem[0xFFFF] = 0x30;
    cpu.bus.mem[0x3000] = 0x40; // RTI
    cpu.status |= FLAG_CARRY;

    assert_eq!(cpu.step(), 7);
    assert_eq!(cpu.pc, 0x3000);
    assert_eq!(cpu.bus.mem[0x01FF], 0x10);
    assert_eq!(cpu.bus.mem[0x01FE], 0x02);
    assert_eq!(cpu.bus.mem[0x01FD], FLAG_CARRY | FLAG_BREAK | FLAG_UNUSED);

    cpu.step();
    assert_eq!(cpu.pc, 0x1002);
    assert_eq!(cpu.status & FLAG_BREAK, 0);
    assert!(cpu.status & FLAG_CARRY != 0);
}

#[test]
fn php_plp_drop_break_bit() {
    let mut cpu = run(&[0x08, 0x28]); // PHP; PLP
    assert_eq!(cpu.step(), 3);
    assert_eq!(cpu.bus.mem[0x01FF], FLAG_BREAK | FLAG_UNUSED);
    assert_eq!(cpu.step(), 4);
    assert_eq!(cpu.status, FLAG_UNUSED);
}

#[test]
fn binary_adc_overflow() {
    let mut cpu = run(&[0x69, 0x50]); // ADC #$50
    cpu.a = 0x50;
    cpu.step();
    assert_eq!(cpu.a, 0xA0);
    assert!(cpu.status & FLAG_OVERFLOW != 0);
    assert!(cpu.status & FLAG_NEGATIVE != 0);
    assert!(cpu.status & FLAG_CARRY == 0);
}

#[test]
fn adc_then_sbc_round_trips() {
    let mut cpu = run(&[]);
    for a in 0..=255u8 {
        for b in 0..=255u8 {
            // CLC; ADC #b; SEC; SBC #b
            cpu.bus.load(0x1000, &[0x18, 0x69, b, 0x38, 0xE9, b]);
            cpu.pc = 0x1000;
            cpu.a = a;
            for _ in 0..4 {
                cpu.step();
            }
            assert_eq!(cpu.a, a, "a={a:02X} b={b:02X}");
        }
    }
}

#[test]
fn decimal_mode_arithmetic() {
    // SED; CLC; ADC #$27
    let mut cpu = run(&[0xF8, 0x18, 0x69, 0x27]);
    cpu.a = 0x15;
    for _ in 0..3 {
        cpu.step();
    }
    assert_eq!(cpu.a, 0x42);
    assert!(cpu.status & FLAG_CARRY == 0);

    // 99 + 01 carries out to 00, but Z follows the binary sum
    let mut cpu = run(&[0x69, 0x01]);
    cpu.status |= FLAG_DECIMAL;
    cpu.a = 0x99;
    cpu.step();
    assert_eq!(cpu.a, 0x00);
    assert!(cpu.status & FLAG_CARRY != 0);
    assert!(cpu.status & FLAG_ZERO == 0);

    // SEC; SBC #$15
    let mut cpu = run(&[0x38, 0xE9, 0x15]);
    cpu.status |= FLAG_DECIMAL;
    cpu.a = 0x42;
    cpu.step();
    cpu.step();
    assert_eq!(cpu.a, 0x27);
    assert!(cpu.status & FLAG_CARRY != 0);
}

#[test]
fn unknown_opcode_is_a_one_cycle_no_op() {
    let mut cpu = run(&[0x02, 0xA9, 0x01]);
    cpu.a = 0x55;
    assert_eq!(cpu.step(), 1);
    assert_eq!(cpu.pc, 0x1001);
    assert_eq!(cpu.a, 0x55);
    assert_eq!(cpu.status, FLAG_UNUSED);
    assert!(cpu.bus.writes.is_empty());

    cpu.step();
    assert_eq!(cpu.a, 0x01);
}

#[test]
fn every_opcode_is_deterministic() {
    fn prepared(opcode: u8) -> CPU<TestBus> {
        let mut bus = TestBus::new();
        for (i, byte) in bus.mem.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(7).wrapping_add(3);
        }
        bus.mem[0x1000] = opcode;
        let mut cpu = new_cpu(bus);
        cpu.a = 0x5A;
        cpu.x = 0x91;
        cpu.y = 0x17;
        cpu.sp = 0xF0;
        cpu
    }

    for opcode in 0..=255u8 {
        let mut first = prepared(opcode);
        let mut second = prepared(opcode);
        let cycles = first.step();
        assert_eq!(second.step(), cycles);

        assert_eq!(
            (first.a, first.x, first.y, first.sp, first.pc, first.status),
            (second.a, second.x, second.y, second.sp, second.pc, second.status),
            "opcode {opcode:02X}"
        );
        assert_eq!(first.bus.writes, second.bus.writes);
        assert_eq!(first.bus.clocks, cycles);

        match OPCODES[opcode as usize] {
            Some(op) => {
                let base = op.cycles as usize;
                assert!((base..=base + 2).contains(&cycles), "opcode {opcode:02X}");
            }
            None => assert_eq!(cycles, 1),
        }
    }
}

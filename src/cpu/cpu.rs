use crate::{
    bus::Bus,
    cpu::{
        flags::{
            FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE,
            FLAG_OVERFLOW, FLAG_UNUSED, FLAG_ZERO,
        },
        opcodes::{AddressMode, Mnemonic, OPCODES, Opcode},
    },
};

const STACK_PAGE: u16 = 0x0100;
const RESET_VECTOR: u16 = 0xFFFC;
const IRQ_VECTOR: u16 = 0xFFFE;

/// Where an instruction's data lives once its address mode is resolved.
#[derive(Clone, Copy)]
enum Operand {
    Accumulator,
    Immediate(u8),
    ZeroPage(u8),
    Memory(u16),
}

/// 6507: a 6502 with 13 address lines and no interrupt pins.
pub struct CPU<B: Bus> {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    /// CPU cycles since power-on.
    pub cycles: usize,
    pub bus: B,
}

impl<B: Bus> CPU<B> {
    pub fn new(bus: B) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFF,
            pc: 0,
            status: FLAG_UNUSED,
            cycles: 0,
            bus,
        }
    }

    /// Load the program counter from the reset vector. Registers other than S keep their values.
    pub fn reset(&mut self) {
        self.sp = 0xFF;
        self.status |= FLAG_INTERRUPT_DISABLE | FLAG_UNUSED;
        self.pc = self.read_word(RESET_VECTOR);
    }

    /// Execute one instruction, returning the cycles it took.
    ///
    /// Time is handed to the bus before the instruction's memory accesses, so
    /// reads and writes land at the end of the instruction as on the real chip.
    pub fn step(&mut self) -> usize {
        let start = self.cycles;

        self.tick(1);
        let pc = self.pc;
        let opcode = self.fetch_byte();

        match OPCODES[opcode as usize] {
            Some(op) => {
                self.tick(op.cycles as usize - 1);
                self.execute(op);
            }
            None => log::warn!("unknown opcode ${opcode:02X} at ${pc:04X}"),
        }

        self.cycles - start
    }

    fn tick(&mut self, cycles: usize) {
        self.cycles += cycles;
        self.bus.clock(cycles);
    }

    fn fetch_byte(&mut self) -> u8 {
        let byte = self.bus.peek(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte() as u16;
        let hi = self.fetch_byte() as u16;
        (hi << 8) | lo
    }

    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.bus.peek(addr) as u16;
        let hi = self.bus.peek(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Pointer stored in page zero; the high byte wraps within the page.
    fn read_zero_page_word(&mut self, addr: u8) -> u16 {
        let lo = self.bus.peek_zero_page(addr) as u16;
        let hi = self.bus.peek_zero_page(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    fn push(&mut self, data: u8) {
        self.bus.poke(STACK_PAGE | self.sp as u16, data);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.bus.peek(STACK_PAGE | self.sp as u16)
    }

    fn flag(&self, flag: u8) -> bool {
        self.status & flag != 0
    }

    fn set_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    fn set_zn(&mut self, value: u8) {
        self.set_flag(FLAG_ZERO, value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    }

    /// Indexed effective address. Reads that cross a page first touch the
    /// address with the uncorrected high byte and take an extra cycle.
    fn indexed(&mut self, base: u16, index: u8, read: bool) -> u16 {
        let addr = base.wrapping_add(index as u16);
        if read && (base ^ addr) & 0xFF00 != 0 {
            self.bus.peek((base & 0xFF00) | (addr & 0x00FF));
            self.tick(1);
        }
        addr
    }

    fn operand(&mut self, mode: AddressMode, read: bool) -> Operand {
        match mode {
            AddressMode::Accumulator => Operand::Accumulator,
            AddressMode::Immediate => Operand::Immediate(self.fetch_byte()),
            AddressMode::ZeroPage => Operand::ZeroPage(self.fetch_byte()),
            AddressMode::ZeroPageX => Operand::ZeroPage(self.fetch_byte().wrapping_add(self.x)),
            AddressMode::ZeroPageY => Operand::ZeroPage(self.fetch_byte().wrapping_add(self.y)),
            AddressMode::Absolute => Operand::Memory(self.fetch_word()),
            AddressMode::AbsoluteX => {
                let base = self.fetch_word();
                Operand::Memory(self.indexed(base, self.x, read))
            }
            AddressMode::AbsoluteY => {
                let base = self.fetch_word();
                Operand::Memory(self.indexed(base, self.y, read))
            }
            AddressMode::IndexedIndirect => {
                let ptr = self.fetch_byte().wrapping_add(self.x);
                Operand::Memory(self.read_zero_page_word(ptr))
            }
            AddressMode::IndirectIndexed => {
                let ptr = self.fetch_byte();
                let base = self.read_zero_page_word(ptr);
                Operand::Memory(self.indexed(base, self.y, read))
            }
            // only JMP and branches use these, and they decode their own operands
            AddressMode::Implied | AddressMode::Relative | AddressMode::Indirect => {
                Operand::Accumulator
            }
        }
    }

    fn load(&mut self, operand: Operand) -> u8 {
        match operand {
            Operand::Accumulator => self.a,
            Operand::Immediate(value) => value,
            Operand::ZeroPage(addr) => self.bus.peek_zero_page(addr),
            Operand::Memory(addr) => self.bus.peek(addr),
        }
    }

    fn store(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::Accumulator => self.a = value,
            Operand::Immediate(_) => {}
            Operand::ZeroPage(addr) => self.bus.poke_zero_page(addr, value),
            Operand::Memory(addr) => self.bus.poke(addr, value),
        }
    }

    fn read_operand(&mut self, mode: AddressMode) -> u8 {
        let operand = self.operand(mode, true);
        self.load(operand)
    }

    fn write_operand(&mut self, mode: AddressMode, value: u8) {
        let operand = self.operand(mode, false);
        self.store(operand, value);
    }

    /// Read-modify-write. Memory forms write the unmodified value back first.
    fn modify(&mut self, mode: AddressMode, f: impl FnOnce(&mut Self, u8) -> u8) {
        let operand = self.operand(mode, false);
        let value = self.load(operand);
        if !matches!(operand, Operand::Accumulator) {
            self.store(operand, value);
        }
        let result = f(self, value);
        self.store(operand, result);
    }

    fn branch(&mut self, condition: bool) {
        let offset = self.fetch_byte() as i8;
        if !condition {
            return;
        }
        self.tick(1);
        let target = self.pc.wrapping_add(offset as u16);
        if (target ^ self.pc) & 0xFF00 != 0 {
            self.tick(1);
        }
        self.pc = target;
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.set_flag(FLAG_CARRY, register >= value);
        self.set_zn(register.wrapping_sub(value));
    }

    fn adc(&mut self, value: u8) {
        let a = self.a as u16;
        let v = value as u16;
        let carry = self.flag(FLAG_CARRY) as u16;
        let binary = a + v + carry;

        if !self.flag(FLAG_DECIMAL) {
            let result = binary as u8;
            self.set_flag(FLAG_OVERFLOW, (!(a ^ v) & (a ^ binary) & 0x80) != 0);
            self.set_flag(FLAG_CARRY, binary > 0xFF);
            self.set_zn(result);
            self.a = result;
            return;
        }

        // NMOS BCD: Z comes from the binary sum, N and V from the sum before
        // the high nibble is corrected.
        let mut low = (a & 0x0F) + (v & 0x0F) + carry;
        if low > 0x09 {
            low += 0x06;
        }
        let mut sum = (low & 0x0F) + (a & 0xF0) + (v & 0xF0);
        if low > 0x0F {
            sum += 0x10;
        }

        self.set_flag(FLAG_ZERO, binary as u8 == 0);
        self.set_flag(FLAG_NEGATIVE, sum & 0x80 != 0);
        self.set_flag(FLAG_OVERFLOW, ((a ^ sum) & !(a ^ v) & 0x80) != 0);

        if (sum & 0x1F0) > 0x90 {
            sum += 0x60;
        }
        self.set_flag(FLAG_CARRY, (sum & 0xFF0) > 0xF0);
        self.a = sum as u8;
    }

    fn sbc(&mut self, value: u8) {
        let a = self.a as u16;
        let v = value as u16;
        let borrow = !self.flag(FLAG_CARRY) as u16;
        let binary = a.wrapping_sub(v).wrapping_sub(borrow);

        self.a = if self.flag(FLAG_DECIMAL) {
            let low = (a & 0x0F).wrapping_sub(v & 0x0F).wrapping_sub(borrow);
            let mut diff = if low & 0x10 != 0 {
                (low.wrapping_sub(6) & 0x0F) | (a & 0xF0).wrapping_sub(v & 0xF0).wrapping_sub(0x10)
            } else {
                (low & 0x0F) | (a & 0xF0).wrapping_sub(v & 0xF0)
            };
            if diff & 0x100 != 0 {
                diff = diff.wrapping_sub(0x60);
            }
            diff as u8
        } else {
            binary as u8
        };

        // flags always follow the binary difference
        self.set_flag(FLAG_CARRY, binary < 0x100);
        self.set_zn(binary as u8);
        self.set_flag(FLAG_OVERFLOW, ((a ^ binary) & (a ^ v) & 0x80) != 0);
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.set_zn(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.set_zn(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = self.flag(FLAG_CARRY) as u8;
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.set_zn(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = if self.flag(FLAG_CARRY) { 0x80 } else { 0 };
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.set_zn(result);
        result
    }

    /// Pulled status: B does not exist in the register and bit 5 always reads 1.
    fn restore_status(&mut self, pulled: u8) {
        self.status = (pulled & !FLAG_BREAK) | FLAG_UNUSED;
    }

    fn execute(&mut self, op: Opcode) {
        let mode = op.mode;

        match op.mnemonic {
            Mnemonic::LDA => {
                self.a = self.read_operand(mode);
                self.set_zn(self.a);
            }
            Mnemonic::LDX => {
                self.x = self.read_operand(mode);
                self.set_zn(self.x);
            }
            Mnemonic::LDY => {
                self.y = self.read_operand(mode);
                self.set_zn(self.y);
            }
            Mnemonic::STA => self.write_operand(mode, self.a),
            Mnemonic::STX => self.write_operand(mode, self.x),
            Mnemonic::STY => self.write_operand(mode, self.y),

            Mnemonic::ADC => {
                let value = self.read_operand(mode);
                self.adc(value);
            }
            Mnemonic::SBC => {
                let value = self.read_operand(mode);
                self.sbc(value);
            }
            Mnemonic::AND => {
                self.a &= self.read_operand(mode);
                self.set_zn(self.a);
            }
            Mnemonic::ORA => {
                self.a |= self.read_operand(mode);
                self.set_zn(self.a);
            }
            Mnemonic::EOR => {
                self.a ^= self.read_operand(mode);
                self.set_zn(self.a);
            }
            Mnemonic::CMP => {
                let value = self.read_operand(mode);
                self.compare(self.a, value);
            }
            Mnemonic::CPX => {
                let value = self.read_operand(mode);
                self.compare(self.x, value);
            }
            Mnemonic::CPY => {
                let value = self.read_operand(mode);
                self.compare(self.y, value);
            }
            Mnemonic::BIT => {
                let value = self.read_operand(mode);
                self.set_flag(FLAG_ZERO, value & self.a == 0);
                self.set_flag(FLAG_OVERFLOW, value & 0x40 != 0);
                self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
            }

            Mnemonic::ASL => self.modify(mode, Self::asl),
            Mnemonic::LSR => self.modify(mode, Self::lsr),
            Mnemonic::ROL => self.modify(mode, Self::rol),
            Mnemonic::ROR => self.modify(mode, Self::ror),
            Mnemonic::INC => self.modify(mode, |cpu, v| {
                let r = v.wrapping_add(1);
                cpu.set_zn(r);
                r
            }),
            Mnemonic::DEC => self.modify(mode, |cpu, v| {
                let r = v.wrapping_sub(1);
                cpu.set_zn(r);
                r
            }),

            Mnemonic::INX => {
                self.x = self.x.wrapping_add(1);
                self.set_zn(self.x);
            }
            Mnemonic::INY => {
                self.y = self.y.wrapping_add(1);
                self.set_zn(self.y);
            }
            Mnemonic::DEX => {
                self.x = self.x.wrapping_sub(1);
                self.set_zn(self.x);
            }
            Mnemonic::DEY => {
                self.y = self.y.wrapping_sub(1);
                self.set_zn(self.y);
            }

            Mnemonic::TAX => {
                self.x = self.a;
                self.set_zn(self.x);
            }
            Mnemonic::TAY => {
                self.y = self.a;
                self.set_zn(self.y);
            }
            Mnemonic::TXA => {
                self.a = self.x;
                self.set_zn(self.a);
            }
            Mnemonic::TYA => {
                self.a = self.y;
                self.set_zn(self.a);
            }
            Mnemonic::TSX => {
                self.x = self.sp;
                self.set_zn(self.x);
            }
            Mnemonic::TXS => self.sp = self.x,

            Mnemonic::BCC => self.branch(!self.flag(FLAG_CARRY)),
            Mnemonic::BCS => self.branch(self.flag(FLAG_CARRY)),
            Mnemonic::BNE => self.branch(!self.flag(FLAG_ZERO)),
            Mnemonic::BEQ => self.branch(self.flag(FLAG_ZERO)),
            Mnemonic::BPL => self.branch(!self.flag(FLAG_NEGATIVE)),
            Mnemonic::BMI => self.branch(self.flag(FLAG_NEGATIVE)),
            Mnemonic::BVC => self.branch(!self.flag(FLAG_OVERFLOW)),
            Mnemonic::BVS => self.branch(self.flag(FLAG_OVERFLOW)),

            Mnemonic::JMP => {
                let addr = self.fetch_word();
                self.pc = if mode == AddressMode::Indirect {
                    // the pointer's high byte is fetched without carrying into the next page
                    let lo = self.bus.peek(addr) as u16;
                    let hi = self.bus.peek((addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF)) as u16;
                    (hi << 8) | lo
                } else {
                    addr
                };
            }
            Mnemonic::JSR => {
                let lo = self.fetch_byte() as u16;
                let ret = self.pc;
                self.push((ret >> 8) as u8);
                self.push(ret as u8);
                let hi = self.bus.peek(self.pc) as u16;
                self.pc = (hi << 8) | lo;
            }
            Mnemonic::RTS => {
                let lo = self.pull() as u16;
                let hi = self.pull() as u16;
                self.pc = ((hi << 8) | lo).wrapping_add(1);
            }
            Mnemonic::BRK => {
                let ret = self.pc.wrapping_add(1);
                self.push((ret >> 8) as u8);
                self.push(ret as u8);
                self.push(self.status | FLAG_BREAK | FLAG_UNUSED);
                self.status |= FLAG_INTERRUPT_DISABLE;
                self.pc = self.read_word(IRQ_VECTOR);
            }
            Mnemonic::RTI => {
                let status = self.pull();
                self.restore_status(status);
                let lo = self.pull() as u16;
                let hi = self.pull() as u16;
                self.pc = (hi << 8) | lo;
            }

            Mnemonic::PHA => self.push(self.a),
            Mnemonic::PHP => self.push(self.status | FLAG_BREAK | FLAG_UNUSED),
            Mnemonic::PLA => {
                self.a = self.pull();
                self.set_zn(self.a);
            }
            Mnemonic::PLP => {
                let status = self.pull();
                self.restore_status(status);
            }

            Mnemonic::CLC => self.set_flag(FLAG_CARRY, false),
            Mnemonic::SEC => self.set_flag(FLAG_CARRY, true),
            Mnemonic::CLD => self.set_flag(FLAG_DECIMAL, false),
            Mnemonic::SED => self.set_flag(FLAG_DECIMAL, true),
            Mnemonic::CLI => self.set_flag(FLAG_INTERRUPT_DISABLE, false),
            Mnemonic::SEI => self.set_flag(FLAG_INTERRUPT_DISABLE, true),
            Mnemonic::CLV => self.set_flag(FLAG_OVERFLOW, false),

            Mnemonic::NOP => {}
        }
    }
}

//! The console: CPU wired to the Atari bus, plus the host-facing run loop.

use crate::{
    audio::mixer::Mixer,
    bus::AtariBus,
    cartridge::cartridge::Cartridge,
    config::Config,
    controller::Controller,
    cpu::{
        cpu::CPU,
        disasm::{self, Disassembly},
        flags::flag_string,
    },
};

/// What `run_frame` does when the host calls it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Running,
    Stopped,
    /// Run until the program counter reaches the address, then stop.
    RunningToBreakpoint(u16),
}

pub struct Atari {
    pub cpu: CPU<AtariBus>,
    pub mode: RunMode,
    /// Log every instruction at trace level.
    pub trace: bool,
    frame_clocks: usize,
}

impl Atari {
    pub fn new(cart: Cartridge, config: &Config, mixer: &mut Mixer) -> Self {
        let bus = AtariBus::new(cart, config.signal, mixer);
        let mut cpu = CPU::new(bus);
        cpu.reset();
        log::info!(
            "{} console, entry point ${:04X}",
            config.signal,
            cpu.pc
        );

        Self {
            cpu,
            mode: RunMode::Running,
            trace: false,
            frame_clocks: config.signal.frame_clocks(),
        }
    }

    pub fn plug(&mut self, left: Box<dyn Controller>, right: Box<dyn Controller>) {
        self.cpu.bus.plug(left, right);
    }

    pub fn run(&mut self) {
        self.mode = RunMode::Running;
    }

    pub fn stop(&mut self) {
        self.mode = RunMode::Stopped;
    }

    pub fn run_to(&mut self, addr: u16) {
        self.mode = RunMode::RunningToBreakpoint(addr);
    }

    /// Warm reset: the reset vector is reloaded and the RIOT timer restarted.
    /// Cartridge bank state and RAM survive.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.bus.riot.reset();
        log::info!("reset, entry point ${:04X}", self.cpu.pc);
    }

    /// Flip `toggle`, release and press console switches (see `riot::PANEL_*`).
    pub fn alter_panel(&mut self, toggle: u8, release: u8, press: u8) {
        self.cpu.bus.riot.alter_panel(toggle, release, press);
    }

    /// Run one host frame's worth of colour clocks (1/60 s of emulated time).
    pub fn run_frame(&mut self) {
        match self.mode {
            RunMode::Stopped => return,
            RunMode::Running => {
                while self.cpu.bus.clocks < self.frame_clocks {
                    self.step();
                }
            }
            RunMode::RunningToBreakpoint(addr) => {
                while self.cpu.bus.clocks < self.frame_clocks {
                    if self.cpu.pc == addr {
                        self.mode = RunMode::Stopped;
                        break;
                    }
                    self.step();
                }
            }
        }

        if self.cpu.bus.clocks >= self.frame_clocks {
            self.cpu.bus.clocks -= self.frame_clocks;
        }
        self.cpu.bus.tia.catch_up();
    }

    /// Execute a single instruction, tracing it first if enabled.
    pub fn step(&mut self) -> usize {
        if self.trace {
            self.cpu.bus.tia.catch_up();
            log::trace!("{}", self.trace_line());
        }
        self.cpu.step()
    }

    /// Registers, beam and object positions, and the next instruction.
    pub fn trace_line(&self) -> String {
        let cpu = &self.cpu;
        let tia = &cpu.bus.tia;
        let [p0, p1, m0, m1, bl] = tia.object_positions();

        format!(
            "{:04X}; A: {:02X} X: {:02X} Y: {:02X} S: {:02X} P: {} ({:3} {:3}: {:3} {:3} {:3} {:3} {:3}) {}",
            cpu.pc,
            cpu.a,
            cpu.x,
            cpu.y,
            cpu.sp,
            flag_string(cpu.status),
            tia.v_pos % 999,
            tia.h_pos,
            bl,
            m0,
            p0,
            m1,
            p1,
            self.disassemble(cpu.pc).text
        )
    }

    pub fn disassemble(&self, addr: u16) -> Disassembly {
        disasm::disassemble(addr, |a| self.cpu.bus.read(a))
    }

    /// Last presented frame, 0xRRGGBB.
    pub fn frame(&self) -> &[u32] {
        &self.cpu.bus.tia.frame
    }

    /// Whether a new frame was presented since the last call.
    pub fn take_frame_ready(&mut self) -> bool {
        self.cpu.bus.tia.take_frame_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;

    /// 4K image whose reset vector points at `program` placed at $F000.
    fn console(program: &[u8]) -> Atari {
        let mut rom = vec![0xEA; 0x1000];
        rom[..program.len()].copy_from_slice(program);
        rom[0xFFC] = 0x00;
        rom[0xFFD] = 0xF0;

        let cart = Cartridge::from_bytes(rom, Some("4k Standard")).unwrap();
        let mut mixer = Mixer::new(44_100);
        Atari::new(cart, &Config::default(), &mut mixer)
    }

    #[test]
    fn starts_at_reset_vector() {
        let atari = console(&[0x4C, 0x00, 0xF0]);
        assert_eq!(atari.cpu.pc, 0xF000);
        assert_eq!(atari.mode, RunMode::Running);
    }

    #[test]
    fn frame_consumes_the_clock_budget() {
        let mut atari = console(&[0x4C, 0x00, 0xF0]); // JMP $F000
        atari.run_frame();

        let budget = Config::default().signal.frame_clocks();
        assert!(atari.cpu.bus.clocks < 9);
        // three colour clocks per CPU cycle, nothing else stretches them here
        assert_eq!(atari.cpu.cycles * 3, budget + atari.cpu.bus.clocks);
    }

    #[test]
    fn stopped_console_does_not_advance() {
        let mut atari = console(&[0x4C, 0x00, 0xF0]);
        atari.stop();
        atari.run_frame();
        assert_eq!(atari.cpu.cycles, 0);
        assert_eq!(atari.cpu.pc, 0xF000);
    }

    #[test]
    fn run_to_stops_at_address() {
        // INX; INX; INX; JMP $F000
        let mut atari = console(&[0xE8, 0xE8, 0xE8, 0x4C, 0x00, 0xF0]);
        atari.run_to(0xF002);
        atari.run_frame();

        assert_eq!(atari.mode, RunMode::Stopped);
        assert_eq!(atari.cpu.pc, 0xF002);
        assert_eq!(atari.cpu.x, 2);

        atari.run_frame();
        assert_eq!(atari.cpu.x, 2);
    }

    #[test]
    fn warm_reset_reloads_vector_and_timer() {
        let mut atari = console(&[0xE8, 0x4C, 0x00, 0xF0]);
        for _ in 0..3 {
            atari.step();
        }
        assert_ne!(atari.cpu.pc, 0xF000);

        atari.reset();
        assert_eq!(atari.cpu.pc, 0xF000);
        assert_eq!(atari.cpu.bus.peek(0x0284), (0x177DB >> 10) as u8);
    }

    #[test]
    fn panel_switches_reach_port_b() {
        let mut atari = console(&[0x4C, 0x00, 0xF0]);
        atari.alter_panel(0, 0, crate::riot::PANEL_RESET);
        assert_eq!(atari.cpu.bus.peek(0x0282), 0x0A);
    }

    #[test]
    fn trace_line_shows_state_and_instruction() {
        let mut atari = console(&[0xA9, 0x80, 0x4C, 0x00, 0xF0]);
        atari.step();
        let line = atari.trace_line();
        assert!(line.starts_with("F002; A: 80"), "{line}");
        assert!(line.contains("P: --I--1-N"), "{line}");
        assert!(line.ends_with("JMP $F000"), "{line}");
    }

    #[test]
    fn disassembles_through_side_effect_free_reads() {
        let atari = console(&[0x4C, 0x00, 0xF0]);
        let d = atari.disassemble(0xF000);
        assert_eq!(d.text, "JMP $F000");
        assert_eq!(d.bytes, vec![0x4C, 0x00, 0xF0]);
    }
}

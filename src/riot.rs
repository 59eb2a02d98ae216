//! RIOT (6532) I/O ports and interval timer.
//!
//! The chip's 128 bytes of RAM are decoded by the bus; this module covers the
//! two I/O ports and the timer. Register selection (low address bits):
//!
//! | A4 | A2 | A1 | A0 | read        | write              |
//! |----|----|----|----|-------------|--------------------|
//! | -  | 0  | S  | 0  | port S      | port S output      |
//! | -  | 0  | S  | 1  | DDR S       | DDR S              |
//! | -  | 1  | -  | 0  | timer       |                    |
//! | -  | 1  | -  | 1  | IRQ flags   |                    |
//! | 0  | 1  | -  | E  |             | PA7 edge select    |
//! | 1  | 1  | I  | I  |             | timer, interval I  |
//!
//! The 6507 has no IRQ pin, so only the flags are emulated. Port A carries both
//! joysticks (player 0 in the high nibble); port B is the console panel.

use crate::controller::Ports;

/// Console switches on port B. Active low for the momentary switches.
pub const PANEL_RESET: u8 = 0x01;
pub const PANEL_SELECT: u8 = 0x02;
pub const PANEL_COLOR: u8 = 0x08;
pub const PANEL_DIFFICULTY_P0: u8 = 0x40;
pub const PANEL_DIFFICULTY_P1: u8 = 0x80;

const IRQ_TIMER: u8 = 0x80;
const IRQ_PA7: u8 = 0x40;

pub struct Riot {
    /// Colour clocks not yet applied to the timer.
    clocks: usize,
    timer: i32,
    shift: u32,

    ddra: u8,
    ddrb: u8,
    outa: u8,
    outb: u8,

    irq: u8,
    edge: bool,
    /// Reading the timer clears its flag, but only once that read has been
    /// answered; the clear lands on the next access.
    clear_timer_flag: bool,

    panel: u8,
}

impl Default for Riot {
    fn default() -> Self {
        Self::new()
    }
}

impl Riot {
    pub fn new() -> Self {
        Self {
            clocks: 0,
            timer: 0x7FFF,
            shift: 10,
            ddra: 0,
            ddrb: 0,
            outa: 0,
            outb: 0,
            irq: 0,
            edge: false,
            clear_timer_flag: false,
            panel: PANEL_RESET | PANEL_SELECT | PANEL_COLOR,
        }
    }

    /// Warm reset reloads the timer with a long 1024-clock interval.
    pub fn reset(&mut self) {
        self.clocks = 0;
        self.timer = 0x177DB;
        self.shift = 10;
    }

    pub fn clock(&mut self, cycles: usize) {
        self.clocks += cycles;
    }

    /// PA7 changed level. The flag latches when it matches the selected edge.
    pub fn transition(&mut self, level: bool) {
        if level == self.edge {
            self.irq |= IRQ_PA7;
        }
    }

    /// Flip `toggle`, set `release`, then clear `press`.
    pub fn alter_panel(&mut self, toggle: u8, release: u8, press: u8) {
        self.panel ^= toggle;
        self.panel |= release;
        self.panel &= !press;
    }

    pub fn panel(&self) -> u8 {
        self.panel
    }

    pub fn timer_flag(&self) -> bool {
        self.irq & IRQ_TIMER != 0
    }

    /// Bring the timer up to date: one tick per three colour clocks.
    fn update(&mut self) {
        if self.clear_timer_flag {
            self.irq &= !IRQ_TIMER;
            self.clear_timer_flag = false;
        }

        let ticks = self.clocks / 3;
        self.clocks %= 3;
        if ticks == 0 {
            return;
        }

        self.timer -= ticks as i32;
        if self.timer <= 0 {
            if self.timer < 0 {
                self.timer &= 0xFF;
            }
            self.shift = 0;
            self.irq |= IRQ_TIMER;
        }
    }

    pub fn peek(&mut self, addr: u16, ports: &Ports) -> u8 {
        self.update();

        if addr & 0x04 != 0 {
            if addr & 0x01 != 0 {
                let flags = self.irq;
                self.irq &= !IRQ_PA7;
                flags
            } else {
                self.clear_timer_flag = true;
                (self.timer >> self.shift) as u8
            }
        } else if addr & 0x01 != 0 {
            if addr & 0x02 == 0 { self.ddra } else { self.ddrb }
        } else if addr & 0x02 == 0 {
            let input = (ports[0].peek() << 4) | (ports[1].peek() & 0x0F);
            (self.outa & self.ddra) | (input & !self.ddra)
        } else {
            self.panel & !self.ddrb
        }
    }

    pub fn poke(&mut self, addr: u16, data: u8, ports: &mut Ports) {
        self.update();

        if addr & 0x04 != 0 {
            if addr & 0x10 != 0 {
                let interval = (addr & 0x03) as u32;
                self.shift = if interval == 3 { 10 } else { interval * 3 };
                self.irq &= !IRQ_TIMER;
                self.clear_timer_flag = false;
                self.timer = (data as i32) << self.shift;
            } else {
                self.edge = addr & 0x01 != 0;
            }
            return;
        }

        match addr & 0x03 {
            0x00 => {
                self.outa = data;
                self.drive_port_a(ports);
            }
            0x01 => {
                self.ddra = data;
                self.drive_port_a(ports);
            }
            0x02 => self.outb = data,
            _ => self.ddrb = data,
        }
    }

    /// Only bits configured as outputs reach the controllers.
    fn drive_port_a(&self, ports: &mut Ports) {
        let driven = self.outa & self.ddra;
        ports[0].poke(driven >> 4);
        ports[1].poke(driven & 0x0F);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{JOY_DOWN, Joystick, unplugged};

    const TIMER: u16 = 0x284;
    const IRQ: u16 = 0x285;
    const TIM1T: u16 = 0x294;
    const TIM64T: u16 = 0x296;

    #[test]
    fn timer_underflow_sets_and_clears_flag() {
        let mut ports = unplugged();
        let mut riot = Riot::new();
        riot.poke(TIM1T, 10, &mut ports);
        riot.clock(10 * 3);

        assert_eq!(riot.peek(TIMER, &ports), 0x00);
        assert!(riot.timer_flag());

        let flags = riot.peek(IRQ, &ports);
        assert_eq!(flags & IRQ_TIMER, 0);
        assert!(!riot.timer_flag());
    }

    #[test]
    fn prescaled_timer_counts_down() {
        let mut ports = unplugged();
        let mut riot = Riot::new();
        riot.poke(TIM64T, 4, &mut ports);
        // 64 ticks of 3 colour clocks each
        riot.clock(64 * 3);
        assert_eq!(riot.peek(TIMER, &ports), 3);
        assert!(!riot.timer_flag());
    }

    #[test]
    fn underflow_wraps_to_single_clock_count() {
        let mut ports = unplugged();
        let mut riot = Riot::new();
        riot.poke(TIM1T, 2, &mut ports);
        riot.clock(5 * 3);
        assert_eq!(riot.peek(TIMER, &ports), 0xFD);
        riot.clock(3);
        assert_eq!(riot.peek(TIMER, &ports), 0xFC);
    }

    #[test]
    fn pa7_edge_flag() {
        let mut ports = unplugged();
        let mut riot = Riot::new();
        riot.poke(0x284, 0, &mut ports); // falling edge
        riot.transition(true);
        assert_eq!(riot.peek(IRQ, &ports) & IRQ_PA7, 0);

        riot.transition(false);
        assert_eq!(riot.peek(IRQ, &ports) & IRQ_PA7, IRQ_PA7);
        assert_eq!(riot.peek(IRQ, &ports) & IRQ_PA7, 0);
    }

    #[test]
    fn port_a_mixes_joysticks_through_ddr() {
        let stick = Joystick::new();
        let mut ports: Ports = [Box::new(stick.clone()), Box::new(Joystick::new())];
        let mut riot = Riot::new();

        stick.set_direction(JOY_DOWN, true);
        assert_eq!(riot.peek(0x280, &ports), 0xDF);

        riot.poke(0x281, 0xF0, &mut ports);
        riot.poke(0x280, 0x50, &mut ports);
        assert_eq!(riot.peek(0x280, &ports), 0x5F);
        assert_eq!(riot.peek(0x281, &ports), 0xF0);
        assert_eq!(ports[1].peek(), 0x0F);
    }

    #[test]
    fn panel_switches() {
        let mut ports = unplugged();
        let mut riot = Riot::new();
        assert_eq!(riot.peek(0x282, &ports), 0x0B);

        riot.alter_panel(PANEL_COLOR, 0, PANEL_RESET);
        assert_eq!(riot.peek(0x282, &ports), 0x02);

        riot.alter_panel(0, PANEL_RESET, 0);
        riot.poke(0x283, 0x01, &mut ports);
        assert_eq!(riot.peek(0x282, &ports), 0x02);
    }
}

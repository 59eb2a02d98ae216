//! TIA (Television Interface Adaptor) implementation.
//!
//! The TIA has no frame buffer of its own: it builds each scanline on the fly
//! from a handful of object registers. Here a line is kept as 160 bytes, one
//! per colour clock, where each byte is a bitmask of the objects covering that
//! pixel. Objects are "scanned in" when the beam reaches their start position,
//! and the mask is resolved to RGB through a 256-entry translation table that
//! encodes the current colours, score mode and priority.
//!
//! Nothing is rendered per clock. Register writes and reads first call
//! [`Tia::catch_up`], which scans in everything the beam passed since the
//! last access, so changes made mid-line only affect pixels to their right.
//!
//! Horizontal position runs from -68 (start of horizontal blank) to 159; a
//! scanline is 228 colour clocks.

use crate::audio::{channel::AudioChannel, mixer::Mixer};
use crate::config::Signal;
use crate::controller::Ports;

pub const PF_BIT: u8 = 0x01;
pub const BL_BIT: u8 = 0x02;
pub const P1_BIT: u8 = 0x04;
pub const M1_BIT: u8 = 0x08;
pub const P0_BIT: u8 = 0x10;
pub const M0_BIT: u8 = 0x20;
/// Right half of the screen (score mode colours the playfield per side).
pub const SIDE_BIT: u8 = 0x40;
/// HMOVE comb: the first eight pixels of a line with an HMOVE are black.
pub const HMOVE_BIT: u8 = 0x80;

/// Visible pixels per line.
pub const LINE_WIDTH: usize = 160;
/// Lines kept per frame.
pub const FRAME_HEIGHT: usize = 264;
/// Host frame: every pixel doubled horizontally.
pub const FRAME_WIDTH: usize = LINE_WIDTH * 2;

/// Scan-in may run up to 32 pixels past the right edge.
const SCANLINE_LEN: usize = 224;
const HBLANK: i32 = 68;

/// Collision latches, in the order of [`COLLISION_MASKS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    BlPf,
    P0Pf,
    M0Pf,
    P1Pf,
    M1Pf,
    P0Bl,
    M0Bl,
    P1Bl,
    M1Bl,
    M0P0,
    P1P0,
    M1P0,
    P1M0,
    M1M0,
    M1P1,
}

pub const COLLISION_MASKS: [u8; 15] = [
    BL_BIT | PF_BIT,
    P0_BIT | PF_BIT,
    M0_BIT | PF_BIT,
    P1_BIT | PF_BIT,
    M1_BIT | PF_BIT,
    P0_BIT | BL_BIT,
    M0_BIT | BL_BIT,
    P1_BIT | BL_BIT,
    M1_BIT | BL_BIT,
    M0_BIT | P0_BIT,
    P1_BIT | P0_BIT,
    M1_BIT | P0_BIT,
    P1_BIT | M0_BIT,
    M1_BIT | M0_BIT,
    M1_BIT | P1_BIT,
];

/// Value a latch holds once set; collision registers report it in bits 6/7.
const LATCHED: u8 = 0x40;

// NUSIZ player modes
const REPEATS: [i32; 8] = [0, 1, 1, 2, 1, 0, 2, 0];
const STRETCH: [i32; 8] = [1, 1, 1, 1, 1, 2, 1, 4];
const GAP: [i32; 8] = [0, 16, 32, 16, 64, 0, 32, 0];

// CTRLPF
const SCORE_MODE: u8 = 0x02;
const PRIORITY_MODE: u8 = 0x04;

#[derive(Clone, Copy)]
struct Player {
    pos: i32,
    motion: i32,
    graphics: u8,
    delayed: u8,
    vertical_delay: bool,
    reflect: bool,
    stretch: i32,
    gap: i32,
    repeat: i32,
    /// Offset of the player's centre; locked missiles sit here.
    mid_delay: i32,
}

impl Player {
    fn new() -> Self {
        Self {
            pos: 0,
            motion: 0,
            graphics: 0,
            delayed: 0,
            vertical_delay: false,
            reflect: false,
            stretch: STRETCH[0],
            gap: GAP[0],
            repeat: REPEATS[0],
            mid_delay: STRETCH[0] * 3,
        }
    }
}

#[derive(Clone, Copy)]
struct Missile {
    pos: i32,
    motion: i32,
    size: i32,
    enabled: bool,
    /// RESMP: missile is parked on its player and hidden.
    locked: bool,
}

struct Ball {
    pos: i32,
    motion: i32,
    size: i32,
    enabled: bool,
    delayed: bool,
    vertical_delay: bool,
}

pub struct Tia {
    palette: &'static [u32; 128],
    channels: [AudioChannel; 2],

    /// Colour clocks received but not yet rendered.
    clock: i32,
    /// Extra colour clocks requested by WSYNC, collected by the bus.
    cycles_added: usize,
    pub h_pos: i32,
    pub v_pos: i32,
    /// First pixel of the current line not yet resolved to RGB.
    h_dirty: i32,
    blanking: bool,
    syncing: bool,

    scanline: [u8; SCANLINE_LEN],
    last_scanline: [u8; SCANLINE_LEN],
    collisions: [u8; 15],

    draw_mode: u8,
    reflect_pf: bool,
    pf: [u8; 3],

    chroma_bk: u8,
    chroma_pf: u8,
    chroma_p0: u8,
    chroma_p1: u8,
    color_translate: [u32; 256],

    players: [Player; 2],
    missiles: [Missile; 2],
    ball: Ball,

    /// 160×264 palette-resolved pixels, filled as lines are drawn.
    back_buffer: Vec<u32>,
    /// 320×264 copy of the last complete frame.
    pub frame: Vec<u32>,
    /// Set when `frame` was refreshed (falling edge of VBLANK).
    pub frame_ready: bool,
}

impl Tia {
    /// New TIA for `signal`, with both audio channels opened on `mixer`.
    pub fn new(signal: Signal, mixer: &mut Mixer) -> Self {
        let rate = signal.audio_rate();
        let missile = Missile {
            pos: 0,
            motion: 0,
            size: 1,
            enabled: false,
            locked: false,
        };
        Self {
            palette: signal.palette(),
            channels: [mixer.open_channel(rate), mixer.open_channel(rate)],
            clock: 0,
            cycles_added: 0,
            h_pos: 0,
            v_pos: 0,
            h_dirty: 0,
            blanking: false,
            syncing: false,
            scanline: [0; SCANLINE_LEN],
            last_scanline: [0; SCANLINE_LEN],
            collisions: [0; 15],
            draw_mode: 0,
            reflect_pf: false,
            pf: [0; 3],
            chroma_bk: 0,
            chroma_pf: 0,
            chroma_p0: 0,
            chroma_p1: 0,
            color_translate: [0; 256],
            players: [Player::new(); 2],
            missiles: [missile; 2],
            ball: Ball {
                pos: 0,
                motion: 0,
                size: 1,
                enabled: false,
                delayed: false,
                vertical_delay: false,
            },
            back_buffer: vec![0; LINE_WIDTH * FRAME_HEIGHT],
            frame: vec![0; FRAME_WIDTH * FRAME_HEIGHT],
            frame_ready: false,
        }
    }

    pub fn clock(&mut self, cycles: usize) {
        self.clock += cycles as i32;
    }

    /// Take the extra colour clocks WSYNC asked for.
    pub fn sync_cycles(&mut self) -> usize {
        std::mem::take(&mut self.cycles_added)
    }

    // --- debug views ---

    /// PF0 << 16 | PF1 << 8 | PF2.
    pub fn playfield(&self) -> u32 {
        (self.pf[0] as u32) << 16 | (self.pf[1] as u32) << 8 | self.pf[2] as u32
    }

    /// Background, playfield, P0 and P1 colours.
    pub fn chroma(&self) -> [u32; 4] {
        [
            self.palette[self.chroma_bk as usize],
            self.palette[self.chroma_pf as usize],
            self.palette[self.chroma_p0 as usize],
            self.palette[self.chroma_p1 as usize],
        ]
    }

    /// Object bitmasks of the line being built, or of the previous one.
    pub fn scanline(&self, previous: bool) -> &[u8] {
        let line = if previous { &self.last_scanline } else { &self.scanline };
        &line[..LINE_WIDTH]
    }

    pub fn color_at(&self, previous: bool, x: usize) -> u32 {
        let mask = self.scanline(previous).get(x).copied().unwrap_or(0);
        self.color_translate[mask as usize]
    }

    pub fn collisions(&self) -> &[u8; 15] {
        &self.collisions
    }

    pub fn collision(&self, which: Collision) -> bool {
        self.collisions[which as usize] != 0
    }

    /// P0, P1, M0, M1, BL.
    pub fn object_positions(&self) -> [i32; 5] {
        [
            self.players[0].pos,
            self.players[1].pos,
            self.missiles[0].pos,
            self.missiles[1].pos,
            self.ball.pos,
        ]
    }

    /// Clear the presented-frame flag, returning whether it was set.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    // --- scan-in ---

    /// Write an 8-bit pattern at `loc`, MSB first, each bit `stretch` pixels
    /// wide; `mask` is cleared from the rest of the line.
    fn scan_in(&mut self, loc: i32, pattern: u8, mask: u8, stretch: i32, mirror: bool) {
        if !(0..LINE_WIDTH as i32).contains(&loc) {
            return;
        }
        let mut loc = loc as usize;
        let mut pattern = if mirror { pattern.reverse_bits() } else { pattern };

        while pattern != 0 {
            for _ in 0..stretch {
                if pattern & 0x80 != 0 {
                    self.scanline[loc] |= mask;
                } else {
                    self.scanline[loc] &= !mask;
                }
                loc += 1;
            }
            pattern <<= 1;
        }

        while loc < LINE_WIDTH {
            self.scanline[loc] &= !mask;
            loc += 1;
        }
    }

    /// Start every object whose trigger point lies in `start..end`, and tick
    /// the audio channels at their two points per line.
    fn latch_serializers(&mut self, start: i32, end: i32) {
        let crosses = |x: i32| start <= x && x < end;

        let audio_ticks = crosses(0) as usize + crosses(114) as usize;
        for _ in 0..audio_ticks {
            for ch in self.channels.iter_mut() {
                ch.tick();
            }
        }

        if self.syncing || self.blanking {
            return;
        }

        let [pf0, pf1, pf2] = self.pf;
        if crosses(0) {
            self.scan_in(0, pf0 >> 4, PF_BIT, 4, true);
        }
        if crosses(16) {
            self.scan_in(16, pf1, PF_BIT, 4, false);
        }
        if crosses(48) {
            self.scan_in(48, pf2, PF_BIT, 4, true);
        }
        if self.reflect_pf {
            if crosses(80) {
                self.scan_in(80, pf2, PF_BIT, 4, false);
            }
            if crosses(112) {
                self.scan_in(112, pf1, PF_BIT, 4, true);
            }
            if crosses(144) {
                self.scan_in(144, pf0 & 0xF0, PF_BIT, 4, false);
            }
        } else {
            if crosses(80) {
                self.scan_in(80, pf0 >> 4, PF_BIT, 4, true);
            }
            if crosses(96) {
                self.scan_in(96, pf1, PF_BIT, 4, false);
            }
            if crosses(128) {
                self.scan_in(128, pf2, PF_BIT, 4, true);
            }
        }

        let ball_on = if self.ball.vertical_delay {
            self.ball.delayed
        } else {
            self.ball.enabled
        };
        if ball_on && crosses(self.ball.pos) {
            self.scan_in(self.ball.pos, 0x80, BL_BIT, self.ball.size, false);
        }

        // copies of missiles and players start in (start, end]
        let starts = |x: i32| start < x && x <= end;
        let copy_pos = |p: &Player, pos: i32, i: i32| {
            let opos = pos + i * p.gap;
            if opos >= LINE_WIDTH as i32 { opos - LINE_WIDTH as i32 } else { opos }
        };

        for (n, mask) in [(0, M0_BIT), (1, M1_BIT)] {
            let missile = self.missiles[n];
            if !missile.enabled || missile.locked {
                continue;
            }
            let player = self.players[n];
            for i in 0..=player.repeat {
                let opos = copy_pos(&player, missile.pos, i);
                if starts(opos) {
                    self.scan_in(opos, 0x80, mask, missile.size, false);
                }
            }
        }

        for (n, mask) in [(0, P0_BIT), (1, P1_BIT)] {
            let player = self.players[n];
            let graphics = if player.vertical_delay {
                player.delayed
            } else {
                player.graphics
            };
            for i in 0..=player.repeat {
                let opos = copy_pos(&player, player.pos, i);
                if starts(opos) {
                    self.scan_in(opos, graphics, mask, player.stretch, player.reflect);
                }
            }
        }
    }

    /// Render everything up to the current colour clock.
    pub fn catch_up(&mut self) {
        let end = self.h_pos + self.clock;
        self.latch_serializers(self.h_pos, end);
        self.h_pos = end;
        self.clock = 0;
        self.force_scan_draw();

        while self.h_pos >= LINE_WIDTH as i32 {
            self.h_pos -= LINE_WIDTH as i32 + HBLANK;
            self.v_pos = self.v_pos.saturating_add(1);
            self.h_dirty = 0;

            std::mem::swap(&mut self.scanline, &mut self.last_scanline);
            let (left, right) = self.scanline.split_at_mut(LINE_WIDTH / 2);
            left.fill(0);
            right[..LINE_WIDTH / 2].fill(SIDE_BIT);

            self.latch_serializers(-HBLANK, self.h_pos);
            self.force_scan_draw();
        }
    }

    /// Resolve the pixels between the last draw and the beam, latching any
    /// collisions among them.
    fn force_scan_draw(&mut self) {
        if self.h_pos <= 0 || self.v_pos < 0 || self.v_pos >= FRAME_HEIGHT as i32 {
            return;
        }

        let start = self.h_dirty as usize;
        let end = self.h_pos.min(LINE_WIDTH as i32) as usize;
        if start >= end {
            return;
        }

        self.find_collisions(start, end);

        let row = self.v_pos as usize * LINE_WIDTH;
        for x in start..end {
            self.back_buffer[row + x] = self.color_translate[self.scanline[x] as usize];
        }
        self.h_dirty = end as i32;
    }

    fn find_collisions(&mut self, start: usize, end: usize) {
        let pixels = &self.scanline[start..end];
        for (latch, &mask) in self.collisions.iter_mut().zip(COLLISION_MASKS.iter()) {
            if *latch == 0 && pixels.iter().any(|&px| px & mask == mask) {
                *latch = LATCHED;
            }
        }
    }

    // --- palette ---

    fn update_palette(&mut self) {
        self.force_scan_draw();

        let p0 = self.palette[self.chroma_p0 as usize];
        let p1 = self.palette[self.chroma_p1 as usize];
        let (pf_left, pf_right) = if self.draw_mode & SCORE_MODE != 0 {
            (p0, p1)
        } else {
            let pf = self.palette[self.chroma_pf as usize];
            (pf, pf)
        };
        let priority = self.draw_mode & PRIORITY_MODE != 0;

        for i in 1..SIDE_BIT {
            let playfield = i & (PF_BIT | BL_BIT) != 0;
            let player0 = i & (P0_BIT | M0_BIT) != 0;
            let player1 = i & (P1_BIT | M1_BIT) != 0;

            let colours = if priority && playfield {
                (pf_left, pf_right)
            } else if player0 {
                (p0, p0)
            } else if player1 {
                (p1, p1)
            } else if playfield {
                (pf_left, pf_right)
            } else {
                continue;
            };

            self.color_translate[i as usize] = colours.0;
            self.color_translate[(i | SIDE_BIT) as usize] = colours.1;
        }
    }

    fn set_background(&mut self, data: u8) {
        self.force_scan_draw();
        self.chroma_bk = data >> 1;
        let colour = self.palette[self.chroma_bk as usize];
        self.color_translate[0] = colour;
        self.color_translate[SIDE_BIT as usize] = colour;
    }

    // --- registers ---

    fn vblank(&mut self, data: u8, ports: &mut Ports) {
        let was_blanking = self.blanking;
        self.blanking = data & 0x02 != 0;

        if was_blanking && !self.blanking {
            self.present();
            self.v_pos = 0;
        }

        for port in ports.iter_mut() {
            port.ground(data & 0x80 != 0);
            port.latch(data & 0x40 != 0);
        }
    }

    /// Copy the back buffer to the host frame, doubling every pixel.
    fn present(&mut self) {
        for (src, dst) in self
            .back_buffer
            .iter()
            .zip(self.frame.chunks_exact_mut(2))
        {
            dst.fill(*src);
        }
        self.frame_ready = true;
    }

    fn nusiz(&mut self, n: usize, data: u8) {
        let mode = (data & 0x07) as usize;
        let player = &mut self.players[n];
        player.stretch = STRETCH[mode];
        player.gap = GAP[mode];
        player.repeat = REPEATS[mode];
        player.mid_delay = player.stretch * 3;

        self.missiles[n].size = 1 << ((data >> 4) & 0x03);
        self.lock_missile(n);
    }

    /// Park a locked missile on its player.
    fn lock_missile(&mut self, n: usize) {
        if self.missiles[n].locked {
            let player = &self.players[n];
            self.missiles[n].pos = player.mid_delay + player.pos;
        }
    }

    /// Object position relative to the beam; HBLANK counts as the left edge.
    fn beam_position(&self, offset: i32) -> i32 {
        self.h_pos.max(0) + offset
    }

    fn hmove(&mut self) {
        let shift = |pos: i32, motion: i32| (pos - motion).rem_euclid(LINE_WIDTH as i32);

        self.ball.pos = shift(self.ball.pos, self.ball.motion);
        for n in 0..2 {
            self.players[n].pos = shift(self.players[n].pos, self.players[n].motion);
            if self.missiles[n].locked {
                self.lock_missile(n);
            } else {
                self.missiles[n].pos = shift(self.missiles[n].pos, self.missiles[n].motion);
            }
        }

        for px in self.scanline[..8].iter_mut() {
            *px |= HMOVE_BIT;
        }
    }

    fn collision_pair(&mut self, trash: u8, high: Collision, low: Collision) -> u8 {
        self.force_scan_draw();
        (trash & 0x3F) | (self.collisions[high as usize] << 1) | self.collisions[low as usize]
    }

    /// Read register `addr & 0x0F`. Undriven bits come from `trash`.
    pub fn peek(&mut self, addr: u16, trash: u8, ports: &Ports) -> u8 {
        self.catch_up();

        match addr & 0x0F {
            0x0 => self.collision_pair(trash, Collision::P1M0, Collision::M0P0),
            0x1 => self.collision_pair(trash, Collision::M1P1, Collision::M1P0),
            0x2 => self.collision_pair(trash, Collision::P0Pf, Collision::P0Bl),
            0x3 => self.collision_pair(trash, Collision::P1Pf, Collision::P1Bl),
            0x4 => self.collision_pair(trash, Collision::M0Pf, Collision::M0Bl),
            0x5 => self.collision_pair(trash, Collision::M1Pf, Collision::M1Bl),
            0x6 => {
                self.force_scan_draw();
                (trash & 0x7F) | (self.collisions[Collision::BlPf as usize] << 1)
            }
            0x7 => self.collision_pair(trash, Collision::P1P0, Collision::M1M0),
            0x8 => (trash & 0x7F) | ports[0].pot1(),
            0x9 => (trash & 0x7F) | ports[0].pot2(),
            0xA => (trash & 0x7F) | ports[1].pot1(),
            0xB => (trash & 0x7F) | ports[1].pot2(),
            0xC => (trash & 0x7F) | ports[0].fire(),
            0xD => (trash & 0x7F) | ports[1].fire(),
            _ => trash,
        }
    }

    /// Write register `addr & 0x3F`.
    pub fn poke(&mut self, addr: u16, data: u8, ports: &mut Ports) {
        self.catch_up();

        match addr & 0x3F {
            // VSYNC
            0x00 => self.syncing = data & 0x02 != 0,
            0x01 => self.vblank(data, ports),
            // WSYNC
            0x02 => {
                if self.h_pos != -HBLANK {
                    self.cycles_added += (LINE_WIDTH as i32 - self.h_pos) as usize;
                }
            }
            // RSYNC
            0x03 => {
                self.h_pos = 0;
                self.clock = 0;
                self.h_dirty = 0;
            }
            0x04 => self.nusiz(0, data),
            0x05 => self.nusiz(1, data),
            0x06 => {
                self.chroma_p0 = data >> 1;
                self.update_palette();
            }
            0x07 => {
                self.chroma_p1 = data >> 1;
                self.update_palette();
            }
            0x08 => {
                self.chroma_pf = data >> 1;
                self.update_palette();
            }
            0x09 => self.set_background(data),
            // CTRLPF
            0x0A => {
                self.reflect_pf = data & 0x01 != 0;
                self.draw_mode = data & (SCORE_MODE | PRIORITY_MODE);
                self.ball.size = 1 << ((data >> 4) & 0x03);
                self.update_palette();
            }
            0x0B => self.players[0].reflect = data & 0x08 != 0,
            0x0C => self.players[1].reflect = data & 0x08 != 0,
            0x0D => self.pf[0] = data,
            0x0E => self.pf[1] = data,
            0x0F => self.pf[2] = data,
            // RESP0 / RESP1
            0x10 | 0x11 => {
                let n = (addr & 1) as usize;
                self.players[n].pos = self.beam_position(5);
                self.lock_missile(n);
            }
            // RESM0 / RESM1
            0x12 | 0x13 => {
                let n = (addr & 1) as usize;
                if !self.missiles[n].locked {
                    self.missiles[n].pos = self.beam_position(4);
                }
            }
            0x14 => self.ball.pos = self.beam_position(4),
            0x15 => self.channels[0].set_waveform(data),
            0x16 => self.channels[1].set_waveform(data),
            0x17 => self.channels[0].set_frequency(data),
            0x18 => self.channels[1].set_frequency(data),
            0x19 => self.channels[0].set_volume(data),
            0x1A => self.channels[1].set_volume(data),
            // GRP0 latches the other player's delayed copy, GRP1 latches P0's and the ball's
            0x1B => {
                self.players[0].graphics = data;
                self.players[1].delayed = self.players[1].graphics;
            }
            0x1C => {
                self.players[1].graphics = data;
                self.players[0].delayed = self.players[0].graphics;
                self.ball.delayed = self.ball.enabled;
            }
            0x1D => self.missiles[0].enabled = data & 0x02 != 0,
            0x1E => self.missiles[1].enabled = data & 0x02 != 0,
            0x1F => self.ball.enabled = data & 0x02 != 0,
            // HMP0..HMBL: signed high nibble
            0x20 => self.players[0].motion = (data as i8 >> 4) as i32,
            0x21 => self.players[1].motion = (data as i8 >> 4) as i32,
            0x22 => self.missiles[0].motion = (data as i8 >> 4) as i32,
            0x23 => self.missiles[1].motion = (data as i8 >> 4) as i32,
            0x24 => self.ball.motion = (data as i8 >> 4) as i32,
            0x25 => self.players[0].vertical_delay = data & 0x01 != 0,
            0x26 => self.players[1].vertical_delay = data & 0x01 != 0,
            0x27 => self.ball.vertical_delay = data & 0x01 != 0,
            // RESMP0 / RESMP1
            0x28 | 0x29 => {
                let n = (addr & 1) as usize;
                self.missiles[n].locked = data & 0x02 != 0;
                self.lock_missile(n);
            }
            0x2A => self.hmove(),
            // HMCLR
            0x2B => {
                self.ball.motion = 0;
                for n in 0..2 {
                    self.players[n].motion = 0;
                    self.missiles[n].motion = 0;
                }
            }
            // CXCLR
            0x2C => {
                self.force_scan_draw();
                self.collisions = [0; 15];
            }
            _ => {}
        }
    }
}

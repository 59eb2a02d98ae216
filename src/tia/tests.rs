use crate::{
    audio::mixer::Mixer,
    config::Signal,
    controller::{Joystick, Ports, unplugged},
    tia::{
        palette::NTSC_PALETTE,
        tia::{COLLISION_MASKS, Collision, FRAME_WIDTH, HMOVE_BIT, P0_BIT, PF_BIT, Tia},
    },
};

const VBLANK: u16 = 0x01;
const WSYNC: u16 = 0x02;
const COLUP0: u16 = 0x06;
const COLUP1: u16 = 0x07;
const COLUPF: u16 = 0x08;
const COLUBK: u16 = 0x09;
const CTRLPF: u16 = 0x0A;
const PF0: u16 = 0x0D;
const PF1: u16 = 0x0E;
const PF2: u16 = 0x0F;
const RESP0: u16 = 0x10;
const AUDV0: u16 = 0x19;
const GRP0: u16 = 0x1B;
const HMP0: u16 = 0x20;
const HMBL: u16 = 0x24;
const HMOVE: u16 = 0x2A;
const CXCLR: u16 = 0x2C;

const CXP0FB: u16 = 0x02;
const INPT4: u16 = 0x0C;

const LINE: usize = 228;

fn new_tia() -> (Tia, Ports) {
    let mut mixer = Mixer::new(44_100);
    (Tia::new(Signal::Ntsc, &mut mixer), unplugged())
}

/// Advance the beam by `clocks` and render.
fn run(tia: &mut Tia, clocks: usize) {
    tia.clock(clocks);
    tia.catch_up();
}

#[test]
fn player_scans_in_from_its_position() {
    let (mut tia, mut ports) = new_tia();
    tia.clock(5);
    tia.poke(RESP0, 0, &mut ports);
    assert_eq!(tia.object_positions()[0], 10);

    tia.poke(GRP0, 0xFF, &mut ports);
    run(&mut tia, 15);
    assert_eq!(tia.h_pos, 20);

    let line = tia.scanline(false);
    for x in 10..18 {
        assert_ne!(line[x] & P0_BIT, 0, "pixel {x}");
    }
    for x in (0..10).chain(18..20) {
        assert_eq!(line[x] & P0_BIT, 0, "pixel {x}");
    }
}

#[test]
fn player_playfield_collision_latches_until_cleared() {
    let (mut tia, mut ports) = new_tia();
    tia.poke(PF1, 0xFF, &mut ports);
    tia.clock(15);
    tia.poke(RESP0, 0, &mut ports);
    tia.poke(GRP0, 0xFF, &mut ports);
    assert_eq!(tia.peek(CXP0FB, 0, &ports), 0);

    run(&mut tia, 40);
    assert!(tia.collision(Collision::P0Pf));
    assert!(!tia.collision(Collision::P0Bl));
    assert_eq!(tia.peek(CXP0FB, 0x15, &ports), 0x80 | 0x15);

    // sticky across lines
    run(&mut tia, LINE * 2);
    assert!(tia.collision(Collision::P0Pf));

    tia.poke(CXCLR, 0, &mut ports);
    assert!(tia.collisions().iter().all(|&c| c == 0));
}

#[test]
fn each_object_pair_has_exactly_one_latch() {
    for (i, &a) in COLLISION_MASKS.iter().enumerate() {
        assert_eq!(a.count_ones(), 2);
        for &b in &COLLISION_MASKS[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn playfield_halves_follow_reflect_bit() {
    let (mut tia, mut ports) = new_tia();
    tia.poke(PF1, 0x80, &mut ports);
    run(&mut tia, LINE);
    run(&mut tia, LINE);
    let line = tia.scanline(true);
    assert_ne!(line[16] & PF_BIT, 0);
    assert_ne!(line[96] & PF_BIT, 0);
    assert_eq!(line[140] & PF_BIT, 0);

    tia.poke(CTRLPF, 0x01, &mut ports);
    run(&mut tia, LINE);
    let line = tia.scanline(true);
    assert_ne!(line[19] & PF_BIT, 0);
    assert_eq!(line[96] & PF_BIT, 0);
    assert_ne!(line[143] & PF_BIT, 0);
}

#[test]
fn playfield_register_view() {
    let (mut tia, mut ports) = new_tia();
    tia.poke(PF0, 0x10, &mut ports);
    tia.poke(PF1, 0x22, &mut ports);
    tia.poke(PF2, 0x33, &mut ports);
    assert_eq!(tia.playfield(), 0x10_22_33);
}

#[test]
fn score_mode_colours_each_half_by_player() {
    let (mut tia, mut ports) = new_tia();
    tia.poke(COLUP0, 0x44, &mut ports);
    tia.poke(COLUP1, 0x86, &mut ports);
    tia.poke(CTRLPF, 0x02, &mut ports);
    tia.poke(PF0, 0xF0, &mut ports);

    run(&mut tia, LINE);
    run(&mut tia, LINE);

    assert_eq!(tia.color_at(true, 0), NTSC_PALETTE[0x44 >> 1]);
    assert_eq!(tia.color_at(true, 80), NTSC_PALETTE[0x86 >> 1]);
}

#[test]
fn priority_mode_puts_playfield_over_players() {
    let (mut tia, mut ports) = new_tia();
    tia.poke(COLUP0, 0x44, &mut ports);
    tia.poke(COLUPF, 0x86, &mut ports);
    tia.poke(PF0, 0xF0, &mut ports);
    tia.clock(5);
    tia.poke(RESP0, 0, &mut ports);
    tia.poke(GRP0, 0xFF, &mut ports);

    run(&mut tia, LINE);
    run(&mut tia, LINE);
    let line = tia.scanline(true);
    assert_eq!(line[12] & (P0_BIT | PF_BIT), P0_BIT | PF_BIT);
    assert_eq!(tia.color_at(true, 12), NTSC_PALETTE[0x44 >> 1]);

    tia.poke(CTRLPF, 0x04, &mut ports);
    assert_eq!(tia.color_at(true, 12), NTSC_PALETTE[0x86 >> 1]);
    // playfield alone keeps its colour either way
    assert_eq!(tia.color_at(true, 2), NTSC_PALETTE[0x86 >> 1]);
}

#[test]
fn colour_change_mid_line_only_affects_pixels_right_of_beam() {
    let (mut tia, mut ports) = new_tia();
    tia.poke(COLUBK, 0x1E, &mut ports);
    run(&mut tia, LINE);
    assert_eq!(tia.v_pos, 1);

    tia.clock(108);
    tia.poke(COLUBK, 0x44, &mut ports);
    assert_eq!(tia.h_pos, 108);
    run(&mut tia, LINE - 108);

    tia.poke(VBLANK, 0x02, &mut ports);
    tia.poke(VBLANK, 0x00, &mut ports);
    assert!(tia.take_frame_ready());

    let old = NTSC_PALETTE[0x1E >> 1];
    let new = NTSC_PALETTE[0x44 >> 1];
    let row = &tia.frame[FRAME_WIDTH..FRAME_WIDTH * 2];
    assert_eq!(row[10 * 2], old);
    assert_eq!(row[107 * 2 + 1], old);
    assert_eq!(row[108 * 2], new);
    assert_eq!(row[130 * 2], new);
}

#[test]
fn line_counter_saturates_without_vblank() {
    let (mut tia, _) = new_tia();
    tia.v_pos = i32::MAX;
    run(&mut tia, LINE * 2);
    assert_eq!(tia.v_pos, i32::MAX);
}

#[test]
fn wsync_requests_rest_of_line() {
    let (mut tia, mut ports) = new_tia();
    tia.clock(10);
    tia.poke(WSYNC, 0, &mut ports);
    assert_eq!(tia.sync_cycles(), 150);
    assert_eq!(tia.sync_cycles(), 0);

    // at the very start of a line there is nothing to wait for
    run(&mut tia, 150);
    assert_eq!(tia.h_pos, -68);
    tia.poke(WSYNC, 0, &mut ports);
    assert_eq!(tia.sync_cycles(), 0);
}

#[test]
fn hmove_shifts_objects_and_marks_comb() {
    let (mut tia, mut ports) = new_tia();
    tia.clock(5);
    tia.poke(RESP0, 0, &mut ports);
    tia.poke(HMP0, 0x10, &mut ports); // one pixel left
    tia.poke(HMBL, 0xF0, &mut ports); // one pixel right
    tia.poke(HMOVE, 0, &mut ports);

    let positions = tia.object_positions();
    assert_eq!(positions[0], 9);
    assert_eq!(positions[4], 1);
    assert!(tia.scanline(false)[..8].iter().all(|px| px & HMOVE_BIT != 0));

    tia.poke(HMBL, 0x70, &mut ports);
    tia.poke(HMOVE, 0, &mut ports);
    assert_eq!(tia.object_positions()[4], 154);
}

#[test]
fn vblank_falling_edge_presents_doubled_frame() {
    let (mut tia, mut ports) = new_tia();
    tia.poke(COLUBK, 0x1E, &mut ports);
    run(&mut tia, LINE);

    tia.poke(VBLANK, 0x02, &mut ports);
    assert!(!tia.frame_ready);
    tia.poke(VBLANK, 0x00, &mut ports);
    assert!(tia.take_frame_ready());
    assert!(!tia.take_frame_ready());
    assert_eq!(tia.v_pos, 0);

    let colour = NTSC_PALETTE[0x1E >> 1];
    assert_eq!(tia.frame[0], colour);
    assert_eq!(tia.frame[1], colour);
    assert_eq!(tia.frame[319], colour);
    assert_eq!(tia.chroma()[0], colour);
}

#[test]
fn audio_ticks_twice_per_line() {
    let mut mixer = Mixer::new(44_100);
    let mut tia = Tia::new(Signal::Ntsc, &mut mixer);
    let mut ports = unplugged();
    tia.poke(AUDV0, 0x0F, &mut ports);
    run(&mut tia, LINE);

    let mut buf = [0u8; 2];
    mixer.mix(&mut buf);
    assert_eq!(buf, [60, 60]);
}

#[test]
fn trigger_reads_keep_bus_trash_in_low_bits() {
    let (mut tia, _) = new_tia();
    let stick = Joystick::new();
    let ports: Ports = [Box::new(stick.clone()), Box::new(Joystick::new())];

    assert_eq!(tia.peek(INPT4, 0x3F, &ports), 0xBF);
    stick.set_fire(true);
    assert_eq!(tia.peek(INPT4, 0x3F, &ports), 0x3F);
    // unmapped read registers return the trash untouched
    assert_eq!(tia.peek(0x0E, 0x5A, &ports), 0x5A);
}

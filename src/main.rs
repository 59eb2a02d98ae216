//! Atari 2600 emulator entry point.
//!
//! Loads a cartridge image and runs it in a window with sound.
//! Usage: tiara [--scheme NAME] [--signal ntsc|pal|secam] path/to/game.bin

use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use ansi_term::Colour::{Blue, Green, Red, Yellow};
use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record};
use minifb::{Key, KeyRepeat, Scale, ScaleMode, Window, WindowOptions};
use rodio::{OutputStream, Sink, Source};

use tiara::{
    atari::{Atari, RunMode},
    audio::mixer::Mixer,
    cartridge::cartridge::{Cartridge, schemes_for},
    config::{Config, DEFAULT_SAMPLE_RATE, Signal},
    controller::{JOY_DOWN, JOY_LEFT, JOY_RIGHT, JOY_UP, Joystick, Unplugged},
    riot::{PANEL_COLOR, PANEL_DIFFICULTY_P0, PANEL_DIFFICULTY_P1, PANEL_RESET, PANEL_SELECT},
    tia::tia::{FRAME_HEIGHT, FRAME_WIDTH},
};

/// One host frame is 1/60 s of emulated time regardless of the TV standard.
const FRAME_DURATION: Duration = Duration::from_nanos(16_666_667);

/// Samples mixed per refill of the audio device.
const AUDIO_BLOCK: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "tiara", version, about = "Atari 2600 emulator")]
struct Args {
    /// Cartridge image (raw ROM dump)
    rom: PathBuf,

    /// Bank-switching scheme; defaults to the first one listed for the image size
    #[arg(long)]
    scheme: Option<String>,

    /// Television standard
    #[arg(long, default_value_t = Signal::Ntsc)]
    signal: Signal,

    /// Audio output rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Log every instruction (implies --log-level trace)
    #[arg(long)]
    trace: bool,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the schemes that fit the image and exit
    #[arg(long)]
    list_schemes: bool,
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => Red.bold().paint("ERROR"),
            Level::Warn => Yellow.bold().paint("WARN"),
            Level::Info => Green.bold().paint("INFO"),
            Level::Debug => Blue.bold().paint("DEBUG"),
            Level::Trace => Blue.paint("TRACE"),
        };
        eprintln!("{} {}", tag, record.args());
    }

    fn flush(&self) {}
}

fn init_logger(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// Feeds the mixer's output to the audio device.
struct MixerSource {
    mixer: Mixer,
    block: Vec<u8>,
    pos: usize,
}

impl MixerSource {
    fn new(mixer: Mixer) -> Self {
        Self {
            mixer,
            block: vec![0; AUDIO_BLOCK],
            pos: AUDIO_BLOCK,
        }
    }
}

impl Iterator for MixerSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.pos == self.block.len() {
            // silence while the emulation has not produced a full block
            self.block.fill(0);
            self.mixer.mix(&mut self.block);
            self.pos = 0;
        }
        let sample = self.block[self.pos];
        self.pos += 1;
        Some(sample as f32 / 256.0)
    }
}

impl Source for MixerSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.mixer.output_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Open the default output device. The returned stream must outlive playback.
fn start_audio(mixer: Mixer) -> Option<(OutputStream, Sink)> {
    let (stream, handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(e) => {
            log::warn!("no audio device, running silent: {e}");
            return None;
        }
    };
    let sink = match Sink::try_new(&handle) {
        Ok(sink) => sink,
        Err(e) => {
            log::warn!("could not open audio sink: {e}");
            return None;
        }
    };
    sink.append(MixerSource::new(mixer));
    Some((stream, sink))
}

/// Sample the keyboard into the joystick and console switches.
fn handle_input(window: &Window, atari: &mut Atari, stick: &Joystick) {
    for (key, mask) in [
        (Key::Up, JOY_UP),
        (Key::Down, JOY_DOWN),
        (Key::Left, JOY_LEFT),
        (Key::Right, JOY_RIGHT),
    ] {
        stick.set_direction(mask, window.is_key_down(key));
    }
    stick.set_fire(window.is_key_down(Key::LeftShift) || window.is_key_down(Key::Space));

    let mut press = 0;
    if window.is_key_down(Key::F1) {
        press |= PANEL_SELECT;
    }
    if window.is_key_down(Key::F2) {
        press |= PANEL_RESET;
    }

    let mut toggle = 0;
    for key in window.get_keys_pressed(KeyRepeat::No) {
        match key {
            Key::F3 => toggle |= PANEL_COLOR,
            Key::F4 => toggle |= PANEL_DIFFICULTY_P0,
            Key::F5 => toggle |= PANEL_DIFFICULTY_P1,
            Key::F9 => {
                if atari.mode == RunMode::Stopped {
                    atari.run();
                } else {
                    atari.stop();
                }
                log::info!("{:?}", atari.mode);
            }
            Key::F10 => {
                atari.trace = !atari.trace;
                if atari.trace {
                    log::set_max_level(LevelFilter::Trace);
                }
            }
            _ => {}
        }
    }

    let release = (PANEL_SELECT | PANEL_RESET) & !press;
    atari.alter_panel(toggle, release, press);
}

fn main() {
    let args = Args::parse();

    let level = if args.trace {
        LevelFilter::Trace
    } else {
        args.log_level.parse().unwrap_or(LevelFilter::Info)
    };
    init_logger(level);

    if args.list_schemes {
        match fs::metadata(&args.rom) {
            Ok(meta) => {
                let schemes = schemes_for(meta.len() as usize);
                if schemes.is_empty() {
                    log::error!("no scheme supports a {} byte image", meta.len());
                    process::exit(1);
                }
                for scheme in schemes {
                    println!("{scheme}");
                }
                return;
            }
            Err(e) => {
                log::error!("{}: {e}", args.rom.display());
                process::exit(1);
            }
        }
    }

    let config = Config {
        signal: args.signal,
        sample_rate: args.sample_rate,
        scheme: args.scheme,
    };

    let cart = match Cartridge::load(&args.rom, config.scheme.as_deref()) {
        Ok(cart) => cart,
        Err(e) => {
            log::error!("{}: {e}", args.rom.display());
            process::exit(1);
        }
    };

    let mut mixer = Mixer::new(config.sample_rate);
    let mut atari = Atari::new(cart, &config, &mut mixer);
    atari.trace = args.trace;

    let stick = Joystick::new();
    atari.plug(Box::new(stick.clone()), Box::new(Unplugged));

    let _audio = start_audio(mixer);

    let mut window = Window::new(
        "Tiara",
        FRAME_WIDTH,
        FRAME_HEIGHT,
        WindowOptions {
            resize: true,
            scale: Scale::X2,
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        },
    )
    .expect("Failed to create window");

    window.set_target_fps(60);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let frame_start = Instant::now();

        handle_input(&window, &mut atari, &stick);
        atari.run_frame();

        if atari.take_frame_ready() {
            if let Err(e) = window.update_with_buffer(atari.frame(), FRAME_WIDTH, FRAME_HEIGHT) {
                log::error!("failed to update window: {e}");
                break;
            }
        } else {
            // stopped, or the program has not reached VBLANK yet: keep pumping events
            window.update();
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }
}

//! Machine configuration: video standard and host audio rate.

use std::fmt;
use std::str::FromStr;

use crate::tia::palette::{NTSC_PALETTE, PAL_PALETTE, SECAM_PALETTE};

/// Host audio rate used when none is configured.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Television standard the console was built for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Signal {
    #[default]
    Ntsc,
    Pal,
    Secam,
}

impl Signal {
    /// Colour clocks per 1/60 s of emulated time: the host frame budget.
    pub fn frame_clocks(self) -> usize {
        match self {
            Signal::Ntsc => 59_736,
            Signal::Pal | Signal::Secam => 59_280,
        }
    }

    /// TIA audio tick rate (two ticks per scanline).
    pub fn audio_rate(self) -> u32 {
        match self {
            Signal::Ntsc => 31_440,
            Signal::Pal | Signal::Secam => 31_200,
        }
    }

    /// 128 colours as 0xRRGGBB, indexed by the colour register value >> 1.
    pub fn palette(self) -> &'static [u32; 128] {
        match self {
            Signal::Ntsc => &NTSC_PALETTE,
            Signal::Pal => &PAL_PALETTE,
            Signal::Secam => &SECAM_PALETTE,
        }
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ntsc" => Ok(Signal::Ntsc),
            "pal" => Ok(Signal::Pal),
            "secam" => Ok(Signal::Secam),
            other => Err(format!("unknown signal type {other:?} (expected ntsc, pal or secam)")),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Ntsc => "NTSC",
            Signal::Pal => "PAL",
            Signal::Secam => "SECAM",
        };
        f.write_str(name)
    }
}

/// Everything a machine instance needs besides the cartridge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub signal: Signal,
    /// Host output rate the audio channels convert to.
    pub sample_rate: u32,
    /// Mapping scheme name; `None` picks the first one listed for the image size.
    pub scheme: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            signal: Signal::Ntsc,
            sample_rate: DEFAULT_SAMPLE_RATE,
            scheme: None,
        }
    }
}

//! Cartridge images and the mapper registry.
//!
//! 2600 images are raw ROM dumps with no header, so the bank-switching scheme
//! cannot be read from the file. The registry lists which schemes are plausible
//! for each image size and the user (or a saved profile) picks one by name.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::cartridge::mapper::{
    activision::Activision,
    fixed::{FourK, TwoK},
    mapper::Mapper,
    misc::{Megaboy, UaLimited},
    mnetwork::MNetwork,
    parker::ParkerBrothers,
    pitfall2::PitfallII,
    ram_carts::{Cbs, Commavid},
    standard::{ReversedStandard, Standard, SuperChip},
    tigervision::{TigerVision, TigerVisionExtended},
};

#[derive(Error, Debug)]
pub enum CartridgeError {
    #[error("unsupported ROM size: {0} bytes")]
    UnsupportedSize(usize),
    #[error("unknown mapping scheme: {0}")]
    UnknownScheme(String),
    #[error("scheme {scheme:?} does not fit a {size} byte image")]
    SchemeSizeMismatch { scheme: String, size: usize },
    #[error("failed to read ROM: {0}")]
    Io(#[from] std::io::Error),
}

type Factory = fn(Vec<u8>) -> Box<dyn Mapper>;

/// Image size -> eligible schemes, most likely first.
const SCHEMES_BY_SIZE: &[(usize, &[&str])] = &[
    (0x800, &["2k Mirrored", "Commavid"]),
    (0x1000, &["4k Standard"]),
    (
        0x2000,
        &[
            "Standard Mapping",
            "Super Chip Mapping",
            "Parker Brothers",
            "Tiger Vision",
            "Reversed Standard",
            "Activision",
            "UA Limited",
        ],
    ),
    // 8K program + 2K graphics, with or without the 255-byte sound table
    (0x2800, &["Pitfall II"]),
    (0x28FF, &["Pitfall II"]),
    (0x3000, &["CBS"]),
    (0x4000, &["Standard Mapping", "Super Chip Mapping", "M-Network"]),
    (
        0x8000,
        &["Standard Mapping", "Super Chip Mapping", "Tigervision Extended"],
    ),
    (
        0x10000,
        &[
            "Standard Mapping",
            "Super Chip Mapping",
            "Megaboy",
            "Tigervision Extended",
        ],
    ),
    (0x20000, &["Tigervision Extended"]),
    (0x40000, &["Tigervision Extended"]),
    (0x80000, &["Tigervision Extended"]),
];

fn boxed<M: Mapper + 'static>(mapper: M) -> Box<dyn Mapper> {
    Box::new(mapper)
}

fn factory(scheme: &str) -> Option<Factory> {
    let f: Factory = match scheme {
        "2k Mirrored" => |rom| boxed(TwoK::new(rom)),
        "Commavid" => |rom| boxed(Commavid::new(rom)),
        "4k Standard" => |rom| boxed(FourK::new(rom)),
        "Standard Mapping" => |rom| boxed(Standard::new(rom)),
        "Super Chip Mapping" => |rom| boxed(SuperChip::new(rom)),
        "Reversed Standard" => |rom| boxed(ReversedStandard::new(rom)),
        "Parker Brothers" => |rom| boxed(ParkerBrothers::new(rom)),
        "Tiger Vision" => |rom| boxed(TigerVision::new(rom)),
        "Tigervision Extended" => |rom| boxed(TigerVisionExtended::new(rom)),
        "Activision" => |rom| boxed(Activision::new(rom)),
        "M-Network" => |rom| boxed(MNetwork::new(rom)),
        "CBS" => |rom| boxed(Cbs::new(rom)),
        "Megaboy" => |rom| boxed(Megaboy::new(rom)),
        "UA Limited" => |rom| boxed(UaLimited::new(rom)),
        "Pitfall II" => |rom| boxed(PitfallII::new(rom)),
        _ => return None,
    };
    Some(f)
}

/// Every image size the registry accepts.
pub fn allowed_sizes() -> Vec<usize> {
    SCHEMES_BY_SIZE.iter().map(|&(size, _)| size).collect()
}

/// Schemes that can drive an image of `size` bytes; empty if the size is unsupported.
pub fn schemes_for(size: usize) -> &'static [&'static str] {
    SCHEMES_BY_SIZE
        .iter()
        .find(|&&(s, _)| s == size)
        .map(|&(_, schemes)| schemes)
        .unwrap_or(&[])
}

/// Build the mapper for `scheme`, rejecting sizes the scheme was not listed for.
pub fn create(scheme: &str, rom: Vec<u8>) -> Result<Box<dyn Mapper>, CartridgeError> {
    let size = rom.len();
    let eligible = schemes_for(size);
    if eligible.is_empty() {
        return Err(CartridgeError::UnsupportedSize(size));
    }
    let make = factory(scheme).ok_or_else(|| CartridgeError::UnknownScheme(scheme.to_string()))?;
    if !eligible.contains(&scheme) {
        return Err(CartridgeError::SchemeSizeMismatch {
            scheme: scheme.to_string(),
            size,
        });
    }
    Ok(make(rom))
}

/// Cartridge: the mapper bound to one image for the whole session.
pub struct Cartridge {
    pub mapper: Box<dyn Mapper>,
    pub scheme: &'static str,
}

impl Cartridge {
    /// Bind `rom` to `scheme`, or to the first eligible scheme when `None`.
    pub fn from_bytes(rom: Vec<u8>, scheme: Option<&str>) -> Result<Self, CartridgeError> {
        let eligible = schemes_for(rom.len());
        let requested = scheme
            .or(eligible.first().copied())
            .ok_or(CartridgeError::UnsupportedSize(rom.len()))?;
        let mapper = create(requested, rom)?;
        let scheme = eligible
            .iter()
            .copied()
            .find(|s| *s == requested)
            .unwrap_or_default();
        log::info!("cartridge bound to {scheme:?}");
        Ok(Self { mapper, scheme })
    }

    /// Read a raw image from disk.
    pub fn load<P: AsRef<Path>>(path: P, scheme: Option<&str>) -> Result<Self, CartridgeError> {
        let rom = fs::read(path)?;
        Self::from_bytes(rom, scheme)
    }

    pub fn access(&mut self, addr: u16, data: u8) -> u8 {
        self.mapper.access(addr, data)
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.mapper.read(addr)
    }

    pub fn clock(&mut self, cycles: usize) {
        self.mapper.clock(cycles);
    }
}

//! One TIA tone generator.

use ringbuf::{
    HeapProd,
    traits::{Observer, Producer},
};

use crate::audio::poly::{DIVISORS, POLYS};

/// Polynomial-waveform channel driven by the TIA audio clock.
///
/// Samples are converted from the chip's tick rate to the host rate with an
/// integer error accumulator and pushed into the queue the `Mixer` drains.
pub struct AudioChannel {
    id: usize,
    output_rate: u32,
    input_rate: u32,

    divider: u32,
    frequency: u32,
    sample_length: u32,
    poly: &'static [u8],
    volume: u8,

    divider_tick: u32,
    poly_offset: usize,
    output: u8,
    rate_error: u32,

    queue: HeapProd<u8>,
}

impl AudioChannel {
    pub(crate) fn new(id: usize, output_rate: u32, input_rate: u32, queue: HeapProd<u8>) -> Self {
        let mut channel = Self {
            id,
            output_rate,
            input_rate: input_rate.max(1),
            divider: 1,
            frequency: 0,
            sample_length: 0,
            poly: POLYS[0],
            volume: 0,
            divider_tick: 0,
            poly_offset: 0,
            output: 0,
            rate_error: 0,
            queue,
        };
        channel.set_waveform(0);
        channel.set_volume(0);
        channel.set_frequency(0);
        channel
    }

    /// Handle the mixer knows this channel by.
    pub fn id(&self) -> usize {
        self.id
    }

    /// AUDC: waveform and extra divisor from the low nibble.
    pub fn set_waveform(&mut self, data: u8) {
        let index = (data & 0x0F) as usize;
        self.poly = POLYS[index];
        self.divider = DIVISORS[index];
        self.sample_length = self.divider * self.frequency;
    }

    /// AUDF: divide the tick rate by 1–32.
    pub fn set_frequency(&mut self, data: u8) {
        self.frequency = (data & 0x1F) as u32 + 1;
        self.sample_length = self.divider * self.frequency;
    }

    /// AUDV: four bits, scaled so two channels at full volume fit in a byte.
    pub fn set_volume(&mut self, data: u8) {
        self.volume = (data & 0x0F) << 2;
    }

    /// One TIA audio clock.
    pub fn tick(&mut self) {
        self.divider_tick += 1;
        if self.divider_tick >= self.sample_length {
            self.divider_tick = 0;
            if self.poly_offset >= self.poly.len() {
                self.poly_offset = 0;
            }
            self.output = self.poly[self.poly_offset];
            self.poly_offset += 1;
        }

        self.rate_error += self.output_rate;
        while self.rate_error >= self.input_rate {
            // a full queue means the host stopped pulling; drop rather than block
            let _ = self.queue.try_push(self.output * self.volume);
            self.rate_error -= self.input_rate;
        }
    }

    /// Samples waiting for the host.
    pub fn queued(&self) -> usize {
        self.queue.occupied_len()
    }
}

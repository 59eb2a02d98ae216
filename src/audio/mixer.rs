//! Audio sink shared between the emulation thread and the host device.

use ringbuf::{
    HeapCons, HeapRb,
    traits::{Consumer, Observer, Split},
};

use crate::audio::channel::AudioChannel;

/// Owns the consumer half of every open channel's queue.
///
/// Channels are opened on the emulation side; the mixer itself is then moved
/// to whichever thread services the audio device.
pub struct Mixer {
    output_rate: u32,
    next_id: usize,
    channels: Vec<(usize, HeapCons<u8>)>,
}

impl Mixer {
    pub fn new(output_rate: u32) -> Self {
        Self {
            output_rate,
            next_id: 0,
            channels: Vec::new(),
        }
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// New channel ticking at `input_rate`, queueing a quarter second at most.
    pub fn open_channel(&mut self, input_rate: u32) -> AudioChannel {
        let capacity = (self.output_rate as usize / 4).max(1);
        let (producer, consumer) = HeapRb::<u8>::new(capacity).split();
        let id = self.next_id;
        self.next_id += 1;
        self.channels.push((id, consumer));
        AudioChannel::new(id, self.output_rate, input_rate, producer)
    }

    /// Stop mixing channel `id`; whatever it still had queued is discarded.
    pub fn release_channel(&mut self, id: usize) {
        self.channels.retain(|(cid, _)| *cid != id);
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Add every channel's next `buffer.len()` samples into `buffer`.
    ///
    /// A channel that cannot fill the whole buffer contributes nothing and
    /// keeps its samples for the next call.
    pub fn mix(&mut self, buffer: &mut [u8]) {
        for (_, queue) in self.channels.iter_mut() {
            if queue.occupied_len() < buffer.len() {
                continue;
            }
            for out in buffer.iter_mut() {
                *out = out.wrapping_add(queue.try_pop().unwrap_or(0));
            }
        }
    }
}

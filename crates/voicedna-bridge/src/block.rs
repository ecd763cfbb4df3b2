//! In-memory multi-channel audio buffer.

/// A block of planar audio: one sample vector per channel, all the same length.
///
/// Sample values are conventionally in `[-1.0, 1.0]` but are never clamped here.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    channels: Vec<Vec<f32>>,
    sample_rate: f64,
}

impl AudioBlock {
    /// Creates a block from planar channel data.
    ///
    /// Returns `None` if there are no channels or the channels differ in length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: f64) -> Option<Self> {
        let len = channels.first()?.len();
        if channels.iter().any(|c| c.len() != len) {
            return None;
        }
        Some(Self {
            channels,
            sample_rate,
        })
    }

    /// Creates a silent block.
    pub fn silence(num_channels: usize, num_samples: usize, sample_rate: f64) -> Self {
        Self {
            channels: vec![vec![0.0; num_samples]; num_channels.max(1)],
            sample_rate,
        }
    }

    /// Creates a block from interleaved frames.
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(samples: &[f32], num_channels: usize, sample_rate: f64) -> Self {
        let num_channels = num_channels.max(1);
        let frames = samples.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (ch, &s) in frame.iter().enumerate() {
                channels[ch].push(s);
            }
        }
        Self {
            channels,
            sample_rate,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_samples(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Iterates interleaved frames, channel 0 first.
    pub fn interleaved(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.num_samples()).flat_map(move |i| self.channels.iter().map(move |c| c[i]))
    }

    /// Copies a sub-range of samples `[start, start + len)` out as a new block.
    ///
    /// The range is clipped to the block length.
    pub fn slice(&self, start: usize, len: usize) -> Self {
        let start = start.min(self.num_samples());
        let end = start.saturating_add(len).min(self.num_samples());
        Self {
            channels: self
                .channels
                .iter()
                .map(|c| c[start..end].to_vec())
                .collect(),
            sample_rate: self.sample_rate,
        }
    }

    /// Appends the samples of `other` channel by channel.
    ///
    /// Channels missing from `other` are padded with silence so the block stays rectangular.
    pub fn append(&mut self, other: &AudioBlock) {
        let added = other.num_samples();
        for (ch, dst) in self.channels.iter_mut().enumerate() {
            match other.channel(ch) {
                Some(src) => dst.extend_from_slice(src),
                None => dst.resize(dst.len() + added, 0.0),
            }
        }
    }

    /// Copies the overlapping region of `source` into this block.
    ///
    /// Only `min(channels)` x `min(samples)` is written. Anything outside that
    /// region keeps its previous contents. Returns the `(channels, samples)` copied.
    pub fn merge_overlap(&mut self, source: &AudioBlock) -> (usize, usize) {
        let channels = self.num_channels().min(source.num_channels());
        let samples = self.num_samples().min(source.num_samples());
        for (dst, src) in self.channels.iter_mut().zip(&source.channels) {
            dst[..samples].copy_from_slice(&src[..samples]);
        }
        (channels, samples)
    }
}

/// Tracks: named groups of sample channels
use crate::memory::MemoryChannel;
use crate::traits::SampleChannel;
use crate::types::SampleCount;
use std::fmt;

/// A named track made of one or more channels
///
/// Channels of one track are expected to be sample-aligned (index `i` of
/// every channel refers to the same instant).
pub struct Track {
    name: String,
    channels: Vec<Box<dyn SampleChannel>>,
}

impl Track {
    /// Create a track with no channels
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
        }
    }

    /// Create a track from existing channels
    pub fn from_channels(name: impl Into<String>, channels: Vec<Box<dyn SampleChannel>>) -> Self {
        Self {
            name: name.into(),
            channels,
        }
    }

    /// Create a single-channel in-memory track
    pub fn mono(name: impl Into<String>, samples: Vec<f32>) -> Self {
        Self::new(name).with_channel(MemoryChannel::new(samples))
    }

    /// Create a two-channel in-memory track
    pub fn stereo(name: impl Into<String>, left: Vec<f32>, right: Vec<f32>) -> Self {
        Self::new(name)
            .with_channel(MemoryChannel::new(left))
            .with_channel(MemoryChannel::new(right))
    }

    /// Append a channel (builder style)
    #[must_use]
    pub fn with_channel(mut self, channel: impl SampleChannel + 'static) -> Self {
        self.channels.push(Box::new(channel));
        self
    }

    /// Append a channel
    pub fn push_channel(&mut self, channel: Box<dyn SampleChannel>) {
        self.channels.push(channel);
    }

    /// Track name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// All channels
    pub fn channels(&self) -> &[Box<dyn SampleChannel>] {
        &self.channels
    }

    /// All channels, mutably
    pub fn channels_mut(&mut self) -> &mut [Box<dyn SampleChannel>] {
        &mut self.channels
    }

    /// Get a channel by index
    pub fn channel(&self, index: usize) -> Option<&dyn SampleChannel> {
        self.channels.get(index).map(|c| c.as_ref())
    }

    /// Get a channel by index, mutably
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut (dyn SampleChannel + 'static)> {
        self.channels.get_mut(index).map(|c| c.as_mut())
    }

    /// Length of the longest channel in samples
    pub fn len(&self) -> SampleCount {
        self.channels.iter().map(|c| c.len()).max().unwrap_or(0)
    }

    /// Check if the track holds no samples at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lengths: Vec<SampleCount> = self.channels.iter().map(|c| c.len()).collect();
        f.debug_struct("Track")
            .field("name", &self.name)
            .field("channel_lengths", &lengths)
            .finish()
    }
}

use std::{collections::BTreeMap, fmt};

use rustc_hash::FxHashMap;

/// The raw `.key = value` assignments of a single manifest block.
pub(crate) type Block = BTreeMap<String, String>;

/// AVB stream class of a channel.
///
/// A zero-initialised `enum stream_class` in the C manifest is `CLASS_A`, so a block without an
/// `.sc` assignment is class A as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamClass {
    /// `CLASS_A`, the 2ms latency class.
    #[default]
    A,
    /// `CLASS_B`, the 50ms latency class.
    B,
}

impl StreamClass {
    /// Both classes, in shaping order. Class B is derived from class A.
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// Parses the manifest token (`CLASS_A` / `CLASS_B`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "CLASS_A" => Some(Self::A),
            "CLASS_B" => Some(Self::B),
            _ => None,
        }
    }

    /// The manifest token for this class.
    pub fn token(&self) -> &'static str {
        match self {
            Self::A => "CLASS_A",
            Self::B => "CLASS_B",
        }
    }

    /// Single-letter label used in tables.
    pub fn letter(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for StreamClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class {}", self.letter())
    }
}

/// A single channel (stream) declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub(crate) name: String,
    pub(crate) stream_class: StreamClass,
    pub(crate) frequency_hz: u32,
    pub(crate) size_bytes: u32,
    /// Every assignment found in the block, including the ones above.
    pub(crate) attributes: Block,
}

impl Channel {
    /// Creates a channel without any extra attributes.
    pub fn new(
        name: impl Into<String>,
        stream_class: StreamClass,
        frequency_hz: u32,
        size_bytes: u32,
    ) -> Self {
        let name = name.into();
        let mut attributes = Block::new();
        attributes.insert("name".to_string(), name.clone());
        attributes.insert("sc".to_string(), stream_class.token().to_string());
        attributes.insert("freq".to_string(), frequency_hz.to_string());
        attributes.insert("size".to_string(), size_bytes.to_string());

        Self { name, stream_class, frequency_hz, size_bytes, attributes }
    }

    /// Adds an uninterpreted attribute, e.g. `stream_id` or `dst`.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The unique channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stream class the channel is reserved in.
    pub fn stream_class(&self) -> StreamClass {
        self.stream_class
    }

    /// Frames per second.
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// Payload size in bytes, without any protocol header.
    pub fn size_bytes(&self) -> u32 {
        self.size_bytes
    }

    /// The `stream_id` assignment, if present.
    pub fn stream_id(&self) -> Option<&str> {
        self.attribute("stream_id")
    }

    /// Looks up a raw assignment by key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All raw assignments, sorted by key.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// All channels of a manifest, keyed by name.
///
/// Iteration follows declaration order. The first declaration of a name wins.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: Vec<Channel>,
    index: FxHashMap<String, usize>,
}

impl ChannelRegistry {
    /// Inserts a channel unless the name is already taken, in which case the rejected channel is
    /// handed back.
    pub(crate) fn insert(&mut self, channel: Channel) -> Result<(), Channel> {
        if self.index.contains_key(channel.name()) {
            return Err(channel);
        }

        self.index.insert(channel.name.clone(), self.channels.len());
        self.channels.push(channel);
        Ok(())
    }

    /// Looks up a channel by name.
    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.index.get(name).map(|&i| &self.channels[i])
    }

    /// Returns `true` if a channel with this name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if no channel was found.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Iterates over all channels in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Channel> {
        self.channels.iter()
    }

    /// Iterates over the channels of one class in declaration order.
    pub fn by_class(&self, class: StreamClass) -> impl Iterator<Item = &Channel> {
        self.channels.iter().filter(move |ch| ch.stream_class == class)
    }
}

impl FromIterator<Channel> for ChannelRegistry {
    /// Builds a registry, silently keeping the first of any duplicated names.
    fn from_iter<T: IntoIterator<Item = Channel>>(iter: T) -> Self {
        let mut registry = Self::default();
        for channel in iter {
            let _ = registry.insert(channel);
        }
        registry
    }
}

impl<'a> IntoIterator for &'a ChannelRegistry {
    type Item = &'a Channel;
    type IntoIter = std::slice::Iter<'a, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

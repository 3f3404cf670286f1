//! Line-oriented scanner for the `struct channel_attrs` array literal.
//!
//! Every line is cleaned on its own, so a `/* ... */` comment spanning several lines is not
//! recognised. Only single-line block comments and `//` comments are removed.

use std::{fs, io, mem, path::Path};

use crate::{
    channel::{Block, Channel, ChannelRegistry, StreamClass},
    error::{BlockDefect, ManifestError, ManifestWarning},
};

/// Scanning starts at the first line containing this marker.
pub const STRUCT_MARKER: &str = "struct channel_attrs";

/// Keys a block must assign to become a channel.
const REQUIRED_KEYS: [&str; 3] = ["name", "size", "freq"];

/// Where the scanner is within the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScanState {
    /// The struct marker has not been seen yet.
    #[default]
    BeforeStruct,
    /// The marker was seen on a line without the array's opening brace.
    BeforeArray,
    /// Inside the array literal. `depth` 0 is between elements, 1 is inside an element.
    Scanning { depth: u32, block: Block },
    /// The closing brace of the array has been seen.
    Done,
}

/// The outcome of parsing a manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    registry: ChannelRegistry,
    warnings: Vec<ManifestWarning>,
    state: ScanState,
}

impl Manifest {
    /// The channels found.
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Consumes the manifest, keeping only the channels.
    pub fn into_registry(self) -> ChannelRegistry {
        self.registry
    }

    /// Skipped blocks, in the order they were found.
    pub fn warnings(&self) -> &[ManifestWarning] {
        &self.warnings
    }

    /// The scanner state after the last line.
    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Returns `true` if the struct marker was found at all.
    pub fn found_struct(&self) -> bool {
        self.state != ScanState::BeforeStruct
    }
}

/// Strips comments and surrounding whitespace from a single line.
///
/// A `/* ... */` pair is removed from the first opener to the last closer on the line, then
/// everything from `//` onwards. The closer must start after the opener ends, so a line with
/// only `/*/` is left as is.
pub fn clean_line(line: &str) -> String {
    let mut cleaned = match (line.find("/*"), line.rfind("*/")) {
        (Some(start), Some(end)) if end >= start + 2 => {
            format!("{}{}", &line[..start], &line[end + 2..])
        }
        _ => line.to_string(),
    };

    if let Some(idx) = cleaned.find("//") {
        cleaned.truncate(idx);
    }

    cleaned.trim().to_string()
}

/// Parses manifest text. Never fails; see [`Manifest::warnings`] for skipped blocks.
pub fn parse(text: &str) -> Manifest {
    let mut scanner = Scanner::default();

    for line in text.lines() {
        scanner.feed(line);
        if scanner.state == ScanState::Done {
            break;
        }
    }

    scanner.finish()
}

/// Reads and parses the manifest at `path`.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ManifestError::FileNotFound { path: path.to_path_buf() },
        _ => ManifestError::Io { path: path.to_path_buf(), source },
    })?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "read manifest");

    Ok(parse(&text))
}

#[derive(Debug, Default)]
struct Scanner {
    state: ScanState,
    registry: ChannelRegistry,
    warnings: Vec<ManifestWarning>,
}

impl Scanner {
    fn feed(&mut self, raw: &str) {
        let line = clean_line(raw);

        self.state = match mem::take(&mut self.state) {
            ScanState::BeforeStruct if line.contains(STRUCT_MARKER) => {
                tracing::debug!("found beginning of struct");
                if line.contains('{') {
                    ScanState::Scanning { depth: 0, block: Block::new() }
                } else {
                    ScanState::BeforeArray
                }
            }
            // The first brace opens the array itself, not an element.
            ScanState::BeforeArray => match line.split_once('{') {
                Some((_, rest)) => self.scan(rest, 0, Block::new()),
                None => ScanState::BeforeArray,
            },
            ScanState::Scanning { depth, block } => self.scan(&line, depth, block),
            state => state,
        };
    }

    fn scan(&mut self, line: &str, mut depth: u32, mut block: Block) -> ScanState {
        let opens = line.matches('{').count() as u32;
        if opens > 0 {
            depth += opens;
            tracing::trace!(depth, "new block");
        }

        for _ in line.matches('}') {
            if depth == 0 {
                tracing::debug!("end of struct");
                return ScanState::Done;
            }

            depth -= 1;
            tracing::trace!(depth, "end of block");
            if depth == 0 {
                self.finalize(mem::take(&mut block));
            }
        }

        if depth > 0 {
            if let Some((key, value)) = parse_assignment(line) {
                block.insert(key, value);
            }
        }

        ScanState::Scanning { depth, block }
    }

    fn finalize(&mut self, block: Block) {
        if block.is_empty() {
            return;
        }

        let warning = match channel_from_block(block) {
            Ok(channel) => match self.registry.insert(channel) {
                Ok(()) => return,
                Err(rejected) => {
                    ManifestWarning::DuplicateChannelName { name: rejected.name().to_string() }
                }
            },
            Err(warning) => warning,
        };

        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn finish(self) -> Manifest {
        match &self.state {
            ScanState::BeforeStruct => {
                tracing::warn!("no `{STRUCT_MARKER}` found in manifest");
            }
            ScanState::BeforeArray => {
                tracing::warn!("`{STRUCT_MARKER}` is never opened");
            }
            ScanState::Scanning { depth, block } => {
                tracing::debug!(depth, pending = block.len(), "manifest ended inside the struct");
            }
            ScanState::Done => {}
        }

        tracing::debug!(
            channels = self.registry.len(),
            warnings = self.warnings.len(),
            "parsed manifest"
        );

        Manifest { registry: self.registry, warnings: self.warnings, state: self.state }
    }
}

/// Splits a `.key = value,` line into its trimmed key and value.
fn parse_assignment(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix('.')?;
    let (key, _) = rest.split_once('=')?;
    let (_, value) = rest.rsplit_once('=')?;

    let value = value.trim_end().strip_suffix(|c: char| c == ',' || c == ';').unwrap_or(value);

    let strip = |s: &str| s.trim_matches(|c: char| c == ' ' || c == '\t' || c == '"').to_string();
    let key = strip(key);
    if key.is_empty() {
        return None;
    }

    Some((key, strip(value)))
}

/// Parses a C unsigned integer literal, allowing hex and `u`/`l` suffixes.
fn parse_c_uint(value: &str) -> Option<u32> {
    let digits = value.trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L'));
    match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => digits.parse().ok(),
    }
}

fn channel_from_block(block: Block) -> Result<Channel, ManifestWarning> {
    let missing: Vec<_> = REQUIRED_KEYS.into_iter().filter(|k| !block.contains_key(*k)).collect();
    if !missing.is_empty() {
        return Err(ManifestWarning::MalformedChannelBlock {
            defect: BlockDefect::MissingKeys(missing),
            block,
        });
    }

    let invalid = |key: &'static str, block: Block| {
        let value = block[key].clone();
        ManifestWarning::MalformedChannelBlock {
            defect: BlockDefect::InvalidValue { key, value },
            block,
        }
    };

    let Some(size_bytes) = parse_c_uint(&block["size"]) else {
        return Err(invalid("size", block));
    };
    let Some(frequency_hz) = parse_c_uint(&block["freq"]) else {
        return Err(invalid("freq", block));
    };
    let stream_class = match block.get("sc").map(|token| StreamClass::from_token(token)) {
        None => StreamClass::default(),
        Some(Some(class)) => class,
        Some(None) => return Err(invalid("sc", block)),
    };

    let channel = Channel {
        name: block["name"].clone(),
        stream_class,
        frequency_hz,
        size_bytes,
        attributes: block,
    };

    tracing::debug!(
        name = channel.name(),
        class = channel.stream_class().letter(),
        freq = frequency_hz,
        size = size_bytes,
        "found channel"
    );

    Ok(channel)
}

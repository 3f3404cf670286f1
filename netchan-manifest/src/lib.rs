//! # netchan-manifest
//!
//! Reads the `struct channel_attrs` array literal of a netchan manifest header and turns every
//! complete element into a [`Channel`].
//!
//! ```c
//! struct channel_attrs nc_channels[] = {
//!     {
//!         .stream_id = 42,
//!         .sc        = CLASS_A,
//!         .size      = 32,
//!         .freq      = 200,
//!         .name      = "mcast42",
//!     },
//! };
//! ```
//!
//! Parsing is best effort. Only failing to read the file is an error; incomplete or duplicated
//! blocks are dropped and reported as [`ManifestWarning`]s next to the resulting
//! [`ChannelRegistry`].

mod channel;
mod error;
mod parser;

pub use channel::{Channel, ChannelRegistry, StreamClass};
pub use error::{BlockDefect, ManifestError, ManifestWarning};
pub use parser::{clean_line, parse, parse_file, Manifest, ScanState, STRUCT_MARKER};

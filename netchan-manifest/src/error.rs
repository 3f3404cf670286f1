use std::{io, path::PathBuf};

use thiserror::Error;

use crate::channel::Block;

/// Fatal manifest errors. Only reading the file can fail.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Problems found while scanning a manifest. The offending block is skipped and parsing goes on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestWarning {
    #[error("invalid channel block detected ({defect}), it won't be added. Incomplete block: {block:?}")]
    MalformedChannelBlock { defect: BlockDefect, block: Block },
    #[error("duplicate name found in manifest! {name} seen more than once")]
    DuplicateChannelName { name: String },
}

/// Why a block could not become a channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockDefect {
    #[error("missing .{}", .0.join(", ."))]
    MissingKeys(Vec<&'static str>),
    #[error("invalid value {value:?} for .{key}")]
    InvalidValue { key: &'static str, value: String },
}

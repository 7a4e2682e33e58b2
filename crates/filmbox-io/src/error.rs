//! Error handling for FBX export operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use filmbox_core::TextureChannel;

/// Errors that can occur when writing FBX files.
#[derive(Error, Debug)]
pub enum FbxWriteError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("could not open output .fbx file: {}", path.display())]
    OpenFailed { path: PathBuf, source: io::Error },

    #[error("tried to emit property with invalid type '{0}'")]
    InvalidPropertyType(char),

    #[error("node name exceeds 255 bytes ({len}): {name}")]
    NameTooLong { name: String, len: usize },

    #[error("transform pivot node '{name}' must have exactly 1 child, found {children}")]
    MalformedPivotChain { name: String, children: usize },

    #[error("unrecognized transform pivot marker '{0}'")]
    UnknownPivotMarker(String),

    #[error("material {material_index} has multiple textures on channel {channel:?}")]
    UnsupportedMultiLayerTexture {
        material_index: usize,
        channel: TextureChannel,
    },
}

/// Type alias for results of FBX write operations.
pub type Result<T> = std::result::Result<T, FbxWriteError>;

/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT
*/

use std::io::{self, ErrorKind};
use stormwater_vector::ShapeType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeResolutionError {
    #[error("The pit layer contains no located features.")]
    EmptyPitLayer,

    #[error("The {layer} layer does not have a field named '{field}'.")]
    MissingField { layer: String, field: String },

    #[error("Pit {fid} does not have an asset ID.")]
    MissingAssetId { fid: usize },

    #[error("Pit {fid} has an asset ID of {length} bytes; the node fields hold at most 254.")]
    AssetIdTooLong { fid: usize, length: usize },

    #[error("Pit {fid} does not have a numeric elevation.")]
    InvalidElevation { fid: usize },

    #[error("The node field name '{field}' must be 1 to 10 bytes long.")]
    InvalidFieldName { field: String },

    #[error("Pipe {fid} does not have a geometry.")]
    NullPipeGeometry { fid: usize },

    #[error("Pipe {fid} has zero length.")]
    ZeroLengthPipe { fid: usize },

    #[error("The {layer} layer must be of {expected} base shape type, found {found}.")]
    WrongShapeType {
        layer: String,
        expected: ShapeType,
        found: ShapeType,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<NodeResolutionError> for io::Error {
    fn from(err: NodeResolutionError) -> io::Error {
        let kind = match &err {
            NodeResolutionError::Io(e) => e.kind(),
            NodeResolutionError::EmptyPitLayer
            | NodeResolutionError::MissingField { .. }
            | NodeResolutionError::InvalidFieldName { .. }
            | NodeResolutionError::WrongShapeType { .. } => ErrorKind::InvalidInput,
            _ => ErrorKind::InvalidData,
        };
        match err {
            NodeResolutionError::Io(e) => e,
            other => io::Error::new(kind, other.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::NodeResolutionError;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_kinds() {
        let e: Error = NodeResolutionError::EmptyPitLayer.into();
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        let e: Error = NodeResolutionError::ZeroLengthPipe { fid: 4 }.into();
        assert_eq!(e.kind(), ErrorKind::InvalidData);
        assert_eq!(e.to_string(), "Pipe 4 has zero length.");
        let e: Error = NodeResolutionError::InvalidFieldName {
            field: "UPSTREAM_NODE".to_string(),
        }
        .into();
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        let e: Error = NodeResolutionError::Io(Error::new(ErrorKind::NotFound, "gone")).into();
        assert_eq!(e.kind(), ErrorKind::NotFound);
    }
}

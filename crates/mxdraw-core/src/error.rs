use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid {kind} value: {value:?}")]
    InvalidEnumeration { kind: &'static str, value: String },

    #[error("Invalid color {value:?}: expected `none`, `default` or `#RRGGBB`")]
    InvalidColor { value: String },

    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("No object named {name:?} in shape library `{library}`")]
    UnknownLibraryObject { library: String, name: String },

    #[error("Malformed shape library: {message}")]
    LibraryFormat { message: String },

    #[error("Input file does not exist: {}", path.display())]
    FileMissing { path: PathBuf },

    #[error("Malformed Draw.io document: {message}")]
    MalformedDocument { message: String },

    #[error("Draw.io document contains no cells")]
    EmptyDocument,

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn invalid_enumeration(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidEnumeration {
            kind,
            value: value.into(),
        }
    }

    pub(crate) fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }
}

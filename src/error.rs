use std::path::PathBuf;

/// error type for minigit operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a git repository (or any parent up to {0})")]
    NotARepository(PathBuf),

    #[error("repository already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("unsupported repository format version {0}")]
    UnsupportedFormat(u32),

    #[error("index signature mismatch, expected DIRC, found {0:?}")]
    BadSignature([u8; 4]),

    #[error("malformed {context}: {detail}")]
    Malformed {
        context: &'static str,
        detail: String,
    },

    #[error("unknown object kind: {0}")]
    UnknownKind(String),

    #[error("no such name: {0}")]
    NotFound(String),

    #[error("ambiguous name {0}: {1:?}")]
    Ambiguous(String, Vec<String>),

    #[error("expected object of kind {expected}, got {got}")]
    WrongKind { expected: String, got: String },

    #[error("invalid mode for tree entry {0:?}")]
    InvalidMode(String),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn malformed(context: &'static str, detail: impl Into<String>) -> Error {
    Error::Malformed {
        context,
        detail: detail.into(),
    }
}

impl Error {
    pub fn malformed(context: &'static str, detail: impl Into<String>) -> Error {
        malformed(context, detail)
    }
}

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

use thiserror::Error;

/// Errors surfaced by the decoder, the mesher and the emitters.
///
/// Every failure mode of the library maps onto exactly one variant; the
/// library never retries internally. [`FontError::code`] exposes the
/// stable integer tag of each kind for callers that log or compare codes.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("out of pool memory: {0}")]
    NoMemory(String),

    #[error("font file too large: {0} bytes (limit {limit} bytes)", limit = crate::MAX_FILE_SIZE)]
    FileTooLarge(u64),

    #[error("error opening font file: {0}")]
    OpenFailed(#[from] std::io::Error),

    #[error("unsupported sfnt version: 0x{0:08X}")]
    UnsupportedVersion(u32),

    #[error("invalid font structure: {0}")]
    CorruptFormat(String),

    #[error("required table missing: {0}")]
    MissingTable(&'static str),

    #[error("checksum mismatch: {0}")]
    CorruptChecksum(String),

    #[error("unsupported table format: {0}")]
    UnsupportedTable(String),

    #[error("unable to build mesh: {0}")]
    MesherFailed(String),

    #[error("glyph has no outline")]
    NoOutline,

    #[error("error writing output: {0}")]
    WriteFailed(String),
}

impl FontError {
    /// Stable integer tag of this error kind.
    pub fn code(&self) -> u32 {
        match self {
            FontError::NoMemory(_) => 1,
            FontError::FileTooLarge(_) => 2,
            FontError::OpenFailed(_) => 3,
            FontError::UnsupportedVersion(_) => 4,
            FontError::CorruptFormat(_) => 5,
            FontError::MissingTable(_) => 6,
            FontError::CorruptChecksum(_) => 7,
            FontError::UnsupportedTable(_) => 8,
            FontError::MesherFailed(_) => 9,
            FontError::NoOutline => 10,
            FontError::WriteFailed(_) => 11,
        }
    }
}

pub type Result<T> = std::result::Result<T, FontError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_error_display() {
        let error = FontError::CorruptFormat("truncated glyf table".to_string());
        assert_eq!(
            error.to_string(),
            "invalid font structure: truncated glyf table"
        );

        let error = FontError::MissingTable("hmtx");
        assert_eq!(error.to_string(), "required table missing: hmtx");

        let error = FontError::UnsupportedVersion(0x4F54544F);
        assert_eq!(error.to_string(), "unsupported sfnt version: 0x4F54544F");
    }

    #[test]
    fn test_error_codes_are_stable() {
        let cases: Vec<(FontError, u32)> = vec![
            (FontError::NoMemory("edge pool".into()), 1),
            (FontError::FileTooLarge(123), 2),
            (
                FontError::OpenFailed(IoError::new(ErrorKind::NotFound, "missing")),
                3,
            ),
            (FontError::UnsupportedVersion(0), 4),
            (FontError::CorruptFormat("bad".into()), 5),
            (FontError::MissingTable("head"), 6),
            (FontError::CorruptChecksum("file".into()), 7),
            (FontError::UnsupportedTable("cmap".into()), 8),
            (FontError::MesherFailed("dup points".into()), 9),
            (FontError::NoOutline, 10),
            (FontError::WriteFailed("disk full".into()), 11),
        ];
        for (error, code) in cases {
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = IoError::new(ErrorKind::PermissionDenied, "access denied");
        let error = FontError::from(io_error);
        match error {
            FontError::OpenFailed(ref err) => {
                assert_eq!(err.kind(), ErrorKind::PermissionDenied);
            }
            _ => panic!("expected OpenFailed variant"),
        }
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FontError>();
    }
}

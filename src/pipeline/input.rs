//! Input validation: make sure a path names a readable PDF before pdfium sees it.
//!
//! pdfium reports every kind of bad input as a generic load failure. Checking
//! existence, permissions and the `%PDF` magic bytes up front gives callers a
//! precise error and keeps unsupported files away from the selection policy.

use crate::error::ConvertError;
use crate::paths::has_pdf_extension;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// First four bytes of every PDF file.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Validate that `path` is an existing, readable PDF file.
///
/// Files that start with `%PDF` are accepted whatever their extension.
/// Anything else is rejected as [`ConvertError::UnsupportedFileType`] when the
/// extension is not `.pdf`, or [`ConvertError::NotAPdf`] when it is.
pub fn validate_pdf(path: &Path) -> Result<(), ConvertError> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(ConvertError::UnsupportedFileType {
            path: path.to_path_buf(),
            reason: "not a regular file".into(),
        });
    }

    let magic = read_magic(path)?;
    if &magic == PDF_MAGIC {
        debug!("Validated PDF input: {}", path.display());
        return Ok(());
    }

    if has_pdf_extension(path) {
        Err(ConvertError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        })
    } else {
        Err(ConvertError::UnsupportedFileType {
            path: path.to_path_buf(),
            reason: "expected a PDF document".into(),
        })
    }
}

/// Read up to four leading bytes, zero-padding short files.
fn read_magic(path: &Path) -> Result<[u8; 4], ConvertError> {
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ConvertError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ConvertError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                })
            }
        }
    }
    Ok(magic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file() {
        let err = validate_pdf(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_pdf(dir.path()).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFileType { .. }));
    }

    #[test]
    fn pdf_extension_with_wrong_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        fs::write(&path, b"This is not a valid PDF").unwrap();
        match validate_pdf(&path).unwrap_err() {
            ConvertError::NotAPdf { magic, .. } => assert_eq!(&magic, b"This"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn other_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docx");
        fs::write(&path, b"PK\x03\x04rest").unwrap();
        let err = validate_pdf(&path).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFileType { .. }));
    }

    #[test]
    fn empty_pdf_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        fs::write(&path, b"").unwrap();
        assert!(matches!(
            validate_pdf(&path).unwrap_err(),
            ConvertError::NotAPdf { .. }
        ));
    }

    #[test]
    fn magic_bytes_accepted_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("download");
        fs::write(&path, b"%PDF-1.7\n").unwrap();
        assert!(validate_pdf(&path).is_ok());
    }
}

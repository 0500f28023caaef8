use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Local file header signature every jar starts with.
pub const ZIP_FILE_HEADER: [u8; 4] = [b'P', b'K', 0x03, 0x04];

/// Whether `path` starts with a zip local file header.
///
/// Fails closed: unreadable or short files are reported as "not a zip".
pub fn is_zip(path: &Path) -> bool {
    File::open(path)
        .and_then(|file| has_zip_header(file))
        .unwrap_or(false)
}

/// Reads at most four bytes from `reader` and compares them to the zip magic.
pub fn has_zip_header(reader: impl Read) -> io::Result<bool> {
    let mut magic = [0u8; 4];
    match reader.take(4).read_exact(&mut magic) {
        Ok(()) => Ok(magic == ZIP_FILE_HEADER),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_zip_header_detected() {
        let dir = tempdir().unwrap();
        let jar = dir.path().join("lib.jar");
        std::fs::write(&jar, b"PK\x03\x04rest-of-archive").unwrap();
        assert!(is_zip(&jar));
    }

    #[test]
    fn test_short_and_foreign_files_are_not_zips() {
        let dir = tempdir().unwrap();
        for (name, bytes) in [
            ("empty", &b""[..]),
            ("one", &b"P"[..]),
            ("three", &b"PK\x03"[..]),
            ("empty-zip", &b"PK\x05\x06"[..]),
            ("class", &b"\xCA\xFE\xBA\xBE"[..]),
        ] {
            let path = dir.path().join(name);
            std::fs::write(&path, bytes).unwrap();
            assert!(!is_zip(&path), "{} must not be treated as a zip", name);
        }
        assert!(!is_zip(&dir.path().join("missing")));
        assert!(!is_zip(dir.path()));
    }

    #[test]
    fn test_reads_exactly_four_bytes() {
        let mut cursor = Cursor::new(b"PK\x03\x04tail".to_vec());
        assert!(has_zip_header(&mut cursor).unwrap());
        assert_eq!(cursor.position(), 4);
    }
}

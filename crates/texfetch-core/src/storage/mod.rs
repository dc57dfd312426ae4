//! Payload file lifecycle.
//!
//! Downloads stream into a `.part` sibling of the destination and are renamed
//! into place only once the body is complete, so the destination path never
//! holds a truncated file. The presence of the destination is what the cache
//! treats as "already fetched".

mod writer;

pub use writer::StorageWriter;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `sky.exr` → `sky.exr.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("sky.exr"));
        assert_eq!(p.to_string_lossy(), "sky.exr.part");
        let p2 = temp_path(Path::new("/tmp/textures.zip"));
        assert_eq!(p2.to_string_lossy(), "/tmp/textures.zip.part");
    }

    #[test]
    fn write_then_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("baseColor.png");

        let mut writer = StorageWriter::create(&final_path).unwrap();
        writer.write(b"hello ").unwrap();
        writer.write(b"world").unwrap();
        assert!(!final_path.exists(), "destination must not appear before finalize");
        assert!(writer.temp_path().exists());
        let written = writer.finalize().unwrap();

        assert_eq!(written, 11);
        assert!(!temp_path(&final_path).exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"hello world");
    }

    #[test]
    fn discard_removes_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("roughness.png");
        let mut writer = StorageWriter::create(&final_path).unwrap();
        writer.write(b"partial").unwrap();
        writer.discard();
        assert!(!temp_path(&final_path).exists());
        assert!(!final_path.exists());
    }

    #[test]
    fn finalize_overwrites_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("sky.hdr");
        std::fs::write(&final_path, b"old").unwrap();
        let mut writer = StorageWriter::create(&final_path).unwrap();
        writer.write(b"new").unwrap();
        writer.finalize().unwrap();
        assert_eq!(std::fs::read(&final_path).unwrap(), b"new");
    }
}

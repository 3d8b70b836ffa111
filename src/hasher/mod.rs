//! CRC-32 file hashing for exact identification.
//!
//! The hash-lookup database keys games on the CRC-32 of the ROM image, so
//! unlike a change-detection hash this one must match the remote side bit
//! for bit. Files are streamed in 64 KiB chunks; the accumulator carries
//! across chunks, so memory use is constant regardless of file size.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crc32fast::Hasher;

/// Read buffer size for streaming.
const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the CRC-32 digest of a file.
///
/// Returns the digest as 8 lowercase zero-padded hex characters, the
/// exact form the hash-lookup API expects on the wire.
///
/// # Errors
///
/// Returns an IO error if the file cannot be opened or a read fails
/// mid-stream. A failed hash must not be trusted partially; callers get
/// either a complete digest or an error.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    hash_reader(file)
}

/// Fold a reader through the CRC accumulator in fixed-size chunks.
pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:08x}", hasher.finalize()))
}

/// Hash a batch of files sequentially.
///
/// Best-effort by policy: one unreadable file must not block the rest of
/// the batch, so each entry carries its own result. Callers decide how to
/// degrade a failed item (the CLI proceeds without a hash for it).
pub fn hash_files(paths: &[&Path]) -> Vec<std::io::Result<String>> {
    paths
        .iter()
        .map(|path| {
            let result = hash_file(path);
            if let Err(ref e) = result {
                tracing::warn!("Failed to hash {:?}: {}", path, e);
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_known_digest() {
        // CRC-32 of "123456789" is the standard check value 0xcbf43926
        let digest = hash_reader(&b"123456789"[..]).unwrap();
        assert_eq!(digest, "cbf43926");
    }

    #[test]
    fn test_empty_input_zero_padded() {
        let digest = hash_reader(&b""[..]).unwrap();
        assert_eq!(digest, "00000000");
    }

    #[test]
    fn test_hash_file_stable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.bin");

        let mut file = File::create(&path).unwrap();
        file.write_all(&[0xAB; 1000]).unwrap();
        drop(file);

        let a = hash_file(&path).unwrap();
        let b = hash_file(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }

    #[test]
    fn test_streaming_across_chunk_boundary() {
        // Content larger than one chunk must accumulate across reads
        let content: Vec<u8> = (0..(CHUNK_SIZE * 2 + 17)).map(|i| (i % 251) as u8).collect();

        let streamed = hash_reader(&content[..]).unwrap();

        let mut reference = crc32fast::Hasher::new();
        reference.update(&content);
        assert_eq!(streamed, format!("{:08x}", reference.finalize()));
    }

    #[test]
    fn test_hash_file_missing() {
        let result = hash_file(Path::new("/nonexistent/rom.bin"));
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_tolerates_bad_file() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.bin");
        std::fs::write(&good, b"data").unwrap();
        let missing = dir.path().join("missing.bin");

        let results = hash_files(&[good.as_path(), missing.as_path()]);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    proptest! {
        /// Digest is independent of how the input is chunked.
        #[test]
        fn prop_chunking_does_not_change_digest(content in proptest::collection::vec(any::<u8>(), 0..200_000)) {
            let whole = hash_reader(&content[..]).unwrap();

            let mut reference = crc32fast::Hasher::new();
            reference.update(&content);
            prop_assert_eq!(whole, format!("{:08x}", reference.finalize()));
        }
    }
}

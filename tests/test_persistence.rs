//! Persistence tests: raw and gzip image round trips, destructive load
//! semantics, and rejection of corrupt files.

use std::fs;

use bitarray::{BitArray, BitArrayError, FORMAT_VERSION};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use tempfile::tempdir;

/// Build an array with a seeded random ~30% fill.
fn sample_array(size: usize, seed: u64) -> BitArray {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut ba = BitArray::new(size);
    for i in 0..size {
        if rng.gen_bool(0.3) {
            ba.set(i, true).unwrap();
        }
    }
    ba
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_round_trip_raw() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");

    let ba = sample_array(1000, 7);
    ba.save(&path, false).unwrap();

    let restored = BitArray::from_file(&path).unwrap();
    assert_eq!(restored, ba);
}

#[test]
fn test_round_trip_compressed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.gz");

    let ba = sample_array(1000, 7);
    ba.save(&path, true).unwrap();

    let restored = BitArray::from_file(&path).unwrap();
    assert_eq!(restored, ba);
}

#[test]
fn test_round_trip_preserves_partial_size() {
    // 13 bits occupy two chunks; the chunk count alone would suggest 16.
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");

    let mut ba = BitArray::new(13);
    ba.set(12, true).unwrap();
    ba.save(&path, false).unwrap();

    let restored = BitArray::from_file(&path).unwrap();
    assert_eq!(restored.size(), 13);
    assert!(restored.get(12).unwrap());
    assert!(restored.get(13).is_err());
    assert_eq!(restored.bitcount(), 1);
}

#[test]
fn test_round_trip_empty_array() {
    let dir = tempdir().unwrap();
    for (name, compressed) in [("empty.raw", false), ("empty.gz", true)] {
        let path = dir.path().join(name);
        BitArray::new(0).save(&path, compressed).unwrap();

        let restored = BitArray::from_file(&path).unwrap();
        assert_eq!(restored.size(), 0);
        assert_eq!(restored.chunk_count(), 0);
    }
}

#[test]
fn test_both_flavors_decode_identically() {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("bits.raw");
    let gz = dir.path().join("bits.gz");

    let ba = sample_array(517, 99);
    ba.save(&raw, false).unwrap();
    ba.save(&gz, true).unwrap();

    assert_eq!(
        BitArray::from_file(&raw).unwrap(),
        BitArray::from_file(&gz).unwrap()
    );
}

// =============================================================================
// On-Disk Surface
// =============================================================================

#[test]
fn test_raw_file_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");

    sample_array(40, 3).save(&path, false).unwrap();
    let bytes = fs::read(&path).unwrap();

    assert_eq!(&bytes[0..4], b"BITA");
    assert_eq!(bytes[4], FORMAT_VERSION);
    assert_eq!(bytes[5], 8); // chunk width in bits
    assert_eq!(&bytes[6..14], &40u64.to_le_bytes());
    assert_eq!(&bytes[14..22], &5u64.to_le_bytes());
    assert_eq!(bytes.len(), 22 + 5);
}

#[test]
fn test_compressed_file_is_gzip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.gz");

    sample_array(40, 3).save(&path, true).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[0..2], &[0x1f, 0x8b]);
}

#[test]
fn test_compression_shrinks_sparse_arrays() {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("bits.raw");
    let gz = dir.path().join("bits.gz");

    let ba = BitArray::new(1 << 20);
    ba.save(&raw, false).unwrap();
    ba.save(&gz, true).unwrap();

    let raw_len = fs::metadata(&raw).unwrap().len();
    let gz_len = fs::metadata(&gz).unwrap().len();
    assert!(gz_len < raw_len / 10);
}

// =============================================================================
// Destructive Load
// =============================================================================

#[test]
fn test_load_replaces_size_and_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");

    let source = sample_array(1000, 11);
    source.save(&path, false).unwrap();

    let mut target = BitArray::new(64);
    target.set(0, true).unwrap();
    target.load(&path).unwrap();

    assert_eq!(target.size(), 1000);
    assert_eq!(target, source);
}

#[test]
fn test_load_keeps_read_only_flag() {
    // The flag is container policy, not data: it does not gate the load
    // itself and is not replaced by it.
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");

    sample_array(100, 5).save(&path, false).unwrap();

    let mut target = BitArray::new(8);
    target.set_read_only(true);
    target.load(&path).unwrap();

    assert_eq!(target.size(), 100);
    assert!(target.is_read_only());
    assert!(matches!(target.set(0, true), Err(BitArrayError::ReadOnly)));
}

#[test]
fn test_saving_a_read_only_array_works() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");

    let mut ba = sample_array(100, 5);
    ba.set_read_only(true);
    ba.save(&path, false).unwrap();

    // The flag itself is not persisted.
    let restored = BitArray::from_file(&path).unwrap();
    assert!(!restored.is_read_only());
    assert_eq!(restored.bitcount(), ba.bitcount());
}

#[test]
fn test_failed_load_leaves_target_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");
    fs::write(&path, b"not a bit array image at all").unwrap();

    let mut target = sample_array(64, 21);
    let before = target.clone();

    assert!(matches!(
        target.load(&path),
        Err(BitArrayError::CorruptData(_))
    ));
    assert_eq!(target, before);
}

// =============================================================================
// Error Routing
// =============================================================================

#[test]
fn test_missing_file_is_io() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.raw");

    match BitArray::from_file(&path) {
        Err(BitArrayError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected Io, got {:?}", other),
    }

    let mut target = sample_array(64, 21);
    let before = target.clone();
    assert!(matches!(target.load(&path), Err(BitArrayError::Io(_))));
    assert_eq!(target, before);
}

#[test]
fn test_save_into_missing_directory_is_io() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("bits.raw");
    assert!(matches!(
        sample_array(64, 1).save(&path, false),
        Err(BitArrayError::Io(_))
    ));
}

// =============================================================================
// Corrupt Files
// =============================================================================

#[test]
fn test_truncated_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");

    sample_array(1000, 13).save(&path, false).unwrap();
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(matches!(
        BitArray::from_file(&path),
        Err(BitArrayError::CorruptData(_))
    ));
}

#[test]
fn test_wrong_chunk_width_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");

    sample_array(1000, 13).save(&path, false).unwrap();
    let mut bytes = fs::read(&path).unwrap();
    bytes[5] = 32; // claim 32-bit chunks
    fs::write(&path, &bytes).unwrap();

    match BitArray::from_file(&path) {
        Err(BitArrayError::CorruptData(reason)) => {
            assert!(reason.contains("wrong chunk width"), "got: {}", reason)
        }
        other => panic!("expected CorruptData, got {:?}", other),
    }
}

#[test]
fn test_nonzero_padding_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");

    // Size 5 leaves the top three bits of the single chunk as padding.
    BitArray::new(5).save(&path, false).unwrap();
    let mut bytes = fs::read(&path).unwrap();
    bytes[22] |= 0b1110_0000;
    fs::write(&path, &bytes).unwrap();

    match BitArray::from_file(&path) {
        Err(BitArrayError::CorruptData(reason)) => {
            assert!(reason.contains("padding"), "got: {}", reason)
        }
        other => panic!("expected CorruptData, got {:?}", other),
    }
}

#[test]
fn test_garbage_with_gzip_magic_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.gz");
    fs::write(&path, [0x1f, 0x8b, 0xde, 0xad, 0xbe, 0xef]).unwrap();

    match BitArray::from_file(&path) {
        Err(BitArrayError::CorruptData(reason)) => {
            assert!(reason.contains("gzip"), "got: {}", reason)
        }
        other => panic!("expected CorruptData, got {:?}", other),
    }
}

#[test]
fn test_empty_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bits.raw");
    fs::write(&path, b"").unwrap();

    assert!(matches!(
        BitArray::from_file(&path),
        Err(BitArrayError::CorruptData(_))
    ));
}

// =============================================================================
// Property-Based Tests
// =============================================================================

proptest! {
    #[test]
    fn prop_save_load_identity(n in 0..600usize, seed in any::<u64>()) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bits");

        let ba = sample_array(n, seed);
        ba.save(&path, seed % 2 == 0).unwrap();

        let restored = BitArray::from_file(&path).unwrap();
        prop_assert_eq!(restored, ba);
    }
}

//! Durable-list save, decode, lookup, and integrity behavior.

use std::io;

use durable_list::{
    sequence_hash, sequence_to_string, BoundedInput, DurableCollection, DurableList, ElementCodec,
    ElementEncoding, ListFooter, Root, SkipEntry, Uniform,
};

use crate::common::{saved_bytes, FixedU32Codec, Utf8Codec, VarintU32Codec};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// SAVE / LOOKUP
// ============================================================================

#[test]
fn save_then_random_access() {
    let values = strings(&["a", "b", "c", "d", "e"]);
    let list = DurableList::save_with_interval(values.clone(), Uniform(Utf8Codec), None, 2).unwrap();

    assert_eq!(list.size(), 5);

    // Sampling every 2 elements of 2 wire bytes each.
    let entries = list.skip_table().unwrap().entries();
    assert_eq!(
        entries,
        &[
            SkipEntry { index: 0, offset: 0 },
            SkipEntry { index: 2, offset: 4 },
            SkipEntry { index: 4, offset: 8 },
        ]
    );

    // nth(3) floors to entry (2, 4) and decodes one element forward.
    assert_eq!(list.nth(3).unwrap(), "d");
    for (i, expected) in values.iter().enumerate() {
        assert_eq!(&list.nth(i as u64).unwrap(), expected);
    }
}

#[test]
fn short_list_has_no_skip_table() {
    let list = DurableList::save(strings(&["only"]), Uniform(Utf8Codec), None).unwrap();
    assert!(list.skip_table().is_none());
    assert_eq!(list.nth(0).unwrap(), "only");
}

#[test]
fn default_interval_on_small_list_degrades_to_origin_scan() {
    // 5 elements under the default interval of 32: a single origin entry,
    // so no table is stored and lookups scan from byte 0.
    let values = strings(&["a", "b", "c", "d", "e"]);
    let list = DurableList::save(values.clone(), Uniform(Utf8Codec), None).unwrap();
    assert!(list.skip_table().is_none());
    assert_eq!(list.nth(4).unwrap(), "e");
}

#[test]
fn empty_list() {
    let list = DurableList::save(Vec::<String>::new(), Uniform(Utf8Codec), None).unwrap();
    assert_eq!(list.size(), 0);
    assert!(list.skip_table().is_none());
    assert!(list.iter().next().is_none());
    assert_eq!(sequence_to_string(&list).unwrap(), "[]");

    let err = list.nth(0).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[test]
fn nth_out_of_range() {
    let list = DurableList::save(strings(&["a", "b"]), Uniform(Utf8Codec), None).unwrap();
    let err = list.nth(2).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    // The list survives the failed lookup.
    assert_eq!(list.nth(1).unwrap(), "b");
}

#[test]
fn zero_interval_rejected() {
    let err =
        DurableList::save_with_interval(strings(&["a"]), Uniform(Utf8Codec), None, 0).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[test]
fn iter_agrees_with_nth() {
    let values: Vec<u32> = (0..100).map(|i| i * 7).collect();
    let list =
        DurableList::save_with_interval(values.clone(), Uniform(VarintU32Codec), None, 8).unwrap();

    let sequential: io::Result<Vec<u32>> = list.iter().collect();
    assert_eq!(sequential.unwrap(), values);

    let random: io::Result<Vec<u32>> = (0..list.size()).map(|i| list.nth(i)).collect();
    assert_eq!(random.unwrap(), values);
}

// ============================================================================
// PER-RUN CODECS
// ============================================================================

/// Codec that changes wire shape partway through the stream.
enum PhaseCodec {
    Fixed(FixedU32Codec),
    Varint(VarintU32Codec),
}

impl ElementCodec for PhaseCodec {
    type Value = u32;

    fn encode(&self, value: &u32, buf: &mut Vec<u8>) {
        match self {
            PhaseCodec::Fixed(c) => c.encode(value, buf),
            PhaseCodec::Varint(c) => c.encode(value, buf),
        }
    }

    fn decode(&self, input: &mut BoundedInput) -> io::Result<u32> {
        match self {
            PhaseCodec::Fixed(c) => c.decode(input),
            PhaseCodec::Varint(c) => c.decode(input),
        }
    }
}

/// Fixed-width records for the first four positions, varints after.
#[derive(Clone)]
struct PhaseEncoding;

impl ElementEncoding for PhaseEncoding {
    type Value = u32;
    type Codec = PhaseCodec;

    fn element_codec(&self, index: u64) -> PhaseCodec {
        if index < 4 {
            PhaseCodec::Fixed(FixedU32Codec)
        } else {
            PhaseCodec::Varint(VarintU32Codec)
        }
    }
}

#[test]
fn codec_switches_at_run_boundaries() {
    let values: Vec<u32> = (0..8).map(|i| i + 300).collect();
    let list = DurableList::save_with_interval(values.clone(), PhaseEncoding, None, 2).unwrap();

    for (i, expected) in values.iter().enumerate() {
        assert_eq!(list.nth(i as u64).unwrap(), *expected);
    }
    let sequential: io::Result<Vec<u32>> = list.iter().collect();
    assert_eq!(sequential.unwrap(), values);
}

// ============================================================================
// EQUALITY AND HASHING
// ============================================================================

#[test]
fn equality_across_encodings() {
    let values: Vec<u32> = (0..50).map(|i| i * 1000 + 3).collect();
    let fixed =
        DurableList::save_with_interval(values.clone(), Uniform(FixedU32Codec), None, 4).unwrap();
    let varint =
        DurableList::save_with_interval(values.clone(), Uniform(VarintU32Codec), None, 16).unwrap();

    // Different wire bytes, same logical sequence.
    assert_ne!(saved_bytes(&fixed), saved_bytes(&varint));
    assert_eq!(fixed, varint);
    assert_eq!(
        sequence_hash(&fixed).unwrap(),
        sequence_hash(&varint).unwrap()
    );

    let mut shifted = values;
    shifted[10] += 1;
    let other = DurableList::save(shifted, Uniform(FixedU32Codec), None).unwrap();
    assert_ne!(fixed, other);
}

#[test]
fn clone_is_the_same_logical_value() {
    let list =
        DurableList::save(strings(&["x", "y", "z"]), Uniform(Utf8Codec), None).unwrap();
    let copy = list.clone();
    assert_eq!(list, copy);

    // Lookups through one never disturb the other.
    assert_eq!(copy.nth(2).unwrap(), "z");
    assert_eq!(list.nth(0).unwrap(), "x");
}

#[test]
fn string_form() {
    let list = DurableList::save(strings(&["a", "b"]), Uniform(Utf8Codec), None).unwrap();
    assert_eq!(sequence_to_string(&list).unwrap(), "[\"a\", \"b\"]");
}

// ============================================================================
// ROOT CONTEXT
// ============================================================================

#[test]
fn root_passes_through_untouched() {
    let root = Root::new(String::from("collection-42"));
    let list =
        DurableList::save(strings(&["a"]), Uniform(Utf8Codec), Some(root)).unwrap();
    let stored = list.root().unwrap();
    assert_eq!(stored.downcast_ref::<String>().unwrap(), "collection-42");

    let rootless = DurableList::save(strings(&["a"]), Uniform(Utf8Codec), None).unwrap();
    assert!(rootless.root().is_none());
}

// ============================================================================
// INTEGRITY
// ============================================================================

#[test]
fn corrupted_element_bytes_rejected() {
    let list = DurableList::save(strings(&["a", "b", "c"]), Uniform(Utf8Codec), None).unwrap();
    let mut buf = saved_bytes(&list);

    // Flip one element byte; the checksum must catch it.
    let target = buf.len() - ListFooter::SIZE - 1;
    buf[target] ^= 0xFF;

    let err = DurableList::decode(BoundedInput::wrap(buf), None, Uniform(Utf8Codec)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn truncated_region_rejected() {
    let list = DurableList::save(strings(&["a", "b", "c"]), Uniform(Utf8Codec), None).unwrap();
    let mut buf = saved_bytes(&list);
    buf.truncate(buf.len() - 3);

    assert!(DurableList::decode(BoundedInput::wrap(buf), None, Uniform(Utf8Codec)).is_err());
}

#[test]
fn tiny_region_rejected() {
    let err = DurableList::decode(
        BoundedInput::wrap(vec![0u8; 10]),
        None,
        Uniform(Utf8Codec),
    )
    .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn unknown_version_rejected() {
    let list = DurableList::save(strings(&["a"]), Uniform(Utf8Codec), None).unwrap();
    let mut buf = saved_bytes(&list);

    // Bump the version byte and re-seal the checksum so only the version
    // check can fail.
    buf[4] = 99;
    let content_len = buf.len() - ListFooter::SIZE;
    let crc = ListFooter::compute_crc32(&buf[..content_len]);
    buf[content_len..content_len + 4].copy_from_slice(&crc.to_le_bytes());

    let err = DurableList::decode(BoundedInput::wrap(buf), None, Uniform(Utf8Codec)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(err.to_string().contains("version"));
}

#[test]
fn forged_section_lengths_rejected() {
    use durable_list::{ListFlags, ListHeader, VERSION};

    // A region whose checksum is valid (the forger writes the whole
    // buffer) but whose header claims an absurd element-stream length.
    // Decode must answer with an error, not arithmetic overflow.
    let header = ListHeader {
        version: VERSION,
        flags: ListFlags::new(),
        size: 1,
        skip_len: 0,
        elements_len: u64::MAX,
    };
    let mut buf = Vec::new();
    header.write(&mut buf);
    buf.push(0x61); // one stray content byte
    let crc32 = ListFooter::compute_crc32(&buf);
    ListFooter { crc32 }.write(&mut buf);

    let err = DurableList::decode(BoundedInput::wrap(buf), None, Uniform(Utf8Codec)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn saved_region_roundtrips_through_raw_bytes() {
    let values = strings(&["alpha", "beta", "gamma", "delta"]);
    let list = DurableList::save_with_interval(values.clone(), Uniform(Utf8Codec), None, 2).unwrap();

    let buf = saved_bytes(&list);
    let reloaded =
        DurableList::decode(BoundedInput::wrap(buf), None, Uniform(Utf8Codec)).unwrap();
    assert_eq!(reloaded.size(), 4);
    for (i, expected) in values.iter().enumerate() {
        assert_eq!(&reloaded.nth(i as u64).unwrap(), expected);
    }
    assert_eq!(list, reloaded);
}

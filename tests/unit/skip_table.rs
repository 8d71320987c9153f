//! Skip-table floor lookup and wire behavior.

use std::io;

use durable_list::{encode_uvarint, BoundedInput, SkipEntry, SkipTable};

fn table(entries: &[(u64, u64)]) -> SkipTable {
    SkipTable::from_entries(
        entries
            .iter()
            .map(|&(index, offset)| SkipEntry { index, offset })
            .collect(),
    )
    .unwrap()
}

#[test]
fn floor_picks_nearest_preceding_entry() {
    let t = table(&[(0, 0), (10, 100), (20, 220), (30, 360)]);

    // Lookup index 25: the nearest preceding entry is (20, 220), so a
    // reader seeks byte 220 and decodes forward 5 elements.
    let entry = t.floor(25);
    assert_eq!(entry, SkipEntry { index: 20, offset: 220 });

    assert_eq!(t.floor(9).index, 0);
    assert_eq!(t.floor(10).index, 10);
    assert_eq!(t.floor(1_000_000).index, 30);
}

#[test]
fn delta_encoding_stays_compact() {
    // Uniform interval 32, offsets growing ~500 bytes per run: each delta
    // pair fits in 3 varint bytes, so the section stays near 1 + 3n bytes.
    let entries: Vec<(u64, u64)> = (0..100).map(|i| (i * 32, i * 500)).collect();
    let t = table(&entries);

    let mut buf = Vec::new();
    t.encode(&mut buf);
    assert!(buf.len() < 100 * 4, "table encoding too large: {}", buf.len());

    let decoded = SkipTable::decode(&mut BoundedInput::wrap(buf)).unwrap();
    assert_eq!(decoded.entries(), t.entries());
}

#[test]
fn decode_stops_at_section_end() {
    let t = table(&[(0, 0), (32, 410)]);
    let mut buf = Vec::new();
    t.encode(&mut buf);
    let table_len = buf.len() as u64;
    buf.extend_from_slice(&[0xAA; 7]); // unrelated trailing bytes

    let input = BoundedInput::wrap(buf);
    let mut section = input.slice(0, table_len).unwrap();
    let decoded = SkipTable::decode(&mut section).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(section.remaining(), 0);
}

#[test]
fn decode_rejects_truncated_section() {
    let t = table(&[(0, 0), (32, 410), (64, 873)]);
    let mut buf = Vec::new();
    t.encode(&mut buf);
    buf.truncate(buf.len() - 1);

    let err = SkipTable::decode(&mut BoundedInput::wrap(buf)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn decode_rejects_offset_overflow() {
    let mut buf = Vec::new();
    encode_uvarint(2, &mut buf);
    encode_uvarint(0, &mut buf); // entry 0: index 0
    encode_uvarint(u64::MAX, &mut buf); // offset u64::MAX
    encode_uvarint(1, &mut buf); // entry 1: index delta 1
    encode_uvarint(1, &mut buf); // offset delta 1 overflows

    let err = SkipTable::decode(&mut BoundedInput::wrap(buf)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

//! Bounded-input behaviors through the public API: nested slices, pools,
//! and teardown ownership across derivation trees.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use durable_list::BoundedInput;

fn numbered(len: u8) -> BoundedInput {
    BoundedInput::wrap((0..len).collect::<Vec<u8>>())
}

#[test]
fn nested_slices_compose_offsets() {
    let input = numbered(64);
    let outer = input.slice(16, 48).unwrap();
    let mut inner = outer.slice(8, 16).unwrap();

    // inner[0] is absolute byte 24.
    assert_eq!(inner.size(), 8);
    assert_eq!(inner.read_u8().unwrap(), 24);
}

#[test]
fn slice_beyond_parent_window_rejected() {
    let input = numbered(64);
    let outer = input.slice(16, 48).unwrap();
    // 40 exceeds the outer window's 32-byte size.
    let err = outer.slice(0, 40).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[test]
fn pool_over_slice_scans_the_slice_only() {
    let input = numbered(32);
    let slice = input.slice(10, 20).unwrap();
    let pool = slice.pool();

    for _ in 0..3 {
        let mut scan = pool.get();
        assert_eq!(scan.size(), 10);
        assert_eq!(scan.read_u8().unwrap(), 10);
    }
}

#[test]
fn reads_resume_after_failed_read() {
    let mut input = numbered(6);
    input.seek(4).unwrap();
    assert!(input.read_u32().is_err());
    // Failed read left the cursor in place; smaller reads still work.
    assert_eq!(input.read_u16().unwrap(), u16::from_le_bytes([4, 5]));
}

#[test]
fn teardown_survives_deep_derivation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let owner = BoundedInput::wrap_with_close(
        (0..16).collect::<Vec<u8>>(),
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    {
        let a = owner.duplicate();
        let b = a.slice(2, 10).unwrap();
        let c = b.duplicate();
        let pool = c.pool();
        drop(pool.get());
    }
    // Every derived view is gone; the resource is still live.
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    drop(owner);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn truncated_varint_is_eof() {
    // Continuation bit set with nothing after it.
    let mut input = BoundedInput::wrap(vec![0x80]);
    let err = input.read_uvarint().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn overlong_varint_is_invalid_data() {
    let mut input = BoundedInput::wrap(vec![0x80; 11]);
    let err = input.read_uvarint().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

//! Scenario 6 (SPEC_FULL.md §8): close during traffic.

mod support;

use cdc_host::descriptor::{
    CDC_FUNC_SUBTYPE_ACM, CDC_FUNC_SUBTYPE_HEADER, CLASS_CDC, CLASS_CDC_DATA,
    DESC_TYPE_CS_INTERFACE, DESC_TYPE_ENDPOINT, DESC_TYPE_INTERFACE, SUBCLASS_ACM,
};
use cdc_host::{Callbacks, CdcHost};
use support::{drive_enumeration_to_completion, FakeBus};
use std::sync::atomic::{AtomicUsize, Ordering};

static UNMOUNT_COUNT: AtomicUsize = AtomicUsize::new(0);

fn record_unmount(_idx: usize) {
    UNMOUNT_COUNT.fetch_add(1, Ordering::SeqCst);
}

fn acm_descriptor_block() -> Vec<u8> {
    let mut d = Vec::new();
    d.extend_from_slice(&[9, DESC_TYPE_INTERFACE, 0, 0, 1, CLASS_CDC, SUBCLASS_ACM, 0, 0]);
    d.extend_from_slice(&[5, DESC_TYPE_CS_INTERFACE, CDC_FUNC_SUBTYPE_HEADER, 0x10, 0x01]);
    d.extend_from_slice(&[4, DESC_TYPE_CS_INTERFACE, CDC_FUNC_SUBTYPE_ACM, 0x02]);
    d.extend_from_slice(&[7, DESC_TYPE_ENDPOINT, 0x81, 0x03, 0x08, 0x00, 0x10]);
    d.extend_from_slice(&[9, DESC_TYPE_INTERFACE, 1, 0, 2, CLASS_CDC_DATA, 0, 0, 0]);
    d.extend_from_slice(&[7, DESC_TYPE_ENDPOINT, 0x82, 0x02, 0x40, 0x00, 0x00]);
    d.extend_from_slice(&[7, DESC_TYPE_ENDPOINT, 0x02, 0x02, 0x40, 0x00, 0x00]);
    d
}

#[test]
fn close_fires_unmount_once_and_ignores_late_completions() {
    let before = UNMOUNT_COUNT.load(Ordering::SeqCst);

    let bus = FakeBus::new();
    let callbacks = Callbacks {
        unmount: Some(record_unmount),
        ..Callbacks::default()
    };
    let mut host: CdcHost<FakeBus, 4> = CdcHost::new(bus, callbacks);

    let data = acm_descriptor_block();
    let idx = host.open(1, &data, 0, data.len()).unwrap();
    host.set_config(1, 0).unwrap();
    drive_enumeration_to_completion(&mut host);
    assert!(host.mounted(idx));

    host.close(1);
    assert_eq!(UNMOUNT_COUNT.load(Ordering::SeqCst), before + 1);
    assert!(!host.mounted(idx));

    // Writes against a freed interface index fail rather than silently
    // succeeding.
    assert!(host.write(idx, b"late").is_err());

    // A late bulk completion on the now-freed endpoint does not panic; the
    // driver reports it as an error for the host stack to discard rather
    // than resurrecting the slot.
    assert!(host.xfer_cb(1, 0x82, Ok(()), 4).is_err());

    // Closing again is a no-op: unmount does not fire a second time.
    host.close(1);
    assert_eq!(UNMOUNT_COUNT.load(Ordering::SeqCst), before + 1);
}

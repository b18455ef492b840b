//! Scenario 4 (SPEC_FULL.md §8): TX ZLP after a max-packet-multiple write.

mod support;

use cdc_host::descriptor::{DESC_TYPE_ENDPOINT, DESC_TYPE_INTERFACE};
use cdc_host::{Callbacks, CdcHost};
use support::{drive_enumeration_to_completion, FakeBus};

fn ftdi_descriptor_block() -> Vec<u8> {
    let mut d = Vec::new();
    d.extend_from_slice(&[9, DESC_TYPE_INTERFACE, 0, 0, 2, 0xFF, 0xFF, 0xFF, 0]);
    d.extend_from_slice(&[7, DESC_TYPE_ENDPOINT, 0x81, 0x02, 0x40, 0x00, 0x00]); // bulk IN, max 64
    d.extend_from_slice(&[7, DESC_TYPE_ENDPOINT, 0x02, 0x02, 0x40, 0x00, 0x00]); // bulk OUT, max 64
    d
}

#[test]
fn write_128_bytes_over_64_byte_max_packet_ends_in_a_zlp() {
    use cdc_host::protocol::ftdi;
    let mut bus = FakeBus::new();
    bus.set_vid_pid(1, ftdi::VENDOR_ID, ftdi::PRODUCT_IDS[0]);
    let mut host: CdcHost<FakeBus, 4> = CdcHost::new(bus, Callbacks::default());

    let data = ftdi_descriptor_block();
    let idx = host.open(1, &data, 0, data.len()).unwrap();
    host.set_config(1, 0).unwrap();
    drive_enumeration_to_completion(&mut host);

    assert_eq!(host.write(idx, &[0xAAu8; 128]).unwrap(), 128);
    let submitted = host.write_flush(idx).unwrap();
    assert_eq!(submitted, 64, "first packet should be exactly one max-packet");

    // First 64-byte bulk-OUT completes: the driver should submit the second.
    host.xfer_cb(1, 0x02, Ok(()), 64).unwrap();
    assert_eq!(host.bus().bulk_out_log.len(), 2);
    assert_eq!(host.bus().bulk_out_log[1].data.len(), 64);

    // Second 64-byte bulk-OUT completes with the ring now empty: a ZLP is owed.
    host.xfer_cb(1, 0x02, Ok(()), 64).unwrap();
    assert_eq!(host.bus().bulk_out_log.len(), 3);
    assert!(host.bus().bulk_out_log[2].data.is_empty(), "third submission should be a zero-length packet");
}

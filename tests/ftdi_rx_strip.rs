//! Scenario 5 (SPEC_FULL.md §8): FTDI RX strips the 2-byte status header.

mod support;

use cdc_host::descriptor::{DESC_TYPE_ENDPOINT, DESC_TYPE_INTERFACE};
use cdc_host::protocol::ftdi;
use cdc_host::{Callbacks, CdcHost};
use support::{drive_enumeration_to_completion, FakeBus};

fn ftdi_descriptor_block() -> Vec<u8> {
    let mut d = Vec::new();
    d.extend_from_slice(&[9, DESC_TYPE_INTERFACE, 0, 0, 2, 0xFF, 0xFF, 0xFF, 0]);
    d.extend_from_slice(&[7, DESC_TYPE_ENDPOINT, 0x81, 0x02, 0x40, 0x00, 0x00]);
    d.extend_from_slice(&[7, DESC_TYPE_ENDPOINT, 0x02, 0x02, 0x40, 0x00, 0x00]);
    d
}

#[test]
fn ten_byte_rx_packet_loses_its_first_two_status_bytes() {
    let mut bus = FakeBus::new();
    bus.set_vid_pid(1, ftdi::VENDOR_ID, ftdi::PRODUCT_IDS[0]);
    let mut host: CdcHost<FakeBus, 4> = CdcHost::new(bus, Callbacks::default());

    let data = ftdi_descriptor_block();
    let idx = host.open(1, &data, 0, data.len()).unwrap();
    host.set_config(1, 0).unwrap();
    drive_enumeration_to_completion(&mut host);

    assert_eq!(host.bus().bulk_in_log.len(), 1, "mount should have posted the first RX transfer");

    let packet: [u8; 10] = [0x01, 0x60, 1, 2, 3, 4, 5, 6, 7, 8];
    host.bus_mut().script_rx(1, 0x81, &packet);
    host.xfer_cb(1, 0x81, Ok(()), packet.len()).unwrap();

    assert_eq!(host.read_available(idx).unwrap(), 8);
    let mut out = [0u8; 8];
    assert_eq!(host.read(idx, &mut out).unwrap(), 8);
    assert_eq!(out, [1, 2, 3, 4, 5, 6, 7, 8]);

    // The driver re-arms RX after every completion.
    assert_eq!(host.bus().bulk_in_log.len(), 2);
}

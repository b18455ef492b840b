//! Scenario 2 (SPEC_FULL.md §8): FTDI enumerate.

mod support;

use cdc_host::descriptor::{DESC_TYPE_ENDPOINT, DESC_TYPE_INTERFACE};
use cdc_host::protocol::ftdi;
use cdc_host::{Callbacks, CdcHost};
use support::{drive_enumeration_to_completion, FakeBus};

fn ftdi_descriptor_block() -> Vec<u8> {
    let mut d = Vec::new();
    // Vendor interface, class=0xff/0xff/0xff, 2 endpoints.
    d.extend_from_slice(&[9, DESC_TYPE_INTERFACE, 0, 0, 2, 0xFF, 0xFF, 0xFF, 0]);
    d.extend_from_slice(&[7, DESC_TYPE_ENDPOINT, 0x81, 0x02, 0x40, 0x00, 0x00]); // bulk IN 0x81
    d.extend_from_slice(&[7, DESC_TYPE_ENDPOINT, 0x02, 0x02, 0x40, 0x00, 0x00]); // bulk OUT 0x02
    d
}

#[test]
fn ftdi_enumerate_resets_then_sets_modem_ctrl_then_baud_rate() {
    let mut bus = FakeBus::new();
    bus.set_vid_pid(1, ftdi::VENDOR_ID, ftdi::PRODUCT_IDS[0]);
    let mut host: CdcHost<FakeBus, 4> = CdcHost::new(bus, Callbacks::default());

    let data = ftdi_descriptor_block();
    let idx = host.open(1, &data, 0, data.len()).expect("open should succeed");

    host.set_config(1, 0).expect("set_config should succeed");
    drive_enumeration_to_completion(&mut host);

    let log = &host.bus().control_log;
    assert_eq!(log.len(), 3);

    assert_eq!(log[0].setup.b_request, ftdi::RESET);
    assert_eq!(log[0].setup.w_value, 0);

    assert_eq!(log[1].setup.b_request, ftdi::MODEM_CTRL);
    assert_eq!(log[1].setup.w_value, 0x0303);

    assert_eq!(log[2].setup.b_request, ftdi::SET_BAUD_RATE);
    assert_eq!(log[2].setup.w_value, ftdi::BAUD_DIVISOR_9600);

    assert!(host.mounted(idx));
    assert_eq!(host.bus().set_config_complete_log, vec![(1, 0)]);
}

//! Protocol openers (§4.4): descriptor-range parsing that allocates a slot
//! and opens endpoints for one of the three recognised variants.
//!
//! Each opener uses [`SlotGuard`] so a descriptor error partway through
//! leaves no slot behind — the scope-guard resolution of the distilled
//! spec's "failure cleanup in open" open question.

use crate::descriptor::{
    desc_len, desc_next, desc_type, find_acm_capability, EndpointDescriptor, InterfaceDescriptor,
    CLASS_CDC, CLASS_CDC_DATA, DESC_TYPE_CS_INTERFACE, DESC_TYPE_INTERFACE, SUBCLASS_ACM,
};
use crate::error::{Error, Result};
use crate::hostbus::HostBus;
use crate::protocol::{cp210x, ftdi, SerialProtocol};
use crate::table::{SlotGuard, Table};

const CLASS_VENDOR: u8 = 0xFF;

/// `cdch_open` dispatch (§4.4 "Dispatch"): picks the opener by class, and for
/// vendor-class interfaces by the device's (vid, pid).
pub fn open<B: HostBus, const N: usize>(
    table: &mut Table<N>,
    bus: &mut B,
    device_address: u8,
    data: &[u8],
    offset: usize,
) -> Result<usize> {
    let itf = InterfaceDescriptor::parse(data, offset).ok_or(Error::DescriptorInvalid)?;

    if itf.class == CLASS_CDC && itf.sub_class == SUBCLASS_ACM {
        return open_acm(table, bus, device_address, data, offset, itf);
    }

    if itf.class == CLASS_VENDOR {
        let (vid, pid) = bus.vid_pid(device_address).ok_or(Error::DescriptorInvalid)?;
        if ftdi::vid_pid_matches(vid, pid) {
            return open_vendor_pair(table, bus, device_address, data, offset, itf, SerialProtocol::Ftdi);
        }
        if cp210x::vid_pid_matches(vid, pid) {
            return open_vendor_pair(table, bus, device_address, data, offset, itf, SerialProtocol::Cp210x);
        }
    }

    Err(Error::DescriptorInvalid)
}

/// ACM open: functional descriptors, optional notification endpoint, and the
/// paired data interface's two bulk endpoints (§4.4 "ACM open").
fn open_acm<B: HostBus, const N: usize>(
    table: &mut Table<N>,
    bus: &mut B,
    device_address: u8,
    data: &[u8],
    offset: usize,
    itf: InterfaceDescriptor,
) -> Result<usize> {
    let idx = table
        .allocate(
            device_address,
            itf.interface_number,
            itf.sub_class,
            itf.protocol,
            SerialProtocol::Acm,
        )
        .ok_or(Error::ResourceExhausted)?;
    let mut guard = SlotGuard::new(table, idx);
    guard.slot_mut().line_coding = crate::enumeration::DEFAULT_LINE_CODING;

    let mut cur = desc_next(data, offset).ok_or(Error::DescriptorInvalid)?;
    let acm_capability = find_acm_capability(data, cur);
    guard.slot_mut().acm_capability = acm_capability;

    // Skip over the run of class-specific interface descriptors (header,
    // ACM, union, call-management, ...).
    while let Some(t) = desc_type(data, cur) {
        if t != DESC_TYPE_CS_INTERFACE {
            break;
        }
        let len = desc_len(data, cur).ok_or(Error::DescriptorInvalid)?;
        cur += len;
    }

    if itf.num_endpoints == 1 {
        let ep = EndpointDescriptor::parse(data, cur).ok_or(Error::DescriptorInvalid)?;
        if !ep.is_interrupt() {
            return Err(Error::DescriptorInvalid);
        }
        bus.edpt_open(device_address, &ep)?;
        guard.slot_mut().notif_endpoint = ep.address;
        cur = desc_next(data, cur).ok_or(Error::DescriptorInvalid)?;
    }

    // Optional paired data interface.
    if desc_type(data, cur) == Some(DESC_TYPE_INTERFACE) {
        let data_itf = InterfaceDescriptor::parse(data, cur).ok_or(Error::DescriptorInvalid)?;
        if data_itf.class != CLASS_CDC_DATA {
            return Err(Error::DescriptorInvalid);
        }
        cur = desc_next(data, cur).ok_or(Error::DescriptorInvalid)?;
        open_bulk_pair(bus, device_address, data, cur, &mut guard)?;
    }

    Ok(guard.disarm())
}

/// FTDI/CP210x open: no functional descriptors, just the bulk pair directly
/// following the interface descriptor (§4.4 "FTDI open" / "CP210x open").
fn open_vendor_pair<B: HostBus, const N: usize>(
    table: &mut Table<N>,
    bus: &mut B,
    device_address: u8,
    data: &[u8],
    offset: usize,
    itf: InterfaceDescriptor,
    protocol: SerialProtocol,
) -> Result<usize> {
    let (expected_sub_class, expected_protocol) = match protocol {
        SerialProtocol::Ftdi => (ftdi::SUB_CLASS, ftdi::PROTOCOL),
        SerialProtocol::Cp210x => (cp210x::SUB_CLASS, cp210x::PROTOCOL),
        SerialProtocol::Acm => unreachable!("open_vendor_pair is never called for ACM"),
    };
    if itf.sub_class != expected_sub_class || itf.protocol != expected_protocol {
        return Err(Error::DescriptorInvalid);
    }
    if itf.num_endpoints != 2 {
        return Err(Error::DescriptorInvalid);
    }
    let idx = table
        .allocate(device_address, itf.interface_number, itf.sub_class, itf.protocol, protocol)
        .ok_or(Error::ResourceExhausted)?;
    let mut guard = SlotGuard::new(table, idx);
    guard.slot_mut().line_coding.bit_rate = crate::enumeration::DEFAULT_VENDOR_BAUD;

    let cur = desc_next(data, offset).ok_or(Error::DescriptorInvalid)?;
    open_bulk_pair(bus, device_address, data, cur, &mut guard)?;

    Ok(guard.disarm())
}

/// Opens two consecutive bulk endpoints as a stream pair: IN → rx, OUT → tx.
fn open_bulk_pair<B: HostBus, const N: usize>(
    bus: &mut B,
    device_address: u8,
    data: &[u8],
    offset: usize,
    guard: &mut SlotGuard<'_, N>,
) -> Result<()> {
    let first = EndpointDescriptor::parse(data, offset).ok_or(Error::DescriptorInvalid)?;
    let second_offset = desc_next(data, offset).ok_or(Error::DescriptorInvalid)?;
    let second = EndpointDescriptor::parse(data, second_offset).ok_or(Error::DescriptorInvalid)?;

    if !first.is_bulk() || !second.is_bulk() {
        return Err(Error::DescriptorInvalid);
    }

    let (in_ep, out_ep) = if first.is_in() && !second.is_in() {
        (first, second)
    } else if second.is_in() && !first.is_in() {
        (second, first)
    } else {
        return Err(Error::DescriptorInvalid);
    };

    bus.edpt_open(device_address, &in_ep)?;
    bus.edpt_open(device_address, &out_ep)?;

    let slot = guard.slot_mut();
    slot.stream.open(
        out_ep.address,
        out_ep.max_packet_size,
        in_ep.address,
        in_ep.max_packet_size,
    );
    Ok(())
}

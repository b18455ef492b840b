//! Silicon Labs CP210x vendor-specific wire requests and device identification.

use crate::descriptor::{SetupPacket, DIR_HOST_TO_DEVICE, RECIP_INTERFACE, TYPE_VENDOR};

pub const IFC_ENABLE: u8 = 0x00;
pub const SET_BAUDRATE: u8 = 0x1E;
pub const SET_MHS: u8 = 0x07;

pub const VENDOR_ID: u16 = 0x10C4;
/// Product IDs this driver recognises (CP2102/CP2104/CP2109 family).
pub const PRODUCT_IDS: &[u16] = &[0xEA60, 0xEA61, 0xEA70, 0xEA80];

/// Expected `bInterfaceSubClass`/`bInterfaceProtocol` of a CP210x vendor
/// interface (§4.4 "CP210x open").
pub const SUB_CLASS: u8 = 0x00;
pub const PROTOCOL: u8 = 0x00;

pub fn vid_pid_matches(vid: u16, pid: u16) -> bool {
    vid == VENDOR_ID && PRODUCT_IDS.contains(&pid)
}

const BM_REQUEST_TYPE: u8 = DIR_HOST_TO_DEVICE | TYPE_VENDOR | RECIP_INTERFACE;

pub fn ifc_enable(interface_number: u8, enabled: bool) -> SetupPacket {
    SetupPacket {
        bm_request_type: BM_REQUEST_TYPE,
        b_request: IFC_ENABLE,
        w_value: enabled as u16,
        w_index: interface_number as u16,
        w_length: 0,
    }
}

/// Payload is a 4-byte little-endian `u32` baud rate, staged into the
/// shared enumeration buffer.
pub fn set_baudrate(interface_number: u8) -> SetupPacket {
    SetupPacket {
        bm_request_type: BM_REQUEST_TYPE,
        b_request: SET_BAUDRATE,
        w_value: 0,
        w_index: interface_number as u16,
        w_length: 4,
    }
}

/// `wValue = 0x0300 | line_state`, DTR bit 0 / RTS bit 1.
pub fn set_mhs(interface_number: u8, line_state: u8) -> SetupPacket {
    SetupPacket {
        bm_request_type: BM_REQUEST_TYPE,
        b_request: SET_MHS,
        w_value: 0x0300 | line_state as u16,
        w_index: interface_number as u16,
        w_length: 0,
    }
}

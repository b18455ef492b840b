//! CDC-ACM (Abstract Control Model) wire requests.

use crate::descriptor::{SetupPacket, DIR_HOST_TO_DEVICE, RECIP_INTERFACE, TYPE_CLASS};

pub const SET_LINE_CODING: u8 = 0x20;
pub const SET_CONTROL_LINE_STATE: u8 = 0x22;

const BM_REQUEST_TYPE: u8 = DIR_HOST_TO_DEVICE | TYPE_CLASS | RECIP_INTERFACE;

/// ACM SET_CONTROL_LINE_STATE: DTR is bit 0, RTS is bit 1 of `line_state`.
pub fn set_control_line_state(interface_number: u8, line_state: u8) -> SetupPacket {
    SetupPacket {
        bm_request_type: BM_REQUEST_TYPE,
        b_request: SET_CONTROL_LINE_STATE,
        w_value: line_state as u16,
        w_index: interface_number as u16,
        w_length: 0,
    }
}

/// ACM SET_LINE_CODING: payload is the 7-byte line coding structure, staged
/// by the caller into the shared enumeration buffer.
pub fn set_line_coding(interface_number: u8) -> SetupPacket {
    SetupPacket {
        bm_request_type: BM_REQUEST_TYPE,
        b_request: SET_LINE_CODING,
        w_value: 0,
        w_index: interface_number as u16,
        w_length: crate::descriptor::LineCoding::WIRE_LEN as u16,
    }
}

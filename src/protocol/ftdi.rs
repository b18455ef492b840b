//! FTDI vendor-specific wire requests and device identification.

use crate::descriptor::{SetupPacket, DIR_HOST_TO_DEVICE, RECIP_DEVICE, TYPE_VENDOR};

pub const RESET: u8 = 0x00;
pub const MODEM_CTRL: u8 = 0x01;
pub const SET_BAUD_RATE: u8 = 0x03;

pub const RESET_SIO: u16 = 0x0000;

/// The distilled spec leaves FTDI baud-divisor computation as an open
/// point (Non-goal §1); the source hardcodes the divisor for 9600 baud.
/// This crate keeps that constant rather than inventing a divisor formula
/// that the spec explicitly declines to specify.
pub const BAUD_DIVISOR_9600: u16 = 0x4138;

pub const VENDOR_ID: u16 = 0x0403;
/// Product IDs this driver recognises (the common FT232/FT2232 family).
pub const PRODUCT_IDS: &[u16] = &[0x6001, 0x6010, 0x6011, 0x6014, 0x6015];

/// Expected `bInterfaceSubClass`/`bInterfaceProtocol` of an FTDI vendor
/// interface (§4.4 "FTDI open").
pub const SUB_CLASS: u8 = 0xFF;
pub const PROTOCOL: u8 = 0xFF;

pub fn vid_pid_matches(vid: u16, pid: u16) -> bool {
    vid == VENDOR_ID && PRODUCT_IDS.contains(&pid)
}

const BM_REQUEST_TYPE: u8 = DIR_HOST_TO_DEVICE | TYPE_VENDOR | RECIP_DEVICE;

pub fn reset() -> SetupPacket {
    SetupPacket {
        bm_request_type: BM_REQUEST_TYPE,
        b_request: RESET,
        w_value: RESET_SIO,
        w_index: 0,
        w_length: 0,
    }
}

/// `wValue = 0x0300 | line_state`, DTR bit 0 / RTS bit 1, high byte selects
/// "apply both mask bits" per the FTDI modem-control request encoding.
pub fn modem_ctrl(line_state: u8) -> SetupPacket {
    SetupPacket {
        bm_request_type: BM_REQUEST_TYPE,
        b_request: MODEM_CTRL,
        w_value: 0x0300 | line_state as u16,
        w_index: 0,
        w_length: 0,
    }
}

pub fn set_baud_rate(divisor: u16) -> SetupPacket {
    SetupPacket {
        bm_request_type: BM_REQUEST_TYPE,
        b_request: SET_BAUD_RATE,
        w_value: divisor,
        w_index: 0,
        w_length: 0,
    }
}

//! USB descriptor wire structures and byte-slice iteration helpers.
//!
//! Field names follow the USB 2.0 specification's own (un-Rust-like)
//! naming, the same convention the teacher kernel's `drivers::usb::mod`
//! descriptor structs use (`b_length`, `b_descriptor_type`, ...).
//!
//! Descriptor iteration (`desc_len`/`desc_type`/`desc_next`) is pure,
//! stateless byte-slice parsing with no host-controller-specific behavior,
//! so — unlike the rest of the host-stack surface in [`crate::hostbus`] —
//! it is implemented here as free functions rather than `HostBus` trait
//! methods; there is nothing for a concrete host stack to override.

pub const DESC_TYPE_INTERFACE: u8 = 0x04;
pub const DESC_TYPE_ENDPOINT: u8 = 0x05;
pub const DESC_TYPE_CS_INTERFACE: u8 = 0x24;

/// CDC functional descriptor subtypes (class-specific interface descriptors).
pub const CDC_FUNC_SUBTYPE_HEADER: u8 = 0x00;
pub const CDC_FUNC_SUBTYPE_ACM: u8 = 0x02;
pub const CDC_FUNC_SUBTYPE_UNION: u8 = 0x06;

pub const CLASS_CDC: u8 = 0x02;
pub const CLASS_CDC_DATA: u8 = 0x0A;
pub const SUBCLASS_ACM: u8 = 0x02;

pub const EP_XFER_CONTROL: u8 = 0;
pub const EP_XFER_ISOCHRONOUS: u8 = 1;
pub const EP_XFER_BULK: u8 = 2;
pub const EP_XFER_INTERRUPT: u8 = 3;

pub const EP_DIR_IN: u8 = 0x80;

/// Length of a raw descriptor at `data[offset]`, or `None` if `offset` is
/// out of range or the descriptor is truncated.
pub fn desc_len(data: &[u8], offset: usize) -> Option<usize> {
    let len = *data.get(offset)? as usize;
    if len < 2 || offset + len > data.len() {
        return None;
    }
    Some(len)
}

/// Descriptor type byte at `data[offset]`.
pub fn desc_type(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset + 1).copied()
}

/// Offset of the descriptor immediately following the one at `offset`.
pub fn desc_next(data: &[u8], offset: usize) -> Option<usize> {
    Some(offset + desc_len(data, offset)?)
}

/// A parsed standard interface descriptor.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceDescriptor {
    pub interface_number: u8,
    pub alternate_setting: u8,
    pub num_endpoints: u8,
    pub class: u8,
    pub sub_class: u8,
    pub protocol: u8,
}

impl InterfaceDescriptor {
    pub fn parse(data: &[u8], offset: usize) -> Option<Self> {
        let len = desc_len(data, offset)?;
        if desc_type(data, offset)? != DESC_TYPE_INTERFACE || len < 9 {
            return None;
        }
        Some(InterfaceDescriptor {
            interface_number: data[offset + 2],
            alternate_setting: data[offset + 3],
            num_endpoints: data[offset + 4],
            class: data[offset + 5],
            sub_class: data[offset + 6],
            protocol: data[offset + 7],
        })
    }
}

/// A parsed standard endpoint descriptor.
#[derive(Debug, Clone, Copy)]
pub struct EndpointDescriptor {
    pub address: u8,
    pub transfer_type: u8,
    pub max_packet_size: u16,
    pub interval: u8,
}

impl EndpointDescriptor {
    pub fn parse(data: &[u8], offset: usize) -> Option<Self> {
        let len = desc_len(data, offset)?;
        if desc_type(data, offset)? != DESC_TYPE_ENDPOINT || len < 7 {
            return None;
        }
        Some(EndpointDescriptor {
            address: data[offset + 2],
            transfer_type: data[offset + 3] & 0x03,
            max_packet_size: u16::from_le_bytes([data[offset + 4], data[offset + 5]]),
            interval: data[offset + 6],
        })
    }

    pub fn is_in(&self) -> bool {
        self.address & EP_DIR_IN != 0
    }

    pub fn is_bulk(&self) -> bool {
        self.transfer_type == EP_XFER_BULK
    }

    pub fn is_interrupt(&self) -> bool {
        self.transfer_type == EP_XFER_INTERRUPT
    }
}

/// The ACM functional descriptor's `bmCapabilities` byte, narrowed to the
/// one bit this driver consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcmCapability {
    raw: u8,
}

impl AcmCapability {
    pub const SUPPORT_LINE_REQUEST: u8 = 1 << 1;

    pub const fn from_raw(raw: u8) -> Self {
        AcmCapability { raw }
    }

    pub fn support_line_request(&self) -> bool {
        self.raw & Self::SUPPORT_LINE_REQUEST != 0
    }
}

/// Parses the ACM functional descriptor (subtype 0x02) out of a run of
/// CDC class-specific interface descriptors starting at `offset`, stopping
/// at the first descriptor that is not class-specific (CS_INTERFACE) or
/// interface/endpoint.
pub fn find_acm_capability(data: &[u8], mut offset: usize) -> AcmCapability {
    while let Some(len) = desc_len(data, offset) {
        match desc_type(data, offset) {
            Some(DESC_TYPE_CS_INTERFACE) if len >= 4 && data[offset + 2] == CDC_FUNC_SUBTYPE_ACM => {
                return AcmCapability::from_raw(data[offset + 3]);
            }
            Some(DESC_TYPE_CS_INTERFACE) => {}
            _ => break,
        }
        offset += len;
    }
    AcmCapability::default()
}

/// A SETUP packet as transmitted on control endpoints (USB 2.0 §9.3).
#[derive(Debug, Clone, Copy)]
pub struct SetupPacket {
    pub bm_request_type: u8,
    pub b_request: u8,
    pub w_value: u16,
    pub w_index: u16,
    pub w_length: u16,
}

pub const DIR_HOST_TO_DEVICE: u8 = 0x00;
pub const DIR_DEVICE_TO_HOST: u8 = 0x80;
pub const TYPE_CLASS: u8 = 0x20;
pub const TYPE_VENDOR: u8 = 0x40;
pub const RECIP_DEVICE: u8 = 0x00;
pub const RECIP_INTERFACE: u8 = 0x01;

/// Line coding: baud rate, stop bits, parity, data bits (USB CDC §6.2.13).
/// On the wire this is 7 bytes, little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineCoding {
    pub bit_rate: u32,
    pub stop_bits: u8,
    pub parity: u8,
    pub data_bits: u8,
}

impl LineCoding {
    pub const WIRE_LEN: usize = 7;

    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let br = self.bit_rate.to_le_bytes();
        [br[0], br[1], br[2], br[3], self.stop_bits, self.parity, self.data_bits]
    }

    /// Populates from the first `min(WIRE_LEN, buf.len())` bytes, per the
    /// control-completion trampoline's cache-update rule.
    pub fn from_bytes(buf: &[u8]) -> Self {
        let n = buf.len().min(Self::WIRE_LEN);
        let mut b = [0u8; Self::WIRE_LEN];
        b[..n].copy_from_slice(&buf[..n]);
        LineCoding {
            bit_rate: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            stop_bits: b[4],
            parity: b[5],
            data_bits: b[6],
        }
    }
}

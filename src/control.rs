//! The control-request dispatcher: submission helpers and the completion
//! trampoline that keeps cached line state/coding coherent.

use crate::descriptor::LineCoding;
use crate::error::Result;
use crate::hostbus::{ControlCompletion, ControlTag, ControlXfer, HostBus};
use crate::protocol::SerialProtocol;
use crate::table::Slot;

/// Submits a control transfer with a data-OUT payload staged through the
/// host stack's shared enumeration buffer (§4.3 / §5): the payload must
/// outlive the caller's stack frame, and single-outstanding-control-per-
/// interface (invariant §3.5) is what makes reusing that shared buffer safe.
pub fn submit_with_payload<B: HostBus>(
    bus: &mut B,
    device_address: u8,
    setup: crate::descriptor::SetupPacket,
    tag: ControlTag,
    payload: &[u8],
) -> Result<()> {
    let buf = bus.enum_buf();
    let n = payload.len().min(buf.len());
    buf[..n].copy_from_slice(&payload[..n]);
    bus.control_xfer(ControlXfer {
        device_address,
        setup,
        tag,
    })
}

pub fn submit_no_data<B: HostBus>(
    bus: &mut B,
    device_address: u8,
    setup: crate::descriptor::SetupPacket,
    tag: ControlTag,
) -> Result<()> {
    bus.control_xfer(ControlXfer {
        device_address,
        setup,
        tag,
    })
}

/// Applies the trampoline's `(serial_protocol, bRequest)` cache-update rule
/// (§4.3 step 2) to a successfully completed control transfer. Does nothing
/// on a failed transfer — callers only invoke this after checking
/// `completion.result.is_ok()`.
pub fn apply_cache_update(slot: &mut Slot, completion: &ControlCompletion) {
    let req = completion.setup.b_request;
    match slot.serial_protocol {
        SerialProtocol::Acm if req == crate::protocol::acm::SET_CONTROL_LINE_STATE => {
            slot.line_state = completion.setup.w_value as u8;
        }
        SerialProtocol::Acm if req == crate::protocol::acm::SET_LINE_CODING => {
            slot.line_coding = LineCoding::from_bytes(completion.buf);
        }
        SerialProtocol::Ftdi if req == crate::protocol::ftdi::MODEM_CTRL => {
            slot.line_state = completion.setup.w_value as u8;
        }
        SerialProtocol::Cp210x if req == crate::protocol::cp210x::SET_MHS => {
            // Resolved open question (§9 / SPEC_FULL.md): unlike the
            // original source, CP210x SET_MHS does update the cache, so
            // get_dtr/get_rts never go stale for this protocol either.
            slot.line_state = completion.setup.w_value as u8;
        }
        _ => {}
    }
}

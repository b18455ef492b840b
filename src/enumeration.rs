//! Per-variant enumeration state machines (§4.5).
//!
//! Each state either submits a control transfer tagged with the *next*
//! state (so the completion trampoline knows where to resume), falls
//! through to the next state when its feature is disabled, or — at the
//! terminal state — fires `set_config_complete`. Gating mirrors the
//! distilled spec's compile-time configuration options, translated here
//! into this crate's Cargo features (see `SPEC_FULL.md` §4.5).

use crate::descriptor::LineCoding;
use crate::error::{Error, Result};
use crate::hostbus::{ControlTag, HostBus};
use crate::protocol::{acm, cp210x, ftdi, EnumState, SerialProtocol};
use crate::table::{Table, LINE_STATE_DTR, LINE_STATE_RTS};
use crate::Callbacks;

fn submit_enum_step<B: HostBus>(
    bus: &mut B,
    device_address: u8,
    setup: crate::descriptor::SetupPacket,
    next: EnumState,
) -> Result<()> {
    crate::control::submit_no_data(bus, device_address, setup, ControlTag::Enumeration(next))
}

fn submit_enum_step_with_payload<B: HostBus>(
    bus: &mut B,
    device_address: u8,
    setup: crate::descriptor::SetupPacket,
    next: EnumState,
    payload: &[u8],
) -> Result<()> {
    crate::control::submit_with_payload(
        bus,
        device_address,
        setup,
        ControlTag::Enumeration(next),
        payload,
    )
}

/// Kicks off the variant-appropriate machine for a just-opened interface.
pub fn start<B: HostBus, const N: usize>(
    table: &mut Table<N>,
    bus: &mut B,
    callbacks: &Callbacks,
    idx: usize,
) -> Result<()> {
    let protocol = table.get(idx).ok_or(Error::InvalidIndex)?.serial_protocol;
    let initial = match protocol {
        SerialProtocol::Acm => EnumState::AcmSetControlLineState,
        SerialProtocol::Ftdi => EnumState::FtdiReset,
        SerialProtocol::Cp210x => EnumState::Cp210xIfcEnable,
    };
    advance(table, bus, callbacks, idx, initial)
}

/// Executes (or falls through) `state` for the interface at `idx`.
pub fn advance<B: HostBus, const N: usize>(
    table: &mut Table<N>,
    bus: &mut B,
    callbacks: &Callbacks,
    idx: usize,
    state: EnumState,
) -> Result<()> {
    // Snapshot what this step needs, then drop the borrow of `table` before
    // any recursive call or bus submission — every arm below that needs to
    // mutate the slot (e.g. stamping `line_state`) re-borrows briefly for
    // just that assignment.
    let slot = *table.get(idx).ok_or(Error::InvalidIndex)?;
    let device_address = slot.device_address;
    let interface_number = slot.interface_number;

    crate::debug_println!(callbacks.log, "enumeration: slot {} -> {:?}", idx, state);

    match state {
        EnumState::AcmSetControlLineState => {
            if cfg!(feature = "acm-line-control") && slot.acm_capability.support_line_request() {
                let line_state = LINE_STATE_DTR | LINE_STATE_RTS;
                table.get_mut(idx).unwrap().line_state = line_state;
                let setup = acm::set_control_line_state(interface_number, line_state);
                submit_enum_step(bus, device_address, setup, EnumState::AcmSetLineCoding)
            } else {
                advance(table, bus, callbacks, idx, EnumState::AcmSetLineCoding)
            }
        }
        EnumState::AcmSetLineCoding => {
            if cfg!(feature = "acm-line-coding") && slot.acm_capability.support_line_request() {
                let coding = slot.line_coding;
                let setup = acm::set_line_coding(interface_number);
                submit_enum_step_with_payload(
                    bus,
                    device_address,
                    setup,
                    EnumState::AcmComplete,
                    &coding.to_bytes(),
                )
            } else {
                advance(table, bus, callbacks, idx, EnumState::AcmComplete)
            }
        }
        EnumState::AcmComplete => {
            // The data interface is a separate host-stack configuration
            // step from the comm interface (§4.5).
            complete(table, bus, callbacks, idx, interface_number + 1)
        }

        EnumState::FtdiReset => {
            let setup = ftdi::reset();
            submit_enum_step(bus, device_address, setup, EnumState::FtdiModemCtrl)
        }
        EnumState::FtdiModemCtrl => {
            if cfg!(feature = "ftdi-modem-ctrl") {
                let line_state = LINE_STATE_DTR | LINE_STATE_RTS;
                table.get_mut(idx).unwrap().line_state = line_state;
                let setup = ftdi::modem_ctrl(line_state);
                submit_enum_step(bus, device_address, setup, EnumState::FtdiSetBaudrate)
            } else {
                advance(table, bus, callbacks, idx, EnumState::FtdiSetBaudrate)
            }
        }
        EnumState::FtdiSetBaudrate => {
            if cfg!(feature = "ftdi-baudrate") {
                let setup = ftdi::set_baud_rate(ftdi::BAUD_DIVISOR_9600);
                submit_enum_step(bus, device_address, setup, EnumState::FtdiSetData)
            } else {
                advance(table, bus, callbacks, idx, EnumState::FtdiSetData)
            }
        }
        EnumState::FtdiSetData => {
            // Placeholder step (§4.5 / SPEC_FULL.md) — no request defined.
            advance(table, bus, callbacks, idx, EnumState::FtdiComplete)
        }
        EnumState::FtdiComplete => complete(table, bus, callbacks, idx, interface_number),

        EnumState::Cp210xIfcEnable => {
            let setup = cp210x::ifc_enable(interface_number, true);
            submit_enum_step(bus, device_address, setup, EnumState::Cp210xSetBaudrate)
        }
        EnumState::Cp210xSetBaudrate => {
            if cfg!(feature = "cp210x-baudrate") {
                let baud = slot.line_coding.bit_rate;
                let setup = cp210x::set_baudrate(interface_number);
                submit_enum_step_with_payload(
                    bus,
                    device_address,
                    setup,
                    EnumState::Cp210xSetLineCtl,
                    &baud.to_le_bytes(),
                )
            } else {
                advance(table, bus, callbacks, idx, EnumState::Cp210xSetLineCtl)
            }
        }
        EnumState::Cp210xSetLineCtl => {
            // Unreachable in the source (guarded off) — fall straight
            // through, matching §4.5 / SPEC_FULL.md.
            advance(table, bus, callbacks, idx, EnumState::Cp210xSetDtrRts)
        }
        EnumState::Cp210xSetDtrRts => {
            if cfg!(feature = "cp210x-dtr-rts") {
                let line_state = LINE_STATE_DTR | LINE_STATE_RTS;
                table.get_mut(idx).unwrap().line_state = line_state;
                let setup = cp210x::set_mhs(interface_number, line_state);
                submit_enum_step(bus, device_address, setup, EnumState::Cp210xComplete)
            } else {
                advance(table, bus, callbacks, idx, EnumState::Cp210xComplete)
            }
        }
        EnumState::Cp210xComplete => complete(table, bus, callbacks, idx, interface_number),
    }
}

/// Terminal step for every machine: fire `mount`, post the first RX
/// transfer, and hand configuration back to the host stack (§4.5).
fn complete<B: HostBus, const N: usize>(
    table: &mut Table<N>,
    bus: &mut B,
    callbacks: &Callbacks,
    idx: usize,
    itf_num_for_host_stack: u8,
) -> Result<()> {
    let slot = table.get_mut(idx).ok_or(Error::InvalidIndex)?;
    let device_address = slot.device_address;
    let rx_ep = slot.stream.rx.ep_addr;
    let rx_max = slot.stream.rx.max_packet_size;

    crate::debug_println!(callbacks.log, "enumeration: slot {} mounted", idx);

    if let Some(mount) = callbacks.mount {
        mount(idx);
    }

    if rx_ep != 0 {
        bus.submit_bulk_in(device_address, rx_ep, rx_max as usize)?;
        table.get_mut(idx).unwrap().stream.rx.xfer_in_flight = true;
    }

    bus.set_config_complete(device_address, itf_num_for_host_stack);
    Ok(())
}

/// Line coding an ACM slot is stamped with at open, before any
/// `SET_LINE_CODING` the application issues — 115200-8-N-1, the teacher's
/// own `set_line_coding` default.
pub const DEFAULT_LINE_CODING: LineCoding = LineCoding {
    bit_rate: 115_200,
    stop_bits: 0,
    parity: 0,
    data_bits: 8,
};

/// Baud rate a freshly opened FTDI/CP210x slot is stamped with — the
/// conventional power-on default for these vendor chips. CP210x's
/// enumeration machine reads this back into its SET_BAUDRATE payload
/// (§4.5); FTDI's baud step is a hardcoded divisor regardless (§9) and
/// never reads this field.
pub const DEFAULT_VENDOR_BAUD: u32 = 9600;

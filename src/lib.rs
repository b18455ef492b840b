//! Host-side USB class driver core for CDC-ACM, FTDI, and CP210x serial
//! adapters.
//!
//! This crate is the interface-lifecycle and control-plane state machinery
//! for serial-over-USB devices: recognising an attached device's variant,
//! driving its enumeration state machine, and exposing a uniform
//! bidirectional byte-stream API once mounted. The lower USB host stack
//! (endpoint open, control/bulk transfer submission) is an external
//! collaborator, supplied by whatever concrete host controller implements
//! [`HostBus`].
//!
//! `#![no_std]`, no heap: every interface record lives in a fixed-capacity
//! [`Table`], sized at compile time by the `N` const generic on [`CdcHost`].

#![no_std]

pub mod control;
pub mod descriptor;
pub mod enumeration;
pub mod error;
pub mod hostbus;
pub mod log;
mod open;
pub mod protocol;
pub mod stream;
pub mod table;

pub use descriptor::{EndpointDescriptor, InterfaceDescriptor, LineCoding, SetupPacket};
pub use error::{Error, Result};
pub use hostbus::{CompletionCb, ControlCompletion, ControlTag, ControlXfer, HostBus};
pub use log::LogFn;
pub use table::INVALID;

use table::Table;

/// Application-registered callbacks, one set per process (§6 "Application
/// API"). All are plain function pointers — no boxed closures, since this
/// crate carries no allocator — mirroring the teacher kernel's callback
/// style for its own driver registration points.
#[derive(Clone, Copy, Default)]
pub struct Callbacks {
    /// Fired once enumeration completes for a newly mounted interface.
    pub mount: Option<fn(usize)>,
    /// Fired when `close` frees a slot that was mounted.
    pub unmount: Option<fn(usize)>,
    /// Fired after every successful RX bulk completion (post header-strip).
    pub rx: Option<fn(usize)>,
    /// Fired after every TX bulk completion.
    pub tx_complete: Option<fn(usize)>,
    /// Optional sink for `debug_println!` trace output (§ ambient logging).
    pub log: Option<LogFn>,
}

/// The top-level driver: an interface table plus the host-bus handle it was
/// opened against. `N` is the interface table capacity — the distilled
/// spec's `MAX_CDC_INTERFACES`, here a const generic instead of a crate-wide
/// constant so an embedder picks its own bound at the type level.
pub struct CdcHost<B: HostBus, const N: usize> {
    table: Table<N>,
    bus: B,
    callbacks: Callbacks,
}

impl<B: HostBus, const N: usize> CdcHost<B, N> {
    /// Process-wide setup: clears the slot table (§3 "Lifecycle").
    pub fn new(bus: B, callbacks: Callbacks) -> Self {
        CdcHost {
            table: Table::new(),
            bus,
            callbacks,
        }
    }

    /// Re-clears every slot without discarding the bus/callbacks, for an
    /// embedder that wants to reuse one `CdcHost` across a host-stack reset.
    pub fn init(&mut self) {
        self.table.init();
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Parses the descriptor block at `data[offset..offset + max_len]`,
    /// allocates a slot, and opens its endpoints (§4.4). Performs no control
    /// traffic; call [`CdcHost::set_config`] afterward to start enumeration.
    pub fn open(
        &mut self,
        device_address: u8,
        data: &[u8],
        offset: usize,
        max_len: usize,
    ) -> Result<usize> {
        let end = offset.saturating_add(max_len).min(data.len());
        let data = &data[..end];
        let result = open::open(&mut self.table, &mut self.bus, device_address, data, offset);
        match result {
            Ok(idx) => crate::debug_println!(self.callbacks.log, "open: device {} -> slot {}", device_address, idx),
            Err(e) => crate::debug_println!(self.callbacks.log, "open: device {} failed: {:?}", device_address, e),
        }
        result
    }

    /// Launches the variant's enumeration state machine for an
    /// already-opened interface (§4.5).
    pub fn set_config(&mut self, device_address: u8, interface_number: u8) -> Result<()> {
        let idx = self.table.lookup_by_itf(device_address, interface_number);
        if idx == table::INVALID {
            return Err(Error::InvalidIndex);
        }
        enumeration::start(&mut self.table, &mut self.bus, &self.callbacks, idx)
    }

    /// Routes a completed control transfer through the cache-update
    /// trampoline (§4.3) and on to either the enumeration machine or a
    /// stashed user callback.
    pub fn control_xfer_complete(&mut self, completion: ControlCompletion<'_>) -> Result<()> {
        let idx = self
            .table
            .lookup_by_itf(completion.device_address, completion.setup.w_index as u8);
        if idx == table::INVALID {
            return Err(Error::Internal);
        }

        if completion.result.is_ok() {
            if let Some(slot) = self.table.get_mut(idx) {
                control::apply_cache_update(slot, &completion);
            }
        }

        match completion.tag {
            ControlTag::Enumeration(state) => {
                if completion.result.is_err() {
                    return Err(Error::TransferFailed);
                }
                enumeration::advance(&mut self.table, &mut self.bus, &self.callbacks, idx, state)
            }
            ControlTag::User { cb, user_data } => {
                if let Some(cb) = cb {
                    cb(idx, completion.result, user_data);
                }
                Ok(())
            }
        }
    }

    /// Bulk/interrupt completion callback (§4.6). `result` carries the host
    /// stack's view of the transfer; non-success disarms the affected
    /// stream direction rather than asserting.
    pub fn xfer_cb(
        &mut self,
        device_address: u8,
        endpoint_address: u8,
        result: Result<()>,
        bytes_transferred: usize,
    ) -> Result<()> {
        let idx = self.table.lookup_by_endpoint(device_address, endpoint_address);
        if self.table.get(idx).is_none() {
            crate::debug_println!(
                self.callbacks.log,
                "xfer_cb: device {} ep {:#x} has no owning slot",
                device_address,
                endpoint_address
            );
            return Err(Error::Internal);
        }
        let slot = self.table.get_mut(idx).ok_or(Error::Internal)?;

        if slot.notif_endpoint == endpoint_address {
            return Ok(());
        }

        let is_tx = slot.stream.tx.ep_addr == endpoint_address;
        let is_rx = slot.stream.rx.ep_addr == endpoint_address;
        if !is_tx && !is_rx {
            return Err(Error::Internal);
        }

        if result.is_err() {
            crate::debug_println!(
                self.callbacks.log,
                "xfer_cb: slot {} ep {:#x} transfer failed",
                idx,
                endpoint_address
            );
            if is_tx {
                slot.stream.tx.xfer_in_flight = false;
                slot.stream.tx.armed = false;
            } else {
                slot.stream.rx.xfer_in_flight = false;
                slot.stream.rx.armed = false;
            }
            if let Some(cb) = if is_tx { self.callbacks.tx_complete } else { self.callbacks.rx } {
                cb(idx);
            }
            return Err(Error::TransferFailed);
        }

        if is_tx {
            slot.stream.tx.xfer_in_flight = false;
            slot.stream.tx.last_xfer_bytes = bytes_transferred;
            if let Some(cb) = self.callbacks.tx_complete {
                cb(idx);
            }
            self.write_xfer(idx)?;
        } else {
            let max_packet = slot.stream.rx.max_packet_size;
            let protocol = slot.serial_protocol;
            let received = self.bus.received_data(device_address, endpoint_address);
            let n = received.len().min(bytes_transferred).min(max_packet as usize);
            let mut tmp = [0u8; crate::stream::RING_CAPACITY];
            let n = n.min(tmp.len());
            tmp[..n].copy_from_slice(&received[..n]);

            let slot = self.table.get_mut(idx).ok_or(Error::Internal)?;
            slot.stream.rx.xfer_in_flight = false;
            slot.stream.rx.ring.write(&tmp[..n]);

            let header_len = protocol.rx_header_len();
            if header_len > 0 {
                slot.stream.rx.ring.discard(header_len.min(n));
            }

            if let Some(cb) = self.callbacks.rx {
                cb(idx);
            }
            self.read_xfer(idx)?;
        }
        Ok(())
    }

    /// Frees every slot owned by `device_address`: fires `unmount`, closes
    /// both streams, and zeroes the free-slot flag (§3 "Lifecycle").
    pub fn close(&mut self, device_address: u8) {
        crate::debug_println!(self.callbacks.log, "close: device {}", device_address);
        let owned: heapless_idx_list::IdxList<N> = self.table.slots_owned_by(device_address).collect();
        for idx in owned.iter().copied() {
            if let Some(unmount) = self.callbacks.unmount {
                unmount(idx);
            }
            if let Some(slot) = self.table.get_mut(idx) {
                slot.stream.close();
            }
            self.table.free(idx);
        }
    }

    // ---- Application API (§6) ----

    pub fn mounted(&self, idx: usize) -> bool {
        self.table.get(idx).is_some()
    }

    pub fn get_dtr(&self, idx: usize) -> Result<bool> {
        Ok(self.table.get(idx).ok_or(Error::InvalidIndex)?.dtr())
    }

    pub fn get_rts(&self, idx: usize) -> Result<bool> {
        Ok(self.table.get(idx).ok_or(Error::InvalidIndex)?.rts())
    }

    pub fn get_local_line_coding(&self, idx: usize) -> Result<LineCoding> {
        Ok(self.table.get(idx).ok_or(Error::InvalidIndex)?.line_coding)
    }

    pub fn write(&mut self, idx: usize, src: &[u8]) -> Result<usize> {
        let slot = self.table.get_mut(idx).ok_or(Error::InvalidIndex)?;
        Ok(slot.stream.tx.ring.write(src))
    }

    pub fn write_available(&self, idx: usize) -> Result<usize> {
        let slot = self.table.get(idx).ok_or(Error::InvalidIndex)?;
        Ok(crate::stream::RING_CAPACITY - 1 - slot.stream.tx.ring.available())
    }

    pub fn write_clear(&mut self, idx: usize) -> Result<()> {
        let slot = self.table.get_mut(idx).ok_or(Error::InvalidIndex)?;
        slot.stream.tx.ring.clear();
        Ok(())
    }

    /// Submits up to one endpoint-packet worth of queued TX bytes, and a ZLP
    /// if the previous completion exactly filled a max-packet multiple and
    /// nothing remains queued (§4.2).
    pub fn write_flush(&mut self, idx: usize) -> Result<usize> {
        self.write_xfer(idx)
    }

    fn write_xfer(&mut self, idx: usize) -> Result<usize> {
        let slot = self.table.get_mut(idx).ok_or(Error::InvalidIndex)?;
        if !slot.stream.tx.armed || slot.stream.tx.xfer_in_flight {
            return Ok(0);
        }
        let max_packet = slot.stream.tx.max_packet_size as usize;
        let ep = slot.stream.tx.ep_addr;
        let device_address = slot.device_address;
        let available = slot.stream.tx.ring.available();

        if available == 0 {
            if slot.stream.tx.last_xfer_bytes != 0
                && max_packet != 0
                && slot.stream.tx.last_xfer_bytes % max_packet == 0
            {
                slot.stream.tx.last_xfer_bytes = 0;
                slot.stream.tx.xfer_in_flight = true;
                self.bus.submit_bulk_out(device_address, ep, &[])?;
            }
            return Ok(0);
        }

        let n = available.min(max_packet.max(1));
        let mut tmp = [0u8; crate::stream::RING_CAPACITY];
        let n = n.min(tmp.len());
        slot.stream.tx.ring.peek(&mut tmp[..n]);
        slot.stream.tx.ring.discard(n);
        slot.stream.tx.xfer_in_flight = true;

        self.bus.submit_bulk_out(device_address, ep, &tmp[..n])?;
        Ok(n)
    }

    pub fn read(&mut self, idx: usize, dst: &mut [u8]) -> Result<usize> {
        let slot = self.table.get_mut(idx).ok_or(Error::InvalidIndex)?;
        Ok(slot.stream.rx.ring.read(dst))
    }

    pub fn read_available(&self, idx: usize) -> Result<usize> {
        Ok(self.table.get(idx).ok_or(Error::InvalidIndex)?.stream.rx.ring.available())
    }

    pub fn peek(&self, idx: usize, dst: &mut [u8]) -> Result<usize> {
        Ok(self.table.get(idx).ok_or(Error::InvalidIndex)?.stream.rx.ring.peek(dst))
    }

    pub fn read_clear(&mut self, idx: usize) -> Result<()> {
        let slot = self.table.get_mut(idx).ok_or(Error::InvalidIndex)?;
        slot.stream.rx.ring.clear();
        Ok(())
    }

    fn read_xfer(&mut self, idx: usize) -> Result<()> {
        let slot = self.table.get_mut(idx).ok_or(Error::InvalidIndex)?;
        if !slot.stream.rx.armed || slot.stream.rx.xfer_in_flight {
            return Ok(());
        }
        let device_address = slot.device_address;
        let ep = slot.stream.rx.ep_addr;
        let max_len = slot.stream.rx.max_packet_size as usize;
        slot.stream.rx.xfer_in_flight = true;
        self.bus.submit_bulk_in(device_address, ep, max_len)
    }

    /// Issues ACM SET_CONTROL_LINE_STATE / FTDI MODEM_CTRL / CP210x SET_MHS
    /// depending on the interface's protocol; `Error::Unsupported` for a
    /// protocol with no such request wired (none presently — kept for
    /// forward compatibility with a protocol that has no line-state request).
    pub fn set_control_line_state(
        &mut self,
        idx: usize,
        line_state: u8,
        cb: Option<CompletionCb>,
        user_data: u32,
    ) -> Result<()> {
        let slot = self.table.get(idx).ok_or(Error::InvalidIndex)?;
        let device_address = slot.device_address;
        let interface_number = slot.interface_number;
        let tag = ControlTag::User { cb, user_data };

        let setup = match slot.serial_protocol {
            protocol::SerialProtocol::Acm => protocol::acm::set_control_line_state(interface_number, line_state),
            protocol::SerialProtocol::Ftdi => protocol::ftdi::modem_ctrl(line_state),
            protocol::SerialProtocol::Cp210x => protocol::cp210x::set_mhs(interface_number, line_state),
        };
        control::submit_no_data(&mut self.bus, device_address, setup, tag)
    }

    /// Issues ACM SET_LINE_CODING or, for FTDI, the equivalent SET_BAUD_RATE
    /// request. `Error::Unsupported` only for CP210x, which has no
    /// analogous on-the-fly line-coding request (§7).
    pub fn set_line_coding(
        &mut self,
        idx: usize,
        coding: LineCoding,
        cb: Option<CompletionCb>,
        user_data: u32,
    ) -> Result<()> {
        let slot = self.table.get(idx).ok_or(Error::InvalidIndex)?;
        let device_address = slot.device_address;
        let interface_number = slot.interface_number;
        let tag = ControlTag::User { cb, user_data };

        match slot.serial_protocol {
            protocol::SerialProtocol::Acm => {
                let setup = protocol::acm::set_line_coding(interface_number);
                control::submit_with_payload(&mut self.bus, device_address, setup, tag, &coding.to_bytes())
            }
            protocol::SerialProtocol::Ftdi => {
                // The wire divisor for an arbitrary baud rate is left
                // unspecified (§9); this routes through the same
                // hardcoded-divisor request enumeration itself uses.
                let setup = protocol::ftdi::set_baud_rate(protocol::ftdi::BAUD_DIVISOR_9600);
                control::submit_no_data(&mut self.bus, device_address, setup, tag)
            }
            protocol::SerialProtocol::Cp210x => Err(Error::Unsupported),
        }
    }
}

/// A tiny fixed-capacity index list, used only by [`CdcHost::close`] to
/// collect owned slot indices before mutating the table (borrowing
/// `slots_owned_by`'s iterator and `get_mut` at the same time is not
/// possible). No allocator is assumed, so this is a const-generic array
/// rather than a `Vec`.
mod heapless_idx_list {
    pub struct IdxList<const N: usize> {
        buf: [usize; N],
        len: usize,
    }

    impl<const N: usize> FromIterator<usize> for IdxList<N> {
        fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
            let mut buf = [0usize; N];
            let mut len = 0;
            for idx in iter {
                if len < N {
                    buf[len] = idx;
                    len += 1;
                }
            }
            IdxList { buf, len }
        }
    }

    impl<const N: usize> IdxList<N> {
        pub fn iter(&self) -> core::slice::Iter<'_, usize> {
            self.buf[..self.len].iter()
        }
    }
}

//! The interface table: a flat, fixed-capacity pool of interface records.
//!
//! Mirrors the teacher kernel's `CDC_ACM_DEVICES`/`HubDevice` pattern of a
//! flat collection scanned linearly on every lookup, but without the
//! teacher's `Spinlock<Vec<_>>` — the spec is explicit that this driver
//! runs single-threaded and cooperatively (§5), so no synchronization
//! primitive is needed, and capacity is fixed at compile time rather than
//! heap-growable, since this crate carries no allocator.

use crate::descriptor::LineCoding;
use crate::protocol::SerialProtocol;
use crate::stream::StreamPair;

/// DTR bit of `line_state`.
pub const LINE_STATE_DTR: u8 = 1 << 0;
/// RTS bit of `line_state`.
pub const LINE_STATE_RTS: u8 = 1 << 1;

/// A single CDC interface's state. `device_address == 0` means the slot is
/// free (invariant §3.1); every other field is meaningless until then.
#[derive(Clone, Copy)]
pub struct Slot {
    pub device_address: u8,
    pub interface_number: u8,
    pub sub_class: u8,
    pub protocol: u8,
    pub serial_protocol: SerialProtocol,
    pub acm_capability: crate::descriptor::AcmCapability,
    pub notif_endpoint: u8,
    pub line_coding: LineCoding,
    pub line_state: u8,
    pub stream: StreamPair,
}

impl Slot {
    const fn free() -> Self {
        Slot {
            device_address: 0,
            interface_number: 0,
            sub_class: 0,
            protocol: 0,
            serial_protocol: SerialProtocol::Acm,
            acm_capability: crate::descriptor::AcmCapability::from_raw(0),
            notif_endpoint: 0,
            line_coding: LineCoding {
                bit_rate: 0,
                stop_bits: 0,
                parity: 0,
                data_bits: 0,
            },
            line_state: 0,
            stream: StreamPair::new(),
        }
    }

    pub fn occupied(&self) -> bool {
        self.device_address != 0
    }

    pub fn dtr(&self) -> bool {
        self.line_state & LINE_STATE_DTR != 0
    }

    pub fn rts(&self) -> bool {
        self.line_state & LINE_STATE_RTS != 0
    }
}

/// Sentinel index for "not found", matching the distilled spec's
/// `lookup_by_itf`/`lookup_by_endpoint` sentinel convention.
pub const INVALID: usize = usize::MAX;

/// Fixed-capacity table of `N` interface slots.
pub struct Table<const N: usize> {
    slots: [Slot; N],
}

impl<const N: usize> Table<N> {
    pub const fn new() -> Self {
        Table {
            slots: [Slot::free(); N],
        }
    }

    /// Process-wide reset: frees every slot. Does not touch stream contents
    /// beyond what `Slot::free()` already specifies.
    pub fn init(&mut self) {
        for s in &mut self.slots {
            *s = Slot::free();
        }
    }

    pub fn get(&self, idx: usize) -> Option<&Slot> {
        self.slots.get(idx).filter(|s| s.occupied())
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Slot> {
        self.slots.get_mut(idx).filter(|s| s.occupied())
    }

    /// First free slot, stamped with identity fields and zeroed line state.
    /// Returns `None` if every slot is occupied (`Error::ResourceExhausted`
    /// at the call site).
    pub fn allocate(
        &mut self,
        device_address: u8,
        interface_number: u8,
        sub_class: u8,
        protocol: u8,
        serial_protocol: SerialProtocol,
    ) -> Option<usize> {
        let idx = self.slots.iter().position(|s| !s.occupied())?;
        self.slots[idx] = Slot::free();
        let s = &mut self.slots[idx];
        s.device_address = device_address;
        s.interface_number = interface_number;
        s.sub_class = sub_class;
        s.protocol = protocol;
        s.serial_protocol = serial_protocol;
        Some(idx)
    }

    /// Frees a slot unconditionally (used by the failure-cleanup scope
    /// guard and by `close`).
    pub fn free(&mut self, idx: usize) {
        if let Some(s) = self.slots.get_mut(idx) {
            s.device_address = 0;
            s.interface_number = 0;
        }
    }

    pub fn lookup_by_itf(&self, device_address: u8, interface_number: u8) -> usize {
        self.slots
            .iter()
            .position(|s| {
                s.occupied()
                    && s.device_address == device_address
                    && s.interface_number == interface_number
            })
            .unwrap_or(INVALID)
    }

    pub fn lookup_by_endpoint(&self, device_address: u8, endpoint_address: u8) -> usize {
        self.slots
            .iter()
            .position(|s| {
                s.occupied()
                    && s.device_address == device_address
                    && (s.notif_endpoint == endpoint_address
                        || s.stream.tx.ep_addr == endpoint_address
                        || s.stream.rx.ep_addr == endpoint_address)
            })
            .unwrap_or(INVALID)
    }

    /// Every slot index owned by `device_address`, in table order.
    pub fn slots_owned_by(&self, device_address: u8) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.occupied() && s.device_address == device_address)
            .map(|(i, _)| i)
    }
}

/// RAII guard over a freshly allocated slot: frees it on drop unless
/// [`disarm`](SlotGuard::disarm) is called. Closes the distilled spec's
/// §9 open question ("failure cleanup in open") by construction — a
/// protocol opener that returns early via `?` before finishing leaves no
/// allocated slot behind.
pub struct SlotGuard<'a, const N: usize> {
    table: &'a mut Table<N>,
    idx: usize,
    armed: bool,
}

impl<'a, const N: usize> SlotGuard<'a, N> {
    pub fn new(table: &'a mut Table<N>, idx: usize) -> Self {
        SlotGuard {
            table,
            idx,
            armed: true,
        }
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn slot_mut(&mut self) -> &mut Slot {
        self.table.get_mut(self.idx).expect("guarded slot vanished")
    }

    /// Call once the open has fully succeeded; the slot survives the guard.
    pub fn disarm(mut self) -> usize {
        self.armed = false;
        self.idx
    }
}

impl<'a, const N: usize> Drop for SlotGuard<'a, N> {
    fn drop(&mut self) {
        if self.armed {
            self.table.free(self.idx);
        }
    }
}

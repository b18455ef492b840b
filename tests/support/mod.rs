//! In-memory fake host controller backing the integration test suite.
//!
//! Mirrors the "scripted fake peripheral, assert on observed side effects"
//! style the teacher's HAL registry tests use for hardware-facing code that
//! can't be driven by real hardware in CI: every submission is recorded so a
//! test can assert on the exact sequence and payload bytes, and completions
//! are driven forward explicitly by the test rather than by a real IRQ pump.

use cdc_host::{ControlCompletion, ControlTag, ControlXfer, EndpointDescriptor, HostBus, Result, SetupPacket};

#[derive(Clone)]
pub struct ControlLogEntry {
    pub device_address: u8,
    pub setup: SetupPacket,
    pub tag: ControlTag,
    /// Snapshot of the enumeration buffer's first `setup.w_length` bytes at
    /// the moment of submission (empty for no-data/IN transfers).
    pub payload: Vec<u8>,
}

#[derive(Clone)]
pub struct BulkOutEntry {
    pub device_address: u8,
    pub ep_addr: u8,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct BulkInEntry {
    pub device_address: u8,
    pub ep_addr: u8,
    pub max_len: usize,
}

pub struct FakeBus {
    pub control_log: Vec<ControlLogEntry>,
    pub bulk_out_log: Vec<BulkOutEntry>,
    pub bulk_in_log: Vec<BulkInEntry>,
    pub set_config_complete_log: Vec<(u8, u8)>,
    enum_buf: [u8; 16],
    vid_pid_table: Vec<(u8, u16, u16)>,
    rx_scripted: Vec<((u8, u8), Vec<u8>)>,
}

impl FakeBus {
    pub fn new() -> Self {
        FakeBus {
            control_log: Vec::new(),
            bulk_out_log: Vec::new(),
            bulk_in_log: Vec::new(),
            set_config_complete_log: Vec::new(),
            enum_buf: [0; 16],
            vid_pid_table: Vec::new(),
            rx_scripted: Vec::new(),
        }
    }

    pub fn set_vid_pid(&mut self, device_address: u8, vid: u16, pid: u16) {
        self.vid_pid_table.push((device_address, vid, pid));
    }

    /// Scripts the bytes `xfer_cb` will see as `received_data` for the next
    /// RX completion on `(device_address, ep_addr)`.
    pub fn script_rx(&mut self, device_address: u8, ep_addr: u8, data: &[u8]) {
        self.rx_scripted.push(((device_address, ep_addr), data.to_vec()));
    }
}

impl HostBus for FakeBus {
    fn control_xfer(&mut self, xfer: ControlXfer) -> Result<()> {
        let n = xfer.setup.w_length as usize;
        let payload = if n > 0 {
            self.enum_buf[..n.min(self.enum_buf.len())].to_vec()
        } else {
            Vec::new()
        };
        self.control_log.push(ControlLogEntry {
            device_address: xfer.device_address,
            setup: xfer.setup,
            tag: xfer.tag,
            payload,
        });
        Ok(())
    }

    fn edpt_open(&mut self, _device_address: u8, _ep: &EndpointDescriptor) -> Result<()> {
        Ok(())
    }

    fn vid_pid(&self, device_address: u8) -> Option<(u16, u16)> {
        self.vid_pid_table
            .iter()
            .find(|(addr, _, _)| *addr == device_address)
            .map(|(_, vid, pid)| (*vid, *pid))
    }

    fn enum_buf(&mut self) -> &mut [u8] {
        &mut self.enum_buf
    }

    fn submit_bulk_out(&mut self, device_address: u8, ep_addr: u8, data: &[u8]) -> Result<()> {
        self.bulk_out_log.push(BulkOutEntry {
            device_address,
            ep_addr,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn submit_bulk_in(&mut self, device_address: u8, ep_addr: u8, max_len: usize) -> Result<()> {
        self.bulk_in_log.push(BulkInEntry {
            device_address,
            ep_addr,
            max_len,
        });
        Ok(())
    }

    fn received_data(&self, device_address: u8, ep_addr: u8) -> &[u8] {
        self.rx_scripted
            .iter()
            .rev()
            .find(|((addr, ep), _)| *addr == device_address && *ep == ep_addr)
            .map(|(_, data)| data.as_slice())
            .unwrap_or(&[])
    }

    fn set_config_complete(&mut self, device_address: u8, interface_number: u8) {
        self.set_config_complete_log.push((device_address, interface_number));
    }
}

/// Replays every control-log entry from `start` onward against `host` with
/// `Ok(())`, one step at a time, re-reading the log after each completion
/// since advancing the state machine appends new entries. Stops once no new
/// entry appears (the machine reached a terminal state).
pub fn drive_enumeration_to_completion<const N: usize>(host: &mut cdc_host::CdcHost<FakeBus, N>) {
    let mut next = 0;
    loop {
        let entry = match host.bus().control_log_entry(next) {
            Some(e) => e,
            None => break,
        };
        let completion = ControlCompletion {
            device_address: entry.device_address,
            setup: entry.setup,
            tag: entry.tag,
            result: Ok(()),
            buf: &entry.payload,
        };
        host.control_xfer_complete(completion).expect("completion should be accepted");
        next += 1;
    }
}

impl FakeBus {
    pub fn control_log_entry(&self, i: usize) -> Option<ControlLogEntry> {
        self.control_log.get(i).cloned()
    }
}

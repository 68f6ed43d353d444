//! Simulated hardware for driving the boot path on a host.
//!
//! Every double is a cheap `Clone` probe around shared state, so a test
//! can hand the "hardware" to the boot code and keep its own handle for
//! injecting input and inspecting output.

use std::boxed::Box;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use std::vec::Vec;

use kestrel_netboot::config::ConfigStore;
use kestrel_netboot::device::{PacketDevice, RxError, SerialPort, TxError};
use kestrel_netboot::platform::{HeapRegion, Platform};
use kestrel_netboot::ppp::{PppCodec, PppStatus};

/// Key/value store seeded by the test.
#[derive(Default)]
pub struct SimStore {
    entries: Vec<(String, String)>,
}

impl SimStore {
    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.push((key.to_string(), value.to_string()));
    }
}

impl ConfigStore for SimStore {
    fn read(&self, key: &str, buf: &mut [u8]) -> Option<usize> {
        let (_, value) = self.entries.iter().find(|(k, _)| k == key)?;
        let n = value.len().min(buf.len());
        buf[..n].copy_from_slice(&value.as_bytes()[..n]);
        Some(n)
    }
}

/// Frame-level NIC double; clones share the same queues.
#[derive(Clone, Default)]
pub struct SimNic {
    rx: Arc<Mutex<VecDeque<Vec<u8>>>>,
    tx: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl SimNic {
    /// Present a frame as if the wire delivered it.
    pub fn push_frame(&self, frame: &[u8]) {
        self.rx.lock().unwrap().push_back(frame.to_vec());
    }

    /// Everything the stack transmitted so far.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.tx.lock().unwrap().clone()
    }
}

impl PacketDevice for SimNic {
    fn can_transmit(&self) -> bool {
        true
    }

    fn can_receive(&self) -> bool {
        !self.rx.lock().unwrap().is_empty()
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), TxError> {
        self.tx.lock().unwrap().push(frame.to_vec());
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<Option<usize>, RxError> {
        let mut rx = self.rx.lock().unwrap();
        match rx.pop_front() {
            Some(frame) if frame.len() > buffer.len() => Err(RxError::BufferTooSmall {
                needed: frame.len(),
            }),
            Some(frame) => {
                buffer[..frame.len()].copy_from_slice(&frame);
                Ok(Some(frame.len()))
            }
            None => Ok(None),
        }
    }
}

/// UART double; clones share the same FIFOs.
#[derive(Clone, Default)]
pub struct SimSerial {
    rx: Arc<Mutex<VecDeque<u8>>>,
    tx: Arc<Mutex<Vec<u8>>>,
}

impl SimSerial {
    /// Feed bytes into the receive FIFO, as the far end would.
    pub fn push_rx(&self, bytes: &[u8]) {
        self.rx.lock().unwrap().extend(bytes.iter().copied());
    }

    /// Drain everything written to the port so far.
    pub fn take_tx(&self) -> Vec<u8> {
        std::mem::take(&mut self.tx.lock().unwrap())
    }
}

impl SerialPort for SimSerial {
    fn write_byte(&self, byte: u8) {
        self.tx.lock().unwrap().push(byte);
    }

    fn read_byte(&self) -> Option<u8> {
        self.rx.lock().unwrap().pop_front()
    }
}

/// Host stand-in for the board.
pub struct SimPlatform {
    serial: SimSerial,
    started: Instant,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self {
            serial: SimSerial::default(),
            started: Instant::now(),
        }
    }

    /// Handle onto the same UART the boot path will receive.
    pub fn serial_probe(&self) -> SimSerial {
        self.serial.clone()
    }
}

impl Platform for SimPlatform {
    type Serial = SimSerial;

    fn mask_all_interrupts(&mut self) {}

    fn enable_interrupts(&mut self) {}

    fn init_serial(&mut self) -> SimSerial {
        self.serial.clone()
    }

    fn heap_region(&mut self) -> HeapRegion {
        // Leaked so the donated arena stays valid for the process life;
        // host builds never actually allocate from it.
        let arena = Box::leak(Box::new([0u8; 256 * 1024]));
        HeapRegion::new(arena.as_mut_ptr(), arena.len())
    }

    fn monotonic_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Observable state of a [`ScriptedCodec`].
#[derive(Default)]
pub struct CodecState {
    pub auth_disabled: bool,
    pub default_set: bool,
    pub connects: u32,
    pub closed: bool,
    pub inputs: Vec<u8>,
    pub last_advance: u64,
    pub pending: VecDeque<PppStatus>,
    /// Status batches the engine reports per connect call, front first.
    /// A batch is delivered on the timer tick after its connect.
    pub connect_script: VecDeque<Vec<PppStatus>>,
    armed: Option<Vec<PppStatus>>,
}

/// Shared handle onto a scripted engine's state.
#[derive(Clone, Default)]
pub struct CodecProbe(Arc<Mutex<CodecState>>);

impl CodecProbe {
    /// Script the engine's response to its next connect calls.
    pub fn script_connects(&self, batches: &[&[PppStatus]]) {
        let mut state = self.0.lock().unwrap();
        for batch in batches {
            state.connect_script.push_back(batch.to_vec());
        }
    }

    /// Queue a spontaneous status report.
    pub fn push_status(&self, status: PppStatus) {
        self.0.lock().unwrap().pending.push_back(status);
    }

    pub fn state(&self) -> MutexGuard<'_, CodecState> {
        self.0.lock().unwrap()
    }

    /// Hand this probe to the next [`ScriptedCodec::create`] on this
    /// thread; boot code constructs the codec internally, so the test
    /// parks its handle here first.
    pub fn install(&self) {
        NEXT_PROBE.with(|slot| *slot.borrow_mut() = Some(self.clone()));
    }
}

thread_local! {
    static NEXT_PROBE: RefCell<Option<CodecProbe>> = RefCell::new(None);
}

/// Scripted stand-in for the external point-to-point engine.
pub struct ScriptedCodec {
    output: Box<dyn FnMut(&[u8]) -> usize>,
    probe: CodecProbe,
}

impl ScriptedCodec {
    /// Canned negotiation burst emitted on every connect.
    pub const CONNECT_BURST: &'static [u8] = &[0x7e, 0xff, 0x7d, 0x23, 0x7e];
}

impl PppCodec for ScriptedCodec {
    fn create(output: impl FnMut(&[u8]) -> usize + 'static) -> Self {
        let probe = NEXT_PROBE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_default();
        Self {
            output: Box::new(output),
            probe,
        }
    }

    fn disable_auth(&mut self) {
        self.probe.state().auth_disabled = true;
    }

    fn make_default(&mut self) {
        self.probe.state().default_set = true;
    }

    fn connect(&mut self) {
        (self.output)(Self::CONNECT_BURST);
        let mut state = self.probe.state();
        state.connects += 1;
        state.armed = state.connect_script.pop_front();
    }

    fn close(&mut self) {
        let mut state = self.probe.state();
        state.closed = true;
        state.armed = Some(vec![PppStatus::Closed]);
    }

    fn input(&mut self, byte: u8) {
        self.probe.state().inputs.push(byte);
    }

    fn advance(&mut self, now_ms: u64) {
        let mut state = self.probe.state();
        state.last_advance = now_ms;
        if let Some(batch) = state.armed.take() {
            state.pending.extend(batch);
        }
    }

    fn take_status(&mut self) -> Option<PppStatus> {
        self.probe.state().pending.pop_front()
    }
}

//! Memory-mapped register implementations over UIO device nodes.
//!
//! Register layouts below ARE the hardware contract. Every field offset
//! matches the corresponding IP core's register map; the size guards fail
//! the build if a field is added or reordered.

use std::fs::OpenOptions;
use std::mem::offset_of;
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};
use static_assertions::assert_eq_size;

use crate::channel::FifoChannel;
use crate::counter::TickCounter;
use crate::HalError;

/// One UIO register window is a single page.
const REGISTER_WINDOW: usize = 0x1000;

/// An open, mapped UIO register window with volatile 32-bit access.
pub struct UioMapping {
    map: MmapMut,
    path: PathBuf,
}

impl UioMapping {
    pub fn open(path: &Path) -> Result<Self, HalError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| HalError::ConfigLookup {
                path: path.to_path_buf(),
                source,
            })?;
        let map = unsafe { MmapOptions::new().len(REGISTER_WINDOW).map_mut(&file) }
            .map_err(|e| {
                HalError::Initialization(format!("mmap of {} failed: {e}", path.display()))
            })?;
        tracing::debug!(path = %path.display(), "register window mapped");
        Ok(Self {
            map,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read32(&self, offset: usize) -> u32 {
        debug_assert!(offset + 4 <= REGISTER_WINDOW && offset % 4 == 0);
        unsafe { std::ptr::read_volatile(self.map.as_ptr().add(offset) as *const u32) }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        debug_assert!(offset + 4 <= REGISTER_WINDOW && offset % 4 == 0);
        unsafe { std::ptr::write_volatile(self.map.as_mut_ptr().add(offset) as *mut u32, value) }
    }
}

// ── Stream FIFO ───────────────────────────────────────────────────────────────

/// AXI4-Stream FIFO register block.
#[allow(dead_code)]
#[repr(C)]
struct FifoRegisters {
    /// Interrupt status, write-1-to-clear. Doubles as the channel status
    /// word: a freshly reset channel reads 0 here.
    isr: u32,
    /// Interrupt enable. Unused — every wait in this driver is a poll.
    ier: u32,
    /// Transmit reset.
    tdfr: u32,
    /// Transmit vacancy, in words.
    tdfv: u32,
    /// Transmit data, one word per write.
    tdfd: u32,
    /// Transmit length in bytes. Writing it starts the accelerator.
    tlr: u32,
    /// Receive reset.
    rdfr: u32,
    /// Receive occupancy, in words.
    rdfo: u32,
    /// Receive data.
    rdfd: u32,
    /// Receive length in bytes.
    rlr: u32,
}

assert_eq_size!(FifoRegisters, [u8; 40]);

/// Transmit-complete bit in the status word.
const ISR_TX_COMPLETE: u32 = 1 << 27;
/// Receive-complete bit in the status word.
const ISR_RX_COMPLETE: u32 = 1 << 26;

/// The streaming FIFO channel, register-mapped through UIO.
pub struct StreamFifo {
    regs: UioMapping,
}

impl StreamFifo {
    pub fn open(path: &Path) -> Result<Self, HalError> {
        let regs = UioMapping::open(path)?;
        tracing::info!(path = %path.display(), "stream fifo ready");
        Ok(Self { regs })
    }
}

impl FifoChannel for StreamFifo {
    fn reset_and_clear(&mut self) {
        self.regs.write32(offset_of!(FifoRegisters, isr), 0xffff_ffff);
    }

    fn status(&mut self) -> u32 {
        self.regs.read32(offset_of!(FifoRegisters, isr))
    }

    fn tx_vacant(&mut self) -> bool {
        self.regs.read32(offset_of!(FifoRegisters, tdfv)) > 0
    }

    fn tx_push(&mut self, word: u32) {
        self.regs.write32(offset_of!(FifoRegisters, tdfd), word);
    }

    fn tx_commit_length(&mut self, bytes: u32) {
        self.regs.write32(offset_of!(FifoRegisters, tlr), bytes);
    }

    fn tx_done(&mut self) -> bool {
        self.regs.read32(offset_of!(FifoRegisters, isr)) & ISR_TX_COMPLETE != 0
    }

    fn rx_occupied(&mut self) -> bool {
        self.regs.read32(offset_of!(FifoRegisters, rdfo)) > 0
    }

    fn rx_done(&mut self) -> bool {
        self.regs.read32(offset_of!(FifoRegisters, isr)) & ISR_RX_COMPLETE != 0
    }
}

// ── AXI timer ─────────────────────────────────────────────────────────────────

/// AXI timer register block, counter 0 only.
#[allow(dead_code)]
#[repr(C)]
struct TimerRegisters {
    /// Control/status.
    tcsr0: u32,
    /// Load value, latched into the counter by the LOAD bit.
    tlr0: u32,
    /// The free-running count.
    tcr0: u32,
}

assert_eq_size!(TimerRegisters, [u8; 12]);

/// Auto-reload on carry-out.
const TCSR_AUTO_RELOAD: u32 = 1 << 4;
/// Latch TLR0 into TCR0.
const TCSR_LOAD: u32 = 1 << 5;
/// Counter enable.
const TCSR_ENABLE: u32 = 1 << 7;

const SELF_TEST_SENTINEL: u32 = 0x5a5a_5a5a;

/// The free-running AXI timer, register-mapped through UIO.
pub struct AxiTimer {
    regs: UioMapping,
}

impl AxiTimer {
    pub fn open(path: &Path) -> Result<Self, HalError> {
        let regs = UioMapping::open(path)?;
        tracing::info!(path = %path.display(), "axi timer ready");
        Ok(Self { regs })
    }
}

impl TickCounter for AxiTimer {
    /// Latch a sentinel through the load path and read it back through
    /// the counter. A broken or absent counter fails here, before any
    /// measurement is trusted.
    fn self_test(&mut self) -> Result<(), HalError> {
        let saved = self.regs.read32(offset_of!(TimerRegisters, tcsr0));
        self.regs.write32(offset_of!(TimerRegisters, tlr0), SELF_TEST_SENTINEL);
        self.regs.write32(offset_of!(TimerRegisters, tcsr0), TCSR_LOAD);
        let got = self.regs.read32(offset_of!(TimerRegisters, tcr0));
        self.regs.write32(offset_of!(TimerRegisters, tlr0), 0);
        self.regs.write32(offset_of!(TimerRegisters, tcsr0), TCSR_LOAD);
        self.regs
            .write32(offset_of!(TimerRegisters, tcsr0), saved & !TCSR_LOAD);
        if got != SELF_TEST_SENTINEL {
            return Err(HalError::Initialization(format!(
                "timer self-test: counter read {got:#010x}, expected {SELF_TEST_SENTINEL:#010x}"
            )));
        }
        Ok(())
    }

    fn set_auto_reload(&mut self, enabled: bool) {
        let offset = offset_of!(TimerRegisters, tcsr0);
        let tcsr = self.regs.read32(offset);
        let tcsr = if enabled {
            tcsr | TCSR_AUTO_RELOAD
        } else {
            tcsr & !TCSR_AUTO_RELOAD
        };
        self.regs.write32(offset, tcsr);
    }

    fn start(&mut self) {
        let offset = offset_of!(TimerRegisters, tcsr0);
        let tcsr = self.regs.read32(offset);
        self.regs.write32(offset, tcsr | TCSR_ENABLE);
    }

    fn value(&mut self) -> u32 {
        self.regs.read32(offset_of!(TimerRegisters, tcr0))
    }
}

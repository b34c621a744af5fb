//! A simulated debug module which can be used in tests or for dry runs.
//!
//! The model covers what the engines of this crate drive: hart selection and
//! halt/resume through `dmcontrol`/`dmstatus`, register access abstract
//! commands with a configurable busy period, and a system bus with memory
//! regions, some of which may be read-only.

use std::collections::{BTreeMap, HashMap};

use crate::{
    dtm::DmiTransport,
    error::TransportError,
    register::DmiRegister,
    registers::{
        Abstractauto, Abstractcs, Command, Dmcontrol, Dmstatus, Hartinfo, Sbcs, DATA_BASE,
        DATA_COUNT, HALTSUM_ADDRESSES, PROGBUF_BASE, PROGBUF_COUNT, SBADDRESS_BASE,
        SBADDRESS_COUNT, SBDATA_BASE, SBDATA_COUNT,
    },
};

const DATA_FIRST: u64 = DATA_BASE;
const DATA_LAST: u64 = DATA_BASE + DATA_COUNT as u64 - 1;
const DMCONTROL: u64 = Dmcontrol::ADDRESS;
const DMSTATUS: u64 = Dmstatus::ADDRESS;
const HARTINFO: u64 = Hartinfo::ADDRESS;
const HALTSUM0: u64 = HALTSUM_ADDRESSES[0];
const ABSTRACTCS: u64 = Abstractcs::ADDRESS;
const COMMAND: u64 = Command::ADDRESS;
const ABSTRACTAUTO: u64 = Abstractauto::ADDRESS;
const PROGBUF_FIRST: u64 = PROGBUF_BASE;
const PROGBUF_LAST: u64 = PROGBUF_BASE + PROGBUF_COUNT as u64 - 1;
const SBCS: u64 = Sbcs::ADDRESS;
const SBADDRESS0: u64 = SBADDRESS_BASE;
const SBADDRESS1: u64 = SBADDRESS_BASE + 1;
const SBADDRESS_LAST: u64 = SBADDRESS_BASE + SBADDRESS_COUNT as u64 - 1;
const SBDATA0: u64 = SBDATA_BASE;
const SBDATA1: u64 = SBDATA_BASE + 1;
const SBDATA_LAST: u64 = SBDATA_BASE + SBDATA_COUNT as u64 - 1;

const PROGBUFSIZE: u32 = 2;
const DATACOUNT: u32 = 2;
const NSCRATCH: u32 = 2;

const CMDERR_BUSY: u32 = 1;
const CMDERR_NOT_SUPPORTED: u32 = 2;
const CMDERR_EXCEPTION: u32 = 3;
const CMDERR_HALT_RESUME: u32 = 4;

const SBERROR_BAD_ADDRESS: u32 = 2;
const SBERROR_ALIGNMENT: u32 = 3;
const SBERROR_BAD_SIZE: u32 = 4;

/// System bus accesses supported by default: 8, 16 and 32 bit.
const SBACCESS_CAPS: u32 = 0b00111;
const SBACCESS_MASK: u32 = 0b11111;

/// State of a single simulated hart.
#[derive(Debug, Clone)]
pub struct MockHart {
    pub gprs: [u32; 32],
    pub fprs: [u32; 32],
    pub csrs: BTreeMap<u16, u32>,
    pub halted: bool,
    pub resumeack: bool,
    halt_countdown: Option<u32>,
}

impl MockHart {
    fn new(index: u32, fpu: bool) -> Self {
        let mut csrs = BTreeMap::from([
            // mstatus
            (0x300, 0x0000_1800),
            // misa, RV32IMAC
            (0x301, 0x4000_1105),
            (0x305, 0x0000_0000),
            (0x340, 0x0000_0000),
            (0x341, 0x0000_0000),
            (0x342, 0x0000_0000),
            // dcsr, external debug version 4, machine mode
            (0x7b0, 0x4000_0003),
            (0x7b1, 0x0000_0000),
            (0x7b2, 0x0000_0000),
            (0x7b3, 0x0000_0000),
            (0xf11, 0x0000_0602),
            (0xf12, 0x0000_0004),
            (0xf13, 0x0000_0000),
            (0xf14, index),
        ]);

        if fpu {
            csrs.extend([(0x001, 0), (0x002, 0), (0x003, 0)]);
            csrs.insert(0x301, 0x4000_1125);
        }

        Self {
            gprs: [0; 32],
            fprs: [0; 32],
            csrs,
            halted: false,
            resumeack: false,
            halt_countdown: None,
        }
    }
}

/// A block of simulated memory on the system bus.
#[derive(Debug, Clone)]
pub struct MemoryRegion {
    pub base: u64,
    pub data: Vec<u8>,
    pub writable: bool,
}

impl MemoryRegion {
    fn contains(&self, address: u64, len: usize) -> bool {
        address >= self.base && address + len as u64 <= self.base + self.data.len() as u64
    }
}

#[derive(Debug, Clone, Copy)]
enum BusDirection {
    Read,
    Write,
}

/// Mock of a debug module behind a DTM.
///
/// Like real hardware, a write returns the value the register held before
/// the write.
#[derive(Debug)]
pub struct MockDebugModule {
    harts: Vec<MockHart>,
    regions: Vec<MemoryRegion>,

    version: u8,
    hartsellen: u32,
    fpu: bool,
    halt_on_request: bool,
    resume_on_request: bool,
    halt_latency: u32,
    command_busy_polls: u32,
    sb_busy_polls: u32,
    sbasize: u32,
    sbaccess_caps: u32,
    failing_after: Option<usize>,

    dmactive: bool,
    ndmreset: bool,
    hartsel: u32,

    data: [u32; DATA_COUNT],
    progbuf: [u32; PROGBUF_COUNT],
    abstractauto: u32,
    cmderr: u32,
    command_busy: u32,
    abstractcs_polls: u32,
    commands: usize,

    sbreadonaddr: bool,
    sbaccess: u32,
    sbautoincrement: bool,
    sbreadondata: bool,
    sberror: u32,
    sbbusyerror: bool,
    sb_busy: u32,
    sbaddress: [u32; SBADDRESS_COUNT],
    sbdata: [u32; SBDATA_COUNT],

    reads: HashMap<u64, usize>,
    writes: HashMap<u64, usize>,
    operations: usize,
    dtm_resets: usize,
}

impl Default for MockDebugModule {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDebugModule {
    /// A debug module with a single running hart, no FPU and no memory.
    pub fn new() -> Self {
        Self {
            harts: vec![MockHart::new(0, false)],
            regions: Vec::new(),
            version: 2,
            hartsellen: 4,
            fpu: false,
            halt_on_request: true,
            resume_on_request: true,
            halt_latency: 0,
            command_busy_polls: 0,
            sb_busy_polls: 0,
            sbasize: 32,
            sbaccess_caps: SBACCESS_CAPS,
            failing_after: None,
            dmactive: false,
            ndmreset: false,
            hartsel: 0,
            data: [0; DATA_COUNT],
            progbuf: [0; PROGBUF_COUNT],
            abstractauto: 0,
            cmderr: 0,
            command_busy: 0,
            abstractcs_polls: 0,
            commands: 0,
            sbreadonaddr: false,
            sbaccess: 2,
            sbautoincrement: false,
            sbreadondata: false,
            sberror: 0,
            sbbusyerror: false,
            sb_busy: 0,
            sbaddress: [0; SBADDRESS_COUNT],
            sbdata: [0; SBDATA_COUNT],
            reads: HashMap::new(),
            writes: HashMap::new(),
            operations: 0,
            dtm_resets: 0,
        }
    }

    pub fn with_harts(mut self, count: u32) -> Self {
        self.harts = (0..count)
            .map(|index| MockHart::new(index, self.fpu))
            .collect();
        self
    }

    pub fn with_fpu(mut self) -> Self {
        self.fpu = true;
        let count = self.harts.len() as u32;
        self.with_harts(count)
    }

    /// Start with every hart halted.
    pub fn with_halted_harts(mut self) -> Self {
        for hart in &mut self.harts {
            hart.halted = true;
        }
        self
    }

    /// Harts ignore halt requests.
    pub fn never_halting(mut self) -> Self {
        self.halt_on_request = false;
        self
    }

    /// Harts ignore resume requests.
    pub fn never_resuming(mut self) -> Self {
        self.resume_on_request = false;
        self
    }

    /// Number of `dmstatus` reads after a halt request that still report the hart running.
    pub fn with_halt_latency(mut self, polls: u32) -> Self {
        self.halt_latency = polls;
        self
    }

    /// Number of `abstractcs` reads reporting busy after each command.
    pub fn with_command_busy_polls(mut self, polls: u32) -> Self {
        self.command_busy_polls = polls;
        self
    }

    /// Number of `sbcs` reads reporting busy after each bus access.
    pub fn with_system_bus_busy_polls(mut self, polls: u32) -> Self {
        self.sb_busy_polls = polls;
        self
    }

    pub fn with_memory(mut self, base: u64, data: Vec<u8>) -> Self {
        self.regions.push(MemoryRegion {
            base,
            data,
            writable: true,
        });
        self
    }

    pub fn with_read_only_memory(mut self, base: u64, data: Vec<u8>) -> Self {
        self.regions.push(MemoryRegion {
            base,
            data,
            writable: false,
        });
        self
    }

    /// Supported access widths, in the bit order of `sbaccess8` to `sbaccess128`.
    pub fn with_access_widths(mut self, mask: u32) -> Self {
        self.sbaccess_caps = mask & SBACCESS_MASK;
        self
    }

    /// Width of system bus addresses in bits.
    pub fn with_sbasize(mut self, bits: u32) -> Self {
        self.sbasize = bits.min(0x7f);
        self
    }

    pub fn without_system_bus(mut self) -> Self {
        self.sbasize = 0;
        self
    }

    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Number of implemented `hartsel` bits.
    pub fn with_hartsellen(mut self, bits: u32) -> Self {
        self.hartsellen = bits.min(20);
        self
    }

    /// Fail every DMI access after the first `operations` ones.
    pub fn failing_after(mut self, operations: usize) -> Self {
        self.failing_after = Some(operations);
        self
    }

    pub fn hart(&self, index: usize) -> Option<&MockHart> {
        self.harts.get(index)
    }

    pub fn hart_mut(&mut self, index: usize) -> Option<&mut MockHart> {
        self.harts.get_mut(index)
    }

    /// Contents of the memory region starting at `base`.
    pub fn memory(&self, base: u64) -> Option<&[u8]> {
        self.regions
            .iter()
            .find(|region| region.base == base)
            .map(|region| region.data.as_slice())
    }

    pub fn selected_hart(&self) -> u32 {
        self.hartsel
    }

    pub fn dmactive(&self) -> bool {
        self.dmactive
    }

    pub fn cmderr(&self) -> u32 {
        self.cmderr
    }

    /// Force a sticky `cmderr`, as left behind by an earlier failed command.
    pub fn set_cmderr(&mut self, cmderr: u32) {
        self.cmderr = cmderr & 0x7;
    }

    pub fn sberror(&self) -> u32 {
        self.sberror
    }

    pub fn set_sberror(&mut self, sberror: u32) {
        self.sberror = sberror & 0x7;
    }

    pub fn sbbusyerror(&self) -> bool {
        self.sbbusyerror
    }

    pub fn set_sbbusyerror(&mut self) {
        self.sbbusyerror = true;
    }

    /// Reads of `abstractcs` since the last accepted command.
    pub fn abstractcs_polls(&self) -> u32 {
        self.abstractcs_polls
    }

    /// Number of accepted abstract commands.
    pub fn commands_executed(&self) -> usize {
        self.commands
    }

    pub fn reads_of(&self, address: u64) -> usize {
        self.reads.get(&address).copied().unwrap_or_default()
    }

    pub fn writes_to(&self, address: u64) -> usize {
        self.writes.get(&address).copied().unwrap_or_default()
    }

    pub fn dtm_resets(&self) -> usize {
        self.dtm_resets
    }

    fn account(&mut self, address: u64) -> Result<(), TransportError> {
        self.operations += 1;

        match self.failing_after {
            Some(limit) if self.operations > limit => {
                Err(TransportError::DmiOperationFailed { address })
            }
            _ => Ok(()),
        }
    }

    /// Value of a register as seen by a read, without side effects.
    fn peek(&self, address: u64) -> u32 {
        match address {
            DATA_FIRST..=DATA_LAST => self.data[(address - DATA_FIRST) as usize],
            DMCONTROL => self.dmcontrol(),
            DMSTATUS => self.dmstatus(),
            HARTINFO => NSCRATCH << 20,
            HALTSUM0 => self
                .harts
                .iter()
                .take(32)
                .enumerate()
                .filter(|(_, hart)| hart.halted)
                .fold(0, |summary, (index, _)| summary | (1 << index)),
            ABSTRACTCS => self.abstractcs(),
            ABSTRACTAUTO => self.abstractauto,
            PROGBUF_FIRST..=PROGBUF_LAST => self.progbuf[(address - PROGBUF_FIRST) as usize],
            SBCS => self.sbcs(),
            SBADDRESS0..=SBADDRESS_LAST => self.sbaddress[(address - SBADDRESS0) as usize],
            SBDATA0..=SBDATA_LAST => self.sbdata[(address - SBDATA0) as usize],
            _ => 0,
        }
    }

    fn dmcontrol(&self) -> u32 {
        ((self.hartsel & 0x3ff) << 16)
            | (((self.hartsel >> 10) & 0x3ff) << 6)
            | (u32::from(self.ndmreset) << 1)
            | u32::from(self.dmactive)
    }

    fn dmstatus(&self) -> u32 {
        // authenticated
        let mut value = (1 << 7) | (u32::from(self.version) & 0xf);

        match self.harts.get(self.hartsel as usize) {
            None => value |= (1 << 15) | (1 << 14),
            Some(hart) => {
                if hart.halted {
                    value |= (1 << 9) | (1 << 8);
                } else {
                    value |= (1 << 11) | (1 << 10);
                }

                if hart.resumeack {
                    value |= (1 << 17) | (1 << 16);
                }
            }
        }

        value
    }

    fn abstractcs(&self) -> u32 {
        (PROGBUFSIZE << 24)
            | (u32::from(self.command_busy > 0) << 12)
            | (self.cmderr << 8)
            | DATACOUNT
    }

    fn sbcs(&self) -> u32 {
        let caps = match self.sbasize {
            0 => 0,
            _ => self.sbaccess_caps,
        };

        (1 << 29)
            | (u32::from(self.sbbusyerror) << 22)
            | (u32::from(self.sb_busy > 0) << 21)
            | (u32::from(self.sbreadonaddr) << 20)
            | (self.sbaccess << 17)
            | (u32::from(self.sbautoincrement) << 16)
            | (u32::from(self.sbreadondata) << 15)
            | (self.sberror << 12)
            | (self.sbasize << 5)
            | caps
    }

    fn advance_halt(&mut self) {
        if let Some(hart) = self.harts.get_mut(self.hartsel as usize) {
            match hart.halt_countdown {
                Some(0) => {
                    hart.halted = true;
                    hart.halt_countdown = None;
                }
                Some(remaining) => hart.halt_countdown = Some(remaining - 1),
                None => {}
            }
        }
    }

    fn command_collision(&mut self) -> bool {
        if self.command_busy > 0 {
            if self.cmderr == 0 {
                self.cmderr = CMDERR_BUSY;
            }
            true
        } else {
            false
        }
    }

    fn write_dmcontrol(&mut self, value: u32) {
        self.dmactive = value & 1 != 0;
        self.ndmreset = value & (1 << 1) != 0;

        let requested = (((value >> 6) & 0x3ff) << 10) | ((value >> 16) & 0x3ff);
        self.hartsel = requested & ((1 << self.hartsellen) - 1);

        let haltreq = value & (1 << 31) != 0;
        let resumereq = value & (1 << 30) != 0;

        let Some(hart) = self.harts.get_mut(self.hartsel as usize) else {
            return;
        };

        if haltreq {
            if self.halt_on_request && !hart.halted && hart.halt_countdown.is_none() {
                hart.halt_countdown = Some(self.halt_latency);
            }
        } else if resumereq {
            hart.resumeack = false;
            if self.resume_on_request {
                hart.halted = false;
                hart.resumeack = true;
            }
        }
    }

    fn write_command(&mut self, command: u32) {
        if self.command_collision() || self.cmderr != 0 {
            return;
        }

        self.commands += 1;
        self.abstractcs_polls = 0;
        self.cmderr = self.execute(command);
        self.command_busy = self.command_busy_polls;
    }

    /// Execute an access register command, returning the resulting `cmderr`.
    fn execute(&mut self, command: u32) -> u32 {
        let cmdtype = command >> 24;
        let aarsize = (command >> 20) & 0x7;
        let postexec = command & (1 << 18) != 0;
        let transfer = command & (1 << 17) != 0;
        let write = command & (1 << 16) != 0;
        let regno = command & 0xffff;

        // Only register access is simulated, without the program buffer.
        if cmdtype != 0 || postexec {
            return CMDERR_NOT_SUPPORTED;
        }

        if !transfer {
            return 0;
        }

        if aarsize != 2 {
            return CMDERR_NOT_SUPPORTED;
        }

        let data0 = self.data[0];
        let fpu = self.fpu;

        let Some(hart) = self.harts.get_mut(self.hartsel as usize) else {
            return CMDERR_HALT_RESUME;
        };

        if !hart.halted {
            return CMDERR_HALT_RESUME;
        }

        let target = match regno {
            0x0000..=0x0fff => match hart.csrs.get_mut(&(regno as u16)) {
                Some(value) => value,
                None => return CMDERR_EXCEPTION,
            },
            0x1000..=0x101f => &mut hart.gprs[(regno - 0x1000) as usize],
            0x1020..=0x103f if fpu => &mut hart.fprs[(regno - 0x1020) as usize],
            _ => return CMDERR_NOT_SUPPORTED,
        };

        if write {
            // x0 is hardwired to zero
            if regno != 0x1000 {
                *target = data0;
            }
        } else {
            self.data[0] = *target;
        }

        0
    }

    fn write_sbcs(&mut self, value: u32) {
        if value & (1 << 22) != 0 {
            self.sbbusyerror = false;
        }
        self.sberror &= !((value >> 12) & 0x7);

        self.sbreadonaddr = value & (1 << 20) != 0;
        self.sbaccess = (value >> 17) & 0x7;
        self.sbautoincrement = value & (1 << 16) != 0;
        self.sbreadondata = value & (1 << 15) != 0;
    }

    fn bus_collision(&mut self) -> bool {
        if self.sb_busy > 0 {
            self.sbbusyerror = true;
            true
        } else {
            false
        }
    }

    fn bus_access(&mut self, direction: BusDirection) {
        if self.bus_collision() || self.sberror != 0 || self.sbbusyerror {
            return;
        }

        self.sb_busy = self.sb_busy_polls;

        if self.sbasize == 0
            || self.sbaccess > 4
            || self.sbaccess_caps & (1 << self.sbaccess) == 0
        {
            self.sberror = SBERROR_BAD_SIZE;
            return;
        }

        let bytes = 1usize << self.sbaccess;
        let words = bytes.div_ceil(4);
        let address = (u64::from(self.sbaddress[1]) << 32) | u64::from(self.sbaddress[0]);

        if address % bytes as u64 != 0 {
            self.sberror = SBERROR_ALIGNMENT;
            return;
        }

        let Some(region) = self
            .regions
            .iter_mut()
            .find(|region| region.contains(address, bytes))
        else {
            self.sberror = SBERROR_BAD_ADDRESS;
            return;
        };

        let offset = (address - region.base) as usize;
        let memory = &mut region.data[offset..offset + bytes];

        match direction {
            BusDirection::Read => {
                let mut unit = [0u8; 16];
                unit[..bytes].copy_from_slice(memory);
                for (word, chunk) in self.sbdata[..words].iter_mut().zip(unit.chunks_exact(4)) {
                    *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                }
            }
            BusDirection::Write => {
                if !region.writable {
                    self.sberror = SBERROR_BAD_ADDRESS;
                    return;
                }
                let mut unit = [0u8; 16];
                for (word, chunk) in self.sbdata[..words].iter().zip(unit.chunks_exact_mut(4)) {
                    chunk.copy_from_slice(&word.to_le_bytes());
                }
                memory.copy_from_slice(&unit[..bytes]);
            }
        }

        if self.sbautoincrement {
            let next = address + bytes as u64;
            self.sbaddress[0] = next as u32;
            self.sbaddress[1] = (next >> 32) as u32;
        }
    }
}

impl DmiTransport for MockDebugModule {
    fn dmi_read(&mut self, address: u64) -> Result<u32, TransportError> {
        self.account(address)?;
        *self.reads.entry(address).or_default() += 1;

        let value = match address {
            DMSTATUS => {
                self.advance_halt();
                self.dmstatus()
            }
            ABSTRACTCS => {
                let value = self.abstractcs();
                self.command_busy = self.command_busy.saturating_sub(1);
                self.abstractcs_polls += 1;
                value
            }
            DATA_FIRST..=DATA_LAST | PROGBUF_FIRST..=PROGBUF_LAST => {
                self.command_collision();
                self.peek(address)
            }
            SBCS => {
                let value = self.sbcs();
                self.sb_busy = self.sb_busy.saturating_sub(1);
                value
            }
            SBDATA0 => {
                let value = self.sbdata[0];
                if !self.bus_collision() && self.sbreadondata {
                    self.bus_access(BusDirection::Read);
                }
                value
            }
            SBDATA1..=SBDATA_LAST => {
                self.bus_collision();
                self.peek(address)
            }
            _ => self.peek(address),
        };

        Ok(value)
    }

    fn dmi_write(&mut self, address: u64, value: u32) -> Result<u32, TransportError> {
        self.account(address)?;
        *self.writes.entry(address).or_default() += 1;

        let previous = self.peek(address);

        match address {
            DATA_FIRST..=DATA_LAST => {
                if !self.command_collision() {
                    self.data[(address - DATA_FIRST) as usize] = value;
                }
            }
            DMCONTROL => self.write_dmcontrol(value),
            ABSTRACTCS => {
                if !self.command_collision() {
                    self.cmderr &= !((value >> 8) & 0x7);
                }
            }
            COMMAND => self.write_command(value),
            ABSTRACTAUTO => self.abstractauto = value,
            PROGBUF_FIRST..=PROGBUF_LAST => {
                if !self.command_collision() {
                    self.progbuf[(address - PROGBUF_FIRST) as usize] = value;
                }
            }
            SBCS => self.write_sbcs(value),
            SBADDRESS0 => {
                if !self.bus_collision() {
                    self.sbaddress[0] = value;
                    if self.sbreadonaddr {
                        self.bus_access(BusDirection::Read);
                    }
                }
            }
            SBADDRESS1..=SBADDRESS_LAST => {
                if !self.bus_collision() {
                    self.sbaddress[(address - SBADDRESS0) as usize] = value;
                }
            }
            SBDATA0 => {
                if !self.bus_collision() {
                    self.sbdata[0] = value;
                    self.bus_access(BusDirection::Write);
                }
            }
            SBDATA1..=SBDATA_LAST => {
                if !self.bus_collision() {
                    self.sbdata[(address - SBDATA0) as usize] = value;
                }
            }
            _ => {}
        }

        Ok(previous)
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.dtm_resets += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::MockDebugModule;
    use crate::dtm::DmiTransport;

    #[test]
    fn write_returns_previous_value() {
        let mut module = MockDebugModule::new();

        assert_eq!(module.dmi_write(0x04, 0x1234).unwrap(), 0);
        assert_eq!(module.dmi_write(0x04, 0x5678).unwrap(), 0x1234);
        assert_eq!(module.dmi_read(0x04).unwrap(), 0x5678);
    }

    #[test]
    fn hartsel_is_limited_to_implemented_bits() {
        let mut module = MockDebugModule::new().with_hartsellen(4);

        module.dmi_write(0x10, 0x03ff_ffc1).unwrap();

        assert_eq!(module.selected_hart(), 0xf);
        assert_eq!(module.dmi_read(0x10).unwrap(), 0x000f_0001);
    }

    #[test]
    fn command_while_busy_reports_busy() {
        let mut module = MockDebugModule::new()
            .with_halted_harts()
            .with_command_busy_polls(3);

        module.dmi_write(0x17, 0x0022_1001).unwrap();
        module.dmi_write(0x17, 0x0022_1001).unwrap();

        assert_eq!(module.cmderr(), 1);
        assert_eq!(module.commands_executed(), 1);
    }

    #[test]
    fn failing_transport() {
        let mut module = MockDebugModule::new().failing_after(1);

        assert!(module.dmi_read(0x11).is_ok());
        assert!(module.dmi_read(0x11).is_err());
    }
}

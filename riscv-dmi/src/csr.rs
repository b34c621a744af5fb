//! Names of the registers reachable through abstract commands.
//!
//! CSR names follow the RISC-V privileged specification, extended with the
//! custom user CSRs of CORE-V cores (hardware loops, `uhartid`, `privlv`).

use std::borrow::Cow;

/// Class of a control and status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsrType {
    /// Floating point CSRs, only present with an FPU.
    FloatingPoint,
    /// Standard user mode counters and timers.
    UserCounter,
    /// Custom user mode CSRs.
    CustomUser,
    /// Machine mode trap setup, trap handling and information CSRs.
    Machine,
    /// Machine mode counters.
    MachineCounter,
    /// Debug trigger CSRs, shared with M-mode.
    Trigger,
    /// Debug mode CSRs.
    Debug,
    Unknown,
}

pub const FFLAGS: u16 = 0x001;
pub const FRM: u16 = 0x002;
pub const FCSR: u16 = 0x003;
pub const MSTATUS: u16 = 0x300;
pub const MISA: u16 = 0x301;
pub const DCSR: u16 = 0x7b0;
pub const DPC: u16 = 0x7b1;
pub const PRIVLV: u16 = 0xc10;
pub const MHARTID: u16 = 0xf14;

static NAMED_CSRS: &[(u16, &str)] = &[
    (FFLAGS, "fflags"),
    (FRM, "frm"),
    (FCSR, "fcsr"),
    (0x014, "uhartid"),
    (MSTATUS, "mstatus"),
    (MISA, "misa"),
    (0x304, "mie"),
    (0x305, "mtvec"),
    (0x320, "mcountinhibit"),
    (0x340, "mscratch"),
    (0x341, "mepc"),
    (0x342, "mcause"),
    (0x343, "mtval"),
    (0x344, "mip"),
    (0x7a0, "tselect"),
    (0x7a1, "tdata1"),
    (0x7a2, "tdata2"),
    (0x7a3, "tdata3"),
    (0x7a4, "tinfo"),
    (0x7a8, "mcontext"),
    (0x7aa, "scontext"),
    (DCSR, "dcsr"),
    (DPC, "dpc"),
    (0x7b2, "dscratch0"),
    (0x7b3, "dscratch1"),
    (0x800, "lpstart0"),
    (0x801, "lpend0"),
    (0x802, "lpcount0"),
    (0x804, "lpstart1"),
    (0x805, "lpend1"),
    (0x806, "lpcount1"),
    (0xb00, "mcycle"),
    (0xb02, "minstret"),
    (0xb80, "mcycleh"),
    (0xb82, "minstreth"),
    (0xc00, "cycle"),
    (0xc01, "time"),
    (0xc02, "instret"),
    // Overlays hpmcounter16 on CORE-V cores.
    (PRIVLV, "privlv"),
    (0xc80, "cycleh"),
    (0xc81, "timeh"),
    (0xc82, "instreth"),
    (0xf11, "mvendorid"),
    (0xf12, "marchid"),
    (0xf13, "mimpid"),
    (MHARTID, "mhartid"),
];

/// Name of the CSR at `address`.
///
/// Unknown addresses are named `csr0x...`, so the result is always printable.
pub fn csr_name(address: u16) -> Cow<'static, str> {
    if let Some((_, name)) = NAMED_CSRS.iter().find(|(csr, _)| *csr == address) {
        return Cow::Borrowed(name);
    }

    match address {
        0x323..=0x33f => Cow::Owned(format!("mhpmevent{}", address - 0x320)),
        0xb03..=0xb1f => Cow::Owned(format!("mhpmcounter{}", address - 0xb00)),
        0xb83..=0xb9f => Cow::Owned(format!("mhpmcounter{}h", address - 0xb80)),
        0xc03..=0xc1f => Cow::Owned(format!("hpmcounter{}", address - 0xc00)),
        0xc83..=0xc9f => Cow::Owned(format!("hpmcounter{}h", address - 0xc80)),
        _ => Cow::Owned(format!("csr{address:#05x}")),
    }
}

pub fn csr_type(address: u16) -> CsrType {
    match address {
        FFLAGS..=FCSR => CsrType::FloatingPoint,
        0x014 | 0x800..=0x802 | 0x804..=0x806 | PRIVLV => CsrType::CustomUser,
        0xc00..=0xc1f | 0xc80..=0xc9f => CsrType::UserCounter,
        0x300..=0x3ff | 0xf11..=0xf15 => CsrType::Machine,
        0xb00..=0xb1f | 0xb80..=0xb9f => CsrType::MachineCounter,
        0x7a0..=0x7af => CsrType::Trigger,
        0x7b0..=0x7bf => CsrType::Debug,
        _ => CsrType::Unknown,
    }
}

/// CSRs with both top address bits set cannot be written.
pub fn csr_is_read_only(address: u16) -> bool {
    (address >> 10) & 0x3 == 0x3
}

static GPR_ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

static FPR_ABI_NAMES: [&str; 32] = [
    "ft0", "ft1", "ft2", "ft3", "ft4", "ft5", "ft6", "ft7", "fs0", "fs1", "fa0", "fa1", "fa2",
    "fa3", "fa4", "fa5", "fa6", "fa7", "fs2", "fs3", "fs4", "fs5", "fs6", "fs7", "fs8", "fs9",
    "fs10", "fs11", "ft8", "ft9", "ft10", "ft11",
];

/// ABI name of general purpose register `x<index>`.
pub fn gpr_abi_name(index: u8) -> Option<&'static str> {
    GPR_ABI_NAMES.get(usize::from(index)).copied()
}

/// ABI name of floating point register `f<index>`.
pub fn fpr_abi_name(index: u8) -> Option<&'static str> {
    FPR_ABI_NAMES.get(usize::from(index)).copied()
}

/// ABI name followed by the architectural name, e.g. `a0 (x10)`.
pub fn gpr_full_name(index: u8) -> String {
    format!("{} (x{index})", gpr_abi_name(index).unwrap_or("(unknown)"))
}

/// ABI name followed by the architectural name, e.g. `fa0 (f10)`.
pub fn fpr_full_name(index: u8) -> String {
    format!("{} (f{index})", fpr_abi_name(index).unwrap_or("(unknown)"))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::{csr_is_read_only, csr_name, csr_type, fpr_abi_name, gpr_abi_name, CsrType};

    #[test_case(0x001, "fflags", CsrType::FloatingPoint)]
    #[test_case(0x003, "fcsr", CsrType::FloatingPoint)]
    #[test_case(0xc00, "cycle", CsrType::UserCounter)]
    #[test_case(0xc03, "hpmcounter3", CsrType::UserCounter)]
    #[test_case(0xc9f, "hpmcounter31h", CsrType::UserCounter)]
    #[test_case(0xc10, "privlv", CsrType::CustomUser)]
    #[test_case(0x806, "lpcount1", CsrType::CustomUser)]
    #[test_case(0x014, "uhartid", CsrType::CustomUser)]
    #[test_case(0x300, "mstatus", CsrType::Machine)]
    #[test_case(0x33f, "mhpmevent31", CsrType::Machine)]
    #[test_case(0xf14, "mhartid", CsrType::Machine)]
    #[test_case(0xb03, "mhpmcounter3", CsrType::MachineCounter)]
    #[test_case(0xb83, "mhpmcounter3h", CsrType::MachineCounter)]
    #[test_case(0x7a1, "tdata1", CsrType::Trigger)]
    #[test_case(0x7b1, "dpc", CsrType::Debug)]
    #[test_case(0x123, "csr0x123", CsrType::Unknown)]
    fn csr_catalogue(address: u16, name: &str, kind: CsrType) {
        assert_eq!(csr_name(address), name);
        assert_eq!(csr_type(address), kind);
    }

    #[test]
    fn read_only_csrs() {
        assert!(csr_is_read_only(0xf14));
        assert!(csr_is_read_only(0xc00));
        assert!(!csr_is_read_only(0x7b0));
    }

    #[test]
    fn abi_names() {
        assert_eq!(gpr_abi_name(0), Some("zero"));
        assert_eq!(gpr_abi_name(13), Some("a3"));
        assert_eq!(gpr_abi_name(31), Some("t6"));
        assert_eq!(gpr_abi_name(32), None);

        assert_eq!(fpr_abi_name(7), Some("ft7"));
        assert_eq!(fpr_abi_name(10), Some("fa0"));
        assert_eq!(fpr_abi_name(32), None);

        assert_eq!(super::gpr_full_name(10), "a0 (x10)");
        assert_eq!(super::fpr_full_name(40), "(unknown) (f40)");
    }
}

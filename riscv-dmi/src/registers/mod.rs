//! The registers of a RISC-V debug module, as defined in section 3.12 of the
//! RISC-V debug specification v0.13.2.

mod bus;
mod command;
mod control;
mod info;

pub use bus::{SbAccessWidth, Sbcs, SBADDRESS_BASE, SBDATA_BASE};
pub use command::{Abstractauto, Abstractcs, Command, DATA_BASE, PROGBUF_BASE};
pub use control::{
    Dmcontrol, Dmstatus, Hartinfo, Hawindow, Hawindowsel, HALTSUM_ADDRESSES, HARTSEL_WIDTH,
};
pub use info::{Authdata, Nextdm, CONFSTRPTR_BASE};

/// Number of `data` registers.
pub const DATA_COUNT: usize = 12;
/// Number of `progbuf` registers.
pub const PROGBUF_COUNT: usize = 16;
/// Number of `haltsum` registers.
pub const HALTSUM_COUNT: usize = 4;
/// Number of `confstrptr` registers.
pub const CONFSTRPTR_COUNT: usize = 4;
/// Number of `sbaddress` registers.
pub const SBADDRESS_COUNT: usize = 3;
/// Number of `sbdata` registers.
pub const SBDATA_COUNT: usize = 4;

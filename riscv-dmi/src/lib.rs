//! # RISC-V Debug Module Interface
//!
//! Typed access to the debug module of a RISC-V target, as defined by the
//! RISC-V External Debug Support specification v0.13.2.
//!
//! The crate is built around the [`Dmi`] struct, which owns a
//! [`DmiTransport`] and a shadow of every debug module register. On top of
//! the registers it provides
//!
//! - hart selection, halt and resume ([`Dmi::select_hart`], [`Dmi::halt_hart`],
//!   [`Dmi::resume_hart`]),
//! - register access through abstract commands ([`Dmi::read_gpr`],
//!   [`Dmi::write_csr`], ...),
//! - memory access through the system bus ([`Dmi::read_mem`], [`Dmi::write_mem`]).
//!
//! Every poll loop is bounded by the [`DmiConfig`] of the `Dmi`. Running out of
//! polls is reported as a timeout, separate from errors reported by the
//! hardware itself.
//!
//! Diagnostics are emitted through [`tracing`]; install a subscriber to see them.

pub mod abstract_command;
pub mod config;
pub mod csr;
mod dmi;
pub mod dtm;
mod error;
mod hart;
pub mod register;
pub mod registers;
mod system_bus;

pub use crate::abstract_command::{AccessRegisterCommand, CommandPhase, RegisterNumber};
pub use crate::config::{DmiConfig, PollPolicy};
pub use crate::csr::{csr_name, csr_type, CsrType};
pub use crate::dmi::Dmi;
pub use crate::dtm::DmiTransport;
pub use crate::error::{
    AbstractCommandErrorKind, DmiError, PollTarget, SystemBusErrorKind, TransportError,
};
pub use crate::register::{DisplayStyle, DmiRegister, Field, FieldUpdate};

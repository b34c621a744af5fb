//! Errors reported by the debug module layer.
//!
//! Hardware reported failures (`cmderr`, `sberror`) are kept apart from
//! failures of the transport itself and from poll bounds running out, so a
//! caller can always tell which of the three went wrong.

use std::fmt;

use thiserror::Error;

/// A failure of a single DMI read or write cycle.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("DMI operation at address {address:#04x} failed")]
    DmiOperationFailed { address: u64 },
    #[error("DMI operation at address {address:#04x} is still in progress")]
    DmiBusy { address: u64 },
    #[error("An error with the debug probe occurred")]
    Probe(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The error type of every fallible operation on a [`Dmi`](crate::Dmi).
#[derive(Debug, Error)]
pub enum DmiError {
    #[error("Error during transport of a DMI access")]
    Transport(#[from] TransportError),
    #[error("Abstract command failed: {0}")]
    AbstractCommand(AbstractCommandErrorKind),
    #[error("System bus access failed after {units_transferred} units: {kind}")]
    SystemBus {
        kind: SystemBusErrorKind,
        units_transferred: usize,
    },
    #[error("System bus was accessed while busy, after {units_transferred} units")]
    SystemBusBusy { units_transferred: usize },
    #[error("Timeout after {polls} polls while waiting for {waiting_for}")]
    Timeout { waiting_for: PollTarget, polls: u32 },
    #[error("System bus still busy after {polls} polls, {units_transferred} units transferred")]
    SystemBusTimeout {
        polls: u32,
        units_transferred: usize,
    },
    #[error("Debug module version {0} is not supported, only version 2 (debug spec 0.13) is")]
    UnsupportedDebugModuleVersion(u8),
    #[error("The system bus supports no access width for {length} bytes at {address:#010x}")]
    NoSystemBusAccess { address: u64, length: usize },
    #[error("Access of {length} bytes at {address:#010x} exceeds the {sbasize} bit system bus")]
    AddressOutOfRange {
        address: u64,
        length: usize,
        sbasize: u32,
    },
    #[error("{kind} register number {index:#x} is out of range")]
    InvalidRegisterNumber { kind: &'static str, index: u32 },
    #[error("Hart {0} does not exist")]
    HartNotFound(u32),
}

/// The condition a bounded poll loop was waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTarget {
    /// `abstractcs.busy` to clear before a new command is issued.
    AbstractCommandIdle,
    /// `abstractcs.busy` to clear after a command was issued.
    AbstractCommandDone,
    /// `dmstatus` to report the hart as halted.
    HartHalted(u32),
    /// `dmstatus` to report the resume acknowledge of the hart.
    HartResumed(u32),
}

impl fmt::Display for PollTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollTarget::AbstractCommandIdle => write!(f, "the abstract command engine to be idle"),
            PollTarget::AbstractCommandDone => write!(f, "the abstract command to complete"),
            PollTarget::HartHalted(hart) => write!(f, "hart {hart} to halt"),
            PollTarget::HartResumed(hart) => write!(f, "hart {hart} to resume"),
        }
    }
}

/// Classification of the `cmderr` field of `abstractcs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbstractCommandErrorKind {
    /// No error.
    None = 0,
    /// An abstract command was executing while `command`, `abstractcs`
    /// or `abstractauto` was written, or `data`/`progbuf` was accessed.
    Busy = 1,
    /// The requested command is not supported.
    NotSupported = 2,
    /// An exception occurred while executing the command.
    Exception = 3,
    /// The command could not be executed because the hart was not in
    /// the required state (running/halted) or unavailable.
    HaltResume = 4,
    /// The command failed because of a bus error.
    Bus = 5,
    /// Reserved encoding.
    Reserved = 6,
    /// The command failed for another reason.
    Other = 7,
}

impl AbstractCommandErrorKind {
    /// Decode the raw 3-bit `cmderr` value. Bits above the field are ignored.
    pub fn parse(value: u32) -> Self {
        match value & 0x7 {
            0 => Self::None,
            1 => Self::Busy,
            2 => Self::NotSupported,
            3 => Self::Exception,
            4 => Self::HaltResume,
            5 => Self::Bus,
            6 => Self::Reserved,
            _ => Self::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Busy => "busy",
            Self::NotSupported => "not supported",
            Self::Exception => "exception",
            Self::HaltResume => "halt/resume",
            Self::Bus => "bus",
            Self::Reserved => "reserved",
            Self::Other => "other",
        }
    }

    pub(crate) fn describe(value: u32) -> &'static str {
        Self::parse(value).name()
    }
}

impl fmt::Display for AbstractCommandErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of the `sberror` field of `sbcs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemBusErrorKind {
    None = 0,
    Timeout = 1,
    BadAddress = 2,
    Alignment = 3,
    BadSize = 4,
    Reserved = 5,
    Other = 7,
}

impl SystemBusErrorKind {
    /// Decode the raw 3-bit `sberror` value. Both reserved encodings (5 and 6)
    /// map to [`SystemBusErrorKind::Reserved`].
    pub fn parse(value: u32) -> Self {
        match value & 0x7 {
            0 => Self::None,
            1 => Self::Timeout,
            2 => Self::BadAddress,
            3 => Self::Alignment,
            4 => Self::BadSize,
            5 | 6 => Self::Reserved,
            _ => Self::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Timeout => "timeout",
            Self::BadAddress => "bad address",
            Self::Alignment => "alignment",
            Self::BadSize => "bad size",
            Self::Reserved => "reserved",
            Self::Other => "other",
        }
    }

    pub(crate) fn describe(value: u32) -> &'static str {
        Self::parse(value).name()
    }
}

impl fmt::Display for SystemBusErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::{AbstractCommandErrorKind, DmiError, PollTarget, SystemBusErrorKind};
    use test_case::test_case;

    #[test_case(0, AbstractCommandErrorKind::None, "none")]
    #[test_case(1, AbstractCommandErrorKind::Busy, "busy")]
    #[test_case(2, AbstractCommandErrorKind::NotSupported, "not supported")]
    #[test_case(3, AbstractCommandErrorKind::Exception, "exception")]
    #[test_case(4, AbstractCommandErrorKind::HaltResume, "halt/resume")]
    #[test_case(5, AbstractCommandErrorKind::Bus, "bus")]
    #[test_case(6, AbstractCommandErrorKind::Reserved, "reserved")]
    #[test_case(7, AbstractCommandErrorKind::Other, "other")]
    fn cmderr_classification(raw: u32, kind: AbstractCommandErrorKind, name: &str) {
        assert_eq!(AbstractCommandErrorKind::parse(raw), kind);
        assert_eq!(kind.to_string(), name);
        assert_eq!(kind as u32, raw);
    }

    #[test_case(0, SystemBusErrorKind::None, "none")]
    #[test_case(1, SystemBusErrorKind::Timeout, "timeout")]
    #[test_case(2, SystemBusErrorKind::BadAddress, "bad address")]
    #[test_case(3, SystemBusErrorKind::Alignment, "alignment")]
    #[test_case(4, SystemBusErrorKind::BadSize, "bad size")]
    #[test_case(5, SystemBusErrorKind::Reserved, "reserved")]
    #[test_case(6, SystemBusErrorKind::Reserved, "reserved")]
    #[test_case(7, SystemBusErrorKind::Other, "other")]
    fn sberror_classification(raw: u32, kind: SystemBusErrorKind, name: &str) {
        assert_eq!(SystemBusErrorKind::parse(raw), kind);
        assert_eq!(kind.to_string(), name);
    }

    #[test]
    fn timeout_message_names_the_condition() {
        let error = DmiError::Timeout {
            waiting_for: PollTarget::HartHalted(3),
            polls: 10,
        };

        assert_eq!(
            error.to_string(),
            "Timeout after 10 polls while waiting for hart 3 to halt"
        );
    }
}

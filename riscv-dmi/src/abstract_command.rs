//! Register access through abstract commands.
//!
//! Every access follows the same sequence: wait for the command engine to be
//! idle, clear a `cmderr` left behind by an earlier command, place the value
//! to write in `data0`, write `command` and poll `abstractcs` until `busy`
//! clears. A read fetches its result from `data0` once `cmderr` reports no
//! error.

use std::fmt;

use bitfield::bitfield;

use crate::{
    csr::{csr_name, fpr_abi_name, gpr_abi_name},
    dmi::Dmi,
    dtm::DmiTransport,
    error::{AbstractCommandErrorKind, DmiError, PollTarget},
    register::DmiRegister,
};

/// `cmdtype` of the access register command.
const ACCESS_REGISTER: u32 = 0;
/// `aarsize` of a 32-bit access.
const AARSIZE_32: u32 = 2;

const GPR_BASE: u16 = 0x1000;
const FPR_BASE: u16 = 0x1020;
const CSR_MAX: u16 = 0x0fff;

bitfield! {
    /// Access register command, written to the `command` register.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct AccessRegisterCommand(u32);
    impl Debug;

    pub cmd_type, set_cmd_type: 31, 24;
    pub aarsize, set_aarsize: 22, 20;
    pub aarpostincrement, set_aarpostincrement: 19;
    pub postexec, set_postexec: 18;
    pub transfer, set_transfer: 17;
    pub write, set_write: 16;
    pub regno, set_regno: 15, 0;
}

impl AccessRegisterCommand {
    /// A 32-bit transfer from or to `regno`.
    pub fn transfer_32(regno: u16, write: bool) -> Self {
        let mut command = AccessRegisterCommand(0);
        command.set_cmd_type(ACCESS_REGISTER);
        command.set_aarsize(AARSIZE_32);
        command.set_transfer(true);
        command.set_write(write);
        command.set_regno(u32::from(regno));
        command
    }
}

impl From<AccessRegisterCommand> for u32 {
    fn from(command: AccessRegisterCommand) -> Self {
        command.0
    }
}

/// A register of the selected hart, as reachable by an abstract command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterNumber {
    /// Control and status register, by CSR address.
    Csr(u16),
    /// General purpose register `x<n>`.
    Gpr(u8),
    /// Floating point register `f<n>`.
    Fpr(u8),
}

impl RegisterNumber {
    /// The `regno` encoding of the register.
    pub fn regno(self) -> Result<u16, DmiError> {
        match self {
            RegisterNumber::Csr(address) if address <= CSR_MAX => Ok(address),
            RegisterNumber::Gpr(index) if index < 32 => Ok(GPR_BASE + u16::from(index)),
            RegisterNumber::Fpr(index) if index < 32 => Ok(FPR_BASE + u16::from(index)),
            RegisterNumber::Csr(address) => Err(DmiError::InvalidRegisterNumber {
                kind: "CSR",
                index: u32::from(address),
            }),
            RegisterNumber::Gpr(index) => Err(DmiError::InvalidRegisterNumber {
                kind: "GPR",
                index: u32::from(index),
            }),
            RegisterNumber::Fpr(index) => Err(DmiError::InvalidRegisterNumber {
                kind: "FPR",
                index: u32::from(index),
            }),
        }
    }
}

impl fmt::Display for RegisterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterNumber::Csr(address) => write!(f, "{} ({:#05x})", csr_name(*address), address),
            RegisterNumber::Gpr(index) => {
                write!(f, "{} (x{})", gpr_abi_name(*index).unwrap_or("?"), index)
            }
            RegisterNumber::Fpr(index) => {
                write!(f, "{} (f{})", fpr_abi_name(*index).unwrap_or("?"), index)
            }
        }
    }
}

/// Progress of an abstract command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandPhase {
    /// No command issued yet, or a new one is being prepared.
    #[default]
    Idle,
    /// `command` was written.
    Issued,
    /// Waiting for `abstractcs.busy` to clear.
    Polling,
    /// The command completed without error.
    Done,
    /// The command timed out or reported a `cmderr`.
    Failed,
}

impl<T: DmiTransport> Dmi<T> {
    pub fn read_gpr(&mut self, index: u8) -> Result<u32, DmiError> {
        self.read_register(RegisterNumber::Gpr(index))
    }

    pub fn write_gpr(&mut self, index: u8, value: u32) -> Result<(), DmiError> {
        self.write_register(RegisterNumber::Gpr(index), value)
    }

    pub fn read_fpr(&mut self, index: u8) -> Result<u32, DmiError> {
        self.read_register(RegisterNumber::Fpr(index))
    }

    pub fn write_fpr(&mut self, index: u8, value: u32) -> Result<(), DmiError> {
        self.write_register(RegisterNumber::Fpr(index), value)
    }

    pub fn read_csr(&mut self, address: u16) -> Result<u32, DmiError> {
        self.read_register(RegisterNumber::Csr(address))
    }

    pub fn write_csr(&mut self, address: u16, value: u32) -> Result<(), DmiError> {
        self.write_register(RegisterNumber::Csr(address), value)
    }

    /// Read a register of the selected hart.
    pub fn read_register(&mut self, register: RegisterNumber) -> Result<u32, DmiError> {
        let regno = register.regno()?;

        self.prepare_abstract_command()?;
        self.issue_abstract_command(AccessRegisterCommand::transfer_32(regno, false).into())?;

        if let Err(error) = self.data.read(0, &mut self.transport) {
            self.command_phase = CommandPhase::Failed;
            return Err(error.into());
        }
        let value = self.data.get(0);

        tracing::debug!("Read {} = {:#010x}", register, value);
        Ok(value)
    }

    /// Write a register of the selected hart.
    pub fn write_register(&mut self, register: RegisterNumber, value: u32) -> Result<(), DmiError> {
        let regno = register.regno()?;

        self.prepare_abstract_command()?;

        self.data.set(0, value);
        if let Err(error) = self.data.write(0, &mut self.transport) {
            self.command_phase = CommandPhase::Failed;
            return Err(error.into());
        }

        self.issue_abstract_command(AccessRegisterCommand::transfer_32(regno, true).into())?;

        tracing::debug!("Wrote {} = {:#010x}", register, value);
        Ok(())
    }

    /// Execute a raw abstract command and wait for it to complete.
    ///
    /// Arguments are expected in the `data` registers already.
    pub fn execute_abstract_command(&mut self, command: u32) -> Result<(), DmiError> {
        self.prepare_abstract_command()?;
        self.issue_abstract_command(command)
    }

    /// Clear `abstractcs.cmderr` by writing ones to it.
    pub fn clear_cmderr(&mut self) -> Result<(), DmiError> {
        self.abstractcs.clear_cmderr();
        self.abstractcs.write(&mut self.transport)?;
        Ok(())
    }

    fn prepare_abstract_command(&mut self) -> Result<(), DmiError> {
        self.command_phase = CommandPhase::Idle;

        if let Err(error) = self.wait_for_abstract_command(PollTarget::AbstractCommandIdle) {
            self.command_phase = CommandPhase::Failed;
            return Err(error);
        }

        // A command is ignored while cmderr is set.
        let stale = self.abstractcs.cmderr();
        if stale != AbstractCommandErrorKind::None {
            tracing::debug!("Clearing cmderr left by a previous command: {}", stale);
            if let Err(error) = self.clear_cmderr() {
                self.command_phase = CommandPhase::Failed;
                return Err(error);
            }
        }

        Ok(())
    }

    fn issue_abstract_command(&mut self, command: u32) -> Result<(), DmiError> {
        self.command.set_bits(command);
        if let Err(error) = self.command.write(&mut self.transport) {
            self.command_phase = CommandPhase::Failed;
            return Err(error.into());
        }
        self.command_phase = CommandPhase::Issued;

        if let Err(error) = self.wait_for_abstract_command(PollTarget::AbstractCommandDone) {
            self.command_phase = CommandPhase::Failed;
            return Err(error);
        }

        match self.abstractcs.cmderr() {
            AbstractCommandErrorKind::None => {
                self.command_phase = CommandPhase::Done;
                Ok(())
            }
            kind => {
                tracing::debug!("Abstract command {:#010x} failed: {}", command, kind);
                self.command_phase = CommandPhase::Failed;
                Err(DmiError::AbstractCommand(kind))
            }
        }
    }

    /// Read `abstractcs` until `busy` clears. The last value read stays in the shadow.
    fn wait_for_abstract_command(&mut self, waiting_for: PollTarget) -> Result<(), DmiError> {
        let polls = self.config.abstract_command.polls();

        for _ in 0..polls {
            self.abstractcs.read(&mut self.transport)?;

            if !self.abstractcs.busy() {
                return Ok(());
            }

            if self.command_phase == CommandPhase::Issued {
                self.command_phase = CommandPhase::Polling;
            }
        }

        tracing::warn!("Abstract command engine still busy after {} polls", polls);
        Err(DmiError::Timeout { waiting_for, polls })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::{AccessRegisterCommand, CommandPhase, RegisterNumber};
    use crate::{
        dmi::Dmi,
        dtm::mock::MockDebugModule,
        error::{AbstractCommandErrorKind, DmiError},
    };

    #[test_case(RegisterNumber::Csr(0x7b0), 0x07b0)]
    #[test_case(RegisterNumber::Gpr(0), 0x1000)]
    #[test_case(RegisterNumber::Gpr(31), 0x101f)]
    #[test_case(RegisterNumber::Fpr(0), 0x1020)]
    #[test_case(RegisterNumber::Fpr(31), 0x103f)]
    fn regno_encoding(register: RegisterNumber, regno: u16) {
        assert_eq!(register.regno().unwrap(), regno);
    }

    #[test_case(RegisterNumber::Csr(0x1000))]
    #[test_case(RegisterNumber::Gpr(32))]
    #[test_case(RegisterNumber::Fpr(40))]
    fn regno_out_of_range(register: RegisterNumber) {
        assert!(matches!(
            register.regno(),
            Err(DmiError::InvalidRegisterNumber { .. })
        ));
    }

    #[test]
    fn transfer_command_words() {
        assert_eq!(
            u32::from(AccessRegisterCommand::transfer_32(0x7b0, false)),
            0x0022_07b0
        );
        assert_eq!(
            u32::from(AccessRegisterCommand::transfer_32(0x100a, true)),
            0x0023_100a
        );

        let command = AccessRegisterCommand(0x0023_100a);
        assert!(command.transfer());
        assert!(command.write());
        assert!(!command.postexec());
        assert_eq!(command.aarsize(), 2);
        assert_eq!(command.regno(), 0x100a);
    }

    #[test]
    fn register_names() {
        assert_eq!(RegisterNumber::Gpr(10).to_string(), "a0 (x10)");
        assert_eq!(RegisterNumber::Fpr(1).to_string(), "ft1 (f1)");
        assert_eq!(RegisterNumber::Csr(0x7b1).to_string(), "dpc (0x7b1)");
    }

    #[test]
    fn phase_follows_the_command() {
        let mut dmi = Dmi::new(MockDebugModule::new().with_halted_harts());
        assert_eq!(dmi.command_phase(), CommandPhase::Idle);

        dmi.read_csr(0x301).unwrap();
        assert_eq!(dmi.command_phase(), CommandPhase::Done);

        // Unknown CSRs raise an exception in the mock.
        assert!(matches!(
            dmi.read_csr(0x7c0),
            Err(DmiError::AbstractCommand(
                AbstractCommandErrorKind::Exception
            ))
        ));
        assert_eq!(dmi.command_phase(), CommandPhase::Failed);
    }

    // Accesses of a read: abstractcs, command, abstractcs, data0.
    #[test_case(1; "command write")]
    #[test_case(3; "data0 read")]
    fn transport_error_fails_the_command(operations: usize) {
        let mut dmi = Dmi::new(
            MockDebugModule::new()
                .with_halted_harts()
                .failing_after(operations),
        );

        assert!(matches!(dmi.read_gpr(1), Err(DmiError::Transport(_))));
        assert_eq!(dmi.command_phase(), CommandPhase::Failed);
    }

    #[test]
    fn invalid_register_number_issues_no_command() {
        let mut dmi = Dmi::new(MockDebugModule::new().with_halted_harts());

        assert!(dmi.write_gpr(32, 1).is_err());
        assert_eq!(dmi.transport().commands_executed(), 0);
        assert_eq!(dmi.transport().writes_to(0x04), 0);
    }
}

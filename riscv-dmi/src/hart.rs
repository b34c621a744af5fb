//! Hart selection and run control.

use crate::{
    dmi::Dmi,
    dtm::DmiTransport,
    error::{DmiError, PollTarget},
    register::DmiRegister,
    registers::Dmstatus,
};

impl<T: DmiTransport> Dmi<T> {
    /// Select hart `hart` for all following operations.
    ///
    /// Fails with [`DmiError::HartNotFound`] if the debug module cannot
    /// select the hart or reports it as nonexistent.
    pub fn select_hart(&mut self, hart: u32) -> Result<(), DmiError> {
        self.dmcontrol.reset();
        self.dmcontrol.set_dmactive(true);

        if self.dmcontrol.set_hartsel(hart).is_truncated() {
            return Err(DmiError::HartNotFound(hart));
        }

        self.dmcontrol.write(&mut self.transport)?;
        self.dmcontrol.read(&mut self.transport)?;
        self.dmstatus.read(&mut self.transport)?;

        // Unimplemented hartsel bits read back as zero.
        if self.dmcontrol.hartsel() != hart || self.dmstatus.nonexistent() {
            tracing::debug!("Hart {} does not exist: {:?}", hart, self.dmstatus);
            return Err(DmiError::HartNotFound(hart));
        }

        tracing::debug!("Selected hart {}", hart);
        Ok(())
    }

    /// Halt hart `hart` and wait until it reports halted.
    pub fn halt_hart(&mut self, hart: u32) -> Result<(), DmiError> {
        self.select_hart(hart)?;

        if self.dmstatus.halted() {
            tracing::debug!("Hart {} already halted", hart);
            return Ok(());
        }

        self.dmcontrol.set_haltreq(true);
        self.dmcontrol.write(&mut self.transport)?;
        self.dmcontrol.read(&mut self.transport)?;

        let halted = self.wait_for_hart(PollTarget::HartHalted(hart), Dmstatus::halted);
        self.clear_hart_requests()?;
        halted?;

        tracing::debug!("Hart {} halted", hart);
        Ok(())
    }

    /// Resume hart `hart` and wait for the resume acknowledge.
    pub fn resume_hart(&mut self, hart: u32) -> Result<(), DmiError> {
        self.select_hart(hart)?;

        self.dmcontrol.set_resumereq(true);
        self.dmcontrol.write(&mut self.transport)?;
        self.dmcontrol.read(&mut self.transport)?;

        let resumed = self.wait_for_hart(PollTarget::HartResumed(hart), Dmstatus::resumeack);
        self.clear_hart_requests()?;
        resumed?;

        tracing::debug!("Hart {} resumed", hart);
        Ok(())
    }

    /// Whether the selected hart is halted.
    pub fn hart_halted(&mut self) -> Result<bool, DmiError> {
        self.dmstatus.read(&mut self.transport)?;
        Ok(self.dmstatus.halted())
    }

    /// Halt state of harts 0 to 31, one bit per hart, from `haltsum0`.
    pub fn halt_summary(&mut self) -> Result<u32, DmiError> {
        self.haltsum.read(0, &mut self.transport)?;
        Ok(self.haltsum.get(0))
    }

    /// The highest hart index the debug module can select.
    ///
    /// All `hartsel` bits are written as ones and read back. The previous
    /// selection is restored afterwards.
    pub fn max_hart_index(&mut self) -> Result<u32, DmiError> {
        self.dmcontrol.read(&mut self.transport)?;
        let previous = self.dmcontrol.hartsel();

        self.dmcontrol.reset();
        self.dmcontrol.set_dmactive(true);
        self.dmcontrol.set_hartsel_max();
        self.dmcontrol.write(&mut self.transport)?;
        self.dmcontrol.read(&mut self.transport)?;
        let max = self.dmcontrol.hartsel();

        self.dmcontrol.reset();
        self.dmcontrol.set_dmactive(true);
        self.dmcontrol.set_hartsel(previous);
        self.dmcontrol.write(&mut self.transport)?;
        self.dmcontrol.read(&mut self.transport)?;

        tracing::debug!("Highest selectable hart: {}", max);
        Ok(max)
    }

    /// Drop `haltreq` and `resumereq`, keeping the hart selection.
    fn clear_hart_requests(&mut self) -> Result<(), DmiError> {
        self.dmcontrol.read(&mut self.transport)?;
        self.dmcontrol.set_haltreq(false);
        self.dmcontrol.set_resumereq(false);
        self.dmcontrol.set_ackhavereset(false);
        self.dmcontrol.set_ndmreset(false);
        self.dmcontrol.set_dmactive(true);
        self.dmcontrol.write(&mut self.transport)?;
        self.dmcontrol.read(&mut self.transport)?;

        Ok(())
    }

    fn wait_for_hart(
        &mut self,
        waiting_for: PollTarget,
        done: fn(&Dmstatus) -> bool,
    ) -> Result<(), DmiError> {
        let polls = self.config.hart_control.polls();

        for _ in 0..polls {
            self.dmstatus.read(&mut self.transport)?;

            if done(&self.dmstatus) {
                return Ok(());
            }
        }

        tracing::warn!(
            "Timeout after {} polls while waiting for {}",
            polls,
            waiting_for
        );
        Err(DmiError::Timeout { waiting_for, polls })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::{dmi::Dmi, dtm::mock::MockDebugModule, error::DmiError};

    #[test]
    fn select_existing_hart() {
        let mut dmi = Dmi::new(MockDebugModule::new().with_harts(3));

        dmi.select_hart(2).unwrap();

        assert_eq!(dmi.selected_hart(), 2);
        assert_eq!(dmi.transport().selected_hart(), 2);
        assert!(dmi.transport().dmactive());
    }

    #[test]
    fn select_missing_hart() {
        let mut dmi = Dmi::new(MockDebugModule::new().with_harts(2));

        assert!(matches!(dmi.select_hart(5), Err(DmiError::HartNotFound(5))));
        // Beyond the implemented hartsel bits.
        assert!(matches!(
            dmi.select_hart(16),
            Err(DmiError::HartNotFound(16))
        ));
        // Beyond the hartsel field.
        assert!(matches!(
            dmi.select_hart(1 << 20),
            Err(DmiError::HartNotFound(_))
        ));
    }

    #[test]
    fn max_hart_index_restores_the_selection() {
        let mut dmi = Dmi::new(MockDebugModule::new().with_harts(2).with_hartsellen(3));
        dmi.select_hart(1).unwrap();

        assert_eq!(dmi.max_hart_index().unwrap(), 7);
        assert_eq!(dmi.transport().selected_hart(), 1);
        assert_eq!(dmi.selected_hart(), 1);
    }

    #[test]
    fn halt_summary_reports_halted_harts() {
        let mut dmi = Dmi::new(MockDebugModule::new().with_harts(3));

        dmi.halt_hart(2).unwrap();

        assert_eq!(dmi.halt_summary().unwrap(), 0b100);
        assert!(dmi.hart_halted().unwrap());
    }
}

//! The debug module aggregate.

use crate::{
    abstract_command::CommandPhase,
    config::DmiConfig,
    dtm::DmiTransport,
    error::DmiError,
    register::{ArrayHandle, DmiRegister, RegisterArray, RegisterHandle},
    registers::{
        Abstractauto, Abstractcs, Authdata, Command, Dmcontrol, Dmstatus, Hartinfo, Hawindow,
        Hawindowsel, Nextdm, Sbcs, CONFSTRPTR_BASE, CONFSTRPTR_COUNT, DATA_BASE, DATA_COUNT,
        HALTSUM_ADDRESSES, HALTSUM_COUNT, PROGBUF_BASE, PROGBUF_COUNT, SBADDRESS_BASE,
        SBADDRESS_COUNT, SBDATA_BASE, SBDATA_COUNT,
    },
};

/// Debug module version implemented by debug specification 0.13.
const SUPPORTED_VERSION: u8 = 2;

/// A RISC-V debug module behind a [`DmiTransport`].
///
/// The `Dmi` owns the transport and one shadow of every debug module
/// register. The shadows are only refreshed by explicit reads, see
/// [`crate::register`]. The currently selected hart is part of the
/// `dmcontrol` shadow, so hart selection is state of this value.
#[derive(Debug)]
pub struct Dmi<T> {
    pub(crate) transport: T,
    pub(crate) config: DmiConfig,
    pub(crate) command_phase: CommandPhase,

    pub(crate) data: RegisterArray<DATA_COUNT>,
    pub(crate) dmcontrol: Dmcontrol,
    pub(crate) dmstatus: Dmstatus,
    pub(crate) hartinfo: Hartinfo,
    pub(crate) haltsum: RegisterArray<HALTSUM_COUNT>,
    pub(crate) hawindowsel: Hawindowsel,
    pub(crate) hawindow: Hawindow,
    pub(crate) abstractcs: Abstractcs,
    pub(crate) command: Command,
    pub(crate) abstractauto: Abstractauto,
    pub(crate) confstrptr: RegisterArray<CONFSTRPTR_COUNT>,
    pub(crate) nextdm: Nextdm,
    pub(crate) progbuf: RegisterArray<PROGBUF_COUNT>,
    pub(crate) authdata: Authdata,
    pub(crate) sbcs: Sbcs,
    pub(crate) sbaddress: RegisterArray<SBADDRESS_COUNT>,
    pub(crate) sbdata: RegisterArray<SBDATA_COUNT>,
}

impl<T: DmiTransport> Dmi<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DmiConfig::default())
    }

    pub fn with_config(transport: T, config: DmiConfig) -> Self {
        Self {
            transport,
            config,
            command_phase: CommandPhase::Idle,
            data: RegisterArray::contiguous("data", DATA_BASE),
            dmcontrol: Dmcontrol::default(),
            dmstatus: Dmstatus::default(),
            hartinfo: Hartinfo::default(),
            haltsum: RegisterArray::new("haltsum", HALTSUM_ADDRESSES),
            hawindowsel: Hawindowsel::default(),
            hawindow: Hawindow::default(),
            abstractcs: Abstractcs::default(),
            command: Command::default(),
            abstractauto: Abstractauto::default(),
            confstrptr: RegisterArray::contiguous("confstrptr", CONFSTRPTR_BASE),
            nextdm: Nextdm::default(),
            progbuf: RegisterArray::contiguous("progbuf", PROGBUF_BASE),
            authdata: Authdata::default(),
            sbcs: Sbcs::default(),
            sbaddress: RegisterArray::contiguous("sbaddress", SBADDRESS_BASE),
            sbdata: RegisterArray::contiguous("sbdata", SBDATA_BASE),
        }
    }

    pub fn config(&self) -> &DmiConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DmiConfig) {
        self.config = config;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Reset the DTM. The register shadows are left as they are.
    pub fn dtm_reset(&mut self) -> Result<(), DmiError> {
        tracing::debug!("Resetting DTM");
        self.transport.reset()?;
        Ok(())
    }

    /// Set every shadow value back to its reset value, without any DMI access.
    pub fn reset_registers(&mut self) {
        self.command_phase = CommandPhase::Idle;

        self.data.reset_all();
        self.dmcontrol.reset();
        self.dmstatus.reset();
        self.hartinfo.reset();
        self.haltsum.reset_all();
        self.hawindowsel.reset();
        self.hawindow.reset();
        self.abstractcs.reset();
        self.command.reset();
        self.abstractauto.reset();
        self.confstrptr.reset_all();
        self.nextdm.reset();
        self.progbuf.reset_all();
        self.authdata.reset();
        self.sbcs.reset();
        self.sbaddress.reset_all();
        self.sbdata.reset_all();
    }

    /// Activate the debug module and check that it implements debug
    /// specification 0.13.
    pub fn activate(&mut self) -> Result<(), DmiError> {
        self.dmcontrol.reset();
        self.dmcontrol.set_dmactive(true);
        self.dmcontrol.write(&mut self.transport)?;
        self.dmcontrol.read(&mut self.transport)?;

        self.dmstatus.read(&mut self.transport)?;
        let version = self.dmstatus.version();

        if version != SUPPORTED_VERSION {
            tracing::warn!("Debug module version {} is not supported", version);
            return Err(DmiError::UnsupportedDebugModuleVersion(version));
        }

        tracing::debug!("Debug module active: {:?}", self.dmstatus);
        Ok(())
    }

    /// The hart selected in the `dmcontrol` shadow.
    pub fn selected_hart(&self) -> u32 {
        self.dmcontrol.hartsel()
    }

    /// Progress of the last abstract command.
    pub fn command_phase(&self) -> CommandPhase {
        self.command_phase
    }

    pub fn data(&mut self) -> ArrayHandle<'_, DATA_COUNT> {
        ArrayHandle::new(&mut self.data, &mut self.transport)
    }

    pub fn dmcontrol(&mut self) -> RegisterHandle<'_, Dmcontrol> {
        RegisterHandle::new(&mut self.dmcontrol, &mut self.transport)
    }

    pub fn dmstatus(&mut self) -> RegisterHandle<'_, Dmstatus> {
        RegisterHandle::new(&mut self.dmstatus, &mut self.transport)
    }

    pub fn hartinfo(&mut self) -> RegisterHandle<'_, Hartinfo> {
        RegisterHandle::new(&mut self.hartinfo, &mut self.transport)
    }

    pub fn haltsum(&mut self) -> ArrayHandle<'_, HALTSUM_COUNT> {
        ArrayHandle::new(&mut self.haltsum, &mut self.transport)
    }

    pub fn hawindowsel(&mut self) -> RegisterHandle<'_, Hawindowsel> {
        RegisterHandle::new(&mut self.hawindowsel, &mut self.transport)
    }

    pub fn hawindow(&mut self) -> RegisterHandle<'_, Hawindow> {
        RegisterHandle::new(&mut self.hawindow, &mut self.transport)
    }

    pub fn abstractcs(&mut self) -> RegisterHandle<'_, Abstractcs> {
        RegisterHandle::new(&mut self.abstractcs, &mut self.transport)
    }

    pub fn command(&mut self) -> RegisterHandle<'_, Command> {
        RegisterHandle::new(&mut self.command, &mut self.transport)
    }

    pub fn abstractauto(&mut self) -> RegisterHandle<'_, Abstractauto> {
        RegisterHandle::new(&mut self.abstractauto, &mut self.transport)
    }

    pub fn confstrptr(&mut self) -> ArrayHandle<'_, CONFSTRPTR_COUNT> {
        ArrayHandle::new(&mut self.confstrptr, &mut self.transport)
    }

    pub fn nextdm(&mut self) -> RegisterHandle<'_, Nextdm> {
        RegisterHandle::new(&mut self.nextdm, &mut self.transport)
    }

    pub fn progbuf(&mut self) -> ArrayHandle<'_, PROGBUF_COUNT> {
        ArrayHandle::new(&mut self.progbuf, &mut self.transport)
    }

    pub fn authdata(&mut self) -> RegisterHandle<'_, Authdata> {
        RegisterHandle::new(&mut self.authdata, &mut self.transport)
    }

    pub fn sbcs(&mut self) -> RegisterHandle<'_, Sbcs> {
        RegisterHandle::new(&mut self.sbcs, &mut self.transport)
    }

    pub fn sbaddress(&mut self) -> ArrayHandle<'_, SBADDRESS_COUNT> {
        ArrayHandle::new(&mut self.sbaddress, &mut self.transport)
    }

    pub fn sbdata(&mut self) -> ArrayHandle<'_, SBDATA_COUNT> {
        ArrayHandle::new(&mut self.sbdata, &mut self.transport)
    }
}

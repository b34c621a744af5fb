//! Abstract command registers.

use crate::{
    error::AbstractCommandErrorKind,
    register::{dmi_register, DmiRegister, FieldUpdate},
};

/// Address of `data0`. `data0` to `data11` are contiguous.
pub const DATA_BASE: u64 = 0x04;
/// Address of `progbuf0`. `progbuf0` to `progbuf15` are contiguous.
pub const PROGBUF_BASE: u64 = 0x20;

dmi_register! {
    /// Abstract command control and status, located at address 0x16.
    Abstractcs, "abstractcs", 0x16, 0,
    [
        PROGBUFSIZE: progbufsize [28:24],
        BUSY: busy [12],
        CMDERR: cmderr [10:8] => AbstractCommandErrorKind::describe,
        DATACOUNT: datacount [3:0],
    ]
}

impl Abstractcs {
    pub fn progbufsize(&self) -> u32 {
        self.field(Self::PROGBUFSIZE)
    }

    /// `true` while an abstract command is executing.
    pub fn busy(&self) -> bool {
        self.flag(Self::BUSY)
    }

    pub fn cmderr(&self) -> AbstractCommandErrorKind {
        AbstractCommandErrorKind::parse(self.field(Self::CMDERR))
    }

    /// Prepare to clear `cmderr`.
    ///
    /// The field is write-1-to-clear, so this sets every bit of it in the
    /// shadow value. The error is only cleared once the register is written.
    pub fn clear_cmderr(&mut self) {
        self.set_field(Self::CMDERR, Self::CMDERR.max());
    }

    /// Zero `cmderr` in the shadow value, so writing the register leaves a
    /// pending error in place.
    pub fn keep_cmderr(&mut self) {
        self.set_field(Self::CMDERR, 0);
    }

    pub fn datacount(&self) -> u32 {
        self.field(Self::DATACOUNT)
    }
}

dmi_register! {
    /// Writing this register at address 0x17 starts an abstract command.
    Command, "command", 0x17, 0,
    [
        CMDTYPE: cmdtype [31:24],
        CONTROL: control [23:0],
    ]
}

impl Command {
    pub fn cmdtype(&self) -> u32 {
        self.field(Self::CMDTYPE)
    }

    pub fn set_cmdtype(&mut self, cmdtype: u32) -> FieldUpdate {
        self.set_field(Self::CMDTYPE, cmdtype)
    }

    /// Command specific payload.
    pub fn control(&self) -> u32 {
        self.field(Self::CONTROL)
    }

    pub fn set_control(&mut self, control: u32) -> FieldUpdate {
        self.set_field(Self::CONTROL, control)
    }
}

dmi_register! {
    Abstractauto, "abstractauto", 0x18, 0,
    [
        AUTOEXECPROGBUF: autoexecprogbuf [31:16],
        AUTOEXECDATA: autoexecdata [11:0],
    ]
}

impl Abstractauto {
    pub fn autoexecprogbuf(&self) -> u32 {
        self.field(Self::AUTOEXECPROGBUF)
    }

    pub fn set_autoexecprogbuf(&mut self, mask: u32) -> FieldUpdate {
        self.set_field(Self::AUTOEXECPROGBUF, mask)
    }

    pub fn autoexecdata(&self) -> u32 {
        self.field(Self::AUTOEXECDATA)
    }

    pub fn set_autoexecdata(&mut self, mask: u32) -> FieldUpdate {
        self.set_field(Self::AUTOEXECDATA, mask)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Abstractauto, Abstractcs, Command};
    use crate::{
        error::AbstractCommandErrorKind,
        register::{DisplayStyle, DmiRegister},
    };

    #[test]
    fn busy_is_bit_twelve() {
        assert!(Abstractcs::from(1 << 12).busy());
        assert!(!Abstractcs::from(0x1f00_0000).busy());
        assert_eq!(Abstractcs::from(0x1f00_0000).progbufsize(), 0x1f);
    }

    #[test]
    fn cmderr_clear_sets_all_field_bits() {
        let mut abstractcs = Abstractcs::from(0x0200_0302);
        assert_eq!(abstractcs.cmderr(), AbstractCommandErrorKind::Exception);

        abstractcs.clear_cmderr();
        assert_eq!(abstractcs.bits(), 0x0200_0702);
        assert_eq!(abstractcs.cmderr(), AbstractCommandErrorKind::Other);

        abstractcs.keep_cmderr();
        assert_eq!(abstractcs.cmderr(), AbstractCommandErrorKind::None);
    }

    #[test]
    fn abstractcs_expanded() {
        let abstractcs = Abstractcs::from(0x0200_0202);

        assert_eq!(
            abstractcs.display(DisplayStyle::Expanded).to_string(),
            "[ progbufsize = 0x2, busy = false, cmderr = 2 (not supported), datacount = 0x2 ]"
        );
    }

    #[test]
    fn command_fields() {
        let mut command = Command::default();

        assert!(!command.set_cmdtype(2).is_truncated());
        assert!(command.set_control(0x0100_0000).is_truncated());
        assert!(!command.set_control(0x0022_1008).is_truncated());

        assert_eq!(command.bits(), 0x0222_1008);
        assert_eq!(command.cmdtype(), 2);
        assert_eq!(command.control(), 0x22_1008);
    }

    #[test]
    fn abstractauto_fields() {
        let mut abstractauto = Abstractauto::default();

        abstractauto.set_autoexecprogbuf(0x8001);
        assert!(abstractauto.set_autoexecdata(0x1001).is_truncated());

        assert_eq!(abstractauto.autoexecprogbuf(), 0x8001);
        assert_eq!(abstractauto.autoexecdata(), 0x001);
    }
}

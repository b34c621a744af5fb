//! System bus access registers.

use crate::{
    error::SystemBusErrorKind,
    register::{dmi_register, DmiRegister, FieldUpdate},
};

/// Address of `sbaddress0`. `sbaddress0` to `sbaddress2` are contiguous.
pub const SBADDRESS_BASE: u64 = 0x39;
/// Address of `sbdata0`. `sbdata0` to `sbdata3` are contiguous.
pub const SBDATA_BASE: u64 = 0x3c;

/// Width of a single system bus access, as encoded in `sbcs.sbaccess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SbAccessWidth {
    U8 = 0,
    U16 = 1,
    U32 = 2,
    U64 = 3,
    U128 = 4,
}

impl SbAccessWidth {
    /// All widths, widest first.
    pub const ALL: [SbAccessWidth; 5] = [
        SbAccessWidth::U128,
        SbAccessWidth::U64,
        SbAccessWidth::U32,
        SbAccessWidth::U16,
        SbAccessWidth::U8,
    ];

    pub fn parse(value: u32) -> Option<Self> {
        let width = match value {
            0 => SbAccessWidth::U8,
            1 => SbAccessWidth::U16,
            2 => SbAccessWidth::U32,
            3 => SbAccessWidth::U64,
            4 => SbAccessWidth::U128,
            _ => return None,
        };

        Some(width)
    }

    /// Number of bytes moved by one access.
    pub const fn bytes(self) -> usize {
        1 << self as usize
    }

    /// Number of `sbdata` registers holding one access.
    pub const fn words(self) -> usize {
        if self.bytes() > 4 {
            self.bytes() / 4
        } else {
            1
        }
    }

    fn describe(value: u32) -> &'static str {
        match Self::parse(value) {
            Some(SbAccessWidth::U8) => "8-bit",
            Some(SbAccessWidth::U16) => "16-bit",
            Some(SbAccessWidth::U32) => "32-bit",
            Some(SbAccessWidth::U64) => "64-bit",
            Some(SbAccessWidth::U128) => "128-bit",
            None => "invalid",
        }
    }
}

fn describe_sbversion(value: u32) -> &'static str {
    match value {
        0 => "pre 1 Jan 2019",
        1 => "debug spec 0.13.2",
        _ => "reserved",
    }
}

dmi_register! {
    /// System bus access control and status, located at address 0x38.
    ///
    /// `sbbusyerror` and `sberror` are sticky and cleared by writing ones to them.
    Sbcs, "sbcs", 0x38, 0x2004_0000,
    [
        SBVERSION: sbversion [31:29] => describe_sbversion,
        SBBUSYERROR: sbbusyerror [22],
        SBBUSY: sbbusy [21],
        SBREADONADDR: sbreadonaddr [20],
        SBACCESS: sbaccess [19:17] => SbAccessWidth::describe,
        SBAUTOINCREMENT: sbautoincrement [16],
        SBREADONDATA: sbreadondata [15],
        SBERROR: sberror [14:12] => SystemBusErrorKind::describe,
        SBASIZE: sbasize [11:5],
        SBACCESS128: sbaccess128 [4],
        SBACCESS64: sbaccess64 [3],
        SBACCESS32: sbaccess32 [2],
        SBACCESS16: sbaccess16 [1],
        SBACCESS8: sbaccess8 [0],
    ]
}

impl Sbcs {
    pub fn sbversion(&self) -> u32 {
        self.field(Self::SBVERSION)
    }

    /// Set when the debugger started an access while the bus was busy.
    pub fn sbbusyerror(&self) -> bool {
        self.flag(Self::SBBUSYERROR)
    }

    pub fn clear_sbbusyerror(&mut self) {
        self.set_flag(Self::SBBUSYERROR, true);
    }

    pub fn sbbusy(&self) -> bool {
        self.flag(Self::SBBUSY)
    }

    pub fn sbreadonaddr(&self) -> bool {
        self.flag(Self::SBREADONADDR)
    }

    /// Start a read whenever `sbaddress0` is written.
    pub fn set_sbreadonaddr(&mut self, flag: bool) {
        self.set_flag(Self::SBREADONADDR, flag);
    }

    pub fn sbaccess(&self) -> u32 {
        self.field(Self::SBACCESS)
    }

    /// Set the raw access width. Values above 7 are truncated with a warning.
    pub fn set_sbaccess(&mut self, sbaccess: u32) -> FieldUpdate {
        self.set_field(Self::SBACCESS, sbaccess)
    }

    pub fn access_width(&self) -> Option<SbAccessWidth> {
        SbAccessWidth::parse(self.sbaccess())
    }

    pub fn set_access_width(&mut self, width: SbAccessWidth) {
        self.set_sbaccess(width as u32);
    }

    pub fn sbautoincrement(&self) -> bool {
        self.flag(Self::SBAUTOINCREMENT)
    }

    pub fn set_sbautoincrement(&mut self, flag: bool) {
        self.set_flag(Self::SBAUTOINCREMENT, flag);
    }

    pub fn sbreadondata(&self) -> bool {
        self.flag(Self::SBREADONDATA)
    }

    /// Start the next read whenever `sbdata0` is read.
    pub fn set_sbreadondata(&mut self, flag: bool) {
        self.set_flag(Self::SBREADONDATA, flag);
    }

    pub fn sberror(&self) -> SystemBusErrorKind {
        SystemBusErrorKind::parse(self.field(Self::SBERROR))
    }

    pub fn clear_sberror(&mut self) {
        self.set_field(Self::SBERROR, Self::SBERROR.max());
    }

    /// Zero both sticky error fields in the shadow value, so that writing the
    /// register changes its configuration without clearing pending errors.
    pub fn keep_sticky_errors(&mut self) {
        self.set_field(Self::SBERROR, 0);
        self.set_flag(Self::SBBUSYERROR, false);
    }

    /// Width of the system bus address in bits. Zero if there is no system bus access.
    pub fn sbasize(&self) -> u32 {
        self.field(Self::SBASIZE)
    }

    pub fn sbaccess128(&self) -> bool {
        self.flag(Self::SBACCESS128)
    }

    pub fn sbaccess64(&self) -> bool {
        self.flag(Self::SBACCESS64)
    }

    pub fn sbaccess32(&self) -> bool {
        self.flag(Self::SBACCESS32)
    }

    pub fn sbaccess16(&self) -> bool {
        self.flag(Self::SBACCESS16)
    }

    pub fn sbaccess8(&self) -> bool {
        self.flag(Self::SBACCESS8)
    }

    pub fn supports(&self, width: SbAccessWidth) -> bool {
        match width {
            SbAccessWidth::U8 => self.sbaccess8(),
            SbAccessWidth::U16 => self.sbaccess16(),
            SbAccessWidth::U32 => self.sbaccess32(),
            SbAccessWidth::U64 => self.sbaccess64(),
            SbAccessWidth::U128 => self.sbaccess128(),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::{SbAccessWidth, Sbcs};
    use crate::{
        error::SystemBusErrorKind,
        register::{DisplayStyle, DmiRegister, FieldUpdate},
    };

    #[test]
    fn reset_value() {
        let sbcs = Sbcs::default();

        assert_eq!(sbcs.bits(), 0x2004_0000);
        assert_eq!(sbcs.sbversion(), 1);
        assert_eq!(sbcs.access_width(), Some(SbAccessWidth::U32));
    }

    #[test]
    fn sbaccess_truncates_with_a_report() {
        let mut sbcs = Sbcs::default();

        let update = sbcs.set_sbaccess(8);

        assert_eq!(
            update,
            FieldUpdate::Truncated {
                requested: 8,
                stored: 0
            }
        );
        assert_eq!(sbcs.sbaccess(), 0);
        assert_eq!(sbcs.sbversion(), 1);
    }

    #[test]
    fn sticky_errors() {
        let mut sbcs = Sbcs::from(0x2040_3000 | (32 << 5) | 0x7);

        assert!(sbcs.sbbusyerror());
        assert_eq!(sbcs.sberror(), SystemBusErrorKind::Alignment);

        sbcs.keep_sticky_errors();
        assert!(!sbcs.sbbusyerror());
        assert_eq!(sbcs.sberror(), SystemBusErrorKind::None);
        assert_eq!(sbcs.sbasize(), 32);

        sbcs.clear_sberror();
        sbcs.clear_sbbusyerror();
        assert_eq!(sbcs.field(Sbcs::SBERROR), 0x7);
        assert!(sbcs.sbbusyerror());
    }

    #[test_case(SbAccessWidth::U8, 1, 1)]
    #[test_case(SbAccessWidth::U16, 2, 1)]
    #[test_case(SbAccessWidth::U32, 4, 1)]
    #[test_case(SbAccessWidth::U64, 8, 2)]
    #[test_case(SbAccessWidth::U128, 16, 4)]
    fn access_width_geometry(width: SbAccessWidth, bytes: usize, words: usize) {
        assert_eq!(width.bytes(), bytes);
        assert_eq!(width.words(), words);
    }

    #[test]
    fn supported_widths() {
        let sbcs = Sbcs::from(0b00111);

        assert!(sbcs.supports(SbAccessWidth::U8));
        assert!(sbcs.supports(SbAccessWidth::U32));
        assert!(!sbcs.supports(SbAccessWidth::U64));
    }

    #[test]
    fn sbcs_expanded() {
        let sbcs = Sbcs::from(0x2014_0000 | (32 << 5) | 0x4);

        assert_eq!(
            sbcs.display(DisplayStyle::Expanded).to_string(),
            "[ sbversion = 1 (debug spec 0.13.2), sbbusyerror = false, sbbusy = false, \
             sbreadonaddr = true, sbaccess = 2 (32-bit), sbautoincrement = false, \
             sbreadondata = false, sberror = 0 (none), sbasize = 0x20, sbaccess128 = false, \
             sbaccess64 = false, sbaccess32 = true, sbaccess16 = false, sbaccess8 = false ]"
        );
    }
}

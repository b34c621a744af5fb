//! Debug module control and status registers.

use std::fmt;

use crate::register::{dmi_register, DmiRegister, FieldUpdate};

/// Number of bits of `hartsel`, split over `hartsello` and `hartselhi`.
pub const HARTSEL_WIDTH: u32 = 20;

dmi_register! {
    /// `dmcontrol` register, located at address 0x10.
    ///
    /// Controls the currently selected harts and the debug module itself.
    /// `hartreset`, `hasel`, `setresethaltreq` and `clrresethaltreq` are not
    /// supported: their getters return `false` and their setters only warn.
    Dmcontrol, "dmcontrol", 0x10, 0,
    [
        HALTREQ: haltreq [31],
        RESUMEREQ: resumereq [30],
        HARTRESET: hartreset [29],
        ACKHAVERESET: ackhavereset [28],
        HASEL: hasel [26],
        HARTSELLO: hartsello [25:16],
        HARTSELHI: hartselhi [15:6],
        SETRESETHALTREQ: setresethaltreq [3],
        CLRRESETHALTREQ: clrresethaltreq [2],
        NDMRESET: ndmreset [1],
        DMACTIVE: dmactive [0],
    ],
    expanded = Dmcontrol::fmt_fields
}

impl Dmcontrol {
    pub fn haltreq(&self) -> bool {
        self.flag(Self::HALTREQ)
    }

    /// Request the selected harts to halt. Applies to the harts selected by
    /// the new value of `hartsel`.
    pub fn set_haltreq(&mut self, flag: bool) {
        self.set_flag(Self::HALTREQ, flag);
    }

    pub fn resumereq(&self) -> bool {
        self.flag(Self::RESUMEREQ)
    }

    /// Request the selected harts to resume. Ignored by the hardware if
    /// `haltreq` is set at the same time.
    pub fn set_resumereq(&mut self, flag: bool) {
        self.set_flag(Self::RESUMEREQ, flag);
    }

    pub fn hartreset(&self) -> bool {
        false
    }

    pub fn set_hartreset(&mut self, _flag: bool) {
        tracing::warn!("Setting dmcontrol:hartreset not supported: ignored.");
    }

    pub fn ackhavereset(&self) -> bool {
        self.flag(Self::ACKHAVERESET)
    }

    pub fn set_ackhavereset(&mut self, flag: bool) {
        self.set_flag(Self::ACKHAVERESET, flag);
    }

    pub fn hasel(&self) -> bool {
        false
    }

    pub fn set_hasel(&mut self, _flag: bool) {
        tracing::warn!("Setting dmcontrol:hasel not supported: ignored.");
    }

    pub fn hartsello(&self) -> u32 {
        self.field(Self::HARTSELLO)
    }

    pub fn hartselhi(&self) -> u32 {
        self.field(Self::HARTSELHI)
    }

    /// The selected hart, `hartselhi << 10 | hartsello`.
    pub fn hartsel(&self) -> u32 {
        (self.hartselhi() << Self::HARTSELLO.width()) | self.hartsello()
    }

    /// Select hart `hart`. Bits above the 20 bit `hartsel` range are dropped
    /// with a warning.
    pub fn set_hartsel(&mut self, hart: u32) -> FieldUpdate {
        let stored = hart & ((1 << HARTSEL_WIDTH) - 1);

        let update = if stored == hart {
            FieldUpdate::Exact
        } else {
            tracing::warn!(
                "requested value of hartsel, {}, exceeds the maximum permitted value: higher bits ignored.",
                hart
            );
            FieldUpdate::Truncated {
                requested: hart,
                stored,
            }
        };

        let low_width = Self::HARTSELLO.width();
        self.set_field(Self::HARTSELLO, stored & Self::HARTSELLO.max());
        self.set_field(Self::HARTSELHI, stored >> low_width);

        update
    }

    /// Set every bit of `hartsel`.
    ///
    /// Reading `dmcontrol` back afterwards yields the highest hart index the
    /// debug module can select. This does not address all harts at once.
    pub fn set_hartsel_max(&mut self) {
        let hartsel = Self::HARTSELLO.mask() | Self::HARTSELHI.mask();
        self.set_bits(self.bits() | hartsel);
    }

    pub fn set_resethaltreq(&mut self) {
        tracing::warn!("Setting dmcontrol:setresethaltreq not supported: ignored.");
    }

    pub fn clear_resethaltreq(&mut self) {
        tracing::warn!("Setting dmcontrol:clrresethaltreq not supported: ignored.");
    }

    pub fn ndmreset(&self) -> bool {
        self.flag(Self::NDMRESET)
    }

    pub fn set_ndmreset(&mut self, flag: bool) {
        self.set_flag(Self::NDMRESET, flag);
    }

    pub fn dmactive(&self) -> bool {
        self.flag(Self::DMACTIVE)
    }

    pub fn set_dmactive(&mut self, flag: bool) {
        self.set_flag(Self::DMACTIVE, flag);
    }

    // Unsupported controls are shown as their getters report them, and the
    // two halves of hartsel as one value.
    fn fmt_fields(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ haltreq = {}, resumereq = {}, hartreset = {}, ackhavereset = {}, hasel = {}, \
             hartsel = {:#07x}, setresethaltreq = {}, clrresethaltreq = {}, ndmreset = {}, \
             dmactive = {} ]",
            self.haltreq(),
            self.resumereq(),
            self.hartreset(),
            self.ackhavereset(),
            self.hasel(),
            self.hartsel(),
            self.flag(Self::SETRESETHALTREQ),
            self.flag(Self::CLRRESETHALTREQ),
            self.ndmreset(),
            self.dmactive()
        )
    }
}

dmi_register! {
    /// Readonly `dmstatus` register, located at address 0x11.
    Dmstatus, "dmstatus", 0x11, 0,
    [
        IMPEBREAK: impebreak [22],
        ALLHAVERESET: allhavereset [19],
        ANYHAVERESET: anyhavereset [18],
        ALLRESUMEACK: allresumeack [17],
        ANYRESUMEACK: anyresumeack [16],
        ALLNONEXISTENT: allnonexistent [15],
        ANYNONEXISTENT: anynonexistent [14],
        ALLUNAVAIL: allunavail [13],
        ANYUNAVAIL: anyunavail [12],
        ALLRUNNING: allrunning [11],
        ANYRUNNING: anyrunning [10],
        ALLHALTED: allhalted [9],
        ANYHALTED: anyhalted [8],
        AUTHENTICATED: authenticated [7],
        AUTHBUSY: authbusy [6],
        HASRESETHALTREQ: hasresethaltreq [5],
        CONFSTRPTRVALID: confstrptrvalid [4],
        VERSION: version [3:0],
    ]
}

// The combined getters do not distinguish between "all" and "any" of the
// selected harts.
impl Dmstatus {
    pub fn impebreak(&self) -> bool {
        self.flag(Self::IMPEBREAK)
    }

    pub fn havereset(&self) -> bool {
        self.flag(Self::ALLHAVERESET) || self.flag(Self::ANYHAVERESET)
    }

    pub fn resumeack(&self) -> bool {
        self.flag(Self::ALLRESUMEACK) || self.flag(Self::ANYRESUMEACK)
    }

    pub fn nonexistent(&self) -> bool {
        self.flag(Self::ALLNONEXISTENT) || self.flag(Self::ANYNONEXISTENT)
    }

    pub fn unavail(&self) -> bool {
        self.flag(Self::ALLUNAVAIL) || self.flag(Self::ANYUNAVAIL)
    }

    pub fn running(&self) -> bool {
        self.flag(Self::ALLRUNNING) || self.flag(Self::ANYRUNNING)
    }

    pub fn halted(&self) -> bool {
        self.flag(Self::ALLHALTED) || self.flag(Self::ANYHALTED)
    }

    pub fn authenticated(&self) -> bool {
        self.flag(Self::AUTHENTICATED)
    }

    pub fn authbusy(&self) -> bool {
        self.flag(Self::AUTHBUSY)
    }

    pub fn hasresethaltreq(&self) -> bool {
        self.flag(Self::HASRESETHALTREQ)
    }

    pub fn confstrptrvalid(&self) -> bool {
        self.flag(Self::CONFSTRPTRVALID)
    }

    /// Version of the debug module. 2 means debug specification 0.13.
    pub fn version(&self) -> u8 {
        self.field(Self::VERSION) as u8
    }
}

dmi_register! {
    /// Readonly `hartinfo` register, located at address 0x12.
    Hartinfo, "hartinfo", 0x12, 0,
    [
        NSCRATCH: nscratch [23:20],
        DATAACCESS: dataaccess [16],
        DATASIZE: datasize [15:12],
        DATAADDR: dataaddr [11:0],
    ]
}

impl Hartinfo {
    /// Number of `dscratch` registers available to the debugger.
    pub fn nscratch(&self) -> u32 {
        self.field(Self::NSCRATCH)
    }

    /// `true` if the data registers are shadowed in memory, `false` if in CSRs.
    pub fn dataaccess(&self) -> bool {
        self.flag(Self::DATAACCESS)
    }

    pub fn datasize(&self) -> u32 {
        self.field(Self::DATASIZE)
    }

    pub fn dataaddr(&self) -> u32 {
        self.field(Self::DATAADDR)
    }
}

dmi_register! {
    /// `hawindowsel` register, located at address 0x14.
    Hawindowsel, "hawindowsel", 0x14, 0,
    [
        HAWINDOWSEL: hawindowsel [14:0],
    ]
}

impl Hawindowsel {
    pub fn hawindowsel(&self) -> u32 {
        self.field(Self::HAWINDOWSEL)
    }

    pub fn set_hawindowsel(&mut self, window: u32) -> FieldUpdate {
        self.set_field(Self::HAWINDOWSEL, window)
    }
}

dmi_register! {
    /// `hawindow` register, located at address 0x15.
    Hawindow, "hawindow", 0x15, 0,
    [
        MASKDATA: maskdata [31:0],
    ]
}

impl Hawindow {
    pub fn maskdata(&self) -> u32 {
        self.bits()
    }

    pub fn set_maskdata(&mut self, mask: u32) {
        self.set_bits(mask);
    }
}

/// Addresses of `haltsum0` to `haltsum3`, which are not contiguous.
pub const HALTSUM_ADDRESSES: [u64; 4] = [0x40, 0x13, 0x34, 0x35];

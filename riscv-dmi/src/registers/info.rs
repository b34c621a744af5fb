//! Configuration string, debug module chaining and authentication registers.

use std::fmt;

use crate::{
    dtm::DmiTransport,
    error::TransportError,
    register::{dmi_register, DmiRegister, Field},
};

/// Address of `confstrptr0`. `confstrptr0` to `confstrptr3` are contiguous.
pub const CONFSTRPTR_BASE: u64 = 0x19;

dmi_register! {
    /// Address of the next debug module, located at 0x1d. Zero for the last one.
    Nextdm, "nextdm", 0x1d, 0,
    [
        ADDR: addr [31:0],
    ]
}

impl Nextdm {
    pub fn addr(&self) -> u32 {
        self.bits()
    }
}

/// `authdata` register, located at address 0x30.
///
/// Authentication is not supported. Reads and writes still reach the
/// register but warn, the getter always returns zero and the setter is
/// ignored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Authdata(u32);

impl Authdata {
    const DATA: Field = Field::new("data", 31, 0);

    pub fn data(&self) -> u32 {
        tracing::warn!(
            "authentication not supported while getting authdata: zero returned"
        );
        0
    }

    pub fn set_data(&mut self, _value: u32) {
        tracing::warn!(
            "authentication not supported while setting authdata: value ignored"
        );
    }
}

impl DmiRegister for Authdata {
    const ADDRESS: u64 = 0x30;
    const NAME: &'static str = "authdata";
    const RESET_VALUE: u32 = 0;
    const FIELDS: &'static [Field] = &[Self::DATA];

    fn bits(&self) -> u32 {
        self.0
    }

    fn set_bits(&mut self, value: u32) {
        self.0 = value;
    }

    fn read(&mut self, transport: &mut dyn DmiTransport) -> Result<(), TransportError> {
        tracing::warn!("authentication not supported while reading authdata");
        self.0 = transport.dmi_read(Self::ADDRESS)?;
        Ok(())
    }

    fn write(&mut self, transport: &mut dyn DmiTransport) -> Result<(), TransportError> {
        tracing::warn!("authentication not supported while writing authdata");
        self.0 = transport.dmi_write(Self::ADDRESS, self.0)?;
        Ok(())
    }

    fn reset(&mut self) {
        tracing::warn!("authentication not supported while resetting authdata");
        self.0 = Self::RESET_VALUE;
    }

    fn fmt_expanded(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ data = {:#x} ]", self.data())
    }
}

impl fmt::Display for Authdata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Authdata;
    use crate::{
        dtm::{mock::MockDebugModule, DmiTransport},
        register::{DisplayStyle, DmiRegister},
    };

    #[test]
    fn authdata_getter_and_setter_are_inert() {
        let mut authdata = Authdata::default();

        authdata.set_data(0x1234);

        assert_eq!(authdata.data(), 0);
        assert_eq!(authdata.bits(), 0);
    }

    #[test]
    fn authdata_still_reaches_the_transport() {
        let mut module = MockDebugModule::new();
        let mut authdata = Authdata::default();

        authdata.read(&mut module).unwrap();
        authdata.write(&mut module).unwrap();

        assert_eq!(module.reads_of(Authdata::ADDRESS), 1);
        assert_eq!(module.writes_to(Authdata::ADDRESS), 1);
        module.reset().unwrap();
    }

    #[test]
    fn authdata_expanded_shows_zero() {
        let mut authdata = Authdata::default();
        authdata.set_bits(0x1234_5678);

        assert_eq!(
            authdata.display(DisplayStyle::Expanded).to_string(),
            "[ data = 0x0 ]"
        );
        assert_eq!(
            authdata.display(DisplayStyle::Compact).to_string(),
            "12345678"
        );
    }
}

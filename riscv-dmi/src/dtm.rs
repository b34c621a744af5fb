//! Debug Transport Module (DTM) access
//!
//! The DTM carries DMI read and write cycles to the debug module, usually over
//! JTAG. This crate only needs the three operations of [`DmiTransport`]; the
//! scan chain encoding lives with the implementor.

use std::fmt;

use crate::error::TransportError;

#[cfg(any(test, feature = "test"))]
pub mod mock;

/// Raw access to the `dmi` bus.
pub trait DmiTransport: fmt::Debug {
    /// Read the register at `address` on the `dmi` bus.
    fn dmi_read(&mut self, address: u64) -> Result<u32, TransportError>;

    /// Write `value` to the register at `address` on the `dmi` bus.
    ///
    /// Returns the value acknowledged by the transport. For a JTAG DTM this is
    /// the value the register held before the write, not an echo of `value`.
    fn dmi_write(&mut self, address: u64, value: u32) -> Result<u32, TransportError>;

    /// Reset the transport, clearing any sticky DTM error state.
    fn reset(&mut self) -> Result<(), TransportError>;
}

impl<T: DmiTransport + ?Sized> DmiTransport for Box<T> {
    fn dmi_read(&mut self, address: u64) -> Result<u32, TransportError> {
        (**self).dmi_read(address)
    }

    fn dmi_write(&mut self, address: u64, value: u32) -> Result<u32, TransportError> {
        (**self).dmi_write(address, value)
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        (**self).reset()
    }
}

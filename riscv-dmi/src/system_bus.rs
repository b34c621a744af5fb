//! Memory access through the system bus.
//!
//! A block transfer is split into units of the widest access width that the
//! bus supports and that divides both the start address and the length.
//! `sbautoincrement` advances `sbaddress` after every unit. Reads are
//! started by the `sbaddress0` write and, for all but the last unit, by
//! reading `sbdata0`.

use crate::{
    dmi::Dmi,
    dtm::DmiTransport,
    error::{DmiError, SystemBusErrorKind},
    register::DmiRegister,
    registers::SbAccessWidth,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Read,
    Write,
}

/// Little endian word `index` of a unit buffer.
fn word(unit: &[u8; 16], index: usize) -> u32 {
    let offset = index * 4;
    u32::from_le_bytes([
        unit[offset],
        unit[offset + 1],
        unit[offset + 2],
        unit[offset + 3],
    ])
}

impl<T: DmiTransport> Dmi<T> {
    /// Read `data.len()` bytes starting at `address`.
    pub fn read_mem(&mut self, address: u64, data: &mut [u8]) -> Result<(), DmiError> {
        if data.is_empty() {
            return Ok(());
        }

        let width = self.prepare_system_bus(address, data.len(), Direction::Read)?;
        let bytes = width.bytes();
        let units = data.len() / bytes;

        tracing::debug!(
            "Reading {} bytes at {:#010x} in {} units of {} bytes",
            data.len(),
            address,
            units,
            bytes
        );

        // Starts the first read.
        self.write_system_bus_address(address)?;

        for (index, chunk) in data.chunks_exact_mut(bytes).enumerate() {
            self.wait_for_system_bus(index)?;

            if units > 1 && index + 1 == units {
                // Reading the last unit must not start another read.
                self.sbcs.keep_sticky_errors();
                self.sbcs.set_sbreadondata(false);
                self.sbcs.write(&mut self.transport)?;
            }

            let mut unit = [0u8; 16];

            // sbdata0 last, reading it may start the next access.
            for n in (0..width.words()).rev() {
                self.sbdata.read(n, &mut self.transport)?;
                unit[n * 4..n * 4 + 4].copy_from_slice(&self.sbdata.get(n).to_le_bytes());
            }

            chunk.copy_from_slice(&unit[..bytes]);
        }

        Ok(())
    }

    /// Write `data` starting at `address`.
    pub fn write_mem(&mut self, address: u64, data: &[u8]) -> Result<(), DmiError> {
        if data.is_empty() {
            return Ok(());
        }

        let width = self.prepare_system_bus(address, data.len(), Direction::Write)?;
        let bytes = width.bytes();

        tracing::debug!(
            "Writing {} bytes at {:#010x} in units of {} bytes",
            data.len(),
            address,
            bytes
        );

        self.write_system_bus_address(address)?;

        for (index, chunk) in data.chunks_exact(bytes).enumerate() {
            let mut unit = [0u8; 16];
            unit[..bytes].copy_from_slice(chunk);

            // Writing sbdata0 starts the access, so it goes last.
            for n in (0..width.words()).rev() {
                self.sbdata.set(n, word(&unit, n));
                self.sbdata.write(n, &mut self.transport)?;
            }

            self.wait_for_system_bus(index)?;
        }

        Ok(())
    }

    pub fn read32(&mut self, address: u64) -> Result<u32, DmiError> {
        let mut data = [0u8; 4];
        self.read_mem(address, &mut data)?;
        Ok(u32::from_le_bytes(data))
    }

    pub fn write32(&mut self, address: u64, value: u32) -> Result<(), DmiError> {
        self.write_mem(address, &value.to_le_bytes())
    }

    /// Pick the access width, clear sticky errors and configure `sbcs`.
    fn prepare_system_bus(
        &mut self,
        address: u64,
        length: usize,
        direction: Direction,
    ) -> Result<SbAccessWidth, DmiError> {
        self.poll_system_bus(0)?;

        let sbasize = self.sbcs.sbasize();
        if sbasize == 0 {
            return Err(DmiError::NoSystemBusAccess { address, length });
        }

        let end = u128::from(address) + length as u128;
        if end > 1u128 << sbasize {
            return Err(DmiError::AddressOutOfRange {
                address,
                length,
                sbasize,
            });
        }

        let width = SbAccessWidth::ALL
            .into_iter()
            .find(|width| {
                let bytes = width.bytes();
                self.sbcs.supports(*width)
                    && address % bytes as u64 == 0
                    && length % bytes == 0
            })
            .ok_or(DmiError::NoSystemBusAccess { address, length })?;

        let units = length / width.bytes();
        let stale_errors =
            self.sbcs.sbbusyerror() || self.sbcs.sberror() != SystemBusErrorKind::None;

        self.sbcs.keep_sticky_errors();
        if stale_errors {
            tracing::debug!("Clearing system bus errors left by a previous transfer");
            self.sbcs.clear_sberror();
            self.sbcs.clear_sbbusyerror();
        }

        self.sbcs.set_access_width(width);
        self.sbcs.set_sbautoincrement(units > 1);
        self.sbcs.set_sbreadonaddr(direction == Direction::Read);
        self.sbcs.set_sbreadondata(direction == Direction::Read && units > 1);
        self.sbcs.write(&mut self.transport)?;

        Ok(width)
    }

    fn write_system_bus_address(&mut self, address: u64) -> Result<(), DmiError> {
        if self.sbcs.sbasize() > 32 {
            self.sbaddress.set(1, (address >> 32) as u32);
            self.sbaddress.write(1, &mut self.transport)?;
        }

        self.sbaddress.set(0, address as u32);
        self.sbaddress.write(0, &mut self.transport)?;

        Ok(())
    }

    /// Read `sbcs` until `sbbusy` clears.
    fn poll_system_bus(&mut self, units_transferred: usize) -> Result<(), DmiError> {
        let polls = self.config.system_bus.polls();

        for _ in 0..polls {
            self.sbcs.read(&mut self.transport)?;

            if !self.sbcs.sbbusy() {
                return Ok(());
            }
        }

        tracing::warn!("System bus still busy after {} polls", polls);
        Err(DmiError::SystemBusTimeout {
            polls,
            units_transferred,
        })
    }

    /// Wait for the current access and report its sticky errors.
    fn wait_for_system_bus(&mut self, units_transferred: usize) -> Result<(), DmiError> {
        self.poll_system_bus(units_transferred)?;

        if self.sbcs.sbbusyerror() {
            return Err(DmiError::SystemBusBusy { units_transferred });
        }

        match self.sbcs.sberror() {
            SystemBusErrorKind::None => Ok(()),
            kind => {
                tracing::debug!(
                    "System bus access failed after {} units: {}",
                    units_transferred,
                    kind
                );
                Err(DmiError::SystemBus {
                    kind,
                    units_transferred,
                })
            }
        }
    }
}

//! Shadow registers of the debug module.
//!
//! Every DMI register is modelled as a 32-bit shadow value. The shadow only
//! changes when it is explicitly read from or written through a
//! [`DmiTransport`], reset to its reset value, or modified through one of the
//! field setters before a write. Nothing refreshes it behind the caller's back.

use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use crate::{dtm::DmiTransport, error::TransportError};

/// A named bit field inside a 32-bit register.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    name: &'static str,
    offset: u32,
    width: u32,
    describe: Option<fn(u32) -> &'static str>,
}

impl Field {
    /// A field spanning bits `msb` down to `lsb`, both inclusive.
    pub const fn new(name: &'static str, msb: u32, lsb: u32) -> Self {
        Self {
            name,
            offset: lsb,
            width: msb - lsb + 1,
            describe: None,
        }
    }

    /// Attach a decoder naming the encoded values of this field, used by the
    /// expanded register format.
    pub const fn with_description(self, describe: fn(u32) -> &'static str) -> Self {
        Self {
            describe: Some(describe),
            ..self
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn offset(&self) -> u32 {
        self.offset
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Largest value the field can hold.
    pub const fn max(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1 << self.width) - 1
        }
    }

    /// The field bits in register position.
    pub const fn mask(&self) -> u32 {
        self.max() << self.offset
    }

    pub const fn extract(&self, register: u32) -> u32 {
        (register & self.mask()) >> self.offset
    }

    /// Place `value` into `register`.
    ///
    /// Bits of `value` beyond the field width are dropped, which is reported
    /// through the returned [`FieldUpdate`].
    pub fn insert(&self, register: u32, value: u32) -> (u32, FieldUpdate) {
        let stored = value & self.max();

        let update = if stored == value {
            FieldUpdate::Exact
        } else {
            FieldUpdate::Truncated {
                requested: value,
                stored,
            }
        };

        ((register & !self.mask()) | (stored << self.offset), update)
    }

    fn fmt_value(&self, value: u32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 1 {
            write!(f, "{}", value != 0)
        } else if let Some(describe) = self.describe {
            write!(f, "{value} ({})", describe(value))
        } else {
            write!(f, "{value:#x}")
        }
    }
}

/// Outcome of a field setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    /// The requested value fit into the field.
    Exact,
    /// The requested value was wider than the field and only the low bits were stored.
    Truncated { requested: u32, stored: u32 },
}

impl FieldUpdate {
    pub fn is_truncated(self) -> bool {
        matches!(self, FieldUpdate::Truncated { .. })
    }
}

/// A register of the debug module, addressed on the `dmi` bus.
pub trait DmiRegister: Copy + Sized {
    /// Address of the register on the `dmi` bus.
    const ADDRESS: u64;
    /// Name of the register, as used in the debug specification.
    const NAME: &'static str;
    /// Value of the register after a reset of the debug module.
    const RESET_VALUE: u32;
    /// All fields of the register, most significant first.
    const FIELDS: &'static [Field];

    fn bits(&self) -> u32;

    fn set_bits(&mut self, value: u32);

    fn field(&self, field: Field) -> u32 {
        field.extract(self.bits())
    }

    /// Store `value` in `field`, truncating it to the field width with a warning.
    fn set_field(&mut self, field: Field, value: u32) -> FieldUpdate {
        let (bits, update) = field.insert(self.bits(), value);

        if let FieldUpdate::Truncated { requested, stored } = update {
            tracing::warn!(
                "{:#x} too large for {} field of {}: truncated to {:#x}",
                requested,
                field.name(),
                Self::NAME,
                stored
            );
        }

        self.set_bits(bits);
        update
    }

    fn flag(&self, field: Field) -> bool {
        self.field(field) != 0
    }

    fn set_flag(&mut self, field: Field, flag: bool) {
        self.set_field(field, u32::from(flag));
    }

    /// Replace the shadow value with the current value of the register.
    fn read(&mut self, transport: &mut dyn DmiTransport) -> Result<(), TransportError> {
        let value = transport.dmi_read(Self::ADDRESS)?;
        tracing::trace!("Read {} = {:#010x}", Self::NAME, value);

        self.set_bits(value);
        Ok(())
    }

    /// Write the shadow value to the register.
    ///
    /// The shadow value is replaced by the value acknowledged by the transport,
    /// which for a debug module is the value before the write.
    fn write(&mut self, transport: &mut dyn DmiTransport) -> Result<(), TransportError> {
        let value = self.bits();
        let acknowledged = transport.dmi_write(Self::ADDRESS, value)?;
        tracing::trace!(
            "Wrote {} = {:#010x}, acknowledged {:#010x}",
            Self::NAME,
            value,
            acknowledged
        );

        self.set_bits(acknowledged);
        Ok(())
    }

    /// Set the shadow value to the reset value. The register itself is not touched.
    fn reset(&mut self) {
        self.set_bits(Self::RESET_VALUE);
    }

    /// Write all fields as `[ name = value, ... ]`.
    ///
    /// Registers whose getters do not mirror the raw bits replace this, so the
    /// expanded form always agrees with the getters.
    fn fmt_expanded(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[ ")?;

        for (index, field) in Self::FIELDS.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }

            write!(f, "{} = ", field.name())?;
            field.fmt_value(self.field(*field), f)?;
        }

        f.write_str(" ]")
    }

    fn display(&self, style: DisplayStyle) -> RegisterDisplay<'_, Self> {
        RegisterDisplay {
            register: self,
            style,
        }
    }
}

/// How a register is rendered by [`DmiRegister::display`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayStyle {
    /// The raw value as 8 hex digits.
    #[default]
    Compact,
    /// Every field by name.
    Expanded,
}

pub struct RegisterDisplay<'a, R> {
    register: &'a R,
    style: DisplayStyle,
}

impl<R: DmiRegister> fmt::Display for RegisterDisplay<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            DisplayStyle::Compact => write!(f, "{:08x}", self.register.bits()),
            DisplayStyle::Expanded => self.register.fmt_expanded(f),
        }
    }
}

/// Defines a debug module register with its address, reset value and fields.
macro_rules! dmi_register {
    (@lsb $msb:literal) => {
        $msb
    };
    (@lsb $msb:literal, $lsb:literal) => {
        $lsb
    };
    (
        $(#[$outer:meta])*
        $name:ident, $reg_name:literal, $address:expr, $reset:expr,
        [$($field:ident: $field_name:ident [$msb:literal $(: $lsb:literal)?] $(=> $describe:path)?),* $(,)?]
        $(, expanded = $expanded:path)?
    ) => {
        $(#[$outer])*
        #[derive(Clone, Copy, PartialEq, Eq)]
        pub struct $name(u32);

        impl $name {
            $(
                #[doc = concat!("The `", stringify!($field_name), "` field.")]
                pub const $field: $crate::register::Field = $crate::register::Field::new(
                    stringify!($field_name),
                    $msb,
                    $crate::register::dmi_register!(@lsb $msb $(, $lsb)?),
                )
                $(.with_description($describe))?;
            )*
        }

        impl $crate::register::DmiRegister for $name {
            const ADDRESS: u64 = $address;
            const NAME: &'static str = $reg_name;
            const RESET_VALUE: u32 = $reset;
            const FIELDS: &'static [$crate::register::Field] = &[$(Self::$field),*];

            fn bits(&self) -> u32 {
                self.0
            }

            fn set_bits(&mut self, value: u32) {
                self.0 = value;
            }

            $(
                fn fmt_expanded(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    $expanded(self, f)
                }
            )?
        }

        impl Default for $name {
            fn default() -> Self {
                Self(<Self as $crate::register::DmiRegister>::RESET_VALUE)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(register: $name) -> Self {
                register.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:#010x})", $reg_name, self.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:08x}", self.0)
            }
        }
    };
}

pub(crate) use dmi_register;

/// A fixed size group of plain 32-bit registers, such as `data0` to `data11`.
///
/// Every slot is an independent register. An index past the end of the array
/// never fails: getters return zero and every other access is skipped, each
/// with a warning.
#[derive(Debug, Clone)]
pub struct RegisterArray<const N: usize> {
    name: &'static str,
    addresses: [u64; N],
    values: [u32; N],
}

impl<const N: usize> RegisterArray<N> {
    pub const fn new(name: &'static str, addresses: [u64; N]) -> Self {
        Self {
            name,
            addresses,
            values: [0; N],
        }
    }

    /// An array whose registers occupy consecutive addresses starting at `base`.
    pub const fn contiguous(name: &'static str, base: u64) -> Self {
        let mut addresses = [0; N];
        let mut index = 0;
        while index < N {
            addresses[index] = base + index as u64;
            index += 1;
        }

        Self::new(name, addresses)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn address(&self, n: usize) -> Option<u64> {
        self.addresses.get(n).copied()
    }

    pub fn values(&self) -> &[u32; N] {
        &self.values
    }

    fn slot(&self, n: usize, action: &str) -> Option<usize> {
        if n < N {
            Some(n)
        } else {
            tracing::warn!("{} {}[{}] invalid: ignored", action, self.name, n);
            None
        }
    }

    /// Shadow value of register `n`, or zero if `n` is out of range.
    pub fn get(&self, n: usize) -> u32 {
        match self.values.get(n) {
            Some(value) => *value,
            None => {
                tracing::warn!("getting {}[{}] invalid: zero returned", self.name, n);
                0
            }
        }
    }

    pub fn set(&mut self, n: usize, value: u32) {
        if let Some(n) = self.slot(n, "setting") {
            self.values[n] = value;
        }
    }

    pub fn read(
        &mut self,
        n: usize,
        transport: &mut dyn DmiTransport,
    ) -> Result<(), TransportError> {
        if let Some(n) = self.slot(n, "reading") {
            let value = transport.dmi_read(self.addresses[n])?;
            tracing::trace!("Read {}{} = {:#010x}", self.name, n, value);
            self.values[n] = value;
        }

        Ok(())
    }

    pub fn write(
        &mut self,
        n: usize,
        transport: &mut dyn DmiTransport,
    ) -> Result<(), TransportError> {
        if let Some(n) = self.slot(n, "writing") {
            let value = self.values[n];
            let acknowledged = transport.dmi_write(self.addresses[n], value)?;
            tracing::trace!("Wrote {}{} = {:#010x}", self.name, n, value);
            self.values[n] = acknowledged;
        }

        Ok(())
    }

    pub fn reset(&mut self, n: usize) {
        if let Some(n) = self.slot(n, "resetting") {
            self.values[n] = 0;
        }
    }

    pub fn reset_all(&mut self) {
        self.values = [0; N];
    }
}

impl<const N: usize> fmt::Display for RegisterArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;

        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value:08x}")?;
        }

        f.write_str("]")
    }
}

/// A register bound to the transport of its [`Dmi`](crate::Dmi).
///
/// The handle borrows both, so `read`, `write` and `reset` need no further
/// arguments. Field accessors are reached through `Deref`.
pub struct RegisterHandle<'a, R> {
    register: &'a mut R,
    transport: &'a mut dyn DmiTransport,
}

impl<'a, R: DmiRegister> RegisterHandle<'a, R> {
    pub(crate) fn new(register: &'a mut R, transport: &'a mut dyn DmiTransport) -> Self {
        Self {
            register,
            transport,
        }
    }

    /// Read the register and return the new shadow value.
    pub fn read(&mut self) -> Result<R, TransportError> {
        self.register.read(&mut *self.transport)?;
        Ok(*self.register)
    }

    /// Write the register and return the acknowledged value.
    pub fn write(&mut self) -> Result<R, TransportError> {
        self.register.write(&mut *self.transport)?;
        Ok(*self.register)
    }

    pub fn reset(&mut self) {
        self.register.reset();
    }
}

impl<R> Deref for RegisterHandle<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.register
    }
}

impl<R> DerefMut for RegisterHandle<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.register
    }
}

/// A [`RegisterArray`] bound to the transport of its [`Dmi`](crate::Dmi).
pub struct ArrayHandle<'a, const N: usize> {
    array: &'a mut RegisterArray<N>,
    transport: &'a mut dyn DmiTransport,
}

impl<'a, const N: usize> ArrayHandle<'a, N> {
    pub(crate) fn new(
        array: &'a mut RegisterArray<N>,
        transport: &'a mut dyn DmiTransport,
    ) -> Self {
        Self { array, transport }
    }

    /// Read register `n` and return its new shadow value.
    pub fn read(&mut self, n: usize) -> Result<u32, TransportError> {
        self.array.read(n, &mut *self.transport)?;
        Ok(self.array.values.get(n).copied().unwrap_or_default())
    }

    pub fn write(&mut self, n: usize) -> Result<u32, TransportError> {
        self.array.write(n, &mut *self.transport)?;
        Ok(self.array.values.get(n).copied().unwrap_or_default())
    }

    pub fn reset(&mut self, n: usize) {
        self.array.reset(n);
    }
}

impl<const N: usize> Deref for ArrayHandle<'_, N> {
    type Target = RegisterArray<N>;

    fn deref(&self) -> &RegisterArray<N> {
        self.array
    }
}

impl<const N: usize> DerefMut for ArrayHandle<'_, N> {
    fn deref_mut(&mut self) -> &mut RegisterArray<N> {
        self.array
    }
}

#[cfg(test)]
mod test {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use tracing_subscriber::{layer::Context, prelude::*, Layer};

    use super::{
        ArrayHandle, DisplayStyle, DmiRegister, Field, FieldUpdate, RegisterArray, RegisterHandle,
    };
    use crate::{dtm::DmiTransport, error::TransportError};

    fn describe_mode(value: u32) -> &'static str {
        match value {
            0 => "off",
            _ => "on",
        }
    }

    dmi_register! {
        Sample, "sample", 0x7f, 0x8000_0001,
        [
            HIGH: high [31],
            MODE: mode [11:8] => describe_mode,
            MIDDLE: middle [7:4],
            LOW: low [0],
        ]
    }

    /// Registers that return the previous value on write, like a debug module.
    #[derive(Debug, Default)]
    struct Loopback {
        registers: HashMap<u64, u32>,
        accesses: usize,
    }

    impl DmiTransport for Loopback {
        fn dmi_read(&mut self, address: u64) -> Result<u32, TransportError> {
            self.accesses += 1;
            Ok(self.registers.get(&address).copied().unwrap_or_default())
        }

        fn dmi_write(&mut self, address: u64, value: u32) -> Result<u32, TransportError> {
            self.accesses += 1;
            Ok(self.registers.insert(address, value).unwrap_or_default())
        }

        fn reset(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    /// Counts the warnings emitted while it is the default subscriber.
    #[derive(Clone, Default)]
    struct WarningCounter(Arc<AtomicUsize>);

    impl WarningCounter {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for WarningCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test_case(Field::new("bit", 0, 0), 0x1, 0x1; "single bit")]
    #[test_case(Field::new("nibble", 11, 8), 0xf, 0xf00; "nibble")]
    #[test_case(Field::new("word", 31, 0), u32::MAX, u32::MAX; "whole register")]
    fn field_geometry(field: Field, max: u32, mask: u32) {
        assert_eq!(field.max(), max);
        assert_eq!(field.mask(), mask);
    }

    #[test]
    fn insert_truncates_to_the_field_width() {
        let field = Field::new("sbaccess", 19, 17);

        let (register, update) = field.insert(0, 8);

        assert_eq!(register, 0);
        assert_eq!(
            update,
            FieldUpdate::Truncated {
                requested: 8,
                stored: 0
            }
        );

        let (register, update) = field.insert(0xffff_ffff, 2);
        assert_eq!(register, 0xfff5_ffff);
        assert_eq!(update, FieldUpdate::Exact);
    }

    #[test]
    fn macro_fields_and_reset() {
        let mut sample = Sample::default();
        assert_eq!(sample.bits(), 0x8000_0001);
        assert!(sample.flag(Sample::HIGH));

        assert!(!sample.set_field(Sample::MIDDLE, 0xa).is_truncated());
        assert!(sample.set_field(Sample::MODE, 0x13).is_truncated());
        assert_eq!(sample.field(Sample::MODE), 0x3);
        assert_eq!(sample.bits(), 0x8000_03a1);

        sample.reset();
        assert_eq!(sample.bits(), Sample::RESET_VALUE);
        assert_eq!(Sample::FIELDS.len(), 4);
    }

    #[test]
    fn display_styles() {
        let sample = Sample::from(0x0000_01a0);

        assert_eq!(
            sample.display(DisplayStyle::Compact).to_string(),
            "000001a0"
        );
        assert_eq!(
            sample.display(DisplayStyle::Expanded).to_string(),
            "[ high = false, mode = 1 (on), middle = 0xa, low = false ]"
        );
    }

    #[test]
    fn write_keeps_the_acknowledged_value() {
        let mut transport = Loopback::default();
        transport.registers.insert(0x7f, 0x1234);

        let mut sample = Sample::from(0x5678);
        sample.write(&mut transport).unwrap();
        assert_eq!(sample.bits(), 0x1234);

        sample.read(&mut transport).unwrap();
        assert_eq!(sample.bits(), 0x5678);
    }

    #[test]
    fn handle_binds_transport() {
        let mut transport = Loopback::default();
        let mut sample = Sample::default();

        let mut handle = RegisterHandle::new(&mut sample, &mut transport);
        handle.set_flag(Sample::LOW, false);
        handle.write().unwrap();
        let value = handle.read().unwrap();

        assert_eq!(value.bits(), 0x8000_0000);
        assert_eq!(transport.accesses, 2);
    }

    #[test]
    fn array_out_of_range_is_ignored() {
        let mut transport = Loopback::default();
        let mut data = RegisterArray::<12>::contiguous("data", 0x04);

        data.set(12, 0xdead_beef);
        data.read(12, &mut transport).unwrap();
        data.write(12, &mut transport).unwrap();
        data.reset(12);

        assert_eq!(data.get(12), 0);
        assert_eq!(data.address(11), Some(0x0f));
        assert_eq!(data.address(12), None);
        assert_eq!(transport.accesses, 0);
    }

    #[test]
    fn array_handle_warns_once_per_invalid_access() {
        let warnings = WarningCounter::default();
        let subscriber = tracing_subscriber::registry().with(warnings.clone());

        tracing::subscriber::with_default(subscriber, || {
            let mut transport = Loopback::default();
            let mut data = RegisterArray::<12>::contiguous("data", 0x04);
            let mut handle = ArrayHandle::new(&mut data, &mut transport);

            assert_eq!(handle.read(12).unwrap(), 0);
            assert_eq!(warnings.count(), 1);

            assert_eq!(handle.write(12).unwrap(), 0);
            assert_eq!(warnings.count(), 2);
        });
    }

    #[test]
    fn array_display() {
        let mut sbdata = RegisterArray::<4>::contiguous("sbdata", 0x3c);
        sbdata.set(0, 0xabc);
        sbdata.set(3, 0xffff_ffff);

        assert_eq!(
            sbdata.to_string(),
            "[00000abc, 00000000, 00000000, ffffffff]"
        );
    }
}

//! Digital pin access for the three I/O ports.
//!
//! Each operation is specialized over a port marker type ([`PortB`],
//! [`PortC`], [`PortD`]) and a `const PIN` index in `0..=7`, checked at
//! compile time.  The raw entry points keep the active-low convention this
//! layer has always had: writing `true` clears the output register bit and
//! pulls the line low.  Driver code that expects conventional polarity should
//! go through [`Pin`], which implements the `embedded-hal` digital traits.

use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::pac;
use crate::sealed;

/// Register access for one 8-bit I/O port.
///
/// Implemented by the three port marker types only; there is no fallback
/// port, a type without an impl cannot be named in a pin operation.
pub trait PortOps: sealed::Sealed {
    /// Read-modify-write the port output register (PORTx).
    fn modify_output(f: impl FnOnce(u8) -> u8);
    /// Read the port input register (PINx).
    fn read_input() -> u8;
}

macro_rules! impl_port {
    ($(#[$doc:meta])* $Port:ident, $PERIPH:ident, $out:ident, $inp:ident) => {
        $(#[$doc])*
        pub struct $Port;

        impl sealed::Sealed for $Port {}

        impl PortOps for $Port {
            #[inline(always)]
            fn modify_output(f: impl FnOnce(u8) -> u8) {
                crate::guarded(|| {
                    let port = unsafe { &*pac::$PERIPH::ptr() };
                    port.$out.modify(|r, w| unsafe { w.bits(f(r.bits())) });
                })
            }

            #[inline(always)]
            fn read_input() -> u8 {
                let port = unsafe { &*pac::$PERIPH::ptr() };
                port.$inp.read().bits()
            }
        }
    };
}

impl_port! {
    /// Port B (board pins `D8`-`D13`).
    PortB, PORTB, portb, pinb
}
impl_port! {
    /// Port C (board pins `A0`-`A5`).
    PortC, PORTC, portc, pinc
}
impl_port! {
    /// Port D (board pins `D0`-`D7`).
    PortD, PORTD, portd, pind
}

const fn bit_set(reg: u8, pin: u8) -> u8 {
    reg | (1 << pin)
}

const fn bit_clear(reg: u8, pin: u8) -> u8 {
    reg & !(1 << pin)
}

const fn read_complement(input: u8, pin: u8) -> u8 {
    !(input & (1 << pin))
}

/// Digital write with the level fixed at compile time.
///
/// Active-low: `LEVEL = true` clears bit `PIN` of the port output register
/// and drives the line low, `LEVEL = false` sets the bit.  The level branch
/// is resolved during monomorphization, leaving a single read-modify-write
/// against a constant mask.
///
/// ```no_run
/// use nano_io::pins::{digital_write_const, PortB};
///
/// // Drive D13 (PB5) low.
/// digital_write_const::<PortB, 5, true>();
/// ```
#[inline(always)]
pub fn digital_write_const<P: PortOps, const PIN: u8, const LEVEL: bool>() {
    const { assert!(PIN < 8, "pin index out of range") };
    if LEVEL {
        P::modify_output(|reg| bit_clear(reg, PIN));
    } else {
        P::modify_output(|reg| bit_set(reg, PIN));
    }
}

/// Runtime-valued variant of [`digital_write_const`].
///
/// Same register semantics, with the level decided by a runtime conditional.
#[inline(always)]
pub fn digital_write<P: PortOps, const PIN: u8>(level: bool) {
    const { assert!(PIN < 8, "pin index out of range") };
    P::modify_output(|reg| {
        if level {
            bit_clear(reg, PIN)
        } else {
            bit_set(reg, PIN)
        }
    });
}

/// Read the port input register and return the complement of the masked byte.
///
/// Bit `PIN` of the result is the inverted line state; every other bit reads
/// as set.  The value is only meaningful through `result & (1 << PIN)`, since
/// it is nonzero for both line states.  Kept byte-exact for callers that mask
/// it themselves; the [`Pin`] wrapper is the boolean form.
#[inline(always)]
pub fn digital_read<P: PortOps, const PIN: u8>() -> u8 {
    const { assert!(PIN < 8, "pin index out of range") };
    read_complement(P::read_input(), PIN)
}

/// A single digital pin with conventional electrical polarity.
///
/// Zero-sized; `set_high` sets the output register bit (line high), `is_high`
/// reports the line state as a bool.  `Error` is [`Infallible`]; nothing in a
/// register access can fail.
///
/// ```no_run
/// use embedded_hal::digital::OutputPin;
/// use nano_io::pins::D13;
///
/// let mut led = D13::new();
/// led.set_high().unwrap();
/// ```
pub struct Pin<P: PortOps, const PIN: u8> {
    _port: PhantomData<P>,
}

impl<P: PortOps, const PIN: u8> Pin<P, PIN> {
    pub const fn new() -> Self {
        const { assert!(PIN < 8, "pin index out of range") };
        Self { _port: PhantomData }
    }
}

impl<P: PortOps, const PIN: u8> ErrorType for Pin<P, PIN> {
    type Error = Infallible;
}

impl<P: PortOps, const PIN: u8> OutputPin for Pin<P, PIN> {
    #[inline(always)]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        P::modify_output(|reg| bit_clear(reg, PIN));
        Ok(())
    }

    #[inline(always)]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        P::modify_output(|reg| bit_set(reg, PIN));
        Ok(())
    }
}

impl<P: PortOps, const PIN: u8> InputPin for Pin<P, PIN> {
    #[inline(always)]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(P::read_input() & (1 << PIN) != 0)
    }

    #[inline(always)]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(P::read_input() & (1 << PIN) == 0)
    }
}

/// `RX/D0`
pub type D0 = Pin<PortD, 0>;
/// `TX/D1`
pub type D1 = Pin<PortD, 1>;
/// `D2`
///
/// * INT0 (external interrupt 0)
pub type D2 = Pin<PortD, 2>;
/// `D3`
///
/// * OC2B (Timer2 PWM output B)
pub type D3 = Pin<PortD, 3>;
/// `D4`
pub type D4 = Pin<PortD, 4>;
/// `D5`
///
/// * OC0B (Timer0 PWM output B)
pub type D5 = Pin<PortD, 5>;
/// `D6`
///
/// * OC0A (Timer0 PWM output A)
pub type D6 = Pin<PortD, 6>;
/// `D7`
pub type D7 = Pin<PortD, 7>;
/// `D8`
pub type D8 = Pin<PortB, 0>;
/// `D9`
///
/// * OC1A (Timer1 PWM output A)
pub type D9 = Pin<PortB, 1>;
/// `D10`
///
/// * OC1B (Timer1 PWM output B)
pub type D10 = Pin<PortB, 2>;
/// `D11/MOSI`
///
/// * OC2A (Timer2 PWM output A)
pub type D11 = Pin<PortB, 3>;
/// `D12/MISO`
pub type D12 = Pin<PortB, 4>;
/// `D13/SCK/LED`
pub type D13 = Pin<PortB, 5>;
/// `A0`
pub type A0 = Pin<PortC, 0>;
/// `A1`
pub type A1 = Pin<PortC, 1>;
/// `A2`
pub type A2 = Pin<PortC, 2>;
/// `A3`
pub type A3 = Pin<PortC, 3>;
/// `A4/SDA`
pub type A4 = Pin<PortC, 4>;
/// `A5/SCL`
pub type A5 = Pin<PortC, 5>;

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU8, Ordering};

    // Simulated port: one register byte standing in for PORTx, looped back
    // as PINx.  Each test gets its own backing static so the harness can run
    // tests on separate threads.
    macro_rules! sim_port {
        ($Port:ident, $REG:ident) => {
            static $REG: AtomicU8 = AtomicU8::new(0);
            struct $Port;
            impl crate::sealed::Sealed for $Port {}
            impl PortOps for $Port {
                fn modify_output(f: impl FnOnce(u8) -> u8) {
                    $REG.store(f($REG.load(Ordering::Relaxed)), Ordering::Relaxed);
                }
                fn read_input() -> u8 {
                    $REG.load(Ordering::Relaxed)
                }
            }
        };
    }

    #[test]
    fn const_write_false_sets_register_bit() {
        sim_port!(SimB, SIM_B_REG);

        digital_write_const::<SimB, 3, false>();
        assert_eq!(SIM_B_REG.load(Ordering::Relaxed), 0b0000_1000);

        // Complemented read: every bit set except bit 3.
        assert_eq!(digital_read::<SimB, 3>(), 0b1111_0111);
    }

    #[test]
    fn const_write_true_clears_register_bit() {
        sim_port!(SimB, SIM_B_REG);

        SIM_B_REG.store(0xFF, Ordering::Relaxed);
        digital_write_const::<SimB, 3, true>();
        assert_eq!(SIM_B_REG.load(Ordering::Relaxed), 0b1111_0111);

        // Bit 3 now reads back as zero, so the complement is all ones.
        assert_eq!(digital_read::<SimB, 3>(), 0xFF);
    }

    #[test]
    fn runtime_write_matches_const_write() {
        sim_port!(SimB, SIM_B_REG);
        sim_port!(SimC, SIM_C_REG);

        macro_rules! check_pin {
            ($($pin:literal),*) => {
                $(
                    digital_write_const::<SimB, $pin, false>();
                    digital_write::<SimC, $pin>(false);
                    assert_eq!(
                        SIM_B_REG.load(Ordering::Relaxed),
                        SIM_C_REG.load(Ordering::Relaxed),
                    );
                    digital_write_const::<SimB, $pin, true>();
                    digital_write::<SimC, $pin>(true);
                    assert_eq!(
                        SIM_B_REG.load(Ordering::Relaxed),
                        SIM_C_REG.load(Ordering::Relaxed),
                    );
                )*
            };
        }
        check_pin!(0, 1, 2, 3, 4, 5, 6, 7);
    }

    #[test]
    fn round_trip_all_pins_all_ports() {
        sim_port!(SimB, SIM_B_REG);
        sim_port!(SimC, SIM_C_REG);
        sim_port!(SimD, SIM_D_REG);

        macro_rules! round_trip {
            ($Port:ident; $($pin:literal),*) => {
                $(
                    // Write low (false sets the bit), read back the
                    // complemented-low encoding.
                    digital_write_const::<$Port, $pin, false>();
                    assert_eq!(digital_read::<$Port, $pin>(), !(1u8 << $pin));
                    // Write high (true clears the bit), complement is all ones.
                    digital_write_const::<$Port, $pin, true>();
                    assert_eq!(digital_read::<$Port, $pin>(), 0xFF);
                )*
            };
        }
        round_trip!(SimB; 0, 1, 2, 3, 4, 5, 6, 7);
        round_trip!(SimC; 0, 1, 2, 3, 4, 5, 6, 7);
        round_trip!(SimD; 0, 1, 2, 3, 4, 5, 6, 7);
    }

    #[test]
    fn writes_leave_other_bits_alone() {
        for pin in 0..8u8 {
            let preset = 0b1010_0101;
            let others = !(1u8 << pin);

            let set = bit_set(preset, pin);
            assert_eq!(set & others, preset & others);
            assert_eq!(set & (1 << pin), 1 << pin);

            let cleared = bit_clear(preset, pin);
            assert_eq!(cleared & others, preset & others);
            assert_eq!(cleared & (1 << pin), 0);
        }
    }

    #[test]
    fn read_complement_encoding() {
        for pin in 0..8u8 {
            assert_eq!(read_complement(1 << pin, pin), !(1u8 << pin));
            assert_eq!(read_complement(0x00, pin), 0xFF);
            // Other bits of the input never leak into the result mask.
            assert_eq!(read_complement(!(1u8 << pin), pin), 0xFF);
        }
    }

    #[test]
    fn hal_pin_uses_electrical_polarity() {
        sim_port!(SimB, SIM_B_REG);

        let mut pin: Pin<SimB, 5> = Pin::new();
        pin.set_high().unwrap();
        assert_eq!(SIM_B_REG.load(Ordering::Relaxed), 0b0010_0000);
        assert!(pin.is_high().unwrap());
        assert!(!pin.is_low().unwrap());

        pin.set_low().unwrap();
        assert_eq!(SIM_B_REG.load(Ordering::Relaxed), 0);
        assert!(pin.is_low().unwrap());
    }
}

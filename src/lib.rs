//! Digital pin and PWM timer abstractions for ATmega328P based boards.
//!
//! This crate is the register-poking layer that sits between firmware and the
//! three I/O ports and three timer/counters of the ATmega328P.  Ports, pin
//! numbers and timers are bound at compile time through marker types and
//! const generics, so every pin access monomorphizes down to a single
//! read-modify-write of the right register with a constant mask.  There is no
//! runtime pin table and no runtime port dispatch.
//!
//! What it covers:
//!
//! * digital pin reads and writes, both the raw active-low entry points in
//!   [`pins`] and an [`embedded-hal`] pin wrapper for driver crates,
//! * PWM frequency selection for Timer0/Timer1/Timer2 via the prescaler
//!   tables in [`pwm`],
//! * a millisecond clock in [`clock`] that stays calibrated when the Timer0
//!   prescaler is changed.
//!
//! Pin *direction* (DDR) setup, interrupt vectors and oscillator
//! configuration are left to the surrounding firmware.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//!
//! # Getting Started
//!
//! A rough skeleton for an application looks like this:
//!
//! ```ignore
//! #![no_std]
//! #![no_main]
//!
//! // Pull in the panic handler from panic-halt
//! extern crate panic_halt;
//!
//! use nano_io::prelude::*;
//! use nano_io::{pins, pwm, clock};
//!
//! #[nano_io::entry]
//! fn main() -> ! {
//!     let dp = nano_io::Peripherals::take().unwrap();
//!
//!     // Direction setup stays with the firmware.
//!     dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits(r.bits() | 1 << 5) });
//!
//!     pwm::set_pwm_frequency::<pwm::Timer2>(pwm::PwmFrequency::Hz1k);
//!
//!     loop {
//!         let start = clock::millis();
//!         pins::digital_write_const::<pins::PortB, 5, true>();
//!         while clock::millis().wrapping_sub(start) < 500 {}
//!         pins::digital_write_const::<pins::PortB, 5, false>();
//!         while clock::millis().wrapping_sub(start) < 1000 {}
//!     }
//! }
//! ```
//!
//! The millisecond clock needs to be fed from the firmware's Timer0
//! interrupt; see [`clock`] for the wiring.

#![cfg_attr(not(test), no_std)]

// Expose the peripheral access crate
pub use avr_device::atmega328p as pac;

/// See [`avr_device::entry`](https://docs.rs/avr-device/latest/avr_device/attr.entry.html).
#[cfg(feature = "rt")]
pub use avr_device::entry;

pub use crate::pac::Peripherals;

pub mod clock;
pub mod pins;
pub mod pwm;
pub mod utility;

pub use crate::clock::millis;
pub use crate::pins::{digital_read, digital_write, digital_write_const, Pin, PortB, PortC, PortD};
pub use crate::pwm::{set_pwm_frequency, PwmFrequency, Timer0, Timer1, Timer2};

pub mod prelude {
    pub use embedded_hal::digital::InputPin as _;
    pub use embedded_hal::digital::OutputPin as _;
}

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Run `f` with interrupts masked when the `irqsafe_io` feature is enabled.
///
/// Port and timer updates are read-modify-write sequences; an interrupt
/// handler writing the same register between the read and the write would
/// have its update lost.  Firmware whose handlers share these registers
/// should enable `irqsafe_io`; without it the access is a plain RMW.
#[inline(always)]
pub(crate) fn guarded<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(feature = "irqsafe_io")]
    {
        avr_device::interrupt::free(|_| f())
    }
    #[cfg(not(feature = "irqsafe_io"))]
    {
        f()
    }
}

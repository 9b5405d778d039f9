//! PWM frequency configuration for the three timer/counters.
//!
//! [`set_pwm_frequency`] maps a frequency class onto the clock-select bits of
//! the chosen timer's control register.  Timer0 and Timer1 share one
//! prescaler set (/1, /8, /64, /256, /1024); Timer2 has the extended set with
//! the additional /32 and /128 steps, which is why the same frequency class
//! can resolve to different divider codes:
//!
//! | Frequency class | Timer0/Timer1 | Timer2 |
//! | --- | --- | --- |
//! | `Hz31k` | /1    | /1    |
//! | `Hz4k`  | /8    | /8    |
//! | `Hz1k`  | /8    | /32   |
//! | `Hz488` | /64   | /64   |
//! | `Hz244` | /64   | /128  |
//! | `Hz122` | /256  | /256  |
//! | `Hz30`  | /1024 | /1024 |
//!
//! Only the low 3 bits of TCCRxB are touched; the waveform generation mode
//! set up by the firmware stays as it is.  Timer0 drives the millisecond
//! tick, so reconfiguring it also records the new rate for [`crate::clock`].

use crate::pac;
use crate::sealed;

/// Nominal PWM output frequency classes, highest to lowest.
///
/// The names are the usual 16 MHz board figures; the exact output frequency
/// depends on the waveform mode the firmware has configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmFrequency {
    Hz31k,
    Hz4k,
    Hz1k,
    Hz488,
    Hz244,
    Hz122,
    Hz30,
}

/// Prescaler selection for Timer0 and Timer1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prescaler {
    Direct,
    Prescale8,
    Prescale64,
    Prescale256,
    Prescale1024,
}

impl Prescaler {
    /// Resolve a frequency class against the Timer0/Timer1 table.
    pub const fn from_pwm_frequency(freq: PwmFrequency) -> Self {
        match freq {
            PwmFrequency::Hz31k => Prescaler::Direct,
            PwmFrequency::Hz4k => Prescaler::Prescale8,
            PwmFrequency::Hz1k => Prescaler::Prescale8,
            PwmFrequency::Hz488 => Prescaler::Prescale64,
            PwmFrequency::Hz244 => Prescaler::Prescale64,
            PwmFrequency::Hz122 => Prescaler::Prescale256,
            PwmFrequency::Hz30 => Prescaler::Prescale1024,
        }
    }

    /// Clock-select code, the value of the CS02:CS00 (or CS12:CS10) bits.
    pub const fn cs_bits(self) -> u8 {
        match self {
            Prescaler::Direct => 1,
            Prescaler::Prescale8 => 2,
            Prescaler::Prescale64 => 3,
            Prescaler::Prescale256 => 4,
            Prescaler::Prescale1024 => 5,
        }
    }
}

/// Prescaler selection for Timer2, which has the extended divider set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tc2Prescaler {
    Direct,
    Prescale8,
    Prescale32,
    Prescale64,
    Prescale128,
    Prescale256,
    Prescale1024,
}

impl Tc2Prescaler {
    /// Resolve a frequency class against the Timer2 table.
    pub const fn from_pwm_frequency(freq: PwmFrequency) -> Self {
        match freq {
            PwmFrequency::Hz31k => Tc2Prescaler::Direct,
            PwmFrequency::Hz4k => Tc2Prescaler::Prescale8,
            PwmFrequency::Hz1k => Tc2Prescaler::Prescale32,
            PwmFrequency::Hz488 => Tc2Prescaler::Prescale64,
            PwmFrequency::Hz244 => Tc2Prescaler::Prescale128,
            PwmFrequency::Hz122 => Tc2Prescaler::Prescale256,
            PwmFrequency::Hz30 => Tc2Prescaler::Prescale1024,
        }
    }

    /// Clock-select code, the value of the CS22:CS20 bits.
    pub const fn cs_bits(self) -> u8 {
        match self {
            Tc2Prescaler::Direct => 1,
            Tc2Prescaler::Prescale8 => 2,
            Tc2Prescaler::Prescale32 => 3,
            Tc2Prescaler::Prescale64 => 4,
            Tc2Prescaler::Prescale128 => 5,
            Tc2Prescaler::Prescale256 => 6,
            Tc2Prescaler::Prescale1024 => 7,
        }
    }
}

const CS_MASK: u8 = 0b0000_0111;

/// Replace the clock-select bits of a TCCRxB value, keeping the upper five.
const fn with_cs_bits(reg: u8, cs: u8) -> u8 {
    (reg & !CS_MASK) | (cs & CS_MASK)
}

/// A timer/counter whose PWM frequency can be selected.
pub trait PwmTimer: sealed::Sealed {
    /// Resolve `freq` against this timer's prescaler table and write the
    /// divider into the low three bits of its control register.
    fn set_pwm_frequency(freq: PwmFrequency);
}

/// Timer/Counter0.  Drives the millisecond tick; reconfiguring it updates
/// the [`crate::clock`] scale state as well as TCCR0B.
pub struct Timer0;
/// Timer/Counter1.
pub struct Timer1;
/// Timer/Counter2.
pub struct Timer2;

impl sealed::Sealed for Timer0 {}
impl sealed::Sealed for Timer1 {}
impl sealed::Sealed for Timer2 {}

impl PwmTimer for Timer0 {
    fn set_pwm_frequency(freq: PwmFrequency) {
        let prescale = Prescaler::from_pwm_frequency(freq);
        crate::guarded(|| {
            let tim = unsafe { &*pac::TC0::ptr() };
            tim.tccr0b
                .modify(|r, w| unsafe { w.bits(with_cs_bits(r.bits(), prescale.cs_bits())) });
        });
        // The millisecond counter now advances at a different rate.
        crate::clock::set_millis_prescale(prescale);
    }
}

impl PwmTimer for Timer1 {
    fn set_pwm_frequency(freq: PwmFrequency) {
        let prescale = Prescaler::from_pwm_frequency(freq);
        crate::guarded(|| {
            let tim = unsafe { &*pac::TC1::ptr() };
            tim.tccr1b
                .modify(|r, w| unsafe { w.bits(with_cs_bits(r.bits(), prescale.cs_bits())) });
        });
    }
}

impl PwmTimer for Timer2 {
    fn set_pwm_frequency(freq: PwmFrequency) {
        let prescale = Tc2Prescaler::from_pwm_frequency(freq);
        crate::guarded(|| {
            let tim = unsafe { &*pac::TC2::ptr() };
            tim.tccr2b
                .modify(|r, w| unsafe { w.bits(with_cs_bits(r.bits(), prescale.cs_bits())) });
        });
    }
}

/// Select the PWM frequency of timer `T`.
///
/// ```no_run
/// use nano_io::pwm::{set_pwm_frequency, PwmFrequency, Timer2};
///
/// set_pwm_frequency::<Timer2>(PwmFrequency::Hz1k);
/// ```
#[inline(always)]
pub fn set_pwm_frequency<T: PwmTimer>(freq: PwmFrequency) {
    T::set_pwm_frequency(freq)
}

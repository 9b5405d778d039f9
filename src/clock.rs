//! Millisecond clock, corrected for the Timer0 prescaler.
//!
//! The counter itself is fed by the firmware: hook the Timer0 interrupt and
//! call [`tick`] with the number of milliseconds per overflow, the way the
//! usual `millis()` setups do:
//!
//! ```ignore
//! #[avr_device::interrupt(atmega328p)]
//! fn TIMER0_OVF() {
//!     nano_io::clock::tick(1);
//! }
//! ```
//!
//! Because the tick interrupt is driven by Timer0, changing that timer's
//! prescaler through [`crate::pwm`] changes the tick rate.  [`millis`]
//! compensates: the scale state recorded by the last Timer0 reconfiguration
//! selects a shift that maps the raw count back to real milliseconds,
//! relative to the /64 baseline the counter is calibrated against.

use core::cell::Cell;

use avr_device::interrupt::{self, Mutex};

use crate::pwm::Prescaler;

/// Scale the counter is calibrated against: /64, the identity transform.
const DEFAULT_PRESCALE: Prescaler = Prescaler::Prescale64;

static MILLIS_COUNTER: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));
static MILLIS_PRESCALE: Mutex<Cell<Prescaler>> = Mutex::new(Cell::new(DEFAULT_PRESCALE));

/// Map a raw counter value to milliseconds under the given scale state.
///
/// Left shifts discard the top bits of the raw count; the counter wraps, so
/// callers already have to treat the value as modular.
pub const fn rescale(raw: u32, scale: Prescaler) -> u32 {
    match scale {
        Prescaler::Direct => raw >> 6,
        Prescaler::Prescale8 => raw >> 3,
        Prescaler::Prescale64 => raw,
        Prescaler::Prescale256 => raw << 2,
        Prescaler::Prescale1024 => raw << 4,
    }
}

/// Milliseconds since startup (or the last [`reset`]), rescaled to real
/// milliseconds.
///
/// ```no_run
/// let start = nano_io::clock::millis();
/// while nano_io::clock::millis().wrapping_sub(start) < 500 {}
/// ```
pub fn millis() -> u32 {
    interrupt::free(|cs| {
        rescale(
            MILLIS_COUNTER.borrow(cs).get(),
            MILLIS_PRESCALE.borrow(cs).get(),
        )
    })
}

/// Advance the raw counter.  Call from the firmware's Timer0 interrupt.
pub fn tick(ms: u32) {
    interrupt::free(|cs| {
        let counter = MILLIS_COUNTER.borrow(cs);
        counter.set(counter.get().wrapping_add(ms));
    })
}

/// Zero the raw counter.
pub fn reset() {
    interrupt::free(|cs| MILLIS_COUNTER.borrow(cs).set(0))
}

/// Record the Timer0 prescaler so [`millis`] can compensate for the changed
/// tick rate.  Only Timer0's frequency setter calls this.
pub(crate) fn set_millis_prescale(prescale: Prescaler) {
    interrupt::free(|cs| MILLIS_PRESCALE.borrow(cs).set(prescale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pwm::PwmFrequency;

    #[test]
    fn default_scale_is_identity() {
        assert_eq!(DEFAULT_PRESCALE, Prescaler::Prescale64);
        assert_eq!(rescale(12345, DEFAULT_PRESCALE), 12345);
    }

    #[test]
    fn rescale_matches_shift_table() {
        for raw in [0u32, 1, 800, u32::MAX] {
            assert_eq!(rescale(raw, Prescaler::Direct), raw >> 6);
            assert_eq!(rescale(raw, Prescaler::Prescale8), raw >> 3);
            assert_eq!(rescale(raw, Prescaler::Prescale64), raw);
            assert_eq!(rescale(raw, Prescaler::Prescale256), raw << 2);
            assert_eq!(rescale(raw, Prescaler::Prescale1024), raw << 4);
        }
    }

    #[test]
    fn rescale_boundaries_are_explicit() {
        assert_eq!(rescale(0, Prescaler::Direct), 0);
        assert_eq!(rescale(1, Prescaler::Direct), 0);
        assert_eq!(rescale(1, Prescaler::Prescale1024), 16);
        // Truncation of the top bits on the left shifts.
        assert_eq!(rescale(u32::MAX, Prescaler::Prescale256), 0xFFFF_FFFC);
        assert_eq!(rescale(u32::MAX, Prescaler::Prescale1024), 0xFFFF_FFF0);
        assert_eq!(rescale(u32::MAX, Prescaler::Direct), u32::MAX >> 6);
    }

    #[test]
    fn hz1k_reconfiguration_scales_raw_count() {
        // Timer0 at Hz1k resolves to /8, divider code 2: the tick runs eight
        // times too fast and the raw count is shifted back down.
        let scale = Prescaler::from_pwm_frequency(PwmFrequency::Hz1k);
        assert_eq!(scale.cs_bits(), 2);
        assert_eq!(rescale(800, scale), 100);
    }
}

//! Utility functions for debug builds.

#[cfg(debug_assertions)]
use ufmt::uWrite;

#[cfg(debug_assertions)]
const HEX_CHARS: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
];

/// Write one byte as two hex digits.
#[cfg(debug_assertions)]
pub fn send_hex_byte<W: uWrite>(w: &mut W, b: u8) {
    ufmt::uwrite!(
        w,
        "{}{}",
        HEX_CHARS[((b & 0xF0) >> 4) as usize],
        HEX_CHARS[(b & 0xF) as usize]
    )
    .ok();
}

/// Peek an I/O register by data-space address and write it as hex.
#[cfg(debug_assertions)]
pub fn send_reg<W: uWrite>(w: &mut W, addr: u8) {
    let ptr = addr as *const u8;
    let b = unsafe { core::ptr::read_volatile(ptr) };
    send_hex_byte(w, b);
    ufmt::uwriteln!(w, "\r").ok();
}

/// Write a word as four hex digits.
#[cfg(debug_assertions)]
pub fn send_u16<W: uWrite>(w: &mut W, n: u16) {
    send_hex_byte(w, ((n & 0xFF00) >> 8) as u8);
    send_hex_byte(w, (n & 0xFF) as u8);
    ufmt::uwriteln!(w, "\r").ok();
}

// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! CRC-8 checksum used on every argument and response word.
//!
//! Polynomial 0x31 (x^8 + x^5 + x^4 + 1), initial value 0xFF, MSB first,
//! no reflection and no final XOR.
//! More info regarding the [algorithm](https://en.wikipedia.org/wiki/Computation_of_cyclic_redundancy_checks)

pub const CRC_INIT: u8 = 0xFF;
pub const CRC_POLYNOMIAL: u8 = 0x31;

/// Computes the checksum of `bytes`.
pub fn compute_checksum(bytes: &[u8]) -> u8 {
    let mut rem = CRC_INIT;
    for byte in bytes {
        rem ^= byte;
        for _ in 0..8 {
            if (rem & 0x80) != 0 {
                rem = (rem << 1) ^ CRC_POLYNOMIAL;
            } else {
                rem <<= 1;
            }
        }
    }
    rem
}

/// True iff `received` is the checksum of `bytes`.
pub fn validate(bytes: &[u8], received: u8) -> bool {
    compute_checksum(bytes) == received
}

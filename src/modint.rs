/*!
 * Wraparound arithmetic for the 15-bit teleporter domain.
 *
 * Author: Dave Eddy <ysap@daveeddy.com>
 * Date: December 23, 2025
 * License: MIT
 */

use serde::{Deserialize, Serialize};

/// The architecture's modulus: every value lives in `0..32768`.
pub const MODULUS: u16 = 32768;

/// Wraparound base for all arithmetic in a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modulus(u16);

impl Default for Modulus {
    fn default() -> Self {
        Self(MODULUS)
    }
}

impl Modulus {
    /// Returns `None` unless `2 <= m <= 32768`.
    pub fn new(m: u16) -> Option<Self> {
        if (2..=MODULUS).contains(&m) { Some(Self(m)) } else { None }
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn contains(self, x: u16) -> bool {
        x < self.0
    }

    pub fn reduce(self, x: u32) -> u16 {
        (x % self.0 as u32) as u16
    }

    pub fn add(self, x: u16, y: u16) -> u16 {
        self.reduce(x as u32 + y as u32)
    }

    // decrement by 1 without going negative: 0 wraps to m - 1
    pub fn sub1(self, x: u16) -> u16 {
        self.add(x, self.0 - 1)
    }
}

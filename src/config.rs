/*!
 * Search configuration: defaults reproduce the teleporter puzzle, a JSON file
 * or command line flags can override any of it.
 *
 * Author: Dave Eddy <ysap@daveeddy.com>
 * Date: December 23, 2025
 * License: MIT
 */

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::eval::{Evaluator, Limits, Strategy};
use crate::modint::{MODULUS, Modulus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    /// try every candidate
    #[default]
    Full,
    /// stop at the lowest matching candidate
    FirstMatch,
}

/// Inclusive bounds for the free argument `c`. Without an `end` the scan
/// runs to the top of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanRange {
    pub start: u16,
    pub end: Option<u16>,
}

impl Default for ScanRange {
    fn default() -> Self {
        Self { start: 1, end: None }
    }
}

impl ScanRange {
    pub fn bounds(&self, modulus: Modulus) -> (u16, u16) {
        (self.start, self.end.unwrap_or(modulus.get() - 1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub a0: u16,
    pub b0: u16,
    pub target: u16,
    pub modulus: u32,
    pub range: ScanRange,
    pub mode: ScanMode,
    pub parallel: bool,
    /// worker count for parallel scans, rayon picks when unset
    pub threads: Option<usize>,
    pub memoize: bool,
    pub strategy: Strategy,
    pub limits: Limits,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            a0: 4,
            b0: 1,
            target: 6,
            modulus: MODULUS as u32,
            range: ScanRange::default(),
            mode: ScanMode::default(),
            parallel: false,
            threads: None,
            memoize: true,
            strategy: Strategy::default(),
            limits: Limits::default(),
        }
    }
}

impl SearchConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| {
            ConfigError::Read { path: path.to_path_buf(), source }
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every value against the modulus before anything runs.
    ///
    /// Returns the modulus and the resolved `(start, end)` of the scan.
    pub fn validate(&self) -> Result<(Modulus, (u16, u16)), ConfigError> {
        let modulus = u16::try_from(self.modulus)
            .ok()
            .and_then(Modulus::new)
            .ok_or(ConfigError::Modulus(self.modulus))?;
        let (start, end) = self.range.bounds(modulus);

        let checks = [
            ("a0", self.a0),
            ("b0", self.b0),
            ("target", self.target),
            ("range end", end),
        ];
        for (name, value) in checks {
            if !modulus.contains(value) {
                return Err(ConfigError::OutOfDomain {
                    name,
                    value: value as u32,
                    modulus: modulus.get(),
                });
            }
        }

        if start == 0 {
            return Err(ConfigError::RangeIncludesZero(start));
        }
        if start > end {
            return Err(ConfigError::EmptyRange { start, end });
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Threads);
        }

        Ok((modulus, (start, end)))
    }

    pub fn evaluator(&self, modulus: Modulus) -> Evaluator {
        Evaluator {
            modulus,
            memoize: self.memoize,
            strategy: self.strategy,
            limits: self.limits,
        }
    }
}

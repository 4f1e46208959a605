/*!
 * Errors for the evaluator, the search configuration and the crate as a whole.
 *
 * Author: Dave Eddy <ysap@daveeddy.com>
 * Date: December 23, 2025
 * License: MIT
 */

use std::fmt;
use std::path::PathBuf;

/// Which evaluator budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// pending frames on the explicit work stack
    Frames,
    /// entries in the memo table
    MemoEntries,
    /// total frames processed
    Steps,
    /// native call depth (recursive strategy only)
    Depth,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resource::Frames => "stack frames",
            Resource::MemoEntries => "memo entries",
            Resource::Steps => "steps",
            Resource::Depth => "recursion depth",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("resource exhausted: {resource} exceeded limit of {limit}")]
    ResourceExhausted { resource: Resource, limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("modulus must be between 2 and 32768, got {0}")]
    Modulus(u32),

    #[error("{name} must be below the modulus {modulus}, got {value}")]
    OutOfDomain { name: &'static str, value: u32, modulus: u16 },

    #[error("range {start}..={end} is empty")]
    EmptyRange { start: u16, end: u16 },

    #[error("range start must be at least 1, got {0}")]
    RangeIncludesZero(u16),

    #[error("thread count must be at least 1")]
    Threads,

    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

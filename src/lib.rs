/*!
 * Solving the teleporter puzzle from the 2012 Synacor VM Challenge without
 * the VM: evaluate the confirmation routine directly and scan the eighth
 * register for the value that makes it return 6.
 *
 * Author: Dave Eddy <ysap@daveeddy.com>
 * Date: December 23, 2025
 * License: MIT
 */

pub mod config;
pub mod error;
pub mod eval;
pub mod modint;
pub mod search;

pub use config::{ScanMode, ScanRange, SearchConfig};
pub use error::{ConfigError, Error, EvalError, Resource, Result};
pub use eval::{CallKey, Evaluator, Limits, MemoTable, Outcome, Strategy};
pub use modint::{MODULUS, Modulus};
pub use search::{CancelToken, Progress, Search, SearchResult};

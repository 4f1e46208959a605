/*!
 * The confirmation routine the teleporter runs at address 6049, lifted out of
 * the VM:
 *
 * ```text
 * f(0, b, c) = b + 1
 * f(a, 0, c) = f(a - 1, c, c)
 * f(a, b, c) = f(a - 1, f(a, b - 1, c), c)
 * ```
 *
 * All arithmetic wraps at the modulus. For a fixed `c` the result only
 * depends on `(a, b)` so calls are memoized per trial.
 *
 * Author: Dave Eddy <ysap@daveeddy.com>
 * Date: December 23, 2025
 * License: MIT
 */

use std::collections::HashMap;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Resource};
use crate::modint::Modulus;

/// `(a, b)` - the arguments that vary within a single trial.
pub type CallKey = (u16, u16);

/// Results already computed for one value of `c`. Never reuse a table for a
/// different `c`.
pub type MemoTable = HashMap<CallKey, u16>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// explicit work stack, no native recursion
    #[default]
    Iterative,
    /// native recursion bounded by `Limits::max_depth`, falls back to
    /// `Iterative` when the bound is hit
    Recursive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_frames: usize,
    pub max_memo: usize,
    pub max_steps: usize,
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_frames: 1 << 24,
            max_memo: 1 << 24,
            max_steps: usize::MAX,
            // rayon workers only get 2MB of stack
            max_depth: 2_000,
        }
    }
}

// a pending piece of work on the explicit stack
#[derive(Debug, Clone, Copy)]
enum Frame {
    // evaluate f(a, b) into the return register
    Call(u16, u16),
    // return register holds f(a, b - 1), continue with f(a - 1, ret)
    Resume(u16),
    // return register holds f(a, b), remember it
    Store(u16, u16),
}

/// Result of one evaluation plus how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub value: u16,
    /// the recursive strategy ran out of depth and the work stack finished
    pub fell_back: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    pub modulus: Modulus,
    pub memoize: bool,
    pub strategy: Strategy,
    pub limits: Limits,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Modulus::default())
    }
}

impl Evaluator {
    pub fn new(modulus: Modulus) -> Self {
        Self {
            modulus,
            memoize: true,
            strategy: Strategy::default(),
            limits: Limits::default(),
        }
    }

    /// Evaluate `f(a, b, c)` with a fresh memo table.
    pub fn trial(&self, a: u16, b: u16, c: u16) -> Result<u16, EvalError> {
        self.trial_outcome(a, b, c).map(|o| o.value)
    }

    pub fn trial_outcome(
        &self,
        a: u16,
        b: u16,
        c: u16,
    ) -> Result<Outcome, EvalError> {
        let mut memo = MemoTable::new();
        let outcome = self.evaluate_outcome(a, b, c, &mut memo)?;
        trace!("trial c={} finished with {} memo entries", c, memo.len());
        Ok(outcome)
    }

    /// Evaluate `f(a, b, c)` against a caller supplied memo table.
    ///
    /// The table must only ever have been used with this same `c`, anything
    /// cached for another `c` is silently returned as if it were correct.
    pub fn evaluate(
        &self,
        a: u16,
        b: u16,
        c: u16,
        memo: &mut MemoTable,
    ) -> Result<u16, EvalError> {
        self.evaluate_outcome(a, b, c, memo).map(|o| o.value)
    }

    fn evaluate_outcome(
        &self,
        a: u16,
        b: u16,
        c: u16,
        memo: &mut MemoTable,
    ) -> Result<Outcome, EvalError> {
        let m = self.modulus;
        let a = m.reduce(a as u32);
        let b = m.reduce(b as u32);
        let c = m.reduce(c as u32);

        let (value, fell_back) = match self.strategy {
            Strategy::Iterative => (self.iterate(a, b, c, memo)?, false),
            Strategy::Recursive => match self.recurse(a, b, c, memo, 0) {
                Err(EvalError::ResourceExhausted {
                    resource: Resource::Depth,
                    limit,
                }) => {
                    debug!(
                        "f({}, {}, {}) went deeper than {} calls, \
                         falling back to the work stack",
                        a, b, c, limit
                    );
                    // anything already cached is valid for this c
                    (self.iterate(a, b, c, memo)?, true)
                }
                res => (res?, false),
            },
        };

        Ok(Outcome { value, fell_back })
    }

    fn iterate(
        &self,
        a: u16,
        b: u16,
        c: u16,
        memo: &mut MemoTable,
    ) -> Result<u16, EvalError> {
        let m = self.modulus;
        let limits = &self.limits;

        let mut frames = vec![Frame::Call(a, b)];
        // value of the most recently completed call
        let mut ret = 0;
        let mut steps = 0usize;

        while let Some(frame) = frames.pop() {
            steps += 1;
            if steps > limits.max_steps {
                return Err(exhausted(Resource::Steps, limits.max_steps));
            }

            match frame {
                Frame::Call(a, b) => {
                    if self.memoize {
                        if let Some(&v) = memo.get(&(a, b)) {
                            ret = v;
                            continue;
                        }
                    }

                    if a == 0 {
                        ret = m.add(b, 1);
                        continue;
                    }

                    if self.memoize {
                        frames.push(Frame::Store(a, b));
                    }

                    if b == 0 {
                        frames.push(Frame::Call(m.sub1(a), c));
                    } else {
                        frames.push(Frame::Resume(a));
                        frames.push(Frame::Call(a, m.sub1(b)));
                    }

                    if frames.len() > limits.max_frames {
                        return Err(exhausted(
                            Resource::Frames,
                            limits.max_frames,
                        ));
                    }
                }
                Frame::Resume(a) => {
                    frames.push(Frame::Call(m.sub1(a), ret));
                }
                Frame::Store(a, b) => {
                    trace!("memo ({}, {}) = {}", a, b, ret);
                    memo.insert((a, b), ret);
                    if memo.len() > limits.max_memo {
                        return Err(exhausted(
                            Resource::MemoEntries,
                            limits.max_memo,
                        ));
                    }
                }
            }
        }

        Ok(ret)
    }

    fn recurse(
        &self,
        a: u16,
        b: u16,
        c: u16,
        memo: &mut MemoTable,
        depth: usize,
    ) -> Result<u16, EvalError> {
        if depth > self.limits.max_depth {
            return Err(exhausted(Resource::Depth, self.limits.max_depth));
        }

        let m = self.modulus;

        if a == 0 {
            return Ok(m.add(b, 1));
        }

        if self.memoize {
            if let Some(&v) = memo.get(&(a, b)) {
                return Ok(v);
            }
        }

        let v = if b == 0 {
            self.recurse(m.sub1(a), c, c, memo, depth + 1)?
        } else {
            let inner = self.recurse(a, m.sub1(b), c, memo, depth + 1)?;
            self.recurse(m.sub1(a), inner, c, memo, depth + 1)?
        };

        if self.memoize {
            memo.insert((a, b), v);
            if memo.len() > self.limits.max_memo {
                return Err(exhausted(
                    Resource::MemoEntries,
                    self.limits.max_memo,
                ));
            }
        }

        Ok(v)
    }
}

fn exhausted(resource: Resource, limit: usize) -> EvalError {
    EvalError::ResourceExhausted { resource, limit }
}

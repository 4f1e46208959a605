/*!
 * Scan the free argument `c` looking for values where `f(a0, b0, c)` lands
 * on the target. Every candidate is an independent trial with its own memo
 * table, so the scan can also be spread over a rayon pool.
 *
 * Author: Dave Eddy <ysap@daveeddy.com>
 * Date: December 23, 2025
 * License: MIT
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ScanMode, SearchConfig};
use crate::error::{EvalError, Result};
use crate::eval::Evaluator;

/// Emitted once per candidate and once per match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Trying(u16),
    Matched(u16),
}

/// Stops a running search between candidates.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// satisfying values of `c`, ascending
    pub matches: Vec<u16>,
    /// candidates actually evaluated
    pub tried: usize,
    /// candidates where the recursive strategy fell back to the work stack
    pub fallbacks: usize,
    pub cancelled: bool,
}

pub struct Search {
    config: SearchConfig,
    evaluator: Evaluator,
    // resolved inclusive bounds for c
    start: u16,
    end: u16,
    cancel: CancelToken,
}

// shared between workers for the lifetime of one run
#[derive(Default)]
struct Tally {
    tried: AtomicUsize,
    fallbacks: AtomicUsize,
    // a candidate was passed over because of a cancel
    skipped: AtomicBool,
}

impl Search {
    /// Validates the config, nothing is evaluated until `run`.
    pub fn new(config: SearchConfig) -> Result<Self> {
        let (modulus, (start, end)) = config.validate()?;
        let evaluator = config.evaluator(modulus);
        Ok(Self { config, evaluator, start, end, cancel: CancelToken::new() })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn run(
        &self,
        progress: &(dyn Fn(Progress) + Sync),
    ) -> Result<SearchResult> {
        debug!(
            "searching c={}..={} for f({}, {}, c) == {} (modulus {})",
            self.start,
            self.end,
            self.config.a0,
            self.config.b0,
            self.config.target,
            self.evaluator.modulus.get()
        );

        let tally = Tally::default();
        let matches = if self.config.parallel {
            self.run_parallel(progress, &tally)?
        } else {
            self.run_sequential(progress, &tally)?
        };

        Ok(SearchResult {
            matches,
            tried: tally.tried.into_inner(),
            fallbacks: tally.fallbacks.into_inner(),
            cancelled: tally.skipped.into_inner(),
        })
    }

    fn run_sequential(
        &self,
        progress: &(dyn Fn(Progress) + Sync),
        tally: &Tally,
    ) -> Result<Vec<u16>> {
        let mut matches = vec![];

        for c in self.start..=self.end {
            if self.cancel.is_cancelled() {
                info!("search cancelled before c={}", c);
                tally.skipped.store(true, Ordering::Relaxed);
                break;
            }
            if let Some(c) = self.attempt(c, progress, tally)? {
                matches.push(c);
                if self.config.mode == ScanMode::FirstMatch {
                    break;
                }
            }
        }

        Ok(matches)
    }

    fn run_parallel(
        &self,
        progress: &(dyn Fn(Progress) + Sync),
        tally: &Tally,
    ) -> Result<Vec<u16>> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = self.config.threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build()?;

        let candidates = self.start..=self.end;
        let matches = pool.install(|| -> Result<Vec<u16>, EvalError> {
            match self.config.mode {
                ScanMode::Full => {
                    let found: Vec<Option<u16>> = candidates
                        .into_par_iter()
                        .map(|c| self.attempt(c, progress, tally))
                        .collect::<Result<_, _>>()?;
                    let mut found: Vec<u16> =
                        found.into_iter().flatten().collect();
                    found.sort_unstable();
                    Ok(found)
                }
                ScanMode::FirstMatch => {
                    let first = candidates.into_par_iter().find_map_first(
                        |c| self.attempt(c, progress, tally).transpose(),
                    );
                    first.transpose().map(|c| c.into_iter().collect())
                }
            }
        })?;

        Ok(matches)
    }

    // one trial: Ok(Some(c)) on a match, Ok(None) on a miss or once cancelled
    fn attempt(
        &self,
        c: u16,
        progress: &(dyn Fn(Progress) + Sync),
        tally: &Tally,
    ) -> Result<Option<u16>, EvalError> {
        if self.cancel.is_cancelled() {
            tally.skipped.store(true, Ordering::Relaxed);
            return Ok(None);
        }

        progress(Progress::Trying(c));
        tally.tried.fetch_add(1, Ordering::Relaxed);

        let outcome =
            self.evaluator.trial_outcome(self.config.a0, self.config.b0, c)?;
        let value = outcome.value;
        if outcome.fell_back
            && tally.fallbacks.fetch_add(1, Ordering::Relaxed) == 0
        {
            warn!(
                "c={} went deeper than {} calls, falling back to the work \
                 stack (further fallbacks are counted, not logged)",
                c, self.evaluator.limits.max_depth
            );
        }
        debug!(
            "f({}, {}, {}) = {}",
            self.config.a0, self.config.b0, c, value
        );

        if value == self.config.target {
            info!("c={} produces {}", c, value);
            progress(Progress::Matched(c));
            Ok(Some(c))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::ScanRange;
    use crate::error::{Error, Resource};
    use crate::eval::{Limits, Strategy};

    fn reference(m: u16, a: u16, b: u16, c: u16) -> u16 {
        if a == 0 {
            return (b + 1) % m;
        }
        if b == 0 {
            return reference(m, (a + m - 1) % m, c, c);
        }
        let inner = reference(m, a, (b + m - 1) % m, c);
        reference(m, (a + m - 1) % m, inner, c)
    }

    fn small(a0: u16, b0: u16, target: u16) -> SearchConfig {
        SearchConfig {
            a0,
            b0,
            target,
            modulus: 8,
            range: ScanRange { start: 1, end: Some(7) },
            ..SearchConfig::default()
        }
    }

    fn brute_force(a0: u16, b0: u16, target: u16) -> Vec<u16> {
        (1..8).filter(|&c| reference(8, a0, b0, c) == target).collect()
    }

    #[test]
    fn small_domain_matches_brute_force() {
        for target in 0..8 {
            let search = Search::new(small(4, 1, target)).unwrap();
            let result = search.run(&|_| {}).unwrap();
            assert_eq!(result.matches, brute_force(4, 1, target));
            assert_eq!(result.tried, 7);
            assert!(!result.cancelled);
        }
    }

    #[test]
    fn parallel_agrees_with_sequential() {
        for (a0, b0) in [(2, 3), (3, 1), (4, 1)] {
            for target in 0..8 {
                let seq = Search::new(small(a0, b0, target)).unwrap();
                let par = Search::new(SearchConfig {
                    parallel: true,
                    threads: Some(3),
                    ..small(a0, b0, target)
                })
                .unwrap();
                assert_eq!(
                    seq.run(&|_| {}).unwrap(),
                    par.run(&|_| {}).unwrap()
                );
            }
        }
    }

    #[test]
    fn progress_is_reported_per_candidate() {
        let events = Mutex::new(vec![]);
        let target = reference(8, 4, 1, 3);
        let search = Search::new(small(4, 1, target)).unwrap();
        let result = search
            .run(&|p| events.lock().unwrap().push(p))
            .unwrap();

        let events = events.into_inner().unwrap();
        let tries: Vec<_> = events
            .iter()
            .filter_map(|p| match p {
                Progress::Trying(c) => Some(*c),
                _ => None,
            })
            .collect();
        let hits: Vec<_> = events
            .iter()
            .filter_map(|p| match p {
                Progress::Matched(c) => Some(*c),
                _ => None,
            })
            .collect();

        assert_eq!(tries, (1..8).collect::<Vec<_>>());
        assert_eq!(hits, result.matches);
        assert!(hits.contains(&3));
    }

    #[test]
    fn first_match_stops_early() {
        let target = reference(8, 4, 1, 3);
        let expected = brute_force(4, 1, target);
        let first = expected[0];

        let search = Search::new(SearchConfig {
            mode: ScanMode::FirstMatch,
            ..small(4, 1, target)
        })
        .unwrap();
        let result = search.run(&|_| {}).unwrap();
        assert_eq!(result.matches, vec![first]);
        assert_eq!(result.tried, first as usize);

        let search = Search::new(SearchConfig {
            mode: ScanMode::FirstMatch,
            parallel: true,
            ..small(4, 1, target)
        })
        .unwrap();
        assert_eq!(search.run(&|_| {}).unwrap().matches, vec![first]);
    }

    #[test]
    fn cancel_between_candidates() {
        let search = Search::new(small(4, 1, 0)).unwrap();
        let token = search.cancel_token();
        let result = search
            .run(&|p| {
                if p == Progress::Trying(3) {
                    token.cancel();
                }
            })
            .unwrap();
        assert!(result.cancelled);
        assert_eq!(result.tried, 3);
    }

    #[test]
    fn cancel_after_last_candidate_is_complete() {
        let search = Search::new(small(4, 1, 3)).unwrap();
        let token = search.cancel_token();
        let result = search
            .run(&|p| {
                if p == Progress::Trying(7) {
                    token.cancel();
                }
            })
            .unwrap();
        assert!(!result.cancelled);
        assert_eq!(result.tried, 7);
        assert_eq!(result.matches, brute_force(4, 1, 3));
    }

    #[test]
    fn cancel_before_parallel_run_skips_everything() {
        let search = Search::new(SearchConfig {
            parallel: true,
            ..small(4, 1, 3)
        })
        .unwrap();
        search.cancel_token().cancel();
        let result = search.run(&|_| {}).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.tried, 0);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn small_modulus_scans_whole_domain_by_default() {
        let seen = Mutex::new(vec![]);
        let search = Search::new(SearchConfig {
            modulus: 8,
            target: 3,
            ..SearchConfig::default()
        })
        .unwrap();
        let result = search
            .run(&|p| {
                if let Progress::Trying(c) = p {
                    seen.lock().unwrap().push(c);
                }
            })
            .unwrap();
        assert_eq!(seen.into_inner().unwrap(), (1..8).collect::<Vec<_>>());
        assert_eq!(result.matches, brute_force(4, 1, 3));
    }

    #[test]
    fn recursive_fallbacks_are_counted() {
        let search = Search::new(SearchConfig {
            strategy: Strategy::Recursive,
            limits: Limits { max_depth: 2, ..Limits::default() },
            ..small(4, 1, 3)
        })
        .unwrap();
        let result = search.run(&|_| {}).unwrap();
        assert_eq!(result.fallbacks, 7);
        assert_eq!(result.matches, brute_force(4, 1, 3));

        let search = Search::new(SearchConfig {
            strategy: Strategy::Recursive,
            ..small(4, 1, 3)
        })
        .unwrap();
        assert_eq!(search.run(&|_| {}).unwrap().fallbacks, 0);
    }

    #[test]
    fn eval_errors_abort_the_search() {
        let search = Search::new(SearchConfig {
            memoize: false,
            limits: Limits { max_steps: 100, ..Limits::default() },
            range: ScanRange { start: 1, end: Some(3) },
            ..SearchConfig::default()
        })
        .unwrap();
        let err = search.run(&|_| {}).unwrap_err();
        assert!(matches!(
            err,
            Error::Eval(EvalError::ResourceExhausted {
                resource: Resource::Steps,
                ..
            })
        ));
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let err = Search::new(SearchConfig {
            target: 40000,
            ..SearchConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn finds_the_teleporter_value() {
        let search = Search::new(SearchConfig {
            range: ScanRange { start: 25730, end: Some(25737) },
            ..SearchConfig::default()
        })
        .unwrap();
        let result = search.run(&|_| {}).unwrap();
        assert!(result.matches.contains(&25734));
    }
}

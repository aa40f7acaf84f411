use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::expression::{ExprArena, NodeId};
use crate::generator::CandidateGenerator;
use crate::inputs::SearchInputs;
use crate::solver::config::SearchConfig;
use crate::solver::constants::COMPACT_THRESHOLD;
use crate::solver::errors::SearchError;
use crate::solver::incumbent::{Improvement, Incumbent, SharedIncumbent};
use crate::solver::report::SearchReport;
use crate::solver::score::{Score, distance};

/// Lifecycle of a [`SearchController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Running,
    /// An incumbent within tolerance was found before the deadline
    Completed,
    /// The deadline (or an equivalent stop signal) ended the search
    TimedOut,
    Reported,
}

/// Why the search loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    ToleranceReached,
    DeadlineReached,
    Cancelled,
    IterationLimit,
}

impl TerminationReason {
    fn state(self) -> SearchState {
        match self {
            TerminationReason::ToleranceReached => SearchState::Completed,
            TerminationReason::DeadlineReached
            | TerminationReason::Cancelled
            | TerminationReason::IterationLimit => SearchState::TimedOut,
        }
    }

    /// Combined reason of several chains; an early match outranks the others
    fn merge(self, other: TerminationReason) -> TerminationReason {
        use TerminationReason::*;
        match (self, other) {
            (ToleranceReached, _) | (_, ToleranceReached) => ToleranceReached,
            (Cancelled, _) | (_, Cancelled) => Cancelled,
            (DeadlineReached, _) | (_, DeadlineReached) => DeadlineReached,
            (IterationLimit, IterationLimit) => IterationLimit,
        }
    }
}

/// Cooperative stop signal, treated exactly like an expired deadline
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
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

/// Counters of a finished search, summed over all chains
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Loop iterations, including abandoned attempts
    pub iterations: u64,
    /// Complete trees that were evaluated
    pub candidates: u64,
    /// Abandoned builds plus trees rejected by a domain guard
    pub rejected: u64,
    /// Improvements installed in the shared incumbent
    pub improvements: u64,
    pub chains: usize,
    pub elapsed: Duration,
    /// Shared incumbent history; distances never increase
    pub history: Vec<Improvement>,
}

#[derive(Debug, Clone, Copy, Default)]
struct ChainStats {
    iterations: u64,
    candidates: u64,
    rejected: u64,
    improvements: u64,
}

#[derive(Debug, Clone, Copy)]
struct LocalBest {
    root: NodeId,
    score: Score,
}

/// State shared read-only by every chain
struct ChainContext<'a> {
    inputs: &'a SearchInputs,
    config: &'a SearchConfig,
    shared: &'a SharedIncumbent,
    cancel: &'a CancellationToken,
    /// Raised by the first chain that reaches the tolerance
    eureka: &'a AtomicBool,
    started: Instant,
    deadline: Instant,
}

impl ChainContext<'_> {
    fn should_stop(&self, iterations: u64) -> Option<TerminationReason> {
        if self.eureka.load(Ordering::Relaxed) {
            return Some(TerminationReason::ToleranceReached);
        }
        if self.cancel.is_cancelled() {
            return Some(TerminationReason::Cancelled);
        }
        if Instant::now() >= self.deadline {
            return Some(TerminationReason::DeadlineReached);
        }
        if self.config.max_iterations.is_some_and(|max| iterations >= max) {
            return Some(TerminationReason::IterationLimit);
        }
        None
    }

    fn publish(&self, arena: &ExprArena, best: LocalBest, value: f64, chain: usize) -> bool {
        if !self.shared.may_improve(&best.score) {
            return false;
        }
        let expression = match arena.to_expression(best.root) {
            Ok(expression) => expression,
            Err(e) => {
                warn!("Chain {} could not extract its incumbent: {}", chain, e);
                return false;
            }
        };

        let found_after = self.started.elapsed();
        let installed = self.shared.try_install(Incumbent {
            expression,
            value,
            score: best.score,
            chain,
            found_after,
        });
        if installed {
            info!(
                "Chain {} improved the incumbent to distance {:e} ({} nodes) after {:?}",
                chain, best.score.distance, best.score.size, found_after
            );
        }
        installed
    }
}

/// Rebuild the arena so that it only holds the local incumbent
fn compact(arena: &mut ExprArena, best: &mut Option<LocalBest>, chain: usize) {
    let nodes = arena.len();
    let kept = best
        .as_ref()
        .and_then(|b| arena.to_expression(b.root).ok().map(|e| (e, b.score)));
    arena.clear();
    *best = kept.and_then(|(expression, score)| {
        arena
            .insert_expression(&expression)
            .ok()
            .map(|root| LocalBest { root, score })
    });
    debug!(
        "Chain {} compacted its arena from {} to {} nodes",
        chain,
        nodes,
        arena.len()
    );
}

/// One generate-evaluate-score loop with its own RNG, arena and incumbent
fn run_chain(ctx: &ChainContext<'_>, chain: usize, seed: u64) -> (TerminationReason, ChainStats) {
    debug!("Chain {} starting with seed {}", chain, seed);

    let mut pool = ctx.inputs.pool().clone();
    let mut arena = ExprArena::with_capacity(1024);
    let mut generator =
        CandidateGenerator::new(ctx.inputs.operators(), ChaCha8Rng::seed_from_u64(seed))
            .with_max_size(ctx.config.max_size)
            .with_perturbation_ratio(ctx.config.perturbation_ratio);
    let mut best: Option<LocalBest> = None;
    let mut stats = ChainStats::default();

    let reason = loop {
        if let Some(reason) = ctx.should_stop(stats.iterations) {
            break reason;
        }
        stats.iterations += 1;

        let mark = arena.checkpoint();
        let Some(candidate) =
            generator.next_candidate(&mut arena, &mut pool, best.map(|b| b.root))
        else {
            stats.rejected += 1;
            continue;
        };
        stats.candidates += 1;

        let evaluation = arena.evaluate(candidate.root);
        let score = Score::new(
            distance(evaluation, ctx.config.objective),
            arena.size(candidate.root),
        );
        let current = best.map_or(Score::WORST, |b| b.score);

        let Ok(value) = evaluation else {
            trace!("Candidate rejected: {:?}", evaluation);
            stats.rejected += 1;
            arena.rollback(mark);
            continue;
        };
        if !score.is_better_than(&current) {
            arena.rollback(mark);
            continue;
        }

        let improved = LocalBest {
            root: candidate.root,
            score,
        };
        best = Some(improved);
        if ctx.publish(&arena, improved, value, chain) {
            stats.improvements += 1;
        }

        if score.is_within(ctx.config.tolerance) {
            ctx.eureka.store(true, Ordering::Relaxed);
            break TerminationReason::ToleranceReached;
        }

        if arena.len() > COMPACT_THRESHOLD {
            compact(&mut arena, &mut best, chain);
        }
    };

    debug!(
        "Chain {} stopped ({:?}) after {} iterations, {} candidates, {} rejected",
        chain, reason, stats.iterations, stats.candidates, stats.rejected
    );
    (reason, stats)
}

/// Drives the search: `Idle → Running → {Completed, TimedOut} → Reported`
#[derive(Debug)]
pub struct SearchController {
    inputs: SearchInputs,
    config: SearchConfig,
    state: SearchState,
    cancel: CancellationToken,
    incumbent: SharedIncumbent,
    outcome: Option<(TerminationReason, ChainStats, Duration)>,
}

impl SearchController {
    /// # Errors
    ///
    /// Returns `SearchError::Validation` if the configuration is invalid.
    pub fn new(inputs: SearchInputs, config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            inputs,
            config,
            state: SearchState::Idle,
            cancel: CancellationToken::new(),
            incumbent: SharedIncumbent::new(),
            outcome: None,
        })
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Distance of the best expression found so far
    pub fn best_distance(&self) -> f64 {
        self.incumbent.best_distance()
    }

    /// Run the search until the tolerance is met or the deadline expires.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidState` unless the controller is `Idle`.
    pub fn run(&mut self) -> Result<SearchState, SearchError> {
        if self.state != SearchState::Idle {
            return Err(SearchError::InvalidState(self.state));
        }
        self.state = SearchState::Running;

        let started = Instant::now();
        // Budgets beyond the clock range are effectively unbounded
        let deadline = started
            .checked_add(self.config.deadline)
            .or_else(|| started.checked_add(Duration::from_secs(u64::from(u32::MAX))))
            .unwrap_or(started);
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let threads = self.config.threads;
        info!(
            "Searching for {} within {:e} in {:?} using {} chain(s), seed {}",
            self.config.objective, self.config.tolerance, self.config.deadline, threads, seed
        );

        let eureka = AtomicBool::new(false);
        let ctx = ChainContext {
            inputs: &self.inputs,
            config: &self.config,
            shared: &self.incumbent,
            cancel: &self.cancel,
            eureka: &eureka,
            started,
            deadline,
        };

        let chain_seed = |chain: usize| seed.wrapping_add(chain as u64);
        let results: Vec<(TerminationReason, ChainStats)> = if threads == 1 {
            vec![run_chain(&ctx, 0, chain_seed(0))]
        } else {
            let run_all = || {
                (0..threads)
                    .into_par_iter()
                    .map(|chain| run_chain(&ctx, chain, chain_seed(chain)))
                    .collect()
            };
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(run_all),
                Err(e) => {
                    warn!("Falling back to the global thread pool: {}", e);
                    run_all()
                }
            }
        };

        let mut totals = ChainStats::default();
        let mut reason: Option<TerminationReason> = None;
        for (chain_reason, stats) in results {
            totals.iterations += stats.iterations;
            totals.candidates += stats.candidates;
            totals.rejected += stats.rejected;
            totals.improvements += stats.improvements;
            reason = Some(reason.map_or(chain_reason, |r| r.merge(chain_reason)));
        }
        let reason = reason.unwrap_or(TerminationReason::DeadlineReached);
        let elapsed = started.elapsed();

        self.state = reason.state();
        self.outcome = Some((reason, totals, elapsed));

        info!(
            "Search {:?} after {:?}: {} candidates, best distance {:e}",
            reason,
            elapsed,
            totals.candidates,
            self.incumbent.best_distance()
        );
        Ok(self.state)
    }

    /// Hand the result over to the caller
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidState` unless the search is `Completed`
    /// or `TimedOut`.
    pub fn report(&mut self) -> Result<SearchReport, SearchError> {
        let Some((reason, totals, elapsed)) = self.outcome.take() else {
            return Err(SearchError::InvalidState(self.state));
        };

        let state = self.state;
        let (best, history) = std::mem::take(&mut self.incumbent).into_parts();
        self.state = SearchState::Reported;

        if best.is_none() {
            warn!("Search ended without a valid candidate");
        }

        let stats = SearchStats {
            iterations: totals.iterations,
            candidates: totals.candidates,
            rejected: totals.rejected,
            improvements: totals.improvements,
            chains: self.config.threads,
            elapsed,
            history,
        };
        Ok(SearchReport::new(best, state, reason, stats))
    }
}

/// Validate, run and report a search on the calling thread
///
/// # Errors
///
/// Returns `SearchError::Validation` for invalid parameters.
pub fn search(inputs: SearchInputs, config: SearchConfig) -> Result<SearchReport, SearchError> {
    search_with_cancellation(inputs, config, CancellationToken::new())
}

/// Like [`search`], stopping early once `cancel` is triggered
///
/// # Errors
///
/// Returns `SearchError::Validation` for invalid parameters.
pub fn search_with_cancellation(
    inputs: SearchInputs,
    config: SearchConfig,
    cancel: CancellationToken,
) -> Result<SearchReport, SearchError> {
    let mut controller = SearchController::new(inputs, config)?.with_cancellation(cancel);
    controller.run()?;
    controller.report()
}

#[cfg(test)]
mod tests_inner_helpers {
    use super::TerminationReason::*;

    #[test]
    fn test_merge_prefers_early_match() {
        assert_eq!(DeadlineReached.merge(ToleranceReached), ToleranceReached);
        assert_eq!(IterationLimit.merge(DeadlineReached), DeadlineReached);
        assert_eq!(Cancelled.merge(DeadlineReached), Cancelled);
        assert_eq!(IterationLimit.merge(IterationLimit), IterationLimit);
    }
}

//! Cat swarm engine and its two-phase stepping protocol.
//!
//! ```text
//!            step()                      evaluate(allow_commit)
//! AwaitingStep ─────────▶ AwaitingEval ───────────────────────▶ AwaitingStep
//! ```
//!
//! `evaluate(true)` on success opens the update gate. The next `step()`
//! consumes it: best tracking, the mode's update rule, then boundary
//! correction for the cursor cat, after which the cursor advances. A `step()`
//! with the gate closed is a no-op, except on a deactivated cat, which is
//! skipped so the round-robin never stalls.

use super::best::{error_vector, ConvergenceCriteria};
use super::boundary::BoundaryAction;
use super::seeking_mode::{seek, SeekingInput};
use super::state::{absolute_mean_deviation, CatMode, Phase, SwarmState};
use super::tracing_mode::trace;
use crate::core::config::{Problem, SwarmConfig};
use crate::core::error::SwarmResult;
use crate::core::objective::{checked_evaluate, Constraint, Objective};
use crate::core::reporter::{Reporter, Severity, TracingReporter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// What a call to [`CatSwarm::step`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Gate closed: nothing committed since the last step
    Idle,
    Updated { particle: usize },
    /// Updated, then removed by the invisible boundary policy
    Deactivated { particle: usize },
    SkippedInactive { particle: usize },
}

/// What a call to [`CatSwarm::evaluate`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalOutcome {
    /// Result captured, iteration counted, gate opened
    Committed,
    /// Result visible through `last_values`, gate closed
    Observed,
    /// Objective faulted; nothing changed, caller may retry
    Fault,
    /// Cursor cat is deactivated; objective not called
    Inactive,
}

impl EvalOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EvalOutcome::Committed | EvalOutcome::Observed)
    }
}

/// Cat Swarm Optimization engine
pub struct CatSwarm {
    pub(crate) config: SwarmConfig,
    pub(crate) problem: Problem,
    pub(crate) criteria: ConvergenceCriteria,
    pub(crate) state: SwarmState,
    pub(crate) objective: Box<dyn Objective>,
    pub(crate) constraint: Box<dyn Constraint>,
    pub(crate) reporter: Box<dyn Reporter>,
    pub(crate) rng: StdRng,
}

impl CatSwarm {
    /// Build a swarm that reports through `tracing` and seeds its RNG from
    /// `config.seed` (entropy when unset).
    pub fn new(
        config: SwarmConfig,
        objective: impl Objective + 'static,
        constraint: impl Constraint + 'static,
    ) -> SwarmResult<Self> {
        let rng = rng_for(config.seed);
        Self::with_parts(config, objective, constraint, TracingReporter, rng)
    }

    /// Build a swarm with an explicit reporter and random source.
    ///
    /// Configuration errors are reported once as `Severity::Fatal` and
    /// returned; no engine exists afterwards.
    pub fn with_parts(
        config: SwarmConfig,
        objective: impl Objective + 'static,
        constraint: impl Constraint + 'static,
        reporter: impl Reporter + 'static,
        mut rng: StdRng,
    ) -> SwarmResult<Self> {
        let problem = match config.validate() {
            Ok(problem) => problem,
            Err(e) => {
                reporter.report(Severity::Fatal, &e.to_string());
                return Err(e);
            }
        };

        let state = SwarmState::initialize(
            &problem,
            config.particle_count,
            config.cat.mixture_ratio,
            config.output_size,
            &mut rng,
        );
        let tracing_cats = state
            .modes
            .iter()
            .filter(|m| **m == CatMode::Tracing)
            .count();

        info!(
            "🐈 [CatSwarm] Initialized {} cats in {} dimensions ({} tracing, boundary={:?}, deviation={:.4})",
            state.len(),
            problem.dimensions(),
            tracing_cats,
            config.boundary,
            state.initial_deviation
        );
        reporter.report(Severity::Diagnostic, "swarm successfully initialized");

        Ok(CatSwarm {
            criteria: criteria_for(&config),
            config,
            problem,
            state,
            objective: Box::new(objective),
            constraint: Box::new(constraint),
            reporter: Box::new(reporter),
            rng,
        })
    }

    /// Advance the protocol by one particle.
    ///
    /// Returns an error only when the random boundary policy runs out of
    /// attempts; the cursor has still advanced and the cat sits at its last
    /// valid position.
    pub fn step(&mut self) -> SwarmResult<StepOutcome> {
        let particle = self.state.cursor;
        if self.config.verbose {
            let summary = self.step_summary();
            self.reporter.report(Severity::Diagnostic, &summary);
        }

        let gate = std::mem::replace(&mut self.state.allow_update, false);
        self.state.phase = Phase::AwaitingEval;

        if !self.state.active[particle] {
            self.advance();
            return Ok(StepOutcome::SkippedInactive { particle });
        }
        if !gate {
            return Ok(StepOutcome::Idle);
        }

        let result = self.update_particle(particle);
        self.advance();

        if self.config.verbose && self.complete() {
            let msg = format!(
                "Points: {:?}\nIterations: {}\nFlist: {:?}\nNorm Flist: {}",
                self.state.global_best,
                self.state.iteration,
                self.state.global_best_error,
                self.best_error_norm()
            );
            self.reporter.report(Severity::Diagnostic, &msg);
        }
        result
    }

    /// Evaluate the cursor cat's position.
    pub fn evaluate(&mut self, allow_commit: bool) -> EvalOutcome {
        let particle = self.state.cursor;
        if !self.state.active[particle] {
            self.state.phase = Phase::AwaitingStep;
            return EvalOutcome::Inactive;
        }

        let values = match checked_evaluate(
            self.objective.as_mut(),
            &self.state.positions[particle],
            self.config.output_size,
        ) {
            Some(values) => values,
            None => {
                debug!("[CatSwarm] Objective fault on particle {}", particle);
                return EvalOutcome::Fault;
            }
        };

        self.state.phase = Phase::AwaitingStep;
        if allow_commit {
            self.state.pending_error = error_vector(&self.problem.targets, &values);
            self.state.last_values = values;
            self.state.iteration += 1;
            self.state.allow_update = true;
            EvalOutcome::Committed
        } else {
            self.state.last_values = values;
            self.state.allow_update = false;
            EvalOutcome::Observed
        }
    }

    /// Run the boundary policy on the cursor cat without updating it.
    ///
    /// Lets a driver recover a cat whose position keeps faulting the
    /// objective.
    pub fn correct_current(&mut self) -> SwarmResult<BoundaryAction> {
        let particle = self.state.cursor;
        if !self.state.active[particle] {
            return Ok(BoundaryAction::Kept);
        }
        self.apply_boundary(particle)
    }

    fn update_particle(&mut self, particle: usize) -> SwarmResult<StepOutcome> {
        let error = self.state.pending_error.clone();
        let best = self.state.record_best(particle, &error);
        if best.global {
            debug!(
                "[CatSwarm] New global best from particle {} (norm={:.6e})",
                particle,
                self.state.best_error_norm()
            );
        }

        self.state.last_valid[particle] = self.state.positions[particle].clone();
        let next = match self.state.modes[particle] {
            CatMode::Tracing => trace(
                &self.state.personal_best[particle],
                &self.state.global_best,
                &self.problem.weights,
                &mut self.rng,
            ),
            CatMode::Seeking => {
                let input = SeekingInput {
                    position: &self.state.positions[particle],
                    personal_best: &self.state.personal_best[particle],
                    global_best: &self.state.global_best,
                    targets: &self.problem.targets,
                    cat: &self.config.cat,
                };
                seek(&input, self.objective.as_mut(), &mut self.rng)
            }
        };
        self.state.positions[particle] = next;

        match self.apply_boundary(particle)? {
            BoundaryAction::Deactivated => Ok(StepOutcome::Deactivated { particle }),
            _ => Ok(StepOutcome::Updated { particle }),
        }
    }

    fn advance(&mut self) {
        self.state.cursor = (self.state.cursor + 1) % self.state.len();
    }

    fn step_summary(&self) -> String {
        let particle = self.state.cursor;
        format!(
            "STEP #{}\nCurrent Particle: {}\nCurrent Particle Location: {:?}\nCurrent Seeking/Tracing Status: {:?}\nAbsolute mean deviation: {:.6}",
            self.state.iteration,
            particle,
            self.state.positions[particle],
            self.state.modes[particle],
            self.absolute_mean_deviation()
        )
    }

    // ── Termination ─────────────────────────────────────────────────────────

    pub fn converged(&self) -> bool {
        self.criteria.converged(&self.state)
    }

    pub fn maxed(&self) -> bool {
        self.criteria.maxed(&self.state)
    }

    pub fn complete(&self) -> bool {
        self.criteria.complete(&self.state)
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn current_particle(&self) -> usize {
        self.state.cursor
    }

    /// Position the next `evaluate` will score
    pub fn current_position(&self) -> &[f64] {
        &self.state.positions[self.state.cursor]
    }

    /// (iteration, global best error norm) for progress reporting
    pub fn convergence_data(&self) -> (u64, f64) {
        (self.state.iteration, self.best_error_norm())
    }

    pub fn best_position(&self) -> &[f64] {
        &self.state.global_best
    }

    /// Global best |targets - values|
    pub fn best_error(&self) -> &[f64] {
        &self.state.global_best_error
    }

    pub fn best_error_norm(&self) -> f64 {
        self.state.best_error_norm()
    }

    pub fn last_values(&self) -> &[f64] {
        &self.state.last_values
    }

    pub fn iteration(&self) -> u64 {
        self.state.iteration
    }

    pub fn positions(&self) -> &[Vec<f64>] {
        &self.state.positions
    }

    /// # Panics
    ///
    /// If `particle >= particle_count()`.
    pub fn personal_best(&self, particle: usize) -> &[f64] {
        &self.state.personal_best[particle]
    }

    pub fn modes(&self) -> &[CatMode] {
        &self.state.modes
    }

    /// # Panics
    ///
    /// If `particle >= particle_count()`.
    pub fn is_active(&self, particle: usize) -> bool {
        self.state.active[particle]
    }

    pub fn active_count(&self) -> usize {
        self.state.active.iter().filter(|a| **a).count()
    }

    pub fn particle_count(&self) -> usize {
        self.state.len()
    }

    pub fn absolute_mean_deviation(&self) -> f64 {
        absolute_mean_deviation(&self.state.positions)
    }

    pub fn initial_deviation(&self) -> f64 {
        self.state.initial_deviation
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn state(&self) -> &SwarmState {
        &self.state
    }

    /// Replace the random source.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

pub(crate) fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn criteria_for(config: &SwarmConfig) -> ConvergenceCriteria {
    ConvergenceCriteria {
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BoundaryPolicy;
    use crate::core::error::SwarmError;
    use crate::core::objective::Unconstrained;
    use crate::core::reporter::RecordingReporter;
    use crate::utils::benchmark::himmelblau;

    fn config(n: usize) -> SwarmConfig {
        SwarmConfig {
            particle_count: n,
            seed: Some(42),
            ..SwarmConfig::default()
        }
    }

    fn swarm(n: usize) -> CatSwarm {
        CatSwarm::new(config(n), himmelblau, Unconstrained).unwrap()
    }

    #[test]
    fn bad_bounds_are_reported_once_and_nothing_is_built() {
        let sink = RecordingReporter::new();
        let mut cfg = config(4);
        cfg.upper_bounds = vec![1.0, 2.0, 3.0];
        let result = CatSwarm::with_parts(
            cfg,
            himmelblau,
            Unconstrained,
            sink.clone(),
            StdRng::seed_from_u64(0),
        );

        assert!(matches!(result, Err(SwarmError::BoundShape { .. })));
        assert_eq!(sink.count(Severity::Fatal), 1);
        assert!(result.err().map(|e| e.is_fatal_config()).unwrap_or(false));
    }

    #[test]
    fn unknown_boundary_selector_is_fatal() {
        let json = r#"{"lower_bounds": [0.0], "upper_bounds": [1.0], "boundary": 0}"#;
        let err = SwarmConfig::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("no boundary is set"));
    }

    #[test]
    fn step_without_evaluation_is_a_no_op() {
        let mut s = swarm(4);
        let before = s.positions().to_vec();
        for _ in 0..5 {
            assert_eq!(s.step().unwrap(), StepOutcome::Idle);
        }
        assert_eq!(s.positions(), &before[..]);
        assert_eq!(s.current_particle(), 0);
        assert_eq!(s.phase(), Phase::AwaitingEval);
    }

    #[test]
    fn committed_evaluation_opens_gate_for_exactly_one_step() {
        let mut s = swarm(3);
        assert_eq!(s.evaluate(true), EvalOutcome::Committed);
        assert_eq!(s.iteration(), 1);
        assert_eq!(s.phase(), Phase::AwaitingStep);

        assert_eq!(s.step().unwrap(), StepOutcome::Updated { particle: 0 });
        assert_eq!(s.current_particle(), 1);
        assert!(s.best_error_norm() < crate::swarm::best::SENTINEL);

        assert_eq!(s.step().unwrap(), StepOutcome::Idle);
        assert_eq!(s.current_particle(), 1);
    }

    #[test]
    fn observed_evaluation_does_not_count_or_commit() {
        let mut s = swarm(2);
        assert_eq!(s.evaluate(false), EvalOutcome::Observed);
        assert_eq!(s.iteration(), 0);
        assert_eq!(s.last_values().len(), 1);
        assert_eq!(s.step().unwrap(), StepOutcome::Idle);
    }

    #[test]
    fn faulting_objective_changes_nothing() {
        let mut s = CatSwarm::new(config(2), |_: &[f64], _: usize| None, Unconstrained).unwrap();
        let snapshot = s.state().clone();
        assert_eq!(s.evaluate(true), EvalOutcome::Fault);
        assert!(!EvalOutcome::Fault.is_success());
        assert_eq!(s.state(), &snapshot);
    }

    #[test]
    fn cursor_wraps_after_last_particle() {
        let mut s = swarm(3);
        let mut visited = Vec::new();
        for _ in 0..7 {
            visited.push(s.current_particle());
            s.evaluate(true);
            s.step().unwrap();
        }
        assert_eq!(visited, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(s.iteration(), 7);
    }

    #[test]
    fn global_best_norm_is_non_increasing() {
        let mut s = swarm(8);
        let mut last = s.best_error_norm();
        for _ in 0..400 {
            s.step().unwrap();
            s.evaluate(true);
            let (_, norm) = s.convergence_data();
            assert!(norm <= last);
            last = norm;
        }
    }

    #[test]
    fn lone_cat_seeks() {
        let s = CatSwarm::new(
            SwarmConfig {
                cat: crate::core::config::CatConfig {
                    mixture_ratio: 1.0,
                    ..Default::default()
                },
                ..config(1)
            },
            himmelblau,
            Unconstrained,
        )
        .unwrap();
        assert_eq!(s.modes(), &[CatMode::Seeking]);
    }

    #[test]
    fn deactivated_cats_are_skipped_not_stalled() {
        let mut cfg = config(3);
        cfg.boundary = BoundaryPolicy::Invisible;
        let mut s = CatSwarm::new(cfg, himmelblau, Unconstrained).unwrap();
        s.state.active[1] = false;

        s.evaluate(true);
        s.step().unwrap();
        assert_eq!(s.current_particle(), 1);
        assert_eq!(s.evaluate(true), EvalOutcome::Inactive);
        assert_eq!(s.step().unwrap(), StepOutcome::SkippedInactive { particle: 1 });
        assert_eq!(s.current_particle(), 2);
        assert_eq!(s.active_count(), 2);
    }

    #[test]
    fn verbose_mode_reports_each_step() {
        let sink = RecordingReporter::new();
        let mut cfg = config(2);
        cfg.verbose = true;
        let mut s = CatSwarm::with_parts(
            cfg,
            himmelblau,
            Unconstrained,
            sink.clone(),
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        sink.drain();

        s.step().unwrap();
        s.evaluate(true);
        s.step().unwrap();
        let messages = sink.drain();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].1.starts_with("STEP #0"));
    }

    #[test]
    #[should_panic]
    fn personal_best_out_of_range_panics() {
        let s = swarm(3);
        let _ = s.personal_best(3);
    }

    #[test]
    #[should_panic]
    fn is_active_out_of_range_panics() {
        let s = swarm(3);
        let _ = s.is_active(7);
    }
}

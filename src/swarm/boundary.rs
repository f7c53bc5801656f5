//! Boundary correction.
//!
//! A position is admissible when it is inside the box, the constraint admits
//! it and the objective evaluates it without a fault. The objective check is
//! skipped when either of the cheaper checks already failed.

use super::engine::CatSwarm;
use super::state::uniform_in_box;
use crate::core::config::BoundaryPolicy;
use crate::core::error::{SwarmError, SwarmResult};
use crate::core::objective::checked_evaluate;
use crate::core::reporter::Severity;
use tracing::{debug, info};

/// What boundary correction did to a cat
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryAction {
    Kept,
    Resampled { attempts: usize },
    Reverted,
    Deactivated,
}

impl CatSwarm {
    pub(crate) fn apply_boundary(&mut self, particle: usize) -> SwarmResult<BoundaryAction> {
        match self.config.boundary {
            BoundaryPolicy::Random => self.random_bound(particle),
            // Absorbing uses the reflecting rule.
            BoundaryPolicy::Reflecting | BoundaryPolicy::Absorbing => {
                self.reflecting_bound(particle)
            }
            BoundaryPolicy::Invisible => Ok(self.invisible_bound(particle)),
        }
    }

    /// Full admissibility check of a cat's current position.
    pub fn is_admissible(&mut self, particle: usize) -> bool {
        let position = &self.state.positions[particle];
        self.problem.in_bounds(position)
            && self.constraint.admits(position)
            && checked_evaluate(self.objective.as_mut(), position, self.config.output_size)
                .is_some()
    }

    fn random_bound(&mut self, particle: usize) -> SwarmResult<BoundaryAction> {
        if self.is_admissible(particle) {
            return Ok(BoundaryAction::Kept);
        }

        let budget = self.config.max_resample_attempts;
        for attempt in 1..=budget {
            self.state.positions[particle] = uniform_in_box(&self.problem, &mut self.rng);
            if self.is_admissible(particle) {
                debug!(
                    "[Boundary] Particle {} resampled after {} attempt(s)",
                    particle, attempt
                );
                return Ok(BoundaryAction::Resampled { attempts: attempt });
            }
        }

        self.state.positions[particle] = self.state.last_valid[particle].clone();
        let err = SwarmError::ResampleExhausted {
            particle,
            attempts: budget,
        };
        self.reporter.report(Severity::Warning, &err.to_string());
        Err(err)
    }

    fn reflecting_bound(&mut self, particle: usize) -> SwarmResult<BoundaryAction> {
        let position = &self.state.positions[particle];
        let inside = self.problem.in_bounds(position);
        if !self.constraint.admits(position) {
            return self.random_bound(particle);
        }
        if inside {
            // Bounds and constraint hold; only objective validity is left.
            return match checked_evaluate(
                self.objective.as_mut(),
                &self.state.positions[particle],
                self.config.output_size,
            ) {
                Some(_) => Ok(BoundaryAction::Kept),
                None => self.random_bound(particle),
            };
        }

        self.state.positions[particle] = self.state.last_valid[particle].clone();
        if self.is_admissible(particle) {
            Ok(BoundaryAction::Reverted)
        } else {
            self.random_bound(particle)
        }
    }

    fn invisible_bound(&mut self, particle: usize) -> BoundaryAction {
        if self.is_admissible(particle) {
            return BoundaryAction::Kept;
        }
        self.state.active[particle] = false;
        info!(
            "👻 [Boundary] Particle {} left the admissible region and is now inactive ({} remain)",
            particle,
            self.active_count()
        );
        BoundaryAction::Deactivated
    }
}

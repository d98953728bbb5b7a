//! Boolean satisfiability solver.
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use anyhow::Error;
use log::info;
use thiserror::Error as ThisError;

use coresat_formula::CnfFormula;
use crate::clause::{assess::select_tier, db, ClauseHeader};
use crate::config::SolverConfigUpdate;
use crate::context::{
    config_changed, ensure_var_count, AssignmentP, Context, IncrementalP, SolverConfigP,
    SolverStateP,
};
use coresat_dimacs::DimacsParser;
use coresat_formula::{Lit, Var};
use crate::incremental::set_assumptions;
use crate::load::load_clause;
use crate::schedule::schedule_step;
use crate::state::SatState;

/// Errors produced while adding clauses or searching for a solution.
///
/// These are returned wrapped in an [`anyhow::Error`]; callers that need to distinguish an
/// interrupted search from other failures can `downcast_ref` on it.
#[derive(Debug, ThisError)]
pub enum SolverError {
    /// The search was aborted via the cooperative interrupt flag before reaching a result.
    ///
    /// The solver remains in a consistent state at decision level 0 and can be resumed with
    /// another call to [`Solver::solve`].
    #[error("interrupted")]
    Interrupted,
    /// A literal names a variable that was never created, or a clause was added while a decision
    /// was in progress.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// A handle that requests cooperative cancellation of a [`Solver`]'s search.
///
/// Cloning shares the same underlying flag, so a handle obtained before spawning a thread (for a
/// timeout, a signal handler, or a portfolio coordinator) stays effective for the lifetime of the
/// solver that produced it.
#[derive(Clone, Default)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    /// Request that the search stop as soon as it can observe the flag.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    fn clear(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

/// A boolean satisfiability solver.
pub struct Solver {
    ctx: Box<Context>,
    interrupt: InterruptHandle,
}

impl Default for Solver {
    fn default() -> Solver {
        Solver {
            ctx: Box::new(Context::default()),
            interrupt: InterruptHandle::default(),
        }
    }
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Apply a partial configuration update.
    pub fn config(&mut self, update: &SolverConfigUpdate) -> Result<(), Error> {
        let mut ctx = self.ctx.into_partial_ref_mut();
        update.apply_to(ctx.part_mut(SolverConfigP));
        config_changed(ctx.borrow(), update);
        Ok(())
    }

    /// A cloneable handle that can cancel the search from any thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Allocate and return a fresh variable.
    pub fn new_var(&mut self) -> Var {
        let mut ctx = self.ctx.into_partial_ref_mut();
        let count = ctx.part(AssignmentP).assignment().len();
        ensure_var_count(ctx.borrow(), count + 1);
        Var::from_index(count)
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Add a clause, extending the variable count if necessary.
    ///
    /// Returns `false` iff adding the clause made the formula unsatisfiable.
    pub fn add_clause(&mut self, lits: &[Lit]) -> bool {
        let mut ctx = self.ctx.into_partial_ref_mut();
        let max_var_index = lits.iter().map(|lit| lit.var().index()).max();
        if let Some(max_var_index) = max_var_index {
            ensure_var_count(ctx.borrow(), max_var_index + 1);
        }
        load_clause(ctx.borrow(), lits);
        ctx.part(SolverStateP).sat_state != SatState::Unsat
    }

    /// Add a clause produced by external inprocessing or a portfolio peer, placing it directly
    /// into the learned clause tiers according to its glue.
    ///
    /// Identical to [`add_clause`](Solver::add_clause) for clauses short enough to be stored
    /// inline (unit or binary); longer clauses skip the Irred tier that fresh input clauses use.
    pub fn add_learned_clause(&mut self, lits: &[Lit], glue: usize) -> bool {
        if lits.len() < 3 {
            return self.add_clause(lits);
        }

        let mut ctx = self.ctx.into_partial_ref_mut();
        let max_var_index = lits.iter().map(|lit| lit.var().index()).max();
        if let Some(max_var_index) = max_var_index {
            ensure_var_count(ctx.borrow(), max_var_index + 1);
        }

        if ctx.part(SolverStateP).sat_state == SatState::Unsat {
            return false;
        }

        let mut header = ClauseHeader::new();
        header.set_glue(glue);
        header.set_tier(select_tier(glue));
        db::add_clause(ctx.borrow(), header, lits);

        true
    }

    /// Reads and adds a formula in DIMACS CNF format.
    ///
    /// Using this avoids creating a temporary [`CnfFormula`].
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = DimacsParser::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);

            self.add_formula(&parser.take_formula());
        }
        parser.eof()?;
        self.add_formula(&parser.take_formula());
        parser.check_header()?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// Restrict the search to assignments extending `assumptions`.
    ///
    /// Takes effect on the next call to [`solve`](Solver::solve). Passing an empty slice clears
    /// any previously set assumptions.
    pub fn assume(&mut self, assumptions: &[Lit]) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        set_assumptions(ctx.borrow(), assumptions);
    }

    /// Subset of the assumptions responsible for unsatisfiability.
    ///
    /// Only meaningful after [`solve`](Solver::solve) returned `Ok(false)` with assumptions set.
    pub fn final_conflict(&self) -> Vec<Lit> {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(IncrementalP).failed_core().to_owned()
    }

    /// Removes satisfied clauses and falsified literals from the database.
    ///
    /// Only valid at decision level 0; a no-op while assumptions or decisions are pending.
    pub fn simplify(&mut self) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        crate::simplify::simplify(ctx.borrow());
    }

    /// Check the satisfiability of the current formula under the current assumptions.
    ///
    /// Returns `Ok(true)` for SAT, `Ok(false)` for UNSAT (or UNSAT under the current
    /// assumptions — see [`final_conflict`](Solver::final_conflict)), and
    /// `Err(SolverError::Interrupted)` if [`interrupt_handle`](Solver::interrupt_handle) was
    /// triggered before a result was reached. The interrupt flag is checked between conflicts,
    /// and is cleared at the start of every call so a fresh `solve` is never born pre-interrupted.
    pub fn solve(&mut self) -> Result<bool, Error> {
        self.interrupt.clear();

        let mut ctx = self.ctx.into_partial_ref_mut();

        while ctx.part(SolverStateP).sat_state == SatState::Unknown {
            if self.interrupt.is_set() {
                return Err(SolverError::Interrupted.into());
            }
            if !schedule_step(ctx.borrow()) {
                break;
            }
        }

        match ctx.part(SolverStateP).sat_state {
            SatState::Unknown => Err(SolverError::Interrupted.into()),
            SatState::Sat => Ok(true),
            SatState::Unsat | SatState::UnsatUnderAssumptions => Ok(false),
        }
    }

    /// Set of literals that satisfy the formula.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let mut ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state == SatState::Sat {
            Some(
                ctx.part(AssignmentP)
                    .assignment()
                    .iter()
                    .enumerate()
                    .flat_map(|(index, assignment)| {
                        assignment.map(|polarity| Lit::from_var(Var::from_index(index), !polarity))
                    })
                    .collect(),
            )
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use coresat_formula::CnfFormula;
    use coresat_dimacs::write_dimacs;

    use crate::test::{sat_formula, sgen_unsat_formula};

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..7usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve().unwrap(), false);
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve().unwrap(), true);

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert_eq!(solver.solve().unwrap(), true);

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sgen_unsat_incremetal_clauses(formula in sgen_unsat_formula(1..7usize)) {
            let mut solver = Solver::new();

            let mut last_state = true;

            for clause in formula.iter() {
                let single_clause = CnfFormula::from(Some(clause));
                solver.add_formula(&single_clause);

                let state = solver.solve().unwrap();
                if state != last_state {
                    prop_assert_eq!(state, false);
                    prop_assert_eq!(last_state, true);
                    last_state = state;
                }
            }

            prop_assert_eq!(last_state, false);
        }

        #[test]
        fn interrupt_before_solve_is_observed(formula in sgen_unsat_formula(3..7usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            solver.interrupt_handle().interrupt();

            let err = solver.solve().unwrap_err();
            prop_assert!(matches!(
                err.downcast_ref::<SolverError>(),
                Some(SolverError::Interrupted)
            ));
        }

        #[test]
        fn interrupt_handle_resets_between_solves(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            let interrupt = solver.interrupt_handle();
            interrupt.interrupt();

            prop_assert!(solver.solve().is_err());

            prop_assert_eq!(solver.solve().unwrap(), true);
        }
    }

}

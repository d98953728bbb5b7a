//! Binary clauses.

use partial_ref::{partial, PartialRef};

use coresat_formula::{Lit, Var};

use crate::context::{AssignmentP, BinaryClausesP, Context};

/// Binary clauses.
#[derive(Default)]
pub struct BinaryClauses {
    by_lit: Vec<Vec<Lit>>,
    count: usize,
}

impl BinaryClauses {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.by_lit.resize(count * 2, vec![]);
    }

    /// Add a binary clause.
    pub fn add_binary_clause(&mut self, lits: [Lit; 2]) {
        for i in 0..2 {
            self.by_lit[(!lits[i]).code()].push(lits[i ^ 1]);
        }
        self.count += 1;
    }

    /// Implications of a given literal
    pub fn implied(&self, lit: Lit) -> &[Lit] {
        &self.by_lit[lit.code()]
    }

    /// Number of binary clauses.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Drop all implications involving a permanently assigned literal.
    ///
    /// Both directions of implications on `lit` are satisfied once `lit` is true at level 0, so
    /// the list can be dropped entirely.
    fn remove_satisfied(&mut self, lit: Lit) {
        self.count -= self.by_lit[lit.code()].len() + self.by_lit[(!lit).code()].len();
        self.by_lit[lit.code()].clear();
        self.by_lit[(!lit).code()].clear();
    }
}

/// Remove binary clauses satisfied by the current top level assignment.
///
/// Only clears entries keyed by an assigned literal itself; stale references to it left in other
/// literals' lists are harmless, as [`propagate_binary`](crate::prop::propagate_binary) skips
/// already satisfied implications.
pub fn simplify_binary(mut ctx: partial!(Context, mut BinaryClausesP, AssignmentP)) {
    let (binary_clauses, ctx) = ctx.split_part_mut(BinaryClausesP);
    let assignment = ctx.part(AssignmentP);

    for index in 0..assignment.assignment().len() {
        let var = Var::from_index(index);
        if let Some(value) = assignment.var_value(var) {
            binary_clauses.remove_satisfied(Lit::from_var(var, !value));
        }
    }
}

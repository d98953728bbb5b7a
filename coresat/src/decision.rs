//! Decision heuristics.
pub mod vsids;

use partial_ref::{partial, PartialRef};

use crate::context::{AssignmentP, Context, ImplGraphP, TrailP, VsidsP};
use crate::prop::{enqueue_assignment, Reason};
use coresat_formula::{Lit, Var};

/// Make a variable available for decisions again.
///
/// Called when a variable becomes unassigned, e.g. on backtracking.
pub fn make_available(mut ctx: partial!(Context, mut VsidsP), var: Var) {
    ctx.part_mut(VsidsP).make_available(var);
}

/// Make a decision and enqueue it.
///
/// Picks the unassigned variable with the highest VSIDS activity and branches on its last saved
/// polarity, defaulting to false for variables that were never assigned.
///
/// Returns `false` if no decision was made because all variables are assigned.
pub fn make_decision(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP, mut VsidsP),
) -> bool {
    loop {
        let decision_var = match ctx.part_mut(VsidsP).next() {
            Some(var) => var,
            None => return false,
        };

        if ctx.part(AssignmentP).var_value(decision_var).is_some() {
            // Variables can linger in the heap after being assigned by propagation.
            continue;
        }

        let polarity = ctx.part(AssignmentP).last_var_value(decision_var);
        let decision = Lit::from_var(decision_var, !polarity);

        ctx.part_mut(TrailP).new_decision_level();

        enqueue_assignment(ctx.borrow(), decision, Reason::Unit);

        return true;
    }
}

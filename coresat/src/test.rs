use proptest::{prelude::*, *};

use rand::distributions::Bernoulli;
use rand::seq::SliceRandom;

use coresat_formula::CnfFormula;
use coresat_formula::{Lit, Var};

/// Generate small hard unsat instances.
///
/// Implementation of http://www.cs.qub.ac.uk/~i.spence/sgen/ but with random partitions
pub fn sgen_unsat_formula(
    blocks: impl Strategy<Value = usize>,
) -> impl Strategy<Value = CnfFormula> {
    blocks.prop_flat_map(|blocks| {
        collection::vec(bool::ANY, blocks * 4 + 1).prop_perturb(|negate, mut rng| {
            let mut clauses: Vec<Vec<Lit>> = vec![];
            let mut lits = negate
                .into_iter()
                .enumerate()
                .map(|(index, negate)| Lit::from_var(Var::from_index(index), negate))
                .collect::<Vec<_>>();

            for &invert in [false, true].iter() {
                lits.shuffle(&mut rng);
                for block in lits.chunks_exact(4) {
                    for a in 0..4 {
                        for b in 0..a {
                            for c in 0..b {
                                let mut clause =
                                    vec![block[a] ^ invert, block[b] ^ invert, block[c] ^ invert];
                                clause.shuffle(&mut rng);
                                clauses.push(clause);
                            }
                        }
                    }
                }
                let &lit_a = lits.last().unwrap();
                for b in 0..4 {
                    for c in 0..b {
                        let mut clause = vec![lit_a ^ invert, lits[b] ^ invert, lits[c] ^ invert];
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }
                }
            }

            clauses.shuffle(&mut rng);
            CnfFormula::from(clauses)
        })
    })
}

/// Generate a sat instance.
///
/// This generates a random full assignment and then only generates clauses compatible with that
/// assignment.
pub fn sat_formula(
    vars: impl Strategy<Value = usize>,
    clause_count: impl Strategy<Value = usize>,
    density: impl Strategy<Value = f64>,
    polarity_dist: impl Strategy<Value = f64>,
) -> impl Strategy<Value = CnfFormula> {
    (vars, clause_count, density, polarity_dist).prop_flat_map(
        |(vars, clause_count, density, polarity_dist)| {
            let density = Bernoulli::new(density);
            let polarity_dist = Bernoulli::new(polarity_dist);

            collection::vec(bool::ANY, vars).prop_perturb(move |negate, mut rng| {
                let mut clauses: Vec<Vec<Lit>> = vec![];
                let lits = negate
                    .into_iter()
                    .enumerate()
                    .map(|(index, negate)| Lit::from_var(Var::from_index(index), negate))
                    .collect::<Vec<_>>();

                for _ in 0..clause_count {
                    let &fixed_lit = lits.choose(&mut rng).unwrap();
                    let mut clause = vec![fixed_lit];
                    for &lit in lits.iter() {
                        if lit != fixed_lit && rng.sample(density) {
                            clause.push(lit ^ rng.sample(polarity_dist));
                        }
                    }
                    clause.shuffle(&mut rng);
                    clauses.push(clause);
                }

                clauses.shuffle(&mut rng);
                CnfFormula::from(clauses)
            })
        },
    )
}

/// Generate a pigeonhole instance where each pigeon's participation is gated by an enabling
/// literal.
///
/// With `columns` holes and `columns + 1 + extra_rows` pigeons, the formula becomes
/// unsatisfiable as soon as all pigeons are enabled. Returns the enabling literals (one per
/// pigeon, in row order), the number of columns and the generated formula. Useful to exercise
/// assumption-driven UNSAT cores: assuming every enabling literal forces a conflict whose minimal
/// unsat core has exactly `columns + 1` literals, no matter how many redundant extra pigeons are
/// present.
pub fn conditional_pigeon_hole(
    extra_rows: impl Strategy<Value = usize>,
    columns: impl Strategy<Value = usize>,
) -> impl Strategy<Value = (Vec<Lit>, usize, CnfFormula)> {
    (extra_rows, columns).prop_map(|(extra_rows, columns)| {
        let rows = columns + 1 + extra_rows;

        let enable_row: Vec<Lit> = (0..rows)
            .map(|row| Lit::positive(Var::from_index(row)))
            .collect();

        let var_at = |row: usize, column: usize| -> Var { Var::from_index(rows + row * columns + column) };

        let mut clauses: Vec<Vec<Lit>> = vec![];

        for (row, &enable) in enable_row.iter().enumerate() {
            let mut clause = vec![!enable];
            for column in 0..columns {
                clause.push(Lit::positive(var_at(row, column)));
            }
            clauses.push(clause);
        }

        for column in 0..columns {
            for row_a in 0..rows {
                for row_b in 0..row_a {
                    clauses.push(vec![
                        !Lit::positive(var_at(row_a, column)),
                        !Lit::positive(var_at(row_b, column)),
                    ]);
                }
            }
        }

        (enable_row, columns, CnfFormula::from(clauses))
    })
}

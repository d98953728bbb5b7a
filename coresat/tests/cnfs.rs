use std::collections::HashSet;

use coresat::solver::Solver;
use coresat_formula::Lit;

macro_rules! test_cnf {
    ($name:ident, $dimacs:expr, $result:expr) => {
        #[test]
        fn $name() {
            let cnf: &[u8] = $dimacs.as_bytes();
            let mut solver = Solver::new();
            let formula = coresat_dimacs::DimacsParser::parse(cnf).expect("parsing failed");
            solver.add_formula(&formula);
            let result = $result;
            assert_eq!(solver.solve().expect("solve failed"), result);
            if result {
                let model: HashSet<Lit> = solver.model().unwrap().into_iter().collect();
                for clause in formula.iter() {
                    assert!(clause.iter().any(|&lit| model.contains(&lit)));
                }
            }
        }
    };
}

test_cnf!(
    pigeon_hole_2_into_1_unsat,
    "p cnf 4 6\n\
     1 2 0\n\
     3 4 0\n\
     -1 -3 0\n\
     -1 -4 0\n\
     -2 -3 0\n\
     -2 -4 0\n",
    false
);

test_cnf!(
    small_chain_sat,
    "p cnf 3 3\n\
     1 2 0\n\
     -1 3 0\n\
     -2 -3 0\n",
    true
);

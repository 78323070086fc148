//! __splitqp__ is a Rust implementation of an operator splitting (ADMM) solver
//! for convex quadratic programs.  It solves problems of the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T P x + q^T x\\\\\[2ex\]
//!  \text{subject to} & l \le Ax \le u
//!  \end{array}
//! $$
//!
//! with decision variables $x \in \mathbb{R}^n$ and data matrices
//! $P=P^\top \succeq 0$, $q \in \mathbb{R}^n$, $A \in \mathbb{R}^{m \times n}$,
//! and bounds $l,u \in \mathbb{R}^m$ with $l \le u$.  Bounds may be
//! infinite, so equality constraints and one-sided inequalities are
//! expressed through the same interface.
//!
//! ## Features
//!
//! * __Sparse data__: all problem data is supplied in compressed sparse
//!   column format.  A single quasi-definite factorization is computed at
//!   setup and reused across iterations.
//!
//! * __Parametric updates__: the linear cost, the bounds and the values of
//!   `P` and `A` may be updated between solves, with warm starting from the
//!   previous iterate.
//!
//! * __Infeasibility detection__: primal and dual infeasibility are
//!   detected from the differences of successive iterates.
//!
//! * __Solution polishing__: an optional refinement step solves the
//!   equality constrained problem defined by the estimated active set.
//!
//! ## Example
//!
//! ```no_run
//! use splitqp::algebra::*;
//! use splitqp::solver::*;
//!
//! // P is supplied in upper triangular form
//! let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
//! let A = CscMatrix::new(3, 2, vec![0, 2, 4], vec![0, 1, 0, 2], vec![1., 1., 1., 1.]);
//! let q = [1., 1.];
//! let l = [1., 0., 0.];
//! let u = [1., 0.7, 0.7];
//!
//! let settings = SettingsBuilder::default().polish(true).build().unwrap();
//! let mut workspace = Workspace::setup(&P, &A, &q, &l, &u, settings).unwrap();
//! let solution = workspace.solve().unwrap();
//! assert_eq!(solution.status, SolverStatus::Solved);
//! ```
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod qdldl;
pub mod solver;
pub(crate) mod timers;

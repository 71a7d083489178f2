//! Linear algebra over rings, including rigorous solvers for ball matrices.

pub mod matrix;

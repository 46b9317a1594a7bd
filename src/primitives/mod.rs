//! Core compute primitives.
//!
//! [`Matrix`] is the single container for feature matrices (`Matrix<f64>`),
//! raw matrices with missing cells (`Matrix<Option<f64>>`) and confusion
//! counts (`Matrix<usize>`).

mod matrix;

pub use matrix::Matrix;

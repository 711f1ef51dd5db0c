//! Command implementations
//!
//! Every user-facing operation lives in [`porcelain`] as an `impl Repository`
//! block and returns a structured result. Rendering is left to the binary.

pub mod porcelain;

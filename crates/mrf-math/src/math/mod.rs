//! Core math modules.

pub mod categorical;
pub mod dirichlet;
pub mod stable;

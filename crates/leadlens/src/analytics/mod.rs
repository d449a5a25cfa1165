//! The analytics engine: normalization, classification, filtering, and the
//! derived statistics the dashboard renders. Everything in here is a pure
//! transformation over in-memory collections; all I/O stays at the import
//! boundary.

pub mod domain;
pub mod export;
pub mod filter;
pub mod funnel;
pub mod health;
pub mod import;
pub mod marketing;
pub mod pareto;
pub mod patients;
pub mod status;
pub mod teams;

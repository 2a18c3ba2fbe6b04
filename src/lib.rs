#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_on_vec_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

//! A constraint-satisfaction engine for filling crossword grids.
//!
//! Pipeline: build a [`grid::Grid`] (directly or via [`skeleton::GridBuilder`]),
//! check it with [`validator::validate`], enumerate slots, build a
//! [`constraint_graph::ConstraintGraph`], load a [`word_supply::WordSupply`],
//! then hand all four plus a [`oracle::WordOracle`] to [`engine::solve`].
//!
//! Rendering, clue generation, on-disk word-list caching and any CLI or file
//! based configuration are intentionally out of scope; hosts build those on
//! top of this crate.

pub mod constraint_graph;
pub mod engine;
pub mod error;
pub mod grid;
#[cfg(feature = "test-util")]
pub mod logging;
pub mod oracle;
pub mod skeleton;
pub mod types;
pub mod validator;
pub mod word_supply;

pub use engine::{solve, solve_and_fill, EngineConfig, FailureReason, FailureReport, SolveOutcome};
pub use types::MAX_SLOT_LENGTH;

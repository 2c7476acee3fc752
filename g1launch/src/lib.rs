//! g1launch: bootstrap and run the G1 assistant.
//!
//! resolve base dir → activate environment → install dependencies → run
//! application → pause on failure. See [`launcher::Launcher`].

pub mod cli;
pub mod commands;
pub mod error;
pub mod launcher;
pub mod pause;

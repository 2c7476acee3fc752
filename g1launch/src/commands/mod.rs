//! Subcommands. Each returns the exit code the process should end with;
//! `Err` is reserved for fatal launcher errors.

pub mod check;
pub mod init;
pub mod run;

//! Named object pools and a staged bootstrap for a vertical shmup.
//!
//! Integration tests in `tests/` are compiled as separate crates; this library is
//! the public surface they import.

pub mod common;
pub mod game;
pub mod plugins;

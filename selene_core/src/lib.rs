// selene_core/src/lib.rs

// This file defines the public modules of your library.
pub mod config;
pub mod error;
pub mod estimation;
pub mod prelude;
pub mod types;
pub mod utils;

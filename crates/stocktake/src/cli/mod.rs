//! CLI module for Stocktake
//!
//! Each command lives in its own module with an `Args` struct and an async
//! `run` entry point.

pub mod config;
pub mod error;
pub mod output;

pub mod assets;
pub mod inventory;
pub mod locations;
pub mod reconcile;
pub mod relocate;

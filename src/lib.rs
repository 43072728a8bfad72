pub mod config;
pub mod error;
pub mod evaluator;
pub mod games;
pub mod generator;
pub mod matcher;
pub mod normalizer;
pub mod session;
pub mod store;
// cmd and reports are binary modules (declared in main.rs); the library
// surface stops at the engine itself.

// Library target for integration tests and criterion benchmarks.
// The binary entry point is main.rs, which re-declares the module tree; this
// file exposes the same modules as `kanadr::engine::*`, `kanadr::session::*`.
#![allow(dead_code)]

pub mod app;
pub mod config;
pub mod engine;
pub mod kana;
pub mod logging;
pub mod session;
pub mod ui;

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![cfg_attr(feature = "fail-on-warnings", deny(clippy::all))]

pub mod account;
pub mod api;
pub mod app;
pub mod check;
pub mod checkbook;
pub mod cli;
pub mod deposit;
mod macros;
pub mod primitives;
pub mod report;
mod tracing;

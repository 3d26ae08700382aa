// Library root: the services and command handlers behind the `dugout`
// binary, exposed for integration tests.

pub mod cli;
pub mod commands;
pub mod service;

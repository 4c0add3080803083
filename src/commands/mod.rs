//! One-shot subcommands.
//!
//! Each command talks to the gateway through the [`Gateway`](crate::gateway::Gateway) trait, prints its
//! result with the `print_cmd_*` macros and returns an error for a non-zero exit.

pub mod health;
pub mod logs;
pub mod settings;
pub mod stats;
pub mod whatsapp;

use crate::gateway::error::GatewayError;
use crate::network::ErrorHandler;
use crate::print_cmd_error;
use std::error::Error;

pub type CommandResult = Result<(), Box<dyn Error>>;

/// Prints a failed gateway call under `title` and converts it for `?`.
pub(crate) fn report(title: &str, error: GatewayError) -> Box<dyn Error> {
    let detail = ErrorHandler::new().short_message(&error);
    print_cmd_error!(title, &detail);
    Box::new(error)
}

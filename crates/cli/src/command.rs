//! Command trait for kiln CLI
//!
//! Every subcommand implements [`Command`] and receives the shared
//! [`RuntimeContext`].

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for all kiln commands
///
/// # Example
///
/// ```rust,ignore
/// use clap::Args;
///
/// #[derive(Debug, Args)]
/// pub struct MyCommand {
///     #[arg(long)]
///     pub json: bool,
/// }
///
/// impl Command for MyCommand {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> Result<()> {
///         let scripts = &context.config.scripts;
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` if the command fails. Hook failures keep the
    /// interpreter's exit status.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}

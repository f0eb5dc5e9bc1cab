// ABOUTME: Command implementations behind the CLI subcommands
// ABOUTME: Exports dump and source commands

pub mod dump;
pub mod source;

pub use dump::dump;
pub use source::source;

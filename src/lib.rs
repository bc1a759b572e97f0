//! A library for searching symbols in program-database (PDB)
//! debug-information sessions.
#![doc = include_str!("../README.md")]

mod error;
mod log;
pub mod provider;
pub mod search;
mod session;
#[cfg(test)]
mod test_helper;

pub use error::Error;
pub use error::ErrorExt;
pub use error::ErrorKind;
pub use error::Result;
pub use provider::DebugInfoProvider;
pub use provider::ProcessHandle;
pub use provider::StringFree;
pub use provider::SymTag;
pub use search::Pattern;
pub use search::SearchOpts;
pub use search::SearchRequest;
pub use search::SymbolMatch;
pub use session::Session;

/// A type representing virtual addresses, expressed as offsets from a
/// session's base load address.
pub type Addr = u64;

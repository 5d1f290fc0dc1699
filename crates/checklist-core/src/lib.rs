pub mod enhancement;
pub mod error;
pub mod ident;
pub mod instance;
pub mod io;
pub mod report;
pub mod session;
pub mod snapshot;
pub mod sop;
pub mod step;
pub mod store;
pub mod tokens;

pub use error::{ChecklistError, Result};

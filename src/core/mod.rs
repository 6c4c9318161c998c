pub mod collect;
pub mod defaults;
pub mod error;
pub mod git;
pub mod github;
pub mod keychain;
pub mod output;
pub mod paths;
pub mod vendor;
pub mod version;

pub use error::{Error, ErrorCode, Result};

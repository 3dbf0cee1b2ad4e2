// Git module - thin wrappers around the git binary
//
// - utils: subprocess helper and shared types
// - status: working tree queries (status, diff)
// - commit: commit and push

pub mod commit;
pub mod status;
pub mod utils;

pub use commit::*;
pub use status::*;
pub use utils::*;

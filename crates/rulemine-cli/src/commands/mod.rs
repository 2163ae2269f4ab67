//! CLI command implementations.

pub mod init;
pub mod itemize;
pub mod split;
pub mod mine;
pub mod sweep;
pub mod validate;
pub mod inspect;

//! channelctl subcommands

pub mod common;
pub mod create;
pub mod keygen;
pub mod serve;
pub mod sign;

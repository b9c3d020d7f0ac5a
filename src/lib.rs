pub mod application;
pub mod buildfile;
pub mod cache;
pub mod commands;
pub mod error;
pub mod manifest;
pub mod runtime;
pub mod toolchain;

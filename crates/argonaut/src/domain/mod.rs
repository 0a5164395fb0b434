//! Pure data model: no I/O, no channels, no terminal types.

pub mod application;
pub mod diff;
pub mod error;
pub mod input;
pub mod rollback;
pub mod scope;
pub mod server;
pub mod tree;

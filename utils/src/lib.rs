//! Shared infrastructure utilities for Venire.
//!
//! - **`atomic_write`**: crash-safe file persistence (temp + rename) used for
//!   workspace snapshots and the config file.

pub mod atomic_write;

pub use atomic_write::{
    AtomicWriteOptions, atomic_write, atomic_write_with_options, read_recovering,
    recover_bak_file,
};

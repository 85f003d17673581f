//! Library wrapper around the `meridian` CLI implementation.
//!
//! Compiling the binary crate root as a module lets `cargo test -p meridian-cli --lib`
//! typecheck the CLI without building the integration test binary.
//!
//! Note: `fn main()` inside `main.rs` is just another function when compiled as a module.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;

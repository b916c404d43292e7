// Library surface for headless/integration tests and reuse.
// Terminal widgets and the key map stay in the binary.
pub mod app_dirs;
pub mod config;
pub mod engine;
pub mod runtime;
pub mod session;
pub mod util;
pub mod wave;

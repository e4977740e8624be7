mod app;
mod logging;
mod protocol;
mod stdio;

pub use app::run_host;

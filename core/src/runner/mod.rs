pub mod exit;
pub mod io_pump;
mod process;
mod traits;
pub mod types;

pub use io_pump::{pump_lines, LineStream, LineTap};
pub use process::ProcessRunner;
pub use traits::{RunnerPlugin, RunnerSession};
pub use types::LaunchSpec;

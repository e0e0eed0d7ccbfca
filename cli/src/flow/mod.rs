pub mod flow_ask;
pub mod flow_console;
pub mod flow_tui;

pub use flow_ask as ask;
pub use flow_console as console;
pub use flow_tui as tui;

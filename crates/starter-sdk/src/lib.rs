// starter-sdk: Foundation layer for Sim Starter.
// This crate has ZERO dependencies on other starter crates and provides
// core utilities, traits, and abstractions used throughout the workspace.

pub mod build_constants;
pub mod io_util;
pub mod path_util;
pub mod process_invoker;
pub mod string_util;
pub mod trace;

// Re-export commonly used items at crate root
pub use build_constants::{Source, StarterPackage};
pub use io_util::IOUtil;
pub use path_util::PathUtil;
pub use process_invoker::{LaunchRequest, ProcessExit, ProcessInvoker, RunningProcess};
pub use string_util::StringUtil;
pub use trace::{CollectingLogSink, LogSink, TraceWriter};

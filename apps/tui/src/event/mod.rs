mod loop_handler;

pub use loop_handler::{build_summary, run, run_headless, HeadlessPoint, HeadlessSummary};

//! Structured event names.
//!
//! Attached to log lines as the `event` field so JSONL output can be filtered
//! without matching on message text.

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    // Commands
    pub const SWEEP_FINISHED: &str = "sweep.finished";
    pub const SWEEP_MISCONFIGURED: &str = "sweep.misconfigured";
    pub const CHECK_FINISHED: &str = "check.finished";
    pub const EXPORT_FINISHED: &str = "export.finished";
    pub const SHOW_VIOLATION: &str = "show.violation";

    // Error events
    pub const INTERNAL_ERROR: &str = "internal_error";
}

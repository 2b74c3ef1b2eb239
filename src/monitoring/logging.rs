// Copyright (c) 2026 Lottery Harness Authors
// Licensed under the Apache License, Version 2.0

//! Log subscriber setup shared by the binaries.

#![forbid(unsafe_code)]

/// Enables JSON log lines when set to `1`.
pub const ENV_LOG_JSON: &str = "LOTTERY_LOG_JSON";

/// Whether the environment asks for JSON logs.
pub fn json_requested() -> bool {
    std::env::var(ENV_LOG_JSON).map(|v| v.trim() == "1").unwrap_or(false)
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(json: bool) {
    let builder = tracing_subscriber::fmt().with_target(false).with_level(true);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

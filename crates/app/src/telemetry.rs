//! Tracing subscriber setup for the terminal runner.
//!
//! - `LOG_LEVEL` sets the filter (e.g. `debug` or `warn,quiz=debug,storage=info`).
//! - `LOG_FORMAT=json` switches to structured output; anything else is the default format.
//!
//! Logs go to stderr so they never interleave with the quiz on stdout.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("warn,quiz=info,storage=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}

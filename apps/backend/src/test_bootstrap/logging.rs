//! Logging for the library's unit tests.
//!
//! Installed once per test binary by the `ctor` hook in `lib.rs`. Level comes
//! from `TEST_LOG`, then `RUST_LOG`, then defaults to `warn`. Output goes
//! through the test writer so cargo only shows it for failing tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

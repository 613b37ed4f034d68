//! Platform abstraction layer
//!
//! Logging backends differ per target; everything else goes through `log`.

/// Install the logger: `env_logger` on native (honours `RUST_LOG`, defaults
/// to `info`), the browser console on web.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    // A second init (tests, embedding) is harmless
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

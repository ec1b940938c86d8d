/// Bundled defaults for builds without a .env on disk (mobile/web)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

#[cfg(not(target_arch = "wasm32"))]
fn load_config() {
    // A local .env wins during desktop development.
    if dotenvy::dotenv().is_ok() {
        return;
    }
    apply_bundled_config();
}

#[cfg(target_arch = "wasm32")]
fn load_config() {
    apply_bundled_config();
}

fn apply_bundled_config() {
    for line in BUNDLED_CONFIG.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        // Real environment variables take precedence over bundled defaults.
        if std::env::var(key).is_err() {
            // SAFETY: set at startup before any threads are spawned
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
}

fn main() {
    load_config();
    tracing_subscriber::fmt::init();
    dioxus::launch(ragstudio::ui::App);
}

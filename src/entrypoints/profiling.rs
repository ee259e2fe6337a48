/*!
Logging setup and the optional puffin profiling server.

With the `profiling` feature, `profiling::scope!` calls record puffin scopes
and the settings tab can start an HTTP server for `puffin_viewer`. Without
it, the UI only shows a notice.
*/

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Initialize the tracing subscriber, setting a default `RUST_LOG` if unset.
///
/// Must run before any other thread is spawned.
pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_err() {
        let default = if cfg!(debug_assertions) {
            "debug,eframe::native=warn,hyper_util=info,walkers=info,egui::context=warn,reqwest::connect=info,wgpu_core=warn,wgpu_hal=warn,naga=warn"
        } else {
            "info,eframe::native=warn,egui::context=warn,wgpu_core=warn,wgpu_hal=warn"
        };
        // Safety: single-threaded at startup
        unsafe {
            std::env::set_var("RUST_LOG", default);
        }
    }

    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!(
        "Logging initialized with RUST_LOG={}",
        std::env::var("RUST_LOG").unwrap_or_default()
    );
}

#[cfg(feature = "profiling")]
mod server {
    use std::cell::RefCell;

    const PUFFIN_ADDRESS: &str = "127.0.0.1:8585";

    pub struct ProfilingServer {
        _server: puffin_http::Server,
    }

    impl ProfilingServer {
        pub fn start() -> Option<Self> {
            puffin::set_scopes_on(true); // tell puffin to collect data

            match puffin_http::Server::new(PUFFIN_ADDRESS) {
                Ok(server) => {
                    tracing::info!(
                        "Profiling enabled, to view: cargo install puffin_viewer && ~/.cargo/bin/puffin_viewer --url {PUFFIN_ADDRESS}"
                    );
                    Some(Self { _server: server })
                }
                Err(err) => {
                    tracing::error!("Failed to start puffin server: {err}");
                    puffin::set_scopes_on(false);
                    None
                }
            }
        }
    }

    impl Drop for ProfilingServer {
        fn drop(&mut self) {
            puffin::set_scopes_on(false);
            tracing::info!("Profiling server stopped");
        }
    }

    thread_local! {
        // The UI runs on a single thread, so the server lives there too
        static PROFILING_SERVER: RefCell<Option<ProfilingServer>> = const { RefCell::new(None) };
    }

    pub fn profiling_ui(ui: &mut egui::Ui) {
        egui::warn_if_debug_build(ui);

        PROFILING_SERVER.with_borrow_mut(|server| {
            let mut enabled = server.is_some();
            if ui
                .checkbox(&mut enabled, "Enable Profiling Server")
                .changed()
            {
                *server = if enabled {
                    ProfilingServer::start()
                } else {
                    None
                };
            }

            if server.is_some() {
                ui.label(format!("⏺ Serving puffin data on {PUFFIN_ADDRESS}"));
            }
        });
    }
}

/// Profiling controls for the settings tab
pub fn profiling_ui(ui: &mut egui::Ui) {
    #[cfg(feature = "profiling")]
    server::profiling_ui(ui);

    #[cfg(not(feature = "profiling"))]
    ui.label("Profiling feature is disabled in this build.");
}

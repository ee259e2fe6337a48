use super::metadata::log_version_info;
use super::profiling::setup_logging;
use super::proxy::{ProxyError, prompt_proxy};
use crate::app::QuakeCatalogueApp;
use crate::app::settings::Settings;

const APP_NAME: &str = "Quake Catalogue Viewer";

/// Run the application on native (desktop) platforms
pub fn run_native() {
    // Logging and the proxy environment must be set up before any thread starts
    setup_logging();
    log_version_info();

    let settings = Settings::from_cli();
    if !settings.skip_proxy_prompt {
        configure_proxy();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    rt.block_on(native_main(settings));
}

fn configure_proxy() {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    match prompt_proxy(&mut input, &mut output) {
        Ok(Some(proxy)) => proxy.apply(),
        Ok(None) => tracing::debug!("No proxy configured"),
        Err(e @ ProxyError::InvalidPort(_)) => {
            println!("{e}");
            std::process::exit(1);
        }
        Err(e) => tracing::warn!("Skipping proxy prompt: {e}"),
    }
}

async fn native_main(settings: Settings) {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(APP_NAME)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(QuakeCatalogueApp::new(cc, settings)))),
    ) {
        tracing::error!("Application error: {e}");
    }
}

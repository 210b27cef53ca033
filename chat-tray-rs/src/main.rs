#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::Context;
use chat_tray_rs::config::ConfigStore;
use chat_tray_rs::platform::icons;
use chat_tray_rs::shell::DEFAULT_WINDOW_SIZE;
use chat_tray_rs::{logging, ShellApp};
use directories::ProjectDirs;
use eframe::egui;
use std::sync::Arc;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "ChatTray", "ChatTray")
}

#[cfg(windows)]
fn open_config(_dirs: Option<&ProjectDirs>) -> anyhow::Result<Box<dyn ConfigStore>> {
    let store = chat_tray_rs::platform::RegistryStore::open()
        .context("failed to open preferences in the registry")?;
    Ok(Box::new(store))
}

#[cfg(not(windows))]
fn open_config(dirs: Option<&ProjectDirs>) -> anyhow::Result<Box<dyn ConfigStore>> {
    use chat_tray_rs::config::{JsonFileStore, MemoryStore};

    match dirs {
        Some(dirs) => {
            let store = JsonFileStore::open_in(dirs.config_dir())
                .context("failed to open the preferences file")?;
            tracing::info!(path = %store.path().display(), "preferences loaded");
            Ok(Box::new(store))
        }
        None => {
            tracing::warn!("no config directory, preferences will not persist");
            Ok(Box::new(MemoryStore::new()))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let dirs = project_dirs();
    let log_dir = dirs.as_ref().map(|d| d.data_local_dir().join("logs"));
    let _log_guard = logging::init(log_dir.as_deref());

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        os = std::env::consts::OS,
        "starting chat tray"
    );

    let config = open_config(dirs.as_ref())?;

    let size = [
        DEFAULT_WINDOW_SIZE.width as f32,
        DEFAULT_WINDOW_SIZE.height as f32,
    ];
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Chat")
            .with_inner_size(size)
            .with_min_inner_size(size)
            .with_visible(false)
            .with_decorations(false)
            .with_icon(Arc::new(icons::window_icon())),
        ..Default::default()
    };

    eframe::run_native(
        "Chat Tray",
        native_options,
        Box::new(move |cc| Ok(Box::new(ShellApp::new(cc, config)?))),
    )
    .map_err(|e| anyhow::anyhow!("event loop failed: {e}"))?;

    tracing::info!("exited");
    Ok(())
}

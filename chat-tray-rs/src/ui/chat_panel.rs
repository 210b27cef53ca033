//! Window body.
//!
//! The chat page itself is loaded elsewhere; the panel names it, offers
//! to open it in the browser and carries the window-level controls.

use crate::platform::Hotkey;
use crate::shell::WindowMode;
use eframe::egui;

/// Address of the hosted chat page.
pub const CHAT_URL: &str = "https://www.bing.com/search?q=Bing+AI&showconv=1&FORM=hpcodx";

/// Actions that can be triggered from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    OpenInBrowser,
    /// Switch between the tray-anchored and the free window
    ToggleDetached,
    ToggleFullscreen,
    Hide,
}

/// What the panel shows about the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelView<'a> {
    pub mode: WindowMode,
    pub fullscreen: bool,
    pub shortcut_enabled: bool,
    pub error_message: Option<&'a str>,
}

/// Chat panel state.
#[derive(Default)]
pub struct ChatPanel {
    actions: Vec<PanelAction>,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the panel content.
    pub fn show(&mut self, ctx: &egui::Context, view: PanelView<'_>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Chat");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("✕").on_hover_text("Hide window").clicked() {
                        self.actions.push(PanelAction::Hide);
                    }

                    let (icon, tooltip) = if view.fullscreen {
                        ("🗗", "Leave fullscreen")
                    } else {
                        ("⛶", "Fullscreen")
                    };
                    if ui.button(icon).on_hover_text(tooltip).clicked() {
                        self.actions.push(PanelAction::ToggleFullscreen);
                    }

                    let (icon, tooltip) = match view.mode {
                        WindowMode::Attached => ("📌", "Detach window"),
                        WindowMode::Detached => ("📍", "Attach to tray"),
                    };
                    if ui.button(icon).on_hover_text(tooltip).clicked() {
                        self.actions.push(PanelAction::ToggleDetached);
                    }
                });
            });

            ui.separator();

            if let Some(error) = view.error_message {
                ui.colored_label(egui::Color32::RED, format!("Error: {error}"));
                ui.separator();
            }

            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.label("Your chat opens in the browser.");
                ui.add_space(8.0);
                ui.hyperlink_to("bing.com chat", CHAT_URL);
                ui.add_space(16.0);

                if ui.button("Open in Browser").clicked() {
                    self.actions.push(PanelAction::OpenInBrowser);
                }
            });

            ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                if view.shortcut_enabled {
                    ui.small(format!("{} toggles this window", Hotkey::ToggleWindow.label()));
                }
            });
        });
    }

    /// Take all pending actions.
    pub fn take_actions(&mut self) -> Vec<PanelAction> {
        std::mem::take(&mut self.actions)
    }
}

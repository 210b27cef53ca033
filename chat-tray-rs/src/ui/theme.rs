//! Panel styling.

use eframe::egui;

/// Colors for the chat panel.
pub struct Theme {
    pub background: egui::Color32,
    pub surface: egui::Color32,
    pub accent: egui::Color32,
    pub text: egui::Color32,
    pub border: egui::Color32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: egui::Color32::from_rgb(28, 28, 30),
            surface: egui::Color32::from_rgb(44, 44, 46),
            accent: egui::Color32::from_rgb(0, 120, 212),
            text: egui::Color32::from_rgb(240, 240, 240),
            border: egui::Color32::from_rgb(64, 64, 66),
        }
    }

    pub fn light() -> Self {
        Self {
            background: egui::Color32::from_rgb(246, 246, 248),
            surface: egui::Color32::WHITE,
            accent: egui::Color32::from_rgb(0, 103, 192),
            text: egui::Color32::from_rgb(20, 20, 20),
            border: egui::Color32::from_rgb(218, 218, 222),
        }
    }

    /// Follow whichever visuals egui picked up from the OS.
    pub fn system(ctx: &egui::Context) -> Self {
        if ctx.style().visuals.dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Apply the theme to an egui context.
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.surface;
        style.visuals.widgets.inactive.bg_fill = self.surface;
        style.visuals.widgets.inactive.weak_bg_fill = self.surface;
        style.visuals.widgets.hovered.bg_stroke.color = self.border;
        style.visuals.widgets.noninteractive.fg_stroke.color = self.text;
        style.visuals.selection.bg_fill = self.accent;
        style.visuals.hyperlink_color = self.accent;
        style.visuals.window_rounding = egui::Rounding::same(8.0);

        ctx.set_style(style);
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

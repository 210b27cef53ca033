//! Tray and window icon generation.
//!
//! The icon is drawn at runtime: a rounded speech bubble with a tail at
//! the bottom-left and three dots.

use tray_icon::Icon;

/// Icon size in pixels.
pub const ICON_SIZE: u32 = 32;

const BUBBLE: (u8, u8, u8) = (0, 120, 212);
const DOT: (u8, u8, u8) = (255, 255, 255);

/// Tray icon.
pub fn tray_icon() -> Result<Icon, String> {
    Icon::from_rgba(chat_icon_rgba(), ICON_SIZE, ICON_SIZE).map_err(|e| e.to_string())
}

/// Window icon for the native title bar.
pub fn window_icon() -> eframe::egui::IconData {
    eframe::egui::IconData {
        rgba: chat_icon_rgba(),
        width: ICON_SIZE,
        height: ICON_SIZE,
    }
}

/// Draw the chat bubble as RGBA data.
pub fn chat_icon_rgba() -> Vec<u8> {
    let size = ICON_SIZE as usize;
    let mut rgba = vec![0u8; size * size * 4];

    // Bubble body: rounded rectangle in the top three quarters.
    let (left, top, right, bottom) = (2.0f32, 3.0f32, 30.0f32, 23.0f32);
    let radius = 6.0f32;

    for y in 0..size {
        for x in 0..size {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            let cx = px.clamp(left + radius, right - radius);
            let cy = py.clamp(top + radius, bottom - radius);
            let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();

            let coverage = (radius + 0.5 - dist).clamp(0.0, 1.0);
            if coverage > 0.0 {
                put(&mut rgba, size, x, y, BUBBLE, (coverage * 255.0) as u8);
            }
        }
    }

    // Tail: right triangle below the bubble's left side.
    for y in 23..29 {
        let width = 29 - y;
        for x in 7..(7 + width) {
            put(&mut rgba, size, x, y, BUBBLE, 255);
        }
    }

    for center_x in [10usize, 16, 22] {
        draw_dot(&mut rgba, size, center_x, 13);
    }

    rgba
}

fn draw_dot(rgba: &mut [u8], size: usize, center_x: usize, center_y: usize) {
    for y in center_y - 2..=center_y + 2 {
        for x in center_x - 2..=center_x + 2 {
            let dx = x as f32 - center_x as f32;
            let dy = y as f32 - center_y as f32;
            if dx * dx + dy * dy <= 4.5 {
                put(rgba, size, x, y, DOT, 255);
            }
        }
    }
}

fn put(rgba: &mut [u8], size: usize, x: usize, y: usize, (r, g, b): (u8, u8, u8), a: u8) {
    if x >= size || y >= size {
        return;
    }
    let idx = (y * size + x) * 4;
    rgba[idx] = r;
    rgba[idx + 1] = g;
    rgba[idx + 2] = b;
    rgba[idx + 3] = a;
}

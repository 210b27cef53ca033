mod common;

use chat_tray_rs::config::{ConfigKey, MemoryStore};
use chat_tray_rs::shell::{Reaction, ShellEvent, Visibility};
use common::{Call, Harness, ANCHORED};

#[test]
fn test_fullscreen_floats_on_top() {
    let mut h = Harness::new();
    h.send(ShellEvent::TrayClick, 0);

    h.send(ShellEvent::ToggleFullscreen, 10);
    let window = h.desk.window();
    assert!(window.fullscreen);
    assert!(window.on_top);
    assert!(h.config.flag(ConfigKey::FullScreen));

    h.send(ShellEvent::ToggleFullscreen, 20);
    let window = h.desk.window();
    assert!(!window.fullscreen);
    assert!(!window.on_top);
    assert!(!h.config.flag(ConfigKey::FullScreen));
}

#[test]
fn test_leaving_fullscreen_keeps_stay_on_top() {
    let mut h = Harness::with_config(MemoryStore::new().with(ConfigKey::StayOnTop, true));
    h.send(ShellEvent::TrayClick, 0);

    h.send(ShellEvent::ToggleFullscreen, 10);
    h.send(ShellEvent::ToggleFullscreen, 20);

    let window = h.desk.window();
    assert!(!window.fullscreen);
    assert!(window.on_top);
}

#[test]
fn test_persisted_fullscreen_applied_at_startup() {
    let h = Harness::with_config(MemoryStore::new().with(ConfigKey::FullScreen, true));

    let window = h.desk.window();
    assert!(window.fullscreen);
    assert!(window.on_top);
    assert!(!window.visible);
}

#[test]
fn test_fullscreen_survives_mode_switch() {
    let mut h = Harness::with_config(MemoryStore::new().with(ConfigKey::FullScreen, true));

    h.send(ShellEvent::ToggleDetached, 0);

    let window = h.desk.window();
    assert!(window.fullscreen);
    assert!(window.visible);
    assert!(h.desk.calls().contains(&Call::Fullscreen(true)));
}

#[test]
fn test_no_hover_peek_in_fullscreen() {
    let mut h = Harness::with_config(MemoryStore::new().with(ConfigKey::FullScreen, true));

    h.send(ShellEvent::TrayMouseMove, 0);

    assert!(!h.desk.window().visible);
    assert_eq!(h.machine.next_deadline(), None);
}

#[test]
fn test_fullscreen_window_survives_blur() {
    let mut h = Harness::new();
    h.send(ShellEvent::TrayClick, 0);
    h.send(ShellEvent::ToggleFullscreen, 10);

    h.send(ShellEvent::WindowBlurred, 20);

    assert!(h.desk.window().visible);
}

#[test]
fn test_stay_on_top_pins_peeking_window() {
    let mut h = Harness::new();
    h.send(ShellEvent::TrayMouseMove, 0);
    assert_eq!(h.machine.visibility(), Visibility::Peek);

    h.send(ShellEvent::ToggleStayOnTop, 50);
    assert_eq!(h.machine.visibility(), Visibility::Pinned);
    assert!(h.config.flag(ConfigKey::StayOnTop));

    h.send(ShellEvent::WindowBlurred, 100);
    assert!(h.desk.window().visible);

    h.send(ShellEvent::ToggleStayOnTop, 200);
    assert!(!h.desk.window().on_top);
    assert!(h.desk.window().visible);

    h.send(ShellEvent::WindowBlurred, 300);
    assert!(!h.desk.window().visible);
}

#[test]
fn test_stay_on_top_shows_hidden_window() {
    let mut h = Harness::new();

    h.send(ShellEvent::ToggleStayOnTop, 0);

    let window = h.desk.window();
    assert!(window.visible);
    assert!(window.on_top);
    assert_eq!(window.bounds.position(), ANCHORED);
    assert_eq!(h.machine.visibility(), Visibility::Pinned);
}

#[test]
fn test_preference_toggles_persist() {
    let mut h = Harness::new();

    h.send(ShellEvent::ToggleHover, 0);
    h.send(ShellEvent::ToggleShortcut, 10);

    assert!(h.config.flag(ConfigKey::DisableHover));
    assert!(h.config.flag(ConfigKey::ShortcutEnabled));
    assert!(!h.machine.hover_enabled());

    h.send(ShellEvent::TrayMouseMove, 20);
    assert!(!h.desk.window().visible);
}

#[test]
fn test_shortcut_toggle_registers_and_unregisters() {
    let mut h = Harness::new();
    assert!(!h.config.flag(ConfigKey::ShortcutEnabled));

    assert_eq!(
        h.send(ShellEvent::ToggleShortcut, 0),
        Reaction::SetToggleShortcut { enabled: true }
    );
    assert!(h.config.flag(ConfigKey::ShortcutEnabled));

    assert_eq!(
        h.send(ShellEvent::ToggleShortcut, 10),
        Reaction::SetToggleShortcut { enabled: false }
    );
    assert!(!h.config.flag(ConfigKey::ShortcutEnabled));
}

#[test]
fn test_auto_update_toggle_flips_preference() {
    let mut h = Harness::new();
    assert!(h.config.flag(ConfigKey::AutoUpdate));

    assert_eq!(h.send(ShellEvent::ToggleAutoUpdate, 0), Reaction::Nothing);
    assert!(!h.config.flag(ConfigKey::AutoUpdate));
    assert!(!h.desk.window().visible);

    h.send(ShellEvent::ToggleAutoUpdate, 10);
    assert!(h.config.flag(ConfigKey::AutoUpdate));
}

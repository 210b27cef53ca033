//! Native window tweaks eframe has no command for.

#[cfg(windows)]
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
#[cfg(windows)]
use windows::Win32::Foundation::HWND;

/// Extract the HWND from an eframe [`eframe::Frame`].
#[cfg(windows)]
fn hwnd(frame: &eframe::Frame) -> Option<HWND> {
    frame
        .window_handle()
        .ok()
        .and_then(|handle| match handle.as_raw() {
            RawWindowHandle::Win32(h) => Some(HWND(h.hwnd.get() as *mut core::ffi::c_void)),
            _ => None,
        })
}

/// Hide or restore the taskbar button by switching between a tool window
/// and an app window. Takes effect the next time the window is shown.
#[cfg(windows)]
pub fn set_skip_taskbar(frame: &eframe::Frame, skip: bool) {
    use windows::Win32::UI::WindowsAndMessaging::{
        GetWindowLongPtrW, SetWindowLongPtrW, GWL_EXSTYLE, WS_EX_APPWINDOW, WS_EX_TOOLWINDOW,
    };

    let Some(hwnd) = hwnd(frame) else {
        tracing::warn!("no native window handle, taskbar button unchanged");
        return;
    };

    unsafe {
        let style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE) as u32;
        let style = if skip {
            (style | WS_EX_TOOLWINDOW.0) & !WS_EX_APPWINDOW.0
        } else {
            (style | WS_EX_APPWINDOW.0) & !WS_EX_TOOLWINDOW.0
        };
        SetWindowLongPtrW(hwnd, GWL_EXSTYLE, style as isize);
    }
}

#[cfg(not(windows))]
pub fn set_skip_taskbar(_frame: &eframe::Frame, skip: bool) {
    tracing::trace!(skip, "skip-taskbar not supported on this platform");
}

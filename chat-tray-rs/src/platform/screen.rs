//! Cursor position and display work areas.

use crate::shell::{Point, Rect, ScreenQuery};
use std::cell::Cell;
use std::rc::Rc;

/// Win32 cursor and monitor queries.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Screen;

#[cfg(windows)]
impl ScreenQuery for Win32Screen {
    fn cursor_position(&self) -> Point {
        use windows::Win32::Foundation::POINT;
        use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

        let mut pt = POINT::default();
        if unsafe { GetCursorPos(&mut pt) }.is_ok() {
            Point::new(pt.x, pt.y)
        } else {
            tracing::trace!("GetCursorPos failed");
            Point::default()
        }
    }

    fn work_area_near(&self, point: Point) -> Rect {
        use windows::Win32::Foundation::POINT;
        use windows::Win32::Graphics::Gdi::{
            GetMonitorInfoW, MonitorFromPoint, MONITORINFO, MONITOR_DEFAULTTONEAREST,
        };

        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        let ok = unsafe {
            let monitor = MonitorFromPoint(
                POINT {
                    x: point.x,
                    y: point.y,
                },
                MONITOR_DEFAULTTONEAREST,
            );
            GetMonitorInfoW(monitor, &mut info).as_bool()
        };

        if !ok {
            tracing::warn!(?point, "GetMonitorInfoW failed, using primary work area");
            return primary_work_area();
        }

        let rc = info.rcWork;
        Rect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top)
    }
}

#[cfg(windows)]
fn primary_work_area() -> Rect {
    use windows::Win32::Foundation::RECT;
    use windows::Win32::UI::WindowsAndMessaging::{
        SystemParametersInfoW, SPI_GETWORKAREA, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
    };

    let mut rc = RECT::default();
    let ok = unsafe {
        SystemParametersInfoW(
            SPI_GETWORKAREA,
            0,
            Some(&mut rc as *mut RECT as *mut _),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )
    }
    .is_ok();

    if ok {
        Rect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top)
    } else {
        TrackedScreen::FALLBACK_WORK_AREA
    }
}

/// Screen geometry fed from what the window and tray report.
///
/// Used where no native cursor query is wired up. The cursor is known
/// while it is over the tray icon or the window; anywhere else it reads
/// as off-screen, which is what the hide check needs.
#[derive(Debug, Clone)]
pub struct TrackedScreen {
    cursor: Rc<Cell<Option<Point>>>,
    work_area: Rc<Cell<Rect>>,
}

impl TrackedScreen {
    pub const FALLBACK_WORK_AREA: Rect = Rect::new(0, 0, 1920, 1040);

    const OFF_SCREEN: Point = Point::new(i32::MIN / 2, i32::MIN / 2);

    pub fn new() -> Self {
        Self {
            cursor: Rc::new(Cell::new(None)),
            work_area: Rc::new(Cell::new(Self::FALLBACK_WORK_AREA)),
        }
    }

    pub fn set_cursor(&self, cursor: Option<Point>) {
        self.cursor.set(cursor);
    }

    pub fn set_work_area(&self, work_area: Rect) {
        if work_area.width > 0 && work_area.height > 0 {
            self.work_area.set(work_area);
        }
    }
}

impl Default for TrackedScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenQuery for TrackedScreen {
    fn cursor_position(&self) -> Point {
        self.cursor.get().unwrap_or(Self::OFF_SCREEN)
    }

    fn work_area_near(&self, _point: Point) -> Rect {
        self.work_area.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_cursor_is_outside_every_work_area() {
        let screen = TrackedScreen::new();
        let cursor = screen.cursor_position();
        assert!(!screen.work_area_near(cursor).contains(cursor));

        screen.set_cursor(Some(Point::new(10, 20)));
        assert_eq!(screen.cursor_position(), Point::new(10, 20));
    }

    #[test]
    fn test_clones_share_state() {
        let screen = TrackedScreen::new();
        let feeder = screen.clone();

        feeder.set_work_area(Rect::new(0, 0, 2560, 1400));
        feeder.set_work_area(Rect::new(0, 0, 0, 0));
        assert_eq!(screen.work_area_near(Point::default()), Rect::new(0, 0, 2560, 1400));
    }
}

//! System tray icon with a Show/Hide toggle and Exit.
//!
//! The tray is its own lifecycle: on Linux it runs a GTK loop on a
//! dedicated thread, elsewhere it lives on the UI thread. Either way it
//! talks to the overlay only through [`TrayAction`]s polled from the UI
//! tick, never by touching UI state directly. If tray setup fails the
//! overlay keeps running without one.

use tray_icon::menu::{Menu, MenuEvent, MenuItem};
use tray_icon::{Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};

/// Control operations the tray can request. Both are idempotent at the
/// window level, so replaying a stale toggle is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    ToggleWindow,
    Exit,
}

const TOGGLE_ID: &str = "show-hide";
const EXIT_ID: &str = "exit";
const ICON_SIZE: u32 = 64;

pub struct Tray {
    // Keeps the icon alive for the process lifetime. On Linux the GTK
    // thread owns it instead.
    #[cfg(not(target_os = "linux"))]
    _icon: Option<TrayIcon>,
}

impl Tray {
    /// Set up the tray icon. On Linux this spawns the GTK thread and
    /// returns immediately; menu events flow through the global
    /// receivers regardless of which thread owns the icon.
    #[cfg(target_os = "linux")]
    pub fn spawn() -> Self {
        std::thread::spawn(|| {
            if gtk::init().is_err() {
                eprintln!("[perch] tray unavailable: gtk init failed");
                return;
            }
            let Some(_icon) = build_tray() else {
                return;
            };
            gtk::main();
        });
        Self {}
    }

    #[cfg(not(target_os = "linux"))]
    pub fn spawn() -> Self {
        Self {
            _icon: build_tray(),
        }
    }

    /// Poll the next pending tray action, if any. A left click on the
    /// icon acts as the default menu item, i.e. Show/Hide.
    pub fn try_action(&self) -> Option<TrayAction> {
        if let Ok(event) = MenuEvent::receiver().try_recv() {
            return match event.id.0.as_str() {
                TOGGLE_ID => Some(TrayAction::ToggleWindow),
                EXIT_ID => Some(TrayAction::Exit),
                _ => None,
            };
        }

        if let Ok(TrayIconEvent::Click {
            button: MouseButton::Left,
            button_state: MouseButtonState::Up,
            ..
        }) = TrayIconEvent::receiver().try_recv()
        {
            return Some(TrayAction::ToggleWindow);
        }

        None
    }

    /// Best-effort teardown on exit. The process is going away, so any
    /// failure here is ignored.
    pub fn shutdown(&mut self) {
        #[cfg(not(target_os = "linux"))]
        {
            self._icon = None;
        }
    }
}

fn build_tray() -> Option<TrayIcon> {
    let menu = Menu::new();
    let toggle = MenuItem::with_id(TOGGLE_ID, "Show/Hide", true, None);
    let exit = MenuItem::with_id(EXIT_ID, "Exit", true, None);
    if let Err(e) = menu.append_items(&[&toggle, &exit]) {
        eprintln!("[perch] tray menu setup failed: {e}");
        return None;
    }

    let (rgba, w, h) = icon_rgba();
    let icon = match Icon::from_rgba(rgba, w, h) {
        Ok(icon) => icon,
        Err(e) => {
            eprintln!("[perch] tray icon build failed: {e}");
            return None;
        }
    };

    match TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip("Perch")
        .with_icon(icon)
        .build()
    {
        Ok(tray) => Some(tray),
        Err(e) => {
            eprintln!("[perch] tray unavailable: {e}");
            None
        }
    }
}

/// The icon is drawn at startup rather than shipped as an asset: a green
/// field with a white plate, matching the gauge ramp's resting color.
pub fn icon_rgba() -> (Vec<u8>, u32, u32) {
    let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let plate = (8..56).contains(&x) && (8..56).contains(&y);
            let (r, g, b) = if plate {
                (0xff, 0xff, 0xff)
            } else {
                (0x4c, 0xaf, 0x50)
            };
            rgba.extend_from_slice(&[r, g, b, 0xff]);
        }
    }
    (rgba, ICON_SIZE, ICON_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_buffer_dimensions() {
        let (rgba, w, h) = icon_rgba();
        assert_eq!((w, h), (64, 64));
        assert_eq!(rgba.len(), (w * h * 4) as usize);
    }

    #[test]
    fn test_icon_is_opaque() {
        let (rgba, _, _) = icon_rgba();
        assert!(rgba.chunks_exact(4).all(|px| px[3] == 0xff));
    }
}

#![windows_subsystem = "windows"]

mod dashboard;
mod gauge;
mod gpu;
mod metrics;
mod ramp;
mod sampler;
mod theme;
mod tray;
mod ui;

use iced::{window, Point, Size};

use dashboard::{WINDOW_HEIGHT, WINDOW_WIDTH};
use ui::Perch;

fn main() -> iced::Result {
    let (rgba, width, height) = tray::icon_rgba();
    let icon = window::icon::from_rgba(rgba, width, height).ok();

    iced::application(Perch::title, Perch::update, Perch::view)
        .subscription(Perch::subscription)
        .theme(Perch::theme)
        .style(Perch::style)
        .window(window::Settings {
            size: Size::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            position: window::Position::SpecificWith(top_right),
            resizable: false,
            decorations: false,
            transparent: true,
            level: window::Level::AlwaysOnTop,
            icon,
            // Closing hides to the tray; Exit lives in the tray menu.
            exit_on_close_request: false,
            #[cfg(target_os = "linux")]
            platform_specific: window::settings::PlatformSpecific {
                application_id: String::from("perch"),
                ..Default::default()
            },
            ..Default::default()
        })
        .run_with(Perch::new)
}

/// Tucked into the top-right corner of the primary monitor.
fn top_right(window: Size, monitor: Size) -> Point {
    Point::new((monitor.width - window.width - 10.0).max(0.0), 10.0)
}

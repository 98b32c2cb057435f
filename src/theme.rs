use iced::Color;

/// The overlay's fixed dark palette. The window background doubles as
/// the transparency key, so only the gauge tracks are visible on screen.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub window_bg: Color,
    pub track: Color,
    pub track_outline: Color,
    pub text: Color,
}

pub fn overlay_palette() -> Palette {
    Palette {
        window_bg: Color::TRANSPARENT,
        track: Color::from_rgb8(0x2b, 0x2b, 0x2b),
        track_outline: Color::from_rgb8(0x40, 0x40, 0x40),
        text: Color::from_rgb8(0xe0, 0xe0, 0xe0),
    }
}

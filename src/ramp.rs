use iced::Color;

/// An 8-bit RGB triple. The ramp works in integer channel space; conversion
/// to an `iced::Color` happens only at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_color(self) -> Color {
        Color::from_rgb8(self.r, self.g, self.b)
    }
}

/// Which value-to-color policy a gauge uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampKind {
    /// Green → yellow → red over a 0–100 percentage.
    Linear,
    /// Threshold bands over raw degrees Celsius.
    Temperature,
}

const GREEN: Rgb = Rgb::new(76, 175, 80);
const YELLOW: Rgb = Rgb::new(255, 235, 0);

/// Map a value to a fill color under the given ramp policy.
///
/// `Linear` expects a percentage in [0, 100]; callers are responsible for
/// having divided by the gauge maximum first. `Temperature` expects raw
/// degrees Celsius and uses strict upper bounds, so exactly 50.0 falls
/// into the green→yellow band (ratio 0), not the flat green below it.
pub fn color_for(value: f32, kind: RampKind) -> Rgb {
    match kind {
        RampKind::Linear => linear(value),
        RampKind::Temperature => temperature(value),
    }
}

fn linear(percent: f32) -> Rgb {
    if percent <= 50.0 {
        let ratio = percent / 50.0;
        lerp_rgb(GREEN, YELLOW, ratio)
    } else {
        let ratio = (percent - 50.0) / 50.0;
        Rgb::new(255, lerp(235, 82, ratio), lerp(59, 0, ratio))
    }
}

fn temperature(celsius: f32) -> Rgb {
    if celsius < 50.0 {
        GREEN
    } else if celsius < 60.0 {
        let ratio = (celsius - 50.0) / 10.0;
        lerp_rgb(GREEN, YELLOW, ratio)
    } else if celsius < 70.0 {
        let ratio = (celsius - 60.0) / 10.0;
        Rgb::new(255, lerp(235, 165, ratio), lerp(59, 0, ratio))
    } else {
        // Capped at 100°C — hotter never extrapolates past pure red.
        let ratio = ((celsius - 70.0) / 30.0).min(1.0);
        Rgb::new(255, lerp(165, 82, ratio), lerp(59, 0, ratio))
    }
}

fn lerp(start: u8, end: u8, ratio: f32) -> u8 {
    (start as f32 + (end as f32 - start as f32) * ratio).round() as u8
}

fn lerp_rgb(start: Rgb, end: Rgb, ratio: f32) -> Rgb {
    Rgb::new(
        lerp(start.r, end.r, ratio),
        lerp(start.g, end.g, ratio),
        lerp(start.b, end.b, ratio),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_endpoints() {
        assert_eq!(color_for(0.0, RampKind::Linear), Rgb::new(76, 175, 80));
        assert_eq!(color_for(50.0, RampKind::Linear), Rgb::new(255, 235, 0));
        assert_eq!(color_for(100.0, RampKind::Linear), Rgb::new(255, 82, 0));
    }

    #[test]
    fn test_linear_midpoints() {
        // Halfway up each segment, channels land on the rounded midpoint.
        assert_eq!(color_for(25.0, RampKind::Linear), Rgb::new(166, 205, 40));
        assert_eq!(color_for(75.0, RampKind::Linear), Rgb::new(255, 159, 30));
    }

    #[test]
    fn test_temperature_flat_green_below_50() {
        assert_eq!(color_for(0.0, RampKind::Temperature), Rgb::new(76, 175, 80));
        assert_eq!(color_for(49.9, RampKind::Temperature), Rgb::new(76, 175, 80));
    }

    #[test]
    fn test_temperature_band_boundaries() {
        // Exactly 50 takes the green→yellow band at ratio 0, which happens
        // to coincide with the flat green — the branch, not the value, is
        // what the tie-break pins down.
        assert_eq!(color_for(50.0, RampKind::Temperature), Rgb::new(76, 175, 80));
        assert_eq!(color_for(60.0, RampKind::Temperature), Rgb::new(255, 235, 59));
        assert_eq!(color_for(70.0, RampKind::Temperature), Rgb::new(255, 165, 59));
    }

    #[test]
    fn test_temperature_clamps_past_100() {
        let at_100 = color_for(100.0, RampKind::Temperature);
        assert_eq!(at_100, Rgb::new(255, 82, 0));
        assert_eq!(color_for(120.0, RampKind::Temperature), at_100);
    }

    #[test]
    fn test_to_color_roundtrip() {
        let c = Rgb::new(255, 82, 0).to_color();
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.b - 0.0).abs() < 1e-6);
    }
}

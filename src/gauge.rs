use crate::ramp::{self, RampKind, Rgb};

/// Which metric a gauge tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeId {
    Cpu,
    Ram,
    Gpu,
    Vram,
    Temp,
}

/// Drawing parameters derived from the current value. Recomputed on every
/// update; the draw pass only reads, never computes.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Filled fraction of the track, `value / max_value`.
    pub fill_ratio: f32,
    pub color: Rgb,
    /// Integer-rounded value plus unit, e.g. "42%" or "67°C".
    pub display_text: String,
}

/// A single metric's value state plus its cached render state.
///
/// The minimum is fixed at zero. Values are clamped to `max_value` on
/// update and never extrapolated beyond it; there is no lower clamp, a
/// malfunctioning source reporting negative values passes through as-is.
#[derive(Debug, Clone)]
pub struct Gauge {
    pub id: GaugeId,
    pub label: &'static str,
    pub max_value: f32,
    pub unit: &'static str,
    pub ramp: RampKind,
    value: f32,
    render: RenderState,
}

impl Gauge {
    pub fn new(id: GaugeId, label: &'static str, max_value: f32, unit: &'static str, ramp: RampKind) -> Self {
        let mut gauge = Self {
            id,
            label,
            max_value,
            unit,
            ramp,
            value: 0.0,
            render: RenderState {
                fill_ratio: 0.0,
                color: ramp::color_for(0.0, ramp),
                display_text: String::new(),
            },
        };
        gauge.update(None);
        gauge
    }

    /// Apply a new reading. Absence means the source had nothing for this
    /// cycle and renders as zero, not as an error. Total over its input
    /// domain; calling twice with the same value yields the same state.
    pub fn update(&mut self, raw: Option<f32>) {
        let raw = raw.unwrap_or(0.0);
        self.value = raw.min(self.max_value);

        let fill_ratio = self.value / self.max_value;
        let color = match self.ramp {
            RampKind::Linear => ramp::color_for(fill_ratio * 100.0, RampKind::Linear),
            RampKind::Temperature => ramp::color_for(self.value, RampKind::Temperature),
        };

        self.render = RenderState {
            fill_ratio,
            color,
            display_text: format!("{:.0}{}", self.value, self.unit),
        };
    }

    #[cfg(test)]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent_gauge() -> Gauge {
        Gauge::new(GaugeId::Cpu, "CPU", 100.0, "%", RampKind::Linear)
    }

    #[test]
    fn test_fresh_gauge_is_zeroed() {
        let g = percent_gauge();
        assert_eq!(g.value(), 0.0);
        assert_eq!(g.render_state().fill_ratio, 0.0);
        assert_eq!(g.render_state().display_text, "0%");
        assert_eq!(g.render_state().color, Rgb::new(76, 175, 80));
    }

    #[test]
    fn test_update_none_renders_as_zero() {
        let mut g = percent_gauge();
        g.update(Some(80.0));
        g.update(None);
        assert_eq!(g.render_state().fill_ratio, 0.0);
        assert_eq!(g.render_state().display_text, "0%");
    }

    #[test]
    fn test_update_clamps_to_max() {
        let mut g = percent_gauge();
        g.update(Some(150.0));
        assert_eq!(g.value(), 100.0);
        assert_eq!(g.render_state().fill_ratio, 1.0);
        assert_eq!(g.render_state().display_text, "100%");
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut g = percent_gauge();
        g.update(Some(42.4));
        let first = g.render_state().clone();
        g.update(Some(42.4));
        assert_eq!(*g.render_state(), first);
    }

    #[test]
    fn test_display_text_is_integer_rounded() {
        let mut g = percent_gauge();
        g.update(Some(41.7));
        assert_eq!(g.render_state().display_text, "42%");
    }

    #[test]
    fn test_temperature_gauge_ramps_on_raw_celsius() {
        let mut g = Gauge::new(GaugeId::Temp, "Temp", 100.0, "°C", RampKind::Temperature);
        g.update(Some(67.0));
        assert_eq!(g.render_state().display_text, "67°C");
        // 67°C sits in the yellow→orange band, not at 67% of the linear ramp.
        assert_eq!(g.render_state().color, Rgb::new(255, 186, 18));
        assert!((g.render_state().fill_ratio - 0.67).abs() < 1e-6);
    }
}

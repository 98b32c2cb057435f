use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke, Text};
use iced::{Point, Rectangle, Renderer, Size, Theme};

use crate::gauge::{Gauge, GaugeId};
use crate::metrics::Sample;
use crate::ramp::RampKind;
use crate::theme::Palette;
use crate::ui::Message;

// Fixed layout: five 85×30 gauges in a row, 3-unit gaps, 5-unit margin.
pub const GAUGE_WIDTH: f32 = 85.0;
pub const GAUGE_HEIGHT: f32 = 30.0;
pub const GAUGE_GAP: f32 = 3.0;
pub const MARGIN: f32 = 5.0;
pub const GAUGE_Y: f32 = 5.0;

pub const WINDOW_WIDTH: f32 = 450.0;
pub const WINDOW_HEIGHT: f32 = 40.0;

const LABEL_SIZE: f32 = 11.0;

/// Owns the five gauges and their fixed layout, routes samples to them,
/// and draws the whole overlay in a single canvas pass.
///
/// Gauges live on the UI thread only; the sampler never touches them.
pub struct Dashboard {
    gauges: [Gauge; 5],
    palette: Palette,
}

impl Dashboard {
    pub fn new(palette: Palette) -> Self {
        Self {
            gauges: [
                Gauge::new(GaugeId::Cpu, "CPU", 100.0, "%", RampKind::Linear),
                Gauge::new(GaugeId::Ram, "RAM", 100.0, "%", RampKind::Linear),
                Gauge::new(GaugeId::Gpu, "GPU", 100.0, "%", RampKind::Linear),
                Gauge::new(GaugeId::Vram, "VRAM", 100.0, "%", RampKind::Linear),
                Gauge::new(GaugeId::Temp, "Temp", 100.0, "°C", RampKind::Temperature),
            ],
            palette,
        }
    }

    /// Dispatch one sample to the gauges. Absent GPU readings pass
    /// through as `None` and render as zero.
    pub fn apply(&mut self, sample: &Sample) {
        for gauge in &mut self.gauges {
            let raw = match gauge.id {
                GaugeId::Cpu => Some(sample.cpu_percent),
                GaugeId::Ram => Some(sample.ram_percent),
                GaugeId::Gpu => sample.gpu_percent,
                GaugeId::Vram => sample.vram_percent,
                GaugeId::Temp => sample.gpu_temp_c,
            };
            gauge.update(raw);
        }
    }

    #[cfg(test)]
    pub fn gauge(&self, id: GaugeId) -> &Gauge {
        self.gauges
            .iter()
            .find(|g| g.id == id)
            .expect("dashboard owns one gauge per id")
    }

    /// Left edge of the i-th gauge.
    fn gauge_x(index: usize) -> f32 {
        MARGIN + (GAUGE_WIDTH + GAUGE_GAP) * index as f32
    }

    fn draw_gauge(&self, frame: &mut Frame, index: usize, gauge: &Gauge) {
        let pal = &self.palette;
        let x = Self::gauge_x(index);
        let state = gauge.render_state();

        // Track
        let track = Path::rectangle(
            Point::new(x, GAUGE_Y),
            Size::new(GAUGE_WIDTH, GAUGE_HEIGHT),
        );
        frame.fill(&track, pal.track);
        frame.stroke(
            &track,
            Stroke::default().with_color(pal.track_outline).with_width(1.0),
        );

        // Fill overlay, percentage-to-pixel
        let fill_width = state.fill_ratio * GAUGE_WIDTH;
        if fill_width > 0.0 {
            let fill = Path::rectangle(
                Point::new(x, GAUGE_Y),
                Size::new(fill_width.min(GAUGE_WIDTH), GAUGE_HEIGHT),
            );
            frame.fill(&fill, state.color.to_color());
        }

        let text_y = GAUGE_Y + GAUGE_HEIGHT / 2.0;

        let mut label = Text::from(gauge.label.to_string());
        label.position = Point::new(x + 5.0, text_y);
        label.color = pal.text;
        label.size = LABEL_SIZE.into();
        label.horizontal_alignment = iced::alignment::Horizontal::Left;
        label.vertical_alignment = iced::alignment::Vertical::Center;
        frame.fill_text(label);

        let mut value = Text::from(state.display_text.clone());
        value.position = Point::new(x + GAUGE_WIDTH - 5.0, text_y);
        value.color = pal.text;
        value.size = LABEL_SIZE.into();
        value.horizontal_alignment = iced::alignment::Horizontal::Right;
        value.vertical_alignment = iced::alignment::Vertical::Center;
        frame.fill_text(value);
    }
}

impl canvas::Program<Message> for Dashboard {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        // Anywhere on the overlay is a drag handle.
        if let canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) = event {
            if cursor.is_over(bounds) {
                return (canvas::event::Status::Captured, Some(Message::DragWindow));
            }
        }
        (canvas::event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        let bg = Path::rectangle(Point::ORIGIN, bounds.size());
        frame.fill(&bg, self.palette.window_bg);

        for (index, gauge) in self.gauges.iter().enumerate() {
            self.draw_gauge(&mut frame, index, gauge);
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ramp::Rgb;
    use crate::theme::overlay_palette;

    fn fresh() -> Dashboard {
        Dashboard::new(overlay_palette())
    }

    #[test]
    fn test_layout_fits_the_window() {
        let last_right = Dashboard::gauge_x(4) + GAUGE_WIDTH;
        assert_eq!(Dashboard::gauge_x(0), 5.0);
        assert_eq!(Dashboard::gauge_x(1), 93.0);
        assert!(last_right <= WINDOW_WIDTH);
        assert!(GAUGE_Y + GAUGE_HEIGHT <= WINDOW_HEIGHT);
    }

    #[test]
    fn test_apply_routes_fields_to_gauges() {
        let mut dash = fresh();
        dash.apply(&Sample {
            cpu_percent: 30.0,
            ram_percent: 60.0,
            gpu_percent: Some(10.0),
            vram_percent: Some(20.0),
            gpu_temp_c: Some(45.0),
        });

        assert_eq!(dash.gauge(GaugeId::Cpu).render_state().display_text, "30%");
        assert_eq!(dash.gauge(GaugeId::Ram).render_state().display_text, "60%");
        assert_eq!(dash.gauge(GaugeId::Gpu).render_state().display_text, "10%");
        assert_eq!(dash.gauge(GaugeId::Vram).render_state().display_text, "20%");
        assert_eq!(dash.gauge(GaugeId::Temp).render_state().display_text, "45°C");
    }

    #[test]
    fn test_headless_sample_renders_gpu_gauges_as_zero() {
        let mut dash = fresh();
        dash.apply(&Sample {
            cpu_percent: 75.0,
            ram_percent: 40.0,
            gpu_percent: None,
            vram_percent: None,
            gpu_temp_c: None,
        });

        let cpu = dash.gauge(GaugeId::Cpu).render_state();
        assert!((cpu.fill_ratio - 0.75).abs() < 1e-6);
        // 75% lands in the yellow→red half of the linear ramp.
        assert_eq!(cpu.color, Rgb::new(255, 159, 30));

        for id in [GaugeId::Gpu, GaugeId::Vram, GaugeId::Temp] {
            let state = dash.gauge(id).render_state();
            assert_eq!(state.fill_ratio, 0.0);
            assert_eq!(state.color, Rgb::new(76, 175, 80));
        }
    }
}

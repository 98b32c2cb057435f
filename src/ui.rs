use std::time::Duration;

use crossbeam_channel::Receiver;
use iced::widget::canvas::Canvas;
use iced::{window, Element, Length, Subscription, Task, Theme};

use crate::dashboard::Dashboard;
use crate::metrics::{Sample, SystemSource};
use crate::sampler::{self, SamplerHandle, SAMPLE_INTERVAL};
use crate::theme::{overlay_palette, Palette};
use crate::tray::{Tray, TrayAction};

/// How often the UI drains queued samples and tray events. Faster than
/// the 1 s sampling cadence so a sample never waits long for a redraw.
const DRAIN_TICK_MS: u64 = 250;
/// Fixed period for re-asserting the always-on-top hint.
const TOPMOST_TICK_MS: u64 = 500;
/// Bounded handoff queue; deep enough that a busy UI queues samples
/// instead of stalling the sampler.
const SAMPLE_QUEUE_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub enum Message {
    /// Drain pending samples and tray actions.
    Tick,
    /// Re-assert the always-on-top level.
    Topmost,
    WindowFetched(Option<window::Id>),
    DragWindow,
    HideRequested(window::Id),
}

// ─── APP STATE ──────────────────────────────────────────────────

pub struct Perch {
    dashboard: Dashboard,
    samples: Receiver<Sample>,
    /// `None` once shutdown has taken and joined it.
    sampler: Option<SamplerHandle>,
    tray: Tray,
    window: Option<window::Id>,
    visible: bool,
    palette: Palette,
}

impl Perch {
    pub fn new() -> (Self, Task<Message>) {
        let palette = overlay_palette();
        let (tx, rx) = crossbeam_channel::bounded(SAMPLE_QUEUE_DEPTH);
        let sampler = sampler::spawn(SystemSource::new(), SAMPLE_INTERVAL, tx);

        let perch = Self {
            dashboard: Dashboard::new(palette),
            samples: rx,
            sampler: Some(sampler),
            tray: Tray::spawn(),
            window: None,
            visible: true,
            palette,
        };

        (perch, window::get_latest().map(Message::WindowFetched))
    }

    pub fn title(&self) -> String {
        String::from("Perch")
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Transparent window background: only the gauge tracks are visible.
    pub fn style(&self, _theme: &Theme) -> iced::application::Appearance {
        iced::application::Appearance {
            background_color: self.palette.window_bg,
            text_color: self.palette.text,
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let drain = iced::time::every(Duration::from_millis(DRAIN_TICK_MS))
            .map(|_| Message::Tick);
        let topmost = iced::time::every(Duration::from_millis(TOPMOST_TICK_MS))
            .map(|_| Message::Topmost);
        // The close button hides to the tray instead of exiting.
        let closes = window::close_requests().map(Message::HideRequested);
        Subscription::batch([drain, topmost, closes])
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                // Samples are applied in production order; a busy UI only
                // delays them, it never drops or reorders.
                while let Ok(sample) = self.samples.try_recv() {
                    self.dashboard.apply(&sample);
                }

                let mut tasks = Vec::new();
                while let Some(action) = self.tray.try_action() {
                    tasks.push(match action {
                        TrayAction::ToggleWindow => self.toggle_window(),
                        TrayAction::Exit => self.exit(),
                    });
                }
                Task::batch(tasks)
            }
            Message::Topmost => match self.window {
                // Some shells drop the hint when other topmost windows
                // appear, so it is re-asserted on a fixed period.
                Some(id) if self.visible => {
                    window::change_level(id, window::Level::AlwaysOnTop)
                }
                _ => Task::none(),
            },
            Message::WindowFetched(id) => {
                self.window = id;
                Task::none()
            }
            Message::DragWindow => match self.window {
                Some(id) => window::drag(id),
                None => Task::none(),
            },
            Message::HideRequested(id) => self.hide(id),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        Canvas::new(&self.dashboard)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn toggle_window(&mut self) -> Task<Message> {
        let Some(id) = self.window else {
            return Task::none();
        };
        if self.visible {
            self.hide(id)
        } else {
            self.show(id)
        }
    }

    fn show(&mut self, id: window::Id) -> Task<Message> {
        self.visible = true;
        Task::batch([
            window::change_mode(id, window::Mode::Windowed),
            window::change_level(id, window::Level::AlwaysOnTop),
        ])
    }

    fn hide(&mut self, id: window::Id) -> Task<Message> {
        self.visible = false;
        window::change_mode(id, window::Mode::Hidden)
    }

    /// Orderly exit: stop the sampler and wait out its in-flight cycle
    /// (at most one interval), then tear the tray down best-effort and
    /// end the event loop.
    fn exit(&mut self) -> Task<Message> {
        if let Some(mut sampler) = self.sampler.take() {
            sampler.join();
        }
        self.tray.shutdown();
        iced::exit()
    }
}

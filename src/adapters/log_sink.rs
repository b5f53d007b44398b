//! Log-based alert sink and renderer.
//!
//! Implements [`AlertSink`] and [`Renderer`] by writing to the `log`
//! facade (stderr via `env_logger` in the host binary).  A notification
//! or UI adapter would implement the same traits.

use log::{info, warn};

use crate::alert::Alert;
use crate::app::events::DisplaySnapshot;
use crate::app::ports::{AlertSink, Renderer};

/// Adapter that logs every [`Alert`] and counts them.
#[derive(Debug, Default)]
pub struct LogAlertSink {
    delivered: usize,
}

impl LogAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }
}

impl AlertSink for LogAlertSink {
    fn notify(&mut self, alert: &Alert) {
        self.delivered += 1;
        warn!("NOTIFY | {} | {}", alert.title, alert.message);
    }
}

/// Output style for [`LogRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    /// One human-readable line per frame.
    #[default]
    Text,
    /// One JSON object per frame.
    Json,
}

/// Renderer that logs each frame.
#[derive(Debug, Default)]
pub struct LogRenderer {
    format: RenderFormat,
    frames: usize,
    last: Option<DisplaySnapshot>,
}

impl LogRenderer {
    pub fn new(format: RenderFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Most recently rendered frame.
    pub fn last(&self) -> Option<&DisplaySnapshot> {
        self.last.as_ref()
    }

    fn text_line(s: &DisplaySnapshot) -> String {
        let swatch = |c: &crate::reading::Sample<crate::color::Rgb>| {
            c.value().map_or_else(|| "-------".to_owned(), |c| c.to_hex_string())
        };
        format!(
            "RENDER | T={} [{}] | H={} [{}] | light={}{}",
            s.temperature_display,
            swatch(&s.temperature_color),
            s.humidity_display,
            swatch(&s.humidity_color),
            if s.light_on { "ON" } else { "OFF" },
            if s.light_write_failed { " (write failed)" } else { "" },
        )
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, snapshot: &DisplaySnapshot) {
        self.frames += 1;
        match self.format {
            RenderFormat::Text => info!("{}", Self::text_line(snapshot)),
            RenderFormat::Json => match serde_json::to_string(snapshot) {
                Ok(json) => info!("{json}"),
                Err(e) => warn!("RENDER | snapshot not serialisable: {e}"),
            },
        }
        self.last = Some(snapshot.clone());
    }
}

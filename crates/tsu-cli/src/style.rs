//! Console decoration for operator-facing output.

use std::io::IsTerminal;

use tsu_config::LogStyle;
use tsu_ingest::SummaryTone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
    Info,
    /// Player names in the preview.
    Accent,
    /// Player ids in the preview.
    Muted,
}

impl From<SummaryTone> for Tone {
    fn from(t: SummaryTone) -> Self {
        match t {
            SummaryTone::Success => Tone::Success,
            SummaryTone::Warning => Tone::Warning,
            SummaryTone::Error => Tone::Error,
            SummaryTone::Info => Tone::Info,
        }
    }
}

pub trait Styler: Send + Sync {
    fn paint(&self, tone: Tone, text: &str) -> String;
}

/// ANSI SGR colors.
#[derive(Debug, Default)]
pub struct DecoratedStyler;

impl DecoratedStyler {
    fn code(tone: Tone) -> &'static str {
        match tone {
            Tone::Success => "32",
            Tone::Warning => "33",
            Tone::Error => "31",
            Tone::Info => "36",
            Tone::Accent => "94",
            Tone::Muted => "90",
        }
    }
}

impl Styler for DecoratedStyler {
    fn paint(&self, tone: Tone, text: &str) -> String {
        format!("\x1b[{}m{text}\x1b[0m", Self::code(tone))
    }
}

#[derive(Debug, Default)]
pub struct PlainStyler;

impl Styler for PlainStyler {
    fn paint(&self, _tone: Tone, text: &str) -> String {
        text.to_string()
    }
}

pub fn styler_for(style: LogStyle) -> Box<dyn Styler> {
    select(style, std::io::stdout().is_terminal())
}

fn select(style: LogStyle, stdout_is_terminal: bool) -> Box<dyn Styler> {
    let decorate = match style {
        LogStyle::Color => true,
        LogStyle::Plain => false,
        LogStyle::Auto => stdout_is_terminal,
    };
    if decorate {
        Box::new(DecoratedStyler)
    } else {
        Box::new(PlainStyler)
    }
}

//! Tracing formatter that stamps every event with the simulation tick.
//!
//! The simulation thread advances a global counter once per tick, so log
//! lines from the render and simulation threads can be correlated against
//! the fixed-rate timeline even when wall-clock timestamps interleave.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::macros::format_description;
use time::{format_description::FormatItem, OffsetDateTime};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

static TICK_COUNTER: AtomicU64 = AtomicU64::new(0);

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:4]");

/// Advances the global tick stamp. Called once per tick by the simulation
/// loop.
pub fn mark_tick() {
    TICK_COUNTER.fetch_add(1, Ordering::Relaxed);
}

/// The tick the log stamp currently reports.
pub fn current_tick() -> u64 {
    TICK_COUNTER.load(Ordering::Relaxed)
}

/// Event formatter: `HH:MM:SS.ssss @tick LEVEL target: fields`.
pub struct TickFormatter;

impl<S, N> FormatEvent<S, N> for TickFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let now = OffsetDateTime::now_utc();
        let timestamp = now.format(&TIMESTAMP_FORMAT).map_err(|_| fmt::Error)?;
        write_dimmed(&mut writer, format_args!("{timestamp} "))?;

        write_dimmed(&mut writer, format_args!("@{:<6} ", current_tick()))?;

        write_level(&mut writer, meta.level())?;
        writer.write_char(' ')?;

        write_dimmed(&mut writer, format_args!("{}: ", meta.target()))?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn write_level(writer: &mut Writer<'_>, level: &Level) -> fmt::Result {
    if writer.has_ansi_escapes() {
        let color = match *level {
            Level::TRACE => "\x1b[35m",
            Level::DEBUG => "\x1b[34m",
            Level::INFO => "\x1b[32m",
            Level::WARN => "\x1b[33m",
            Level::ERROR => "\x1b[31m",
        };
        write!(writer, "{}{:>5}\x1b[0m", color, level.as_str())
    } else {
        write!(writer, "{:>5}", level.as_str())
    }
}

fn write_dimmed(writer: &mut Writer<'_>, value: impl fmt::Display) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "\x1b[2m{}\x1b[0m", value)
    } else {
        write!(writer, "{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counter_advances() {
        let before = current_tick();
        mark_tick();
        mark_tick();
        assert_eq!(current_tick(), before + 2);
    }
}

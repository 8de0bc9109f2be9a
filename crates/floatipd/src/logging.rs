//! Subscriber setup for the daemon
//!
//! Lines go to stderr as `[<date time> ]<SEVERITY> <message>`. Filtering is
//! delegated to [`LogPolicy`] so quiet mode and the severity threshold are
//! decided in one place.

use floatip_core::{LogPolicy, Severity};
use std::fmt;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Single-line event formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormatter {
    show_datetime: bool,
}

impl LineFormatter {
    pub fn new(show_datetime: bool) -> Self {
        Self { show_datetime }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        if self.show_datetime {
            write!(writer, "{} ", chrono::Local::now().format(DATETIME_FORMAT))?;
        }
        write!(writer, "{} ", Severity::from_metadata(event.metadata()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Build a subscriber that writes through `make_writer`
pub fn subscriber<W>(policy: LogPolicy, make_writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(make_writer)
        .event_format(LineFormatter::new(policy.show_datetime))
        .with_filter(filter_fn(move |meta: &Metadata<'_>| {
            policy.allows_metadata(meta)
        }));

    tracing_subscriber::registry().with(layer)
}

/// Install the global subscriber writing to stderr
pub fn init(policy: LogPolicy) -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(subscriber(policy, std::io::stderr))
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

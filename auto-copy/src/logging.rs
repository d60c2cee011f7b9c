//! Log output for the mirror.
//!
//! Every line goes to stderr as `[autoCopy] <message>`; lines above or below
//! `info` also carry their level. `RUST_LOG` overrides the default `info` filter:
//!
//! ```bash
//! RUST_LOG=debug auto-copy
//! ```

use std::fmt;
use std::sync::Once;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Prefix written at the start of every log line.
pub const LOG_PREFIX: &str = "autoCopy";

static INIT: Once = Once::new();

/// `[prefix] LEVEL: message` for everything but `info`, which omits the level.
struct PrefixedFormat {
    prefix: &'static str,
}

impl<S, N> FormatEvent<S, N> for PrefixedFormat
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
        write!(writer, "[{}] ", self.prefix)?;

        let level = *event.metadata().level();
        if level != Level::INFO {
            write!(writer, "{level}: ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Initialize logging. Only the first call takes effect.
pub fn init() {
    init_with_default("info");
}

/// Initialize logging with `default` as the filter when `RUST_LOG` is unset.
pub fn init_with_default(default: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .event_format(PrefixedFormat { prefix: LOG_PREFIX })
            .with_filter(filter);

        // A test harness may already have installed a subscriber.
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}

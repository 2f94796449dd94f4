//! Watch command: run the coordinator with polling and print every refresh.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use vinorage_core::entity::brightness::to_presentation;
use vinorage_core::{ConfigEntry, DEFAULT_SCAN_INTERVAL_SECS, RefreshEvent, RefreshState};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── View ────────────────────────────────────────────────────────────

/// One refresh, as printed.
#[derive(Debug, Serialize)]
struct RefreshView {
    sequence: u64,
    at: DateTime<Utc>,
    ok: bool,
    /// Device LED level, 0-100, from the snapshot being served.
    led_brightness: Option<u8>,
    /// Light brightness, 0-255.
    brightness: Option<u8>,
    error: Option<String>,
}

impl RefreshView {
    fn new(sequence: u64, led_brightness: Option<u8>, error: Option<String>) -> Self {
        Self {
            sequence,
            at: Utc::now(),
            ok: error.is_none(),
            led_brightness,
            brightness: led_brightness.map(to_presentation),
            error,
        }
    }

    fn from_state(state: &RefreshState) -> Self {
        Self::new(
            state.sequence,
            state.snapshot.as_ref().map(|s| s.led_brightness),
            state.last_error.as_ref().map(ToString::to_string),
        )
    }

    fn from_event(event: &RefreshEvent) -> Self {
        match event {
            RefreshEvent::Updated { sequence, snapshot } => {
                Self::new(*sequence, Some(snapshot.led_brightness), None)
            }
            RefreshEvent::Failed {
                sequence,
                error,
                stale,
            } => Self::new(
                *sequence,
                stale.as_ref().map(|s| s.led_brightness),
                Some(error.to_string()),
            ),
        }
    }
}

fn line(view: &RefreshView, color: bool) -> String {
    let at = view.at.with_timezone(&Local).format("%H:%M:%S");
    let level = view
        .led_brightness
        .map_or_else(|| "-".into(), |p| format!("{p}%"));
    match view.error {
        None => format!(
            "{at}  #{:<4} {}  LED {level}",
            view.sequence,
            output::status_word("ok", true, color)
        ),
        Some(ref error) => format!(
            "{at}  #{:<4} {}  LED {level} (stale)  {error}",
            view.sequence,
            output::status_word("failed", false, color)
        ),
    }
}

fn plain(view: &RefreshView) -> String {
    let level = view
        .led_brightness
        .map_or_else(|| "-".into(), |p| p.to_string());
    format!("{}\t{}\t{level}", view.sequence, if view.ok { "ok" } else { "failed" })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    mut entry: ConfigEntry,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let interval = args.interval.unwrap_or_else(|| {
        if entry.config.polling_enabled() {
            entry.config.poll_interval.as_secs()
        } else {
            DEFAULT_SCAN_INTERVAL_SECS
        }
    });
    entry.config = entry.config.with_poll_interval_secs(interval);

    let loaded = util::load(entry).await?;
    let coordinator = loaded.coordinator().clone();
    let mut events = coordinator.subscribe();

    let color =
        matches!(global.output, OutputFormat::Table) && output::should_color(&global.color);
    let print = |view: &RefreshView| {
        let out = output::render_single(&global.output, view, |v| line(v, color), plain);
        output::print_output(&out, global.quiet);
    };

    // The first refresh already happened during load.
    print(&RefreshView::from_state(&coordinator.state()));
    let mut seen = 1_usize;

    loop {
        if args.count.is_some_and(|n| seen >= n) {
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    print(&RefreshView::from_event(&event));
                    seen += 1;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "watch output fell behind");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    loaded.unload().await;
    Ok(())
}

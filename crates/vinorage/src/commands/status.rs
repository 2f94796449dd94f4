//! Status command: one refresh, then both entity states.

use serde::Serialize;
use tabled::Tabled;
use vinorage_core::{ConfigEntry, Entity, EntityState, Platform};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

/// Serializable view of one entity.
#[derive(Debug, Serialize)]
struct EntityView {
    unique_id: String,
    name: &'static str,
    platform: Platform,
    state: EntityState,
}

impl From<&dyn Entity> for EntityView {
    fn from(entity: &dyn Entity) -> Self {
        let descriptor = entity.descriptor();
        Self {
            unique_id: descriptor.unique_id.clone(),
            name: descriptor.name,
            platform: descriptor.platform,
            state: entity.read_state(),
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    name: String,
    #[tabled(rename = "Unique ID")]
    unique_id: String,
    #[tabled(rename = "Available")]
    available: String,
    #[tabled(rename = "State")]
    state: String,
}

fn row(view: &EntityView, color: bool) -> EntityRow {
    let available = view.state.available();
    EntityRow {
        name: view.name.into(),
        unique_id: view.unique_id.clone(),
        available: output::status_word(if available { "yes" } else { "no" }, available, color),
        state: state_text(&view.state, color),
    }
}

fn state_text(state: &EntityState, color: bool) -> String {
    match state {
        EntityState::Light(light) => match light.brightness {
            Some(b) if light.is_on => format!("{} ({b}/255)", output::status_word("on", true, color)),
            Some(_) => output::status_word("off", false, color),
            None => output::dim("unknown", color),
        },
        EntityState::Cover(cover) => match cover.is_closed {
            Some(true) => "closed".into(),
            Some(false) => "open".into(),
            None => output::dim("position unknown", color),
        },
    }
}

fn plain_line(view: &EntityView) -> String {
    let state = match view.state {
        EntityState::Light(light) => light
            .brightness
            .map_or_else(|| "unknown".into(), |b| b.to_string()),
        EntityState::Cover(_) => "unknown".into(),
    };
    format!("{}\t{state}", view.unique_id)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(entry: ConfigEntry, global: &GlobalOpts) -> Result<(), CliError> {
    let loaded = util::load_once(entry).await?;

    let views: Vec<EntityView> = loaded
        .entities()
        .iter()
        .map(|e| EntityView::from(e.as_ref()))
        .collect();
    let color =
        matches!(global.output, OutputFormat::Table) && output::should_color(&global.color);

    let out = output::render_list(&global.output, &views, |v| row(v, color), plain_line);
    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        eprintln!("{}", loaded.entry().title);
    }
    output::print_output(&out, global.quiet);

    loaded.unload().await;
    Ok(())
}

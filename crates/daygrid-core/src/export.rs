use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::event::{Event, EventStore};
use crate::tag::TagRegistry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagEntry {
    pub color: String,
    #[serde(default)]
    pub desc: String,
    pub visible: bool,
}

/// Plain dump of tags and events. Events are keyed by ISO-8601 date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportDump {
    pub tags: BTreeMap<String, TagEntry>,
    pub events: BTreeMap<String, Vec<Event>>,
}

impl ExportDump {
    pub fn capture(tags: &TagRegistry, events: &EventStore) -> Self {
        let tags = tags
            .iter()
            .map(|tag| {
                (
                    tag.id.clone(),
                    TagEntry {
                        color: tag.color.clone(),
                        desc: tag.desc.clone(),
                        visible: tag.visible,
                    },
                )
            })
            .collect();
        let events = events
            .iter()
            .map(|(date, list)| (date.format("%Y-%m-%d").to_string(), list.clone()))
            .collect();
        Self { tags, events }
    }

    /// Writes pretty JSON through a temp file in the target directory.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        debug!(tags = self.tags.len(), dates = self.events.len(), "writing export");

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        let serialized = serde_json::to_string_pretty(self)?;
        writeln!(temp, "{serialized}")?;
        temp.flush()?;

        temp.persist(path)
            .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

        info!(file = %path.display(), "exported calendar");
        Ok(())
    }

    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed parsing {}", path.display()))
    }

    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::tag::Tag;

    #[test]
    fn keys_events_by_iso_date() {
        let mut tags = TagRegistry::new();
        tags.add(Tag::new("trip", "violet").with_desc("travel").hidden())
            .expect("tag");
        let mut events = EventStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 11, 1).expect("date");
        events.insert(day, Event::new("Eco", "", "trip")).expect("insert");

        let dump = ExportDump::capture(&tags, &events);
        assert_eq!(
            dump.tags["trip"],
            TagEntry {
                color: "violet".to_string(),
                desc: "travel".to_string(),
                visible: false,
            }
        );
        assert_eq!(dump.events["2025-11-01"][0].name, "Eco");

        let json = serde_json::to_value(&dump).expect("json");
        assert_eq!(json["events"]["2025-11-01"][0]["tag"], "trip");
        assert_eq!(json["tags"]["trip"]["visible"], false);
    }
}

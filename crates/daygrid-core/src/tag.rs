use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CalendarError, Result};

/// Color painted for events whose tag is no longer registered.
pub const FALLBACK_TAG_COLOR: &str = "gray";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub color: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default = "tag_visible_default")]
    pub visible: bool,
}

fn tag_visible_default() -> bool {
    true
}

impl Tag {
    pub fn new(id: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
            desc: String::new(),
            visible: true,
        }
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Partial update for [`TagRegistry::update`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    pub color: Option<String>,
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: BTreeMap<String, Tag>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip(self, tag), fields(tag = %tag.id))]
    pub fn add(&mut self, tag: Tag) -> Result<()> {
        validate_tag(&tag)?;
        if self.tags.contains_key(&tag.id) {
            return Err(CalendarError::DuplicateTag(tag.id));
        }
        debug!(color = %tag.color, visible = tag.visible, "registered tag");
        self.tags.insert(tag.id.clone(), tag);
        Ok(())
    }

    /// Inserts or replaces a tag, returning the previous definition.
    #[tracing::instrument(skip(self, tag), fields(tag = %tag.id))]
    pub fn upsert(&mut self, tag: Tag) -> Result<Option<Tag>> {
        validate_tag(&tag)?;
        let previous = self.tags.insert(tag.id.clone(), tag);
        debug!(replaced = previous.is_some(), "upserted tag");
        Ok(previous)
    }

    #[tracing::instrument(skip(self, patch))]
    pub fn update(&mut self, id: &str, patch: TagPatch) -> Result<&Tag> {
        if let Some(color) = patch.color.as_deref()
            && color.trim().is_empty()
        {
            return Err(CalendarError::InvalidArgument(
                "tag color must not be empty".to_string(),
            ));
        }

        let tag = self
            .tags
            .get_mut(id)
            .ok_or_else(|| CalendarError::TagNotFound(id.to_string()))?;
        if let Some(color) = patch.color {
            tag.color = color;
        }
        if let Some(desc) = patch.desc {
            tag.desc = desc;
        }
        debug!(color = %tag.color, "updated tag");
        Ok(&*tag)
    }

    #[tracing::instrument(skip(self))]
    pub fn remove(&mut self, id: &str) -> Result<Tag> {
        self.tags
            .remove(id)
            .ok_or_else(|| CalendarError::TagNotFound(id.to_string()))
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<()> {
        let tag = self
            .tags
            .get_mut(id)
            .ok_or_else(|| CalendarError::TagNotFound(id.to_string()))?;
        tag.visible = visible;
        debug!(tag = %id, visible, "changed tag visibility");
        Ok(())
    }

    /// Flips visibility and returns the new state.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let visible = !self
            .tags
            .get(id)
            .ok_or_else(|| CalendarError::TagNotFound(id.to_string()))?
            .visible;
        self.set_visible(id, visible)?;
        Ok(visible)
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tags.contains_key(id)
    }

    /// Unregistered tags count as visible so dangling events stay on screen.
    pub fn is_visible(&self, id: &str) -> bool {
        self.tags.get(id).map(|tag| tag.visible).unwrap_or(true)
    }

    pub fn color_or<'a>(&'a self, id: &str, fallback: &'a str) -> &'a str {
        self.tags
            .get(id)
            .map(|tag| tag.color.as_str())
            .unwrap_or(fallback)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

fn validate_tag(tag: &Tag) -> Result<()> {
    if tag.id.trim().is_empty() {
        return Err(CalendarError::InvalidArgument(
            "tag id must not be empty".to_string(),
        ));
    }
    if tag.color.trim().is_empty() {
        return Err(CalendarError::InvalidArgument(format!(
            "tag {} has an empty color",
            tag.id
        )));
    }
    Ok(())
}

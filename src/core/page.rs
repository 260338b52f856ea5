//! Stash pages and their lifecycle
//!
//! Legacy stash pages carry a name and flags while gold lives on the stash.
//! Native stash pages carry their own gold, so deleting them must move that
//! gold somewhere or it would be lost.

use crate::error::{Result, StashError};
use crate::item::Item;
use crate::owner::{check_page_kinds, Owner};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Page attributes that depend on the stash format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    Legacy { name: String, flags: u32 },
    Native { gold: u64 },
}

/// A single stash page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub kind: PageKind,
    pub items: Vec<Item>,
}

impl Page {
    /// Create an empty legacy page
    pub fn legacy(name: impl Into<String>) -> Self {
        Page {
            kind: PageKind::Legacy {
                name: name.into(),
                flags: 0,
            },
            items: Vec::new(),
        }
    }

    /// Create an empty native page holding `gold`
    pub fn native(gold: u64) -> Self {
        Page {
            kind: PageKind::Native { gold },
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            PageKind::Legacy { name, .. } => Some(name),
            PageKind::Native { .. } => None,
        }
    }

    /// Page-level gold; always 0 on legacy pages
    pub fn gold(&self) -> u64 {
        match self.kind {
            PageKind::Native { gold } => gold,
            PageKind::Legacy { .. } => 0,
        }
    }

    /// Add gold to a native page
    fn add_gold(&mut self, amount: u64) -> Result<()> {
        match &mut self.kind {
            PageKind::Native { gold } => {
                *gold = gold
                    .checked_add(amount)
                    .ok_or(StashError::GoldOverflow(amount))?;
                Ok(())
            }
            PageKind::Legacy { .. } => Err(StashError::PageKindMismatch {
                page: 0,
                expected: "native",
            }),
        }
    }

    fn set_page_index(&mut self, index: Option<usize>) {
        for item in &mut self.items {
            item.set_page(index);
        }
    }
}

/// Append an empty page to a stash and return its index
///
/// Native pages ignore `name`.
pub fn add_page(owner: &mut Owner, name: &str) -> Result<usize> {
    let label = owner.owner_name();
    let page = match owner {
        Owner::Character(_) => return Err(StashError::NotAStash(label)),
        Owner::LegacyStash(_) => Page::legacy(name),
        Owner::NativeStash(_) => Page::native(0),
    };

    let pages = owner.pages_mut().ok_or_else(|| StashError::NotAStash(label.clone()))?;
    pages.push(page);
    let index = pages.len() - 1;

    info!("Added page {} to {}", index, label);
    Ok(index)
}

/// Delete pages `[from, to)` of a stash and return the items they held
///
/// `to` defaults to the page count. Gold of deleted native pages moves onto the
/// first remaining page, or onto a new page if none remains. Items of the
/// remaining pages are renumbered; returned items have no page index.
pub fn delete_pages(owner: &mut Owner, from: usize, to: Option<usize>) -> Result<Vec<Item>> {
    let label = owner.owner_name();
    if owner.is_character() {
        return Err(StashError::NotAStash(label));
    }

    let count = owner.page_count();
    let end = to.unwrap_or(count);
    if end > count {
        return Err(StashError::PageOutOfRange {
            page: end,
            pages: count,
        });
    }
    if from > end {
        return Err(StashError::PageOutOfRange {
            page: from,
            pages: count,
        });
    }

    let native = owner.is_native_stash();
    check_page_kinds(owner.pages(), native)?;

    let moved_gold = owner.pages()[from..end]
        .iter()
        .try_fold(0u64, |acc, page| acc.checked_add(page.gold()))
        .ok_or(StashError::GoldOverflow(u64::MAX))?;

    let pages = owner
        .pages_mut()
        .ok_or_else(|| StashError::NotAStash(label.clone()))?;

    // Gold goes to the page that will come first, before anything is removed
    let lead = if from == 0 { end } else { 0 };
    let mut synthesize = false;
    if native && moved_gold > 0 {
        match pages.get_mut(lead) {
            Some(first) => first.add_gold(moved_gold)?,
            None => synthesize = true,
        }
    }

    let removed: Vec<Page> = pages.drain(from..end).collect();
    let mut items = Vec::new();
    for mut page in removed {
        page.set_page_index(None);
        items.append(&mut page.items);
    }

    for (index, page) in pages.iter_mut().enumerate().skip(from) {
        page.set_page_index(Some(index));
    }

    if synthesize {
        pages.push(Page::native(moved_gold));
    }
    if moved_gold > 0 {
        debug!("Moved {} gold from deleted pages of {}", moved_gold, label);
    }

    info!(
        "Deleted pages {}..{} of {}, {} items released",
        from,
        end,
        label,
        items.len()
    );
    Ok(items)
}

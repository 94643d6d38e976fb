use crate::{ProductId, UserId};
use rust_decimal::Decimal;
use std::{collections::VecDeque, fmt};

/// Record of a purchase modified because of a product limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub product: ProductId,
    pub product_name: String,
    pub user: UserId,
    pub ordered: Decimal,
    pub granted: Decimal,
    pub deleted: bool,
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} had their purchase of {} ({}) modified: ordered {}, now granted {}",
            self.user, self.product_name, self.product, self.ordered, self.granted
        )?;
        if self.deleted {
            write!(f, " (purchase deleted)")?;
        }
        Ok(())
    }
}

/// Bounded audit log of adjustments. The oldest entries are dropped first.
#[derive(Debug)]
pub struct Journal {
    max_entries: usize,
    entries: VecDeque<JournalEntry>,
}

impl Default for Journal {
    fn default() -> Self {
        Self::with_capacity(1000)
    }
}

impl Journal {
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: VecDeque::new(),
        }
    }

    pub fn record(&mut self, entry: JournalEntry) {
        log::info!("{entry}");

        self.entries.push_back(entry);

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = JournalEntry> + '_ {
        self.entries.drain(..)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

use std::time::Instant;

use racecar_engine::{AssetBatch, AssetStatus, Sprite};

/// `counter mod count`; `None` when there is nothing to pick from.
pub(crate) fn skin_index(select_counter: u64, skin_count: usize) -> Option<usize> {
    if skin_count == 0 {
        return None;
    }
    Some((select_counter % skin_count as u64) as usize)
}

/// Vehicle skins in configured order. Nothing is selectable until every skin
/// has loaded.
#[derive(Debug)]
pub(crate) struct SkinCatalog {
    batch: AssetBatch<Sprite>,
}

impl Default for SkinCatalog {
    fn default() -> Self {
        Self::new(AssetBatch::new(Vec::new()))
    }
}

impl SkinCatalog {
    pub(crate) fn new(batch: AssetBatch<Sprite>) -> Self {
        Self { batch }
    }

    pub(crate) fn poll(&mut self, now: Instant) -> AssetStatus {
        self.batch.poll(now)
    }

    pub(crate) fn status(&self) -> AssetStatus {
        self.batch.status()
    }

    pub(crate) fn select(&self, select_counter: u64) -> Option<usize> {
        if self.status() != AssetStatus::Ready {
            return None;
        }
        skin_index(select_counter, self.batch.len())
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Sprite> {
        self.batch.get(index)
    }

    pub(crate) fn key(&self, index: usize) -> Option<&str> {
        self.batch.key(index)
    }
}

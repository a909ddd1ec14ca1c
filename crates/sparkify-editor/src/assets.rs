//! Tickets for asynchronous image loads.
//!
//! The host decodes images on its own schedule (browser `Image.onload`,
//! a file read, a test). The editor hands out a [`LoadTicket`] when a load
//! starts and resolves it when the host reports back. Clearing the canvas
//! bumps the generation, so completions that arrive after a clear are
//! dropped instead of writing into the fresh canvas. Two loads for the same
//! slot both resolve; the later completion wins.

use serde::{Deserialize, Serialize};
use sparkify_core::error::AssetError;
use std::collections::HashMap;

/// Where a finished image goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    Background {
        template: Option<String>,
        /// Canvas size to adopt, when the sizing policy asks for it.
        resize_to: Option<(u32, u32)>,
    },
    Character {
        character: Option<String>,
    },
    Upload {
        file_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadTicket {
    pub id: u64,
    pub generation: u64,
    /// URL or file name for the host to load.
    pub source: String,
}

#[derive(Debug, Default)]
pub struct AssetLoader {
    generation: u64,
    next_id: u64,
    pending: HashMap<u64, LoadTarget>,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, source: &str, target: LoadTarget) -> LoadTicket {
        self.next_id += 1;
        let ticket = LoadTicket {
            id: self.next_id,
            generation: self.generation,
            source: source.to_string(),
        };
        log::debug!("assets: ticket {} loading {source}", ticket.id);
        self.pending.insert(ticket.id, target);
        ticket
    }

    /// Resolve a ticket. Fails with [`AssetError::StaleTicket`] if it is
    /// unknown, already resolved, or from before the last
    /// [`invalidate`](Self::invalidate).
    pub fn finish(&mut self, ticket: &LoadTicket) -> Result<LoadTarget, AssetError> {
        if ticket.generation != self.generation {
            log::debug!(
                "assets: load {} of {} is from generation {}, now {}",
                ticket.id,
                ticket.source,
                ticket.generation,
                self.generation
            );
            return Err(AssetError::StaleTicket(ticket.id));
        }
        self.pending
            .remove(&ticket.id)
            .ok_or(AssetError::StaleTicket(ticket.id))
    }

    /// Forget every pending load.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.pending.clear();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether an upload is still decoding.
    pub fn is_loading(&self) -> bool {
        self.pending
            .values()
            .any(|t| matches!(t, LoadTarget::Upload { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn upload(name: &str) -> LoadTarget {
        LoadTarget::Upload {
            file_name: name.to_string(),
        }
    }

    #[test]
    fn ticket_resolves_once() {
        let mut loader = AssetLoader::new();
        let ticket = loader.begin("a.png", upload("a.png"));
        assert!(loader.is_loading());
        assert_eq!(loader.finish(&ticket), Ok(upload("a.png")));
        assert_eq!(loader.finish(&ticket), Err(AssetError::StaleTicket(ticket.id)));
        assert!(!loader.is_loading());
    }

    #[test]
    fn invalidate_drops_in_flight_loads() {
        let mut loader = AssetLoader::new();
        let ticket = loader.begin("a.png", upload("a.png"));
        loader.invalidate();
        assert_eq!(loader.finish(&ticket), Err(AssetError::StaleTicket(ticket.id)));
        assert_eq!(loader.pending(), 0);

        let fresh = loader.begin("b.png", upload("b.png"));
        assert_eq!(fresh.generation, 1);
        assert!(loader.finish(&fresh).is_ok());
    }

    #[test]
    fn background_loads_do_not_count_as_uploading() {
        let mut loader = AssetLoader::new();
        loader.begin(
            "/bg1.png",
            LoadTarget::Background {
                template: Some("bg-1".to_string()),
                resize_to: None,
            },
        );
        assert!(!loader.is_loading());
    }

    #[test]
    fn foreign_ticket_is_rejected() {
        let mut loader = AssetLoader::new();
        loader.begin("a.png", upload("a.png"));
        let foreign = LoadTicket {
            id: 99,
            generation: 0,
            source: "b.png".to_string(),
        };
        assert_eq!(loader.finish(&foreign), Err(AssetError::StaleTicket(foreign.id)));
        assert_eq!(loader.pending(), 1);
    }
}

//! Inbound change feed
//!
//! Events arrive from other nodes through `POST /api/feed` or the message
//! bus, possibly out of order and more than once. The adapter drops our own
//! echoes and exact redeliveries, and hands the rest to
//! [`FloorEngine::apply_remote`], which resolves last-write-wins by
//! timestamp. Versions are per-node counters, so a lower version alone never
//! makes an event stale.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use shared::message::{FeedEntity, FeedEvent};

use super::engine::FloorEngine;
use super::error::FloorResult;

/// What happened to one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedOutcome {
    Applied,
    /// Same `(timestamp, version)` already applied
    Duplicate,
    /// Not newer in time than what we hold
    Stale,
    /// Originated on this node
    OwnEcho,
}

pub struct ChangeFeedAdapter {
    engine: Arc<FloorEngine>,
    /// Last applied `(timestamp, version)` per entity
    applied: DashMap<(FeedEntity, i64), (i64, u64)>,
}

impl fmt::Debug for ChangeFeedAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFeedAdapter")
            .field("node_id", &self.engine.node_id())
            .field("tracked", &self.applied.len())
            .finish()
    }
}

impl ChangeFeedAdapter {
    pub fn new(engine: Arc<FloorEngine>) -> Self {
        Self {
            engine,
            applied: DashMap::new(),
        }
    }

    pub fn apply(&self, event: &FeedEvent) -> FloorResult<FeedOutcome> {
        if event.origin.as_deref() == Some(self.engine.node_id()) {
            tracing::trace!(event_id = %event.event_id, "Ignoring own feed event");
            return Ok(FeedOutcome::OwnEcho);
        }

        let key = (event.entity, event.id);
        let stamp = (event.timestamp, event.version);
        if self.applied.get(&key).is_some_and(|seen| *seen == stamp) {
            return Ok(FeedOutcome::Duplicate);
        }

        if !self.engine.apply_remote(event)? {
            tracing::debug!(
                entity = %event.entity,
                id = event.id,
                version = event.version,
                timestamp = event.timestamp,
                "Stale feed event"
            );
            return Ok(FeedOutcome::Stale);
        }

        self.applied.insert(key, stamp);
        Ok(FeedOutcome::Applied)
    }

    /// Entities with at least one applied remote change
    pub fn tracked(&self) -> usize {
        self.applied.len()
    }
}

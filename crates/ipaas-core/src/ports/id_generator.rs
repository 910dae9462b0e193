//! IdGenerator port - cycle id generation.

use crate::domain::CycleId;
use crate::ports::Clock;
use ulid::Ulid;

pub trait IdGenerator: Send + Sync {
    fn generate_cycle_id(&self) -> CycleId;
}

/// ULID based generator.
///
/// The timestamp half comes from the clock so a `FixedClock` yields ids with
/// a known timestamp; the random half keeps them unique.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_cycle_id(&self) -> CycleId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        CycleId::from(ulid)
    }
}

use serde::Serialize;

use crate::systems::rigid_block::BlockId;

/// Notifications for the driver, drained with `drain_events()`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A scan cleared `count` cells.
    CellsCleared { count: usize },
    Score { delta: u64 },
    GameOver,
    BlockGranularized { block: BlockId },
    /// The spawn delay after a granularization has elapsed.
    SpawnDue,
    ElementExpired,
    EvacuationFinished,
}

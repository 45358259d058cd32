//! Game session simulation
//!
//! All gameplay logic lives here. This module must stay free of platform code:
//! - Time only arrives as host timestamps passed to `dispatch`/`tick`
//! - Seeded RNG only
//! - No rendering or DOM dependencies

pub mod commands;
pub mod event_log;
pub mod geometry;
pub mod input;
pub mod placement;
pub mod state;
pub mod tick;
pub mod timers;

pub use commands::{Command, EndReason, Rejection, dispatch};
pub use event_log::{EventLog, LogEntry, WallClock};
pub use geometry::{Aabb, clamp_to_surface, is_match, overlaps};
pub use input::{ClickTracker, Direction, HeldKeys, KeyAction, MovementKey};
pub use placement::{Placement, spawn_position};
pub use state::{MatchPhase, Notice, Player, Session, Target};
pub use tick::tick;
pub use timers::{TimerKind, TimerQueue};

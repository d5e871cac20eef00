//! Dead man's switch lifecycle tracking.
//!
//! A switch is a check-in timer with a payload. Each check-in pushes its
//! deadline out to `now + check_in_interval + grace_period`; once the deadline
//! passes, the periodic sweep deactivates it for good.
//!
//! - [`SwitchStore`] - create, check in, deactivate, delete, sweep
//! - [`SwitchRepository`] - wholesale persistence ([`JsonFileRepository`], [`InMemoryRepository`])
//! - [`Sweeper`] - background task running the sweep on an interval
//! - [`Clock`] - injectable time source ([`SystemClock`], [`ManualClock`])
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use switch_core::{JsonFileRepository, NewSwitch, SwitchStore};
//!
//! # fn example() -> switch_core::Result<()> {
//! let repo = Arc::new(JsonFileRepository::new("switches.json"));
//! let mut store = SwitchStore::load(repo)?;
//!
//! let switch = store.create(NewSwitch::new("The safe code is 4512", 24).with_grace_period(12))?;
//! store.check_in(&switch.id)?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod error;
pub mod plans;
pub mod repository;
pub mod store;
pub mod sweeper;
pub mod time;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, SwitchError};
pub use plans::PlanTemplate;
pub use repository::{InMemoryRepository, JsonFileRepository, SwitchRepository, STORAGE_KEY};
pub use store::SwitchStore;
pub use sweeper::{SharedStore, Sweeper, SweeperHandle, DEFAULT_SWEEP_INTERVAL};
pub use time::{Frequency, SwitchStatus};
pub use types::{
    ActionKind, ActionPriority, CustomAction, NewSwitch, NotificationSettings, ReminderFrequency,
    ReminderSettings, Switch,
};

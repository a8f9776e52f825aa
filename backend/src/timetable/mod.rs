//! Timetable view-model: plan resolution, slot assignments, roster joins,
//! current-period tracking and grid shaping.

pub mod assignments;
pub mod clock;
pub mod current_period;
pub mod grid;
pub mod loader;
pub mod next_class;
pub mod plan_resolver;
pub mod roster;

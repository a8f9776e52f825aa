pub mod assignment;
pub mod common;
pub mod roster;
pub mod timetable;
pub mod view;

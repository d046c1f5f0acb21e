pub mod display;
pub mod notice;
pub mod row;
pub mod settings;
pub mod step;
pub mod totals;
pub mod transaction;

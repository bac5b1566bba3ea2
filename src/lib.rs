pub mod app;
pub mod binding;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod day_key;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod streak;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use day_key::{Calendar, DayKey, Month};
pub use models::{Routine, RoutineId};
pub use state::AppState;
pub use storage::RoutineStorage;
pub use store::{RoutineStore, StoreEvent};

pub mod icon;
pub mod save;
pub mod worker;

pub use icon::{LocalIconStore, TouchIconFetcher};
pub use save::{spawn_save, SaveOutcome};
pub use worker::{spawn_loader, LoadCommand, LoadQuery, LoadResult};

pub mod auth;
pub mod backend;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod database;
pub mod draft;
pub mod filter;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod partition;
pub mod selection;
pub mod state;
pub mod stats;
pub mod tags;
pub mod tui;
pub mod utils;
pub mod workspace;

pub use backend::{Backend, BackendError};
pub use config::Config;
pub use database::Database;
pub use filter::TaskFilter;
pub use models::{Note, Priority, Task, TaskList, User};
pub use partition::ListSelector;
pub use selection::SelectionState;
pub use state::{NoteView, TaskView};
pub use tags::TagSet;
pub use utils::Profile;
pub use workspace::Workspace;

//! Client-side task board for the TaskFlow API.
//!
//! [`TaskBoard`] keeps the user's tasks in memory, merges the server fields
//! with locally cached annotations (priority, due time), and derives the
//! filtered and sorted view. Every successful mutation is written back to a
//! [`LocalCache`].

pub mod board;
pub mod cache;
pub mod error;
pub mod model;
pub mod remote;
pub mod session;
pub mod view;

pub use board::{BoardConfig, TaskBoard};
pub use cache::{FileCache, LocalCache, MemoryCache, TASKS_KEY, TOKEN_KEY, USER_KEY};
pub use error::BoardError;
pub use model::{BoardTask, LocalMeta, Priority, RemoteTask, TaskUpdate};
pub use remote::{HttpApi, RegisteredUser, TasksRemote};
pub use session::{Session, SessionUser};
pub use view::{derive, summarize, Filter, SortMode, Summary, ViewState};

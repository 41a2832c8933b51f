pub mod commands;
pub mod session;
pub mod store;
pub mod sync;

pub use commands::CommandStack;
pub use session::EditorSession;
pub use store::{DocumentStore, FileStore, MemoryStore, StoreError, UserId};
pub use sync::{EditEvent, EditQueue, SyncConfig, SyncController, SyncCycle, SyncListener, SyncState};

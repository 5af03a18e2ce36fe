pub mod core;
pub mod links;
pub mod memory;
pub mod modes;
pub mod planner;
pub mod progress;
pub mod prompts;
pub mod retrieval;
pub mod session;
pub mod summarizer;
pub mod synthesizer;

pub use core::{Collaborators, ModelCall};
pub use memory::{CatalogEntry, Interaction, Memory, MemoryState, MemoryStore};
pub use modes::{Answer, ModeController};
pub use progress::with_progress;
pub use session::{Mode, SessionState};

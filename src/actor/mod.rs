//! Actor System for watch mode
//!
//! ```text
//! FsActor --> BuildActor --> Publisher
//! (watch)     (rebuild)      (status, overlay, reload, root)
//! ```
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `builder` - Serialized rebuild passes and outcome publication
//! - `coordinator` - Wires up and runs actors

pub mod builder;
pub mod coordinator;
pub mod fs;
pub mod messages;

pub use builder::Publisher;
pub use coordinator::Coordinator;

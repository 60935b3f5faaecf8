//! Actor Message Definitions
//!
//! ```text
//! FsActor --Rebuild--> BuildActor
//! ```

/// Messages to the Build Actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMsg {
    /// Run one full regeneration pass
    Rebuild,
    /// Stop after the pass in flight (if any)
    Shutdown,
}

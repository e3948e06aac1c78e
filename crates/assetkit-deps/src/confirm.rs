//! The confirmation gate interface.

/// Warning shown before the first destructive edit of a session.
pub const MOVE_WARNING: &str = "Are you sure you want to (re)move this dependency? \
This will not remap the file ids in the objects of this file. \
Use only if you know what you're doing.";

/// Host-supplied yes/no prompt.
///
/// Returning `false` aborts the pending edit with no state change. Any
/// `FnMut(&str) -> bool` closure is a `Confirm`.
pub trait Confirm {
    /// Ask the user to accept `warning`.
    fn confirm(&mut self, warning: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, warning: &str) -> bool {
        self(warning)
    }
}

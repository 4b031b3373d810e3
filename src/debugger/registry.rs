use crate::debugger::breakpoint::{Breakpoint, CurrentPosition};
use crate::debugger::error::Error;
use itertools::Itertools;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    breakpoints: Vec<Breakpoint>,
    position: Option<CurrentPosition>,
}

/// Active breakpoints and the current execution position.
///
/// A registry may be shared with a host and outlives debugger processes, it is cleared when
/// a session is torn down. The session state machine is the only writer, hosts read
/// snapshots.
#[derive(Default)]
pub struct Registry {
    inner: Mutex<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_breakpoint(
        &self,
        number: u32,
        line: usize,
        end_offset: usize,
        filename: impl Into<String>,
    ) {
        let mut inner = self.lock();
        inner.breakpoints.retain(|bp| bp.number != number);
        inner
            .breakpoints
            .push(Breakpoint::new(number, line, end_offset, filename));
    }

    /// Remove breakpoint by its number. Unknown number means that the registry and the
    /// debugger disagree, an error is returned in that case.
    pub fn remove_breakpoint(&self, number: u32) -> Result<Breakpoint, Error> {
        let mut inner = self.lock();
        let idx = inner
            .breakpoints
            .iter()
            .position(|bp| bp.number == number)
            .ok_or(Error::BreakpointNotFound(number))?;
        Ok(inner.breakpoints.remove(idx))
    }

    pub fn remove_all_breakpoints(&self) {
        self.lock().breakpoints.clear();
    }

    /// Return breakpoints of a file, ordered by line.
    pub fn breakpoints_in_file(&self, filename: &str) -> Vec<Breakpoint> {
        self.lock()
            .breakpoints
            .iter()
            .filter(|bp| bp.filename == filename)
            .sorted_by_key(|bp| (bp.line, bp.number))
            .cloned()
            .collect()
    }

    /// Return all breakpoints ordered by number.
    pub fn breakpoints(&self) -> Vec<Breakpoint> {
        self.lock()
            .breakpoints
            .iter()
            .sorted_by_key(|bp| bp.number)
            .cloned()
            .collect()
    }

    pub fn set_current_position(&self, filename: impl Into<String>, offset: usize) {
        self.lock().position = Some(CurrentPosition {
            filename: filename.into(),
            offset,
        });
    }

    pub fn clear_current_position(&self) {
        self.lock().position = None;
    }

    pub fn current_position(&self) -> Option<CurrentPosition> {
        self.lock().position.clone()
    }

    /// Return current execution offset if execution stopped in this file.
    pub fn position_in_file(&self, filename: &str) -> Option<usize> {
        self.lock()
            .position
            .as_ref()
            .filter(|pos| pos.filename == filename)
            .map(|pos| pos.offset)
    }

    /// Drop all breakpoints and the current position.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.breakpoints.clear();
        inner.position = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_breakpoints_by_file() {
        let registry = Registry::new();
        registry.add_breakpoint(1, 20, 310, "foo.ml");
        registry.add_breakpoint(2, 4, 60, "bar.ml");
        registry.add_breakpoint(3, 9, 120, "foo.ml");

        let in_foo = registry.breakpoints_in_file("foo.ml");
        assert_eq!(
            in_foo.iter().map(|bp| bp.number).collect::<Vec<_>>(),
            vec![3, 1]
        );
        assert!(registry.breakpoints_in_file("baz.ml").is_empty());

        let removed = registry.remove_breakpoint(2).unwrap();
        assert_eq!(removed.filename, "bar.ml");
        assert!(matches!(
            registry.remove_breakpoint(2),
            Err(Error::BreakpointNotFound(2))
        ));

        registry.remove_all_breakpoints();
        assert!(registry.breakpoints().is_empty());
    }

    #[test]
    fn test_same_number_replaces_breakpoint() {
        let registry = Registry::new();
        registry.add_breakpoint(1, 20, 310, "foo.ml");
        registry.add_breakpoint(1, 21, 330, "foo.ml");
        assert_eq!(registry.breakpoints(), vec![Breakpoint::new(1, 21, 330, "foo.ml")]);
    }

    #[test]
    fn test_current_position() {
        let registry = Registry::new();
        assert_eq!(registry.position_in_file("foo.ml"), None);

        registry.set_current_position("foo.ml", 181);
        assert_eq!(registry.position_in_file("foo.ml"), Some(181));
        assert_eq!(registry.position_in_file("bar.ml"), None);

        registry.set_current_position("bar.ml", 7);
        assert_eq!(registry.position_in_file("foo.ml"), None);

        registry.add_breakpoint(1, 1, 1, "bar.ml");
        registry.clear();
        assert_eq!(registry.current_position(), None);
        assert!(registry.breakpoints().is_empty());
    }
}

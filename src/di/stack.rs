use crate::error::{AutowireError, Result};
use dashmap::DashMap;
use std::thread::{self, ThreadId};

/// Identifiers currently under construction, one stack per calling thread.
///
/// Keying by thread keeps concurrent resolutions on different threads from
/// mistaking each other's in-flight identifiers for cycles.
#[derive(Default)]
pub(crate) struct ResolutionStacks {
    by_thread: DashMap<ThreadId, Vec<String>>,
}

impl ResolutionStacks {
    /// Push `identifier` for the current thread.
    ///
    /// Fails if the identifier is already being resolved on this thread, or
    /// if the stack already holds `max_depth` entries. The returned guard
    /// pops the entry when dropped.
    pub(crate) fn enter(&self, identifier: &str, max_depth: usize) -> Result<StackGuard<'_>> {
        let thread = thread::current().id();
        let mut stack = self.by_thread.entry(thread).or_default();

        if stack.iter().any(|entry| entry == identifier) {
            let mut chain = stack.to_vec();
            chain.push(identifier.to_string());
            return Err(AutowireError::CircularDependency {
                identifier: identifier.to_string(),
                chain,
            });
        }

        if stack.len() >= max_depth {
            return Err(AutowireError::ResolutionTooDeep {
                identifier: identifier.to_string(),
                max_depth,
            });
        }

        stack.push(identifier.to_string());
        Ok(StackGuard {
            stacks: self,
            thread,
        })
    }

    pub(crate) fn depth(&self) -> usize {
        self.by_thread
            .get(&thread::current().id())
            .map_or(0, |stack| stack.len())
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.by_thread
            .get(&thread::current().id())
            .map(|stack| stack.to_vec())
            .unwrap_or_default()
    }

    fn pop(&self, thread: ThreadId) {
        if let Some(mut stack) = self.by_thread.get_mut(&thread) {
            stack.pop();
        }
        self.by_thread.remove_if(&thread, |_, stack| stack.is_empty());
    }
}

pub(crate) struct StackGuard<'a> {
    stacks: &'a ResolutionStacks,
    thread: ThreadId,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.stacks.pop(self.thread);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_pops_on_drop() {
        let stacks = ResolutionStacks::default();
        {
            let _outer = stacks.enter("A", 8).unwrap();
            let _inner = stacks.enter("B", 8).unwrap();
            assert_eq!(stacks.snapshot(), ["A", "B"]);
        }
        assert_eq!(stacks.depth(), 0);
        assert!(stacks.by_thread.is_empty());
    }

    #[test]
    fn test_reentry_is_circular() {
        let stacks = ResolutionStacks::default();
        let _a = stacks.enter("A", 8).unwrap();
        let _b = stacks.enter("B", 8).unwrap();

        match stacks.enter("A", 8) {
            Err(AutowireError::CircularDependency { identifier, chain }) => {
                assert_eq!(identifier, "A");
                assert_eq!(chain, ["A", "B", "A"]);
            }
            other => panic!("expected circular dependency, got {:?}", other.map(|_| ())),
        }
        // The failed entry must not have been pushed.
        assert_eq!(stacks.depth(), 2);
    }

    #[test]
    fn test_depth_limit() {
        let stacks = ResolutionStacks::default();
        let _a = stacks.enter("A", 1).unwrap();
        let err = stacks.enter("B", 1).err().unwrap();
        assert!(matches!(err, AutowireError::ResolutionTooDeep { max_depth: 1, .. }));
    }

    #[test]
    fn test_stacks_are_per_thread() {
        let stacks = ResolutionStacks::default();
        let _a = stacks.enter("A", 8).unwrap();

        thread::scope(|scope| {
            scope.spawn(|| {
                assert_eq!(stacks.depth(), 0);
                let _a = stacks.enter("A", 8).unwrap();
                assert_eq!(stacks.depth(), 1);
            });
        });

        assert_eq!(stacks.snapshot(), ["A"]);
    }
}

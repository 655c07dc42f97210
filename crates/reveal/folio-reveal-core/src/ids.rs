//! Identifiers and simple allocators for watched groups and ambient loops.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GroupId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LoopId(pub u32);

/// Monotonic allocator for GroupId and LoopId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_group: u32,
    next_loop: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_group(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group = self.next_group.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_loop(&mut self) -> LoopId {
        let id = LoopId(self.next_loop);
        self.next_loop = self.next_loop.wrapping_add(1);
        id
    }
}

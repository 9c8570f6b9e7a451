//! Binary min-heap over arena indices with decrease-key.
//!
//! The heap stores indices into a caller-owned arena. Each arena item keeps
//! the slot it currently occupies so `update_item` can restore order after an
//! external priority change without searching.

pub(crate) trait HeapItem {
    fn priority(&self) -> f64;
    fn slot(&self) -> Option<usize>;
    fn set_slot(&mut self, slot: Option<usize>);
}

impl HeapItem for crate::common::Node {
    fn priority(&self) -> f64 {
        self.f_cost
    }

    fn slot(&self) -> Option<usize> {
        self.heap_slot
    }

    fn set_slot(&mut self, slot: Option<usize>) {
        self.heap_slot = slot;
    }
}

#[derive(Debug, Default)]
pub(crate) struct OpenList {
    heap: Vec<usize>,
}

impl OpenList {
    pub(crate) fn new() -> Self {
        OpenList { heap: Vec::new() }
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn push<T: HeapItem>(&mut self, arena: &mut [T], item: usize) {
        let slot = self.heap.len();
        self.heap.push(item);
        arena[item].set_slot(Some(slot));
        self.sift_up(arena, slot);
    }

    /// Remove and return the item with the smallest priority.
    pub(crate) fn pop<T: HeapItem>(&mut self, arena: &mut [T]) -> Option<usize> {
        let last = self.heap.pop()?;
        let top = if self.heap.is_empty() {
            last
        } else {
            let top = std::mem::replace(&mut self.heap[0], last);
            arena[last].set_slot(Some(0));
            self.sift_down(arena, 0);
            top
        };
        arena[top].set_slot(None);
        Some(top)
    }

    /// Restore heap order after `item`'s priority changed in place.
    pub(crate) fn update_item<T: HeapItem>(&mut self, arena: &mut [T], item: usize) {
        let Some(slot) = arena[item].slot() else {
            return;
        };
        let slot = self.sift_up(arena, slot);
        self.sift_down(arena, slot);
    }

    fn swap<T: HeapItem>(&mut self, arena: &mut [T], i: usize, j: usize) {
        self.heap.swap(i, j);
        arena[self.heap[i]].set_slot(Some(i));
        arena[self.heap[j]].set_slot(Some(j));
    }

    fn less<T: HeapItem>(&self, arena: &[T], i: usize, j: usize) -> bool {
        arena[self.heap[i]].priority() < arena[self.heap[j]].priority()
    }

    fn sift_up<T: HeapItem>(&mut self, arena: &mut [T], mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(arena, slot, parent) {
                break;
            }
            self.swap(arena, slot, parent);
            slot = parent;
        }
        slot
    }

    fn sift_down<T: HeapItem>(&mut self, arena: &mut [T], mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < len && self.less(arena, left, smallest) {
                smallest = left;
            }
            if right < len && self.less(arena, right, smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(arena, slot, smallest);
            slot = smallest;
        }
    }
}

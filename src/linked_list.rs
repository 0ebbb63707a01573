//! A doubly linked list that flattens all of its nodes onto a Vec, gaining
//! data locality and O(1) removal by handle without any raw pointers.

/// Alias for the index of a node in the linked list's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeHandle(usize);

/// A node that lives in a linked list.
#[derive(Clone, Debug)]
struct Node<T> {
    /// The value being stored.
    value: T,

    /// The node before this one, or None if this is the head.
    prev: Option<NodeHandle>,

    /// The node after this one, or None if this is the tail.
    next: Option<NodeHandle>,
}

/// A list whose nodes live in a single contiguous Vec and are addressed by
/// their position in it. Removed slots are freelisted and reused by later
/// pushes, so a handle is only meaningful until the node it names is removed.
///
/// The prev/next links are plain indices. Nothing owns a node except the
/// store, which means splicing a node out never has to reason about who else
/// might still be pointing at it.
#[derive(Clone, Debug)]
pub(crate) struct LinkedList<T> {
    /// The slots of the list. A vacant slot is None and its handle sits on
    /// the freelist.
    store: Vec<Option<Node<T>>>,

    /// Slots which aren't in use anymore. These will be reused.
    free: Vec<NodeHandle>,

    /// The first node in the list.
    head: Option<NodeHandle>,

    /// The last node in the list.
    tail: Option<NodeHandle>,
}

impl<T> LinkedList<T> {
    /// Creates a new linked list with a specific capacity.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// The length of this linked list.
    pub(crate) fn len(&self) -> usize {
        self.store.len() - self.free.len()
    }

    pub(crate) fn head(&self) -> Option<NodeHandle> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<NodeHandle> {
        self.tail
    }

    /// Gets an element from the list.
    pub(crate) fn get(&self, node: NodeHandle) -> Option<&T> {
        self.node(node).map(|n| &n.value)
    }

    pub(crate) fn get_mut(&mut self, node: NodeHandle) -> Option<&mut T> {
        self.node_mut(node).map(|n| &mut n.value)
    }

    /// The handle following `node`, or None at the tail.
    pub(crate) fn next(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.node(node).and_then(|n| n.next)
    }

    /// The handle preceding `node`, or None at the head.
    pub(crate) fn prev(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.node(node).and_then(|n| n.prev)
    }

    /// Walks the handles from head to tail.
    pub(crate) fn handles(&self) -> Handles<'_, T> {
        Handles {
            list: self,
            cursor: self.head,
        }
    }

    /// Pushes t onto the back of the list and returns a handle to the node.
    pub(crate) fn push_back(&mut self, t: T) -> NodeHandle {
        let old_tail = self.tail;
        let idx = self.alloc(Node {
            value: t,
            prev: old_tail,
            next: None,
        });

        match old_tail.and_then(|tail| self.node_mut(tail)) {
            Some(tail_node) => tail_node.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);

        #[cfg(test)]
        self.continuity_test();

        idx
    }

    /// Pushes t onto the front of the list and returns a handle to the node.
    pub(crate) fn push_front(&mut self, t: T) -> NodeHandle {
        let old_head = self.head;
        let idx = self.alloc(Node {
            value: t,
            prev: None,
            next: old_head,
        });

        match old_head.and_then(|head| self.node_mut(head)) {
            Some(head_node) => head_node.prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);

        #[cfg(test)]
        self.continuity_test();

        idx
    }

    /// Pops the back node off the list if it exists.
    pub(crate) fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    /// Pops the front node off the list if it exists.
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        self.remove(head)
    }

    /// Remove an arbitrary node from the list. Returns None if the handle
    /// names a vacant slot, leaving the list untouched.
    pub(crate) fn remove(&mut self, node: NodeHandle) -> Option<T> {
        let removed = self.store.get_mut(node.0)?.take()?;

        // link prev to next and next to prev so node doesn't exist in the
        // chain anymore; its slot gets reused at some later push
        match removed.prev.and_then(|prev| self.node_mut(prev)) {
            Some(prev_node) => prev_node.next = removed.next,
            None => self.head = removed.next,
        }
        match removed.next.and_then(|next| self.node_mut(next)) {
            Some(next_node) => next_node.prev = removed.prev,
            None => self.tail = removed.prev,
        }

        self.free.push(node);

        #[cfg(test)]
        self.continuity_test();

        Some(removed.value)
    }

    /// Rewires the chain so it visits exactly `order`, front to back. Every
    /// live handle must appear in `order` once.
    pub(crate) fn relink(&mut self, order: &[NodeHandle]) {
        debug_assert_eq!(order.len(), self.len());

        for (i, &handle) in order.iter().enumerate() {
            let prev = if i == 0 { None } else { Some(order[i - 1]) };
            let next = order.get(i + 1).copied();
            if let Some(node) = self.node_mut(handle) {
                node.prev = prev;
                node.next = next;
            }
        }
        self.head = order.first().copied();
        self.tail = order.last().copied();

        #[cfg(test)]
        self.continuity_test();
    }

    /// Clears this linked list. Does not free the underlying buffer.
    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    fn alloc(&mut self, node: Node<T>) -> NodeHandle {
        // use the first available slot in the storage vec, or grow it
        match self.free.pop() {
            Some(idx) => {
                self.store[idx.0] = Some(node);
                idx
            }
            None => {
                self.store.push(Some(node));
                NodeHandle(self.store.len() - 1)
            }
        }
    }

    fn node(&self, node: NodeHandle) -> Option<&Node<T>> {
        self.store.get(node.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, node: NodeHandle) -> Option<&mut Node<T>> {
        self.store.get_mut(node.0).and_then(Option::as_mut)
    }

    #[cfg(test)]
    pub(crate) fn continuity_test(&self) {
        let mut count = 0;
        let mut prev = None;
        let mut cursor = self.head;

        // walk forwards checking every back link on the way
        while let Some(handle) = cursor {
            let node = self.node(handle).expect("chain references a vacant slot");
            assert_eq!(prev, node.prev);
            count += 1;
            assert!(count <= self.len());
            prev = Some(handle);
            cursor = node.next;
        }

        assert_eq!(self.len(), count);
        assert_eq!(prev, self.tail);

        count = 0;
        cursor = self.tail;
        while let Some(handle) = cursor {
            count += 1;
            assert!(count <= self.len());
            cursor = self.prev(handle);
        }

        assert_eq!(self.len(), count);
        assert_eq!(self.head.is_none(), self.tail.is_none());
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

/// Iterator over the live handles of a list, in order.
pub(crate) struct Handles<'a, T> {
    list: &'a LinkedList<T>,
    cursor: Option<NodeHandle>,
}

impl<'a, T> Iterator for Handles<'a, T> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        self.cursor = self.list.next(handle);
        Some(handle)
    }
}

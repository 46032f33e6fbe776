//! IR Operations
//!
//! `OpList` is a doubly-linked list of IR operations with ownership tracking.
//!
//! Nodes live in an arena owned by the list and are addressed by `OpId`. Index 0 and 1 of the
//! arena are the head and tail sentinels (`OpKind::ListEnd`); every op that is currently part of
//! the list sits strictly between them. Ops may also exist in the arena while detached (created
//! but not yet linked, or removed/replaced), in which case they have no neighbors and no owner.
//!
//! Every structural precondition is checked and a violation panics with an
//! `Illegal operation` message: these indicate IR corruption, not bad input.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::ops::{Index, IndexMut};

use smallvec::SmallVec;

use crate::template::pipeline::ir::enums::OpKind;
use crate::template::pipeline::ir::expression::{ExpressionTransform, VisitorContextFlag};

/// Base trait for IR operations stored in an `OpList`.
pub trait Op: fmt::Debug + Sized {
    fn kind(&self) -> OpKind;

    /// The payload stored in the head and tail sentinels and left behind by `OpList::take`.
    fn list_end() -> Self;

    /// Replaces every expression owned by this op with the result of `transform`, visiting
    /// sub-expressions first. Ops nested inside this one (listener handlers, track bodies) are
    /// visited with `VisitorContextFlag::IN_CHILD_OPERATION` added to `flags`.
    fn transform_expressions(
        &mut self,
        transform: &mut ExpressionTransform<'_>,
        flags: VisitorContextFlag,
    );
}

/// Identifies one `OpList`. Allocated by the compilation job, never by a global counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(pub usize);

impl ListId {
    pub fn new(id: usize) -> Self {
        ListId(id)
    }
}

/// Stable handle to an op inside a particular list's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpId {
    list: ListId,
    arena: u64,
    index: usize,
}

impl OpId {
    /// The list whose arena holds this op (whether or not the op is currently linked).
    pub fn list(&self) -> ListId {
        self.list
    }
}

/// List ids restart in every job, so each arena also carries a process-unique tag.
static NEXT_ARENA: AtomicU64 = AtomicU64::new(0);

const HEAD: usize = 0;
const TAIL: usize = 1;

#[derive(Debug)]
struct Node<T> {
    op: T,
    prev: Option<usize>,
    next: Option<usize>,
    owner: Option<ListId>,
}

pub struct OpList<T: Op> {
    id: ListId,
    arena: u64,
    nodes: Vec<Node<T>>,
    len: usize,
}

impl<T: Op> OpList<T> {
    pub fn new(id: ListId) -> Self {
        let nodes = vec![
            Node {
                op: T::list_end(),
                prev: None,
                next: Some(TAIL),
                owner: Some(id),
            },
            Node {
                op: T::list_end(),
                prev: Some(HEAD),
                next: None,
                owner: Some(id),
            },
        ];
        OpList {
            id,
            arena: NEXT_ARENA.fetch_add(1, Ordering::Relaxed),
            nodes,
            len: 0,
        }
    }

    pub fn id(&self) -> ListId {
        self.id
    }

    /// Number of ops currently linked into the list.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> OpId {
        self.op_id(HEAD)
    }

    pub fn tail(&self) -> OpId {
        self.op_id(TAIL)
    }

    /// First op in the list, skipping the head sentinel.
    pub fn first(&self) -> Option<OpId> {
        self.nodes[HEAD]
            .next
            .filter(|&index| index != TAIL)
            .map(|index| self.op_id(index))
    }

    pub fn last(&self) -> Option<OpId> {
        self.nodes[TAIL]
            .prev
            .filter(|&index| index != HEAD)
            .map(|index| self.op_id(index))
    }

    /// Allocates `op` in this list's arena without linking it.
    pub fn create(&mut self, op: T) -> OpId {
        if op.kind() == OpKind::ListEnd {
            panic!("Illegal operation: cannot create a ListEnd op");
        }
        let index = self.nodes.len();
        self.nodes.push(Node {
            op,
            prev: None,
            next: None,
            owner: None,
        });
        self.op_id(index)
    }

    /// Appends `op` before the tail sentinel.
    pub fn push(&mut self, op: T) -> OpId {
        let id = self.create(op);
        self.push_node(id);
        id
    }

    /// Links an existing detached op before the tail sentinel.
    pub fn push_node(&mut self, id: OpId) {
        self.insert_node_before(id, self.tail());
    }

    pub fn push_all<I: IntoIterator<Item = T>>(&mut self, ops: I) -> SmallVec<[OpId; 4]> {
        let ids: SmallVec<[OpId; 4]> = ops.into_iter().map(|op| self.create(op)).collect();
        self.insert_nodes_before(&ids, self.tail());
        ids
    }

    /// Inserts `ops`, in the given order, immediately after the head sentinel.
    pub fn prepend<I: IntoIterator<Item = T>>(&mut self, ops: I) -> SmallVec<[OpId; 4]> {
        let ids: SmallVec<[OpId; 4]> = ops.into_iter().map(|op| self.create(op)).collect();
        self.prepend_nodes(&ids);
        ids
    }

    pub fn prepend_nodes(&mut self, ids: &[OpId]) {
        if ids.is_empty() {
            return;
        }
        let first = self.nodes[HEAD].next.unwrap_or(TAIL);
        self.insert_nodes_before(ids, self.op_id(first));
    }

    pub fn insert_before(&mut self, op: T, target: OpId) -> OpId {
        let id = self.create(op);
        self.insert_node_before(id, target);
        id
    }

    pub fn insert_node_before(&mut self, id: OpId, target: OpId) {
        self.insert_nodes_before(&[id], target);
    }

    /// Links every op in `ids`, in order, directly before `target`.
    pub fn insert_nodes_before(&mut self, ids: &[OpId], target: OpId) {
        let target = self.index_of(target);
        self.assert_is_owned(target);
        if target == HEAD {
            panic!("Illegal operation: cannot insert before the list head");
        }
        let indices = self.detached_indices(ids);
        for index in indices {
            let prev = self.neighbor(target, true);
            self.link_between(index, prev, target);
        }
    }

    pub fn insert_after(&mut self, op: T, target: OpId) -> OpId {
        let id = self.create(op);
        self.insert_node_after(id, target);
        id
    }

    pub fn insert_node_after(&mut self, id: OpId, target: OpId) {
        let target = self.index_of(target);
        self.assert_is_owned(target);
        if target == TAIL {
            panic!("Illegal operation: cannot insert after the list tail");
        }
        let index = self.index_of(id);
        self.assert_is_not_end(index);
        self.assert_is_unowned(index);
        let next = self.neighbor(target, false);
        self.link_between(index, target, next);
    }

    /// Replaces `old` with a newly created `op`. `old` stays in the arena, detached.
    pub fn replace(&mut self, old: OpId, op: T) -> OpId {
        let id = self.create(op);
        self.replace_node(old, id);
        id
    }

    pub fn replace_node(&mut self, old: OpId, new: OpId) {
        let old = self.index_of(old);
        let new = self.index_of(new);
        self.assert_is_not_end(old);
        self.assert_is_not_end(new);
        self.assert_is_owned(old);
        self.assert_is_unowned(new);
        let (prev, next) = self.unlink(old);
        self.link_between(new, prev, next);
    }

    /// Replaces `old` with the contiguous run `new_ids`. The run may contain `old` itself. An empty
    /// run removes `old`.
    pub fn replace_with_many(&mut self, old: OpId, new_ids: &[OpId]) {
        if new_ids.is_empty() {
            self.remove(old);
            return;
        }
        let old_index = self.index_of(old);
        self.assert_is_not_end(old_index);
        self.assert_is_owned(old_index);

        let mut indices: SmallVec<[usize; 4]> = SmallVec::with_capacity(new_ids.len());
        for &id in new_ids {
            let index = self.index_of(id);
            self.assert_is_not_end(index);
            if index != old_index {
                self.assert_is_unowned(index);
            }
            if indices.contains(&index) {
                panic!("Illegal operation: op {index} appears twice in a replacement run");
            }
            indices.push(index);
        }

        let (mut prev, next) = self.unlink(old_index);
        for index in indices {
            self.link_between(index, prev, next);
            prev = index;
        }
    }

    /// Detaches `id` from the list. The op stays in the arena and may be linked again.
    pub fn remove(&mut self, id: OpId) {
        let index = self.index_of(id);
        self.assert_is_not_end(index);
        self.assert_is_owned(index);
        self.unlink(index);
    }

    /// Moves a detached op out of the arena, leaving a `ListEnd` tombstone that can never be
    /// linked again.
    pub fn take(&mut self, id: OpId) -> T {
        let index = self.index_of(id);
        self.assert_is_not_end(index);
        self.assert_is_unowned(index);
        std::mem::replace(&mut self.nodes[index].op, T::list_end())
    }

    pub fn get(&self, id: OpId) -> Option<&T> {
        if !self.holds(id) {
            return None;
        }
        self.nodes.get(id.index).map(|node| &node.op)
    }

    pub fn get_mut(&mut self, id: OpId) -> Option<&mut T> {
        if !self.holds(id) {
            return None;
        }
        self.nodes.get_mut(id.index).map(|node| &mut node.op)
    }

    /// The node before `id` (possibly the head sentinel), or `None` if `id` is detached.
    pub fn prev(&self, id: OpId) -> Option<OpId> {
        let index = self.index_of(id);
        self.nodes[index].prev.map(|prev| self.op_id(prev))
    }

    /// The node after `id` (possibly the tail sentinel), or `None` if `id` is detached.
    pub fn next(&self, id: OpId) -> Option<OpId> {
        let index = self.index_of(id);
        self.nodes[index].next.map(|next| self.op_id(next))
    }

    pub fn owner(&self, id: OpId) -> Option<ListId> {
        let index = self.index_of(id);
        self.nodes[index].owner
    }

    pub fn is_sentinel(&self, id: OpId) -> bool {
        self.holds(id) && (id.index == HEAD || id.index == TAIL)
    }

    /// A head-to-tail cursor that does not borrow the list, so the list can be mutated between
    /// steps.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            list: self.id,
            arena: self.arena,
            position: self.nodes[HEAD].next,
            reverse: false,
        }
    }

    pub fn cursor_rev(&self) -> Cursor {
        Cursor {
            list: self.id,
            arena: self.arena,
            position: self.nodes[TAIL].prev,
            reverse: true,
        }
    }

    pub fn ids(&self) -> Ids<'_, T> {
        Ids {
            list: self,
            cursor: self.cursor(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.ids().map(move |id| &self.nodes[id.index].op)
    }

    pub fn reversed(&self) -> impl Iterator<Item = &T> + '_ {
        Ids {
            list: self,
            cursor: self.cursor_rev(),
        }
        .map(move |id| &self.nodes[id.index].op)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        let order: Vec<usize> = self.ids().map(|id| id.index).collect();
        let mut slots: Vec<Option<&mut T>> =
            self.nodes.iter_mut().map(|node| Some(&mut node.op)).collect();
        order.into_iter().filter_map(move |index| slots[index].take())
    }

    /// Walks the whole arena and panics if any structural invariant is broken: the chain from
    /// head reaches tail through owned ops only, back links mirror forward links, and every op
    /// outside the chain is fully detached.
    pub fn assert_consistent(&self) {
        let mut on_chain = vec![false; self.nodes.len()];
        on_chain[HEAD] = true;
        let mut current = HEAD;
        let mut count = 0;
        while current != TAIL {
            let next = match self.nodes[current].next {
                Some(next) => next,
                None => panic!("AssertionError: chain broken after node {current}"),
            };
            if on_chain[next] {
                panic!("AssertionError: node {next} appears twice in the chain");
            }
            if self.nodes[next].prev != Some(current) {
                panic!("AssertionError: node {next} does not link back to {current}");
            }
            if self.nodes[next].owner != Some(self.id) {
                panic!("AssertionError: node {next} is chained but not owned by this list");
            }
            on_chain[next] = true;
            current = next;
            if current != TAIL {
                count += 1;
            }
        }
        if count != self.len {
            panic!(
                "AssertionError: chain holds {count} ops but the list counts {}",
                self.len
            );
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if !on_chain[index]
                && (node.owner.is_some() || node.prev.is_some() || node.next.is_some())
            {
                panic!("AssertionError: detached node {index} still has list state");
            }
        }
    }

    fn op_id(&self, index: usize) -> OpId {
        OpId {
            list: self.id,
            arena: self.arena,
            index,
        }
    }

    /// Whether `id` was handed out by this very list, not merely one with the same `ListId`.
    fn holds(&self, id: OpId) -> bool {
        id.list == self.id && id.arena == self.arena
    }

    fn index_of(&self, id: OpId) -> usize {
        if id.list != self.id {
            panic!(
                "Illegal operation: op belongs to list {:?}, not {:?}",
                id.list, self.id
            );
        }
        if id.arena != self.arena {
            panic!(
                "Illegal operation: op belongs to another list with id {:?}",
                self.id
            );
        }
        id.index
    }

    fn detached_indices(&self, ids: &[OpId]) -> SmallVec<[usize; 4]> {
        let mut indices: SmallVec<[usize; 4]> = SmallVec::with_capacity(ids.len());
        for &id in ids {
            let index = self.index_of(id);
            self.assert_is_not_end(index);
            self.assert_is_unowned(index);
            if indices.contains(&index) {
                panic!("Illegal operation: op {index} is inserted twice");
            }
            indices.push(index);
        }
        indices
    }

    fn neighbor(&self, index: usize, before: bool) -> usize {
        let node = &self.nodes[index];
        match if before { node.prev } else { node.next } {
            Some(neighbor) => neighbor,
            None => panic!("AssertionError: owned node {index} is missing a neighbor"),
        }
    }

    fn link_between(&mut self, index: usize, prev: usize, next: usize) {
        self.nodes[prev].next = Some(index);
        self.nodes[next].prev = Some(index);
        let node = &mut self.nodes[index];
        node.prev = Some(prev);
        node.next = Some(next);
        node.owner = Some(self.id);
        self.len += 1;
    }

    fn unlink(&mut self, index: usize) -> (usize, usize) {
        let prev = self.neighbor(index, true);
        let next = self.neighbor(index, false);
        self.nodes[prev].next = Some(next);
        self.nodes[next].prev = Some(prev);
        let node = &mut self.nodes[index];
        node.prev = None;
        node.next = None;
        node.owner = None;
        self.len -= 1;
        (prev, next)
    }

    fn assert_is_not_end(&self, index: usize) {
        if index == HEAD || index == TAIL || self.nodes[index].op.kind() == OpKind::ListEnd {
            panic!("Illegal operation: expected op to not be a list end");
        }
    }

    fn assert_is_unowned(&self, index: usize) {
        if let Some(owner) = self.nodes[index].owner {
            panic!("Illegal operation: op is already owned by list {:?}", owner);
        }
    }

    fn assert_is_owned(&self, index: usize) {
        match self.nodes[index].owner {
            Some(owner) if owner == self.id => {}
            Some(owner) => panic!(
                "Illegal operation: op is owned by list {:?}, expected {:?}",
                owner, self.id
            ),
            None => panic!("Illegal operation: op is not owned by any list"),
        }
    }
}

impl<T: Op> Index<OpId> for OpList<T> {
    type Output = T;

    fn index(&self, id: OpId) -> &T {
        let index = self.index_of(id);
        &self.nodes[index].op
    }
}

impl<T: Op> IndexMut<OpId> for OpList<T> {
    fn index_mut(&mut self, id: OpId) -> &mut T {
        let index = self.index_of(id);
        &mut self.nodes[index].op
    }
}

impl<T: Op> fmt::Debug for OpList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpList#{} ", self.id.0)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Position in an `OpList` that is independent of any borrow of the list.
///
/// The successor is read before a node is yielded, so the caller may remove, replace or insert
/// after the yielded node. Each step verifies the node about to be yielded is still owned by the
/// list, which catches mutations at or after the cursor position.
#[derive(Debug, Clone)]
pub struct Cursor {
    list: ListId,
    arena: u64,
    position: Option<usize>,
    reverse: bool,
}

impl Cursor {
    #[allow(clippy::should_implement_trait)]
    pub fn next<T: Op>(&mut self, list: &OpList<T>) -> Option<OpId> {
        if list.id != self.list || list.arena != self.arena {
            panic!(
                "Illegal operation: cursor over {:?} used with list {:?}",
                self.list, list.id
            );
        }
        let index = self.position?;
        let end = if self.reverse { HEAD } else { TAIL };
        if index == end {
            self.position = None;
            return None;
        }
        if list.nodes[index].owner != Some(list.id) {
            panic!("Illegal state: iterated onto an op that is no longer owned by this list");
        }
        let node = &list.nodes[index];
        self.position = if self.reverse { node.prev } else { node.next };
        Some(list.op_id(index))
    }
}

pub struct Ids<'a, T: Op> {
    list: &'a OpList<T>,
    cursor: Cursor,
}

impl<T: Op> Iterator for Ids<'_, T> {
    type Item = OpId;

    fn next(&mut self) -> Option<OpId> {
        self.cursor.next(self.list)
    }
}

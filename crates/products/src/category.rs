//! Category hierarchy.
//!
//! Categories form a forest: every category has at most one parent and the
//! parent graph never contains a cycle. The tree is held as an adjacency list
//! (parent id per node) plus a children index, built from one owner's rows.
//!
//! Deleting a category never cascades: its direct children become roots and
//! everything below them keeps its parent.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, Entity, OwnerId};

use crate::attribute::AttributeId;
use crate::slug::Slug;
use crate::validate::{self, SHORT_NAME_MAX};

catalog_core::uuid_newtype!(
    /// Category identifier.
    pub struct CategoryId,
    "CategoryId"
);

/// A category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub owner: OwnerId,
    pub name: String,
    pub slug: Slug,
    pub is_active: bool,
    pub parent: Option<CategoryId>,
    pub attributes: Vec<AttributeId>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Category {
    type Id = CategoryId;
    const KIND: &'static str = "category";

    fn id(&self) -> &CategoryId {
        &self.id
    }
}

/// Input for [`CategoryTree::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub id: CategoryId,
    pub owner: OwnerId,
    pub name: String,
    pub is_active: bool,
    pub parent: Option<CategoryId>,
    pub attributes: Vec<AttributeId>,
    pub created_at: DateTime<Utc>,
}

/// Result of [`CategoryTree::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedCategory {
    pub removed: Category,
    /// Former direct children, now roots.
    pub orphaned: Vec<CategoryId>,
}

/// One owner's category forest.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: HashMap<CategoryId, Category>,
    children: HashMap<CategoryId, Vec<CategoryId>>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tree from stored rows.
    ///
    /// A row whose parent is not among `rows` is treated as a root.
    pub fn from_rows(rows: impl IntoIterator<Item = Category>) -> Self {
        let mut tree = Self::new();
        for row in rows {
            tree.nodes.insert(row.id, row);
        }
        let links: Vec<(CategoryId, CategoryId)> = tree
            .nodes
            .values()
            .filter_map(|c| c.parent.map(|p| (p, c.id)))
            .collect();
        for (parent, child) in links {
            if tree.nodes.contains_key(&parent) {
                tree.children.entry(parent).or_default().push(child);
            } else if let Some(node) = tree.nodes.get_mut(&child) {
                tracing::warn!(category = %child, missing_parent = %parent, "dangling parent reference; treating as root");
                node.parent = None;
            }
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.nodes.values()
    }

    /// Whether some category other than `except` already uses `slug`.
    pub fn slug_taken(&self, slug: &str, except: Option<CategoryId>) -> bool {
        self.nodes
            .values()
            .any(|c| Some(c.id) != except && c.slug.as_str() == slug)
    }

    /// Insert a new category. A fresh node cannot be its own ancestor, so no
    /// cycle check is needed; the parent only has to exist.
    pub fn create(&mut self, new: NewCategory) -> DomainResult<&Category> {
        let name = validate::normalize_name("name", &new.name, SHORT_NAME_MAX)?;
        if self.nodes.contains_key(&new.id) {
            return Err(DomainError::conflict(format!("category {} already exists", new.id)));
        }
        if let Some(parent) = new.parent {
            if !self.nodes.contains_key(&parent) {
                return Err(DomainError::unresolved("category", parent));
            }
        }
        let slug = Slug::unique_from_name(&name, new.id, |s| self.slug_taken(s, None));

        let category = Category {
            id: new.id,
            owner: new.owner,
            name,
            slug,
            is_active: new.is_active,
            parent: new.parent,
            attributes: new.attributes,
            created_at: new.created_at,
        };
        if let Some(parent) = category.parent {
            self.children.entry(parent).or_default().push(category.id);
        }
        let id = category.id;
        self.nodes.insert(id, category);
        Ok(&self.nodes[&id])
    }

    /// Move `node` under `new_parent` (or to the root with `None`).
    ///
    /// Rejects `node` itself and any of its descendants as the new parent with
    /// [`DomainError::CyclicParent`]. On error the tree is unchanged.
    pub fn reparent(&mut self, node: CategoryId, new_parent: Option<CategoryId>) -> DomainResult<()> {
        let old_parent = self.nodes.get(&node).ok_or(DomainError::NotFound)?.parent;
        if old_parent == new_parent {
            return Ok(());
        }

        if let Some(parent) = new_parent {
            if !self.nodes.contains_key(&parent) {
                return Err(DomainError::unresolved("category", parent));
            }
            if self.is_descendant_or_self(parent, node) {
                return Err(DomainError::CyclicParent {
                    node: node.to_string(),
                    parent: parent.to_string(),
                });
            }
        }

        if let Some(old) = old_parent {
            self.unlink_child(old, node);
        }
        if let Some(parent) = new_parent {
            self.children.entry(parent).or_default().push(node);
        }
        if let Some(category) = self.nodes.get_mut(&node) {
            category.parent = new_parent;
        }
        Ok(())
    }

    /// Rename `node`, re-deriving its slug.
    pub fn rename(&mut self, node: CategoryId, name: &str) -> DomainResult<()> {
        let name = validate::normalize_name("name", name, SHORT_NAME_MAX)?;
        if !self.nodes.contains_key(&node) {
            return Err(DomainError::NotFound);
        }
        let slug = Slug::unique_from_name(&name, node, |s| self.slug_taken(s, Some(node)));
        if let Some(category) = self.nodes.get_mut(&node) {
            category.name = name;
            category.slug = slug;
        }
        Ok(())
    }

    pub fn set_active(&mut self, node: CategoryId, is_active: bool) -> DomainResult<()> {
        let category = self.nodes.get_mut(&node).ok_or(DomainError::NotFound)?;
        category.is_active = is_active;
        Ok(())
    }

    pub fn set_attributes(&mut self, node: CategoryId, attributes: Vec<AttributeId>) -> DomainResult<()> {
        let category = self.nodes.get_mut(&node).ok_or(DomainError::NotFound)?;
        category.attributes = attributes;
        Ok(())
    }

    /// Remove `node`; its direct children become roots.
    pub fn delete(&mut self, node: CategoryId) -> DomainResult<DeletedCategory> {
        let removed = self.nodes.remove(&node).ok_or(DomainError::NotFound)?;
        if let Some(parent) = removed.parent {
            self.unlink_child(parent, node);
        }

        let orphaned = self.children.remove(&node).unwrap_or_default();
        for child in &orphaned {
            if let Some(category) = self.nodes.get_mut(child) {
                category.parent = None;
            }
        }
        Ok(DeletedCategory { removed, orphaned })
    }

    /// Every category reachable through child links from `node`, breadth first.
    ///
    /// Callers must not rely on the order. An unknown `node` yields nothing.
    pub fn descendants(&self, node: CategoryId, include_self: bool) -> Descendants<'_> {
        let mut queue = VecDeque::new();
        let mut seen = HashSet::new();
        if self.nodes.contains_key(&node) {
            seen.insert(node);
            if include_self {
                queue.push_back(node);
            } else {
                self.enqueue_children(node, &mut queue, &mut seen);
            }
        }
        Descendants {
            tree: self,
            queue,
            seen,
        }
    }

    /// Ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: CategoryId) -> impl Iterator<Item = &Category> {
        let mut next = self.nodes.get(&node).and_then(|c| c.parent);
        let mut hops = 0usize;
        let limit = self.nodes.len();
        core::iter::from_fn(move || {
            let id = next?;
            hops += 1;
            if hops > limit {
                return None;
            }
            let category = self.nodes.get(&id)?;
            next = category.parent;
            Some(category)
        })
    }

    /// Whether `candidate` is `of` or lies below it.
    pub fn is_descendant_or_self(&self, candidate: CategoryId, of: CategoryId) -> bool {
        candidate == of || self.ancestors(candidate).any(|a| a.id == of)
    }

    /// Root categories in display order.
    pub fn roots(&self) -> Vec<&Category> {
        let mut roots: Vec<&Category> = self.nodes.values().filter(|c| c.parent.is_none()).collect();
        sort_for_display(&mut roots);
        roots
    }

    /// Direct children of `parent` in display order.
    pub fn children_sorted(&self, parent: CategoryId) -> Vec<&Category> {
        let mut children: Vec<&Category> = self
            .children
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
            .collect();
        sort_for_display(&mut children);
        children
    }

    pub fn into_rows(self) -> impl Iterator<Item = Category> {
        self.nodes.into_values()
    }

    fn unlink_child(&mut self, parent: CategoryId, child: CategoryId) {
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|c| *c != child);
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
    }

    fn enqueue_children(
        &self,
        node: CategoryId,
        queue: &mut VecDeque<CategoryId>,
        seen: &mut HashSet<CategoryId>,
    ) {
        for child in self.children.get(&node).into_iter().flatten() {
            if seen.insert(*child) {
                queue.push_back(*child);
            }
        }
    }
}

/// Name order, ties broken by id.
fn sort_for_display(categories: &mut [&Category]) {
    categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

/// Lazy breadth-first walk returned by [`CategoryTree::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a CategoryTree,
    queue: VecDeque<CategoryId>,
    seen: HashSet<CategoryId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Category;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.queue.pop_front()?;
        self.tree.enqueue_children(id, &mut self.queue, &mut self.seen);
        self.tree.nodes.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_category(owner: OwnerId, name: &str, parent: Option<CategoryId>) -> NewCategory {
        NewCategory {
            id: CategoryId::new(),
            owner,
            name: name.to_string(),
            is_active: true,
            parent,
            attributes: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn add(tree: &mut CategoryTree, owner: OwnerId, name: &str, parent: Option<CategoryId>) -> CategoryId {
        tree.create(new_category(owner, name, parent)).unwrap().id
    }

    fn ids<'a>(it: impl Iterator<Item = &'a Category>) -> HashSet<CategoryId> {
        it.map(|c| c.id).collect()
    }

    #[test]
    fn create_with_missing_parent_is_unresolved() {
        let mut tree = CategoryTree::new();
        let err = tree
            .create(new_category(OwnerId::new(), "Shoes", Some(CategoryId::new())))
            .unwrap_err();
        assert!(matches!(err, DomainError::UnresolvedScopeReference { kind: "category", .. }));
        assert!(tree.is_empty());
    }

    #[test]
    fn create_derives_unique_slugs() {
        let owner = OwnerId::new();
        let mut tree = CategoryTree::new();
        let a = add(&mut tree, owner, "Outdoor Gear", None);
        let b = add(&mut tree, owner, "outdoor gear", None);
        assert_eq!(tree.get(&a).unwrap().slug.as_str(), "outdoor-gear");
        assert_eq!(tree.get(&b).unwrap().slug.as_str(), "outdoor-gear-2");
    }

    #[test]
    fn reparent_to_descendant_is_cyclic_and_leaves_tree_unchanged() {
        let owner = OwnerId::new();
        let mut tree = CategoryTree::new();
        let c = add(&mut tree, owner, "C", None);
        let d = add(&mut tree, owner, "D", Some(c));
        let f = add(&mut tree, owner, "F", Some(d));

        let err = tree.reparent(c, Some(f)).unwrap_err();
        assert!(matches!(err, DomainError::CyclicParent { .. }));

        assert_eq!(tree.get(&c).unwrap().parent, None);
        assert_eq!(tree.get(&d).unwrap().parent, Some(c));
        assert_eq!(tree.get(&f).unwrap().parent, Some(d));
        assert_eq!(ids(tree.descendants(c, true)), HashSet::from([c, d, f]));
    }

    #[test]
    fn reparent_to_self_is_cyclic() {
        let owner = OwnerId::new();
        let mut tree = CategoryTree::new();
        let c = add(&mut tree, owner, "C", None);
        assert!(matches!(tree.reparent(c, Some(c)), Err(DomainError::CyclicParent { .. })));
    }

    #[test]
    fn reparent_moves_subtree_and_to_root() {
        let owner = OwnerId::new();
        let mut tree = CategoryTree::new();
        let a = add(&mut tree, owner, "A", None);
        let b = add(&mut tree, owner, "B", None);
        let c = add(&mut tree, owner, "C", Some(a));
        let d = add(&mut tree, owner, "D", Some(c));

        tree.reparent(c, Some(b)).unwrap();
        assert_eq!(ids(tree.descendants(a, false)), HashSet::new());
        assert_eq!(ids(tree.descendants(b, false)), HashSet::from([c, d]));

        tree.reparent(c, None).unwrap();
        assert_eq!(tree.get(&c).unwrap().parent, None);
        assert!(tree.roots().iter().any(|r| r.id == c));
    }

    #[test]
    fn reparent_unknown_parent_is_unresolved() {
        let owner = OwnerId::new();
        let mut tree = CategoryTree::new();
        let c = add(&mut tree, owner, "C", None);
        let err = tree.reparent(c, Some(CategoryId::new())).unwrap_err();
        assert!(matches!(err, DomainError::UnresolvedScopeReference { .. }));
        assert_eq!(tree.reparent(CategoryId::new(), None), Err(DomainError::NotFound));
    }

    #[test]
    fn delete_orphans_direct_children_only() {
        let owner = OwnerId::new();
        let mut tree = CategoryTree::new();
        let c = add(&mut tree, owner, "C", None);
        let d = add(&mut tree, owner, "D", Some(c));
        let e = add(&mut tree, owner, "E", Some(c));
        let g = add(&mut tree, owner, "G", Some(d));

        let deleted = tree.delete(c).unwrap();
        assert_eq!(deleted.removed.id, c);
        assert_eq!(deleted.orphaned.iter().copied().collect::<HashSet<_>>(), HashSet::from([d, e]));

        assert!(!tree.contains(&c));
        assert_eq!(tree.get(&d).unwrap().parent, None);
        assert_eq!(tree.get(&e).unwrap().parent, None);
        assert_eq!(tree.get(&g).unwrap().parent, Some(d));
    }

    #[test]
    fn delete_unlinks_from_parent() {
        let owner = OwnerId::new();
        let mut tree = CategoryTree::new();
        let a = add(&mut tree, owner, "A", None);
        let b = add(&mut tree, owner, "B", Some(a));
        tree.delete(b).unwrap();
        assert!(tree.children_sorted(a).is_empty());
    }

    #[test]
    fn descendants_of_three_level_chain() {
        let owner = OwnerId::new();
        let mut tree = CategoryTree::new();
        let c = add(&mut tree, owner, "C", None);
        let d = add(&mut tree, owner, "D", Some(c));
        let f = add(&mut tree, owner, "F", Some(d));

        assert_eq!(ids(tree.descendants(c, true)), HashSet::from([c, d, f]));
        assert_eq!(ids(tree.descendants(d, false)), HashSet::from([f]));
        assert_eq!(tree.descendants(CategoryId::new(), true).count(), 0);
    }

    #[test]
    fn siblings_sort_by_name_then_id() {
        let owner = OwnerId::new();
        let mut tree = CategoryTree::new();
        let root = add(&mut tree, owner, "Root", None);
        add(&mut tree, owner, "Zebra", Some(root));
        add(&mut tree, owner, "Apple", Some(root));
        let m1 = add(&mut tree, owner, "Mango", Some(root));
        let m2 = add(&mut tree, owner, "Mango", Some(root));

        let names: Vec<&str> = tree.children_sorted(root).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Mango", "Mango", "Zebra"]);
        let mangos: Vec<CategoryId> = tree
            .children_sorted(root)
            .iter()
            .filter(|c| c.name == "Mango")
            .map(|c| c.id)
            .collect();
        assert_eq!(mangos, vec![m1.min(m2), m1.max(m2)]);
    }

    #[test]
    fn from_rows_rebuilds_children_and_drops_dangling_parents() {
        let owner = OwnerId::new();
        let mut tree = CategoryTree::new();
        let a = add(&mut tree, owner, "A", None);
        let b = add(&mut tree, owner, "B", Some(a));
        let mut rows: Vec<Category> = tree.into_rows().collect();
        let mut stray = rows[0].clone();
        stray.id = CategoryId::new();
        stray.slug = Slug::parse("stray").unwrap();
        stray.parent = Some(CategoryId::new());
        let stray_id = stray.id;
        rows.push(stray);

        let rebuilt = CategoryTree::from_rows(rows);
        assert_eq!(ids(rebuilt.descendants(a, false)), HashSet::from([b]));
        assert_eq!(rebuilt.get(&stray_id).unwrap().parent, None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                ..ProptestConfig::default()
            })]

            /// Property: no sequence of reparent calls can create a cycle.
            #[test]
            fn reparent_never_creates_cycles(
                parents in prop::collection::vec(prop::option::of(0usize..12), 12),
                moves in prop::collection::vec((0usize..12, prop::option::of(0usize..12)), 0..40)
            ) {
                let owner = OwnerId::new();
                let mut tree = CategoryTree::new();
                let mut ids: Vec<CategoryId> = Vec::new();
                for (i, parent) in parents.iter().enumerate() {
                    let parent = parent.filter(|p| *p < i).map(|p| ids[p]);
                    ids.push(add(&mut tree, owner, &format!("n{i}"), parent));
                }

                for (node, parent) in moves {
                    let _ = tree.reparent(ids[node], parent.map(|p| ids[p]));
                }

                for id in &ids {
                    prop_assert!(tree.ancestors(*id).all(|a| a.id != *id));
                    prop_assert!(tree.ancestors(*id).count() < ids.len());
                }
            }

            /// Property: descendants(x) is exactly the set of nodes that have x as an ancestor.
            #[test]
            fn descendants_match_ancestor_relation(
                parents in prop::collection::vec(prop::option::of(0usize..10), 1..10)
            ) {
                let owner = OwnerId::new();
                let mut tree = CategoryTree::new();
                let mut ids: Vec<CategoryId> = Vec::new();
                for (i, parent) in parents.iter().enumerate() {
                    let parent = parent.filter(|p| *p < i).map(|p| ids[p]);
                    ids.push(add(&mut tree, owner, &format!("n{i}"), parent));
                }

                for x in &ids {
                    let walked: HashSet<CategoryId> = tree.descendants(*x, false).map(|c| c.id).collect();
                    let expected: HashSet<CategoryId> = ids
                        .iter()
                        .copied()
                        .filter(|y| tree.ancestors(*y).any(|a| a.id == *x))
                        .collect();
                    prop_assert_eq!(walked, expected);
                }
            }
        }
    }
}

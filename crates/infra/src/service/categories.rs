use std::sync::PoisonError;

use chrono::Utc;

use catalog_core::{DomainError, DomainResult, OwnerId};
use catalog_products::{
    Category, CategoryId, CategoryTree, DeletedCategory, NewCategory, ProductPatch,
};

use super::CatalogService;
use crate::owner_store::OwnerStore;
use crate::scope_lock::ScopeKey;

const TREE_SCOPE: &str = "category_tree";

/// Input for [`CatalogService::create_category`]. Attributes are given by
/// name and created on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
    pub is_active: bool,
    pub parent: Option<CategoryId>,
    pub attributes: Vec<String>,
}

/// Changes for [`CatalogService::update_category`]; `None` leaves a field as is.
/// `parent: Some(None)` moves the category to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub parent: Option<Option<CategoryId>>,
    pub attributes: Option<Vec<String>>,
}

impl CatalogService {
    pub(super) fn tree(&self, owner: OwnerId) -> CategoryTree {
        let trees = self.categories.read().unwrap_or_else(PoisonError::into_inner);
        trees.get(&owner).cloned().unwrap_or_default()
    }

    /// Mutate a working copy of the owner's tree; it replaces the stored tree
    /// only if `f` succeeds.
    fn with_tree<R>(
        &self,
        owner: OwnerId,
        f: impl FnOnce(&mut CategoryTree) -> DomainResult<R>,
    ) -> DomainResult<R> {
        self.locks.with(ScopeKey::new(TREE_SCOPE, owner), || {
            let mut tree = self.tree(owner);
            let out = f(&mut tree)?;
            self.categories
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(owner, tree);
            Ok(out)
        })
    }

    pub fn create_category(&self, owner: OwnerId, input: CategoryInput) -> DomainResult<Category> {
        let category = self.with_tree(owner, |tree| {
            let id = CategoryId::new();
            tree.create(NewCategory {
                id,
                owner,
                name: input.name,
                is_active: input.is_active,
                parent: input.parent,
                attributes: Vec::new(),
                created_at: Utc::now(),
            })?;
            if !input.attributes.is_empty() {
                let attributes = self.resolve_attributes(owner, &input.attributes)?;
                tree.set_attributes(id, attributes)?;
            }
            tree.get(&id).cloned().ok_or(DomainError::NotFound)
        })?;
        tracing::debug!(%owner, category = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    pub fn get_category(&self, owner: OwnerId, id: CategoryId) -> DomainResult<Category> {
        self.tree(owner).get(&id).cloned().ok_or(DomainError::NotFound)
    }

    /// All categories, depth first, siblings in display order.
    pub fn list_categories(&self, owner: OwnerId) -> Vec<Category> {
        let tree = self.tree(owner);
        let mut out = Vec::with_capacity(tree.len());
        let mut stack: Vec<&Category> = tree.roots().into_iter().rev().collect();
        while let Some(category) = stack.pop() {
            stack.extend(tree.children_sorted(category.id).into_iter().rev());
            out.push(category.clone());
        }
        out
    }

    pub fn update_category(
        &self,
        owner: OwnerId,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> DomainResult<Category> {
        let category = self.with_tree(owner, |tree| {
            if !tree.contains(&id) {
                return Err(DomainError::NotFound);
            }
            if let Some(name) = &patch.name {
                tree.rename(id, name)?;
            }
            if let Some(parent) = patch.parent {
                tree.reparent(id, parent)?;
            }
            if let Some(is_active) = patch.is_active {
                tree.set_active(id, is_active)?;
            }
            if let Some(names) = &patch.attributes {
                let attributes = self.resolve_attributes(owner, names)?;
                tree.set_attributes(id, attributes)?;
            }
            tree.get(&id).cloned().ok_or(DomainError::NotFound)
        })?;
        tracing::debug!(%owner, category = %id, parent = ?category.parent, "category updated");
        Ok(category)
    }

    /// Delete a category. Its direct children become roots and products that
    /// referenced it lose their category.
    pub fn delete_category(&self, owner: OwnerId, id: CategoryId) -> DomainResult<DeletedCategory> {
        let deleted = self.with_tree(owner, |tree| tree.delete(id))?;

        let cleared = self.rewrite_products(owner, |product| {
            (product.category == Some(id)).then(|| ProductPatch {
                category: Some(None),
                ..Default::default()
            })
        })?;
        tracing::debug!(
            %owner,
            category = %id,
            orphaned = deleted.orphaned.len(),
            products_cleared = cleared,
            "category deleted"
        );
        Ok(deleted)
    }

    /// `id` and/or everything below it.
    pub fn category_descendants(
        &self,
        owner: OwnerId,
        id: CategoryId,
        include_self: bool,
    ) -> DomainResult<Vec<Category>> {
        let tree = self.tree(owner);
        if !tree.contains(&id) {
            return Err(DomainError::NotFound);
        }
        Ok(tree.descendants(id, include_self).cloned().collect())
    }

    /// Ids of every category named `name` (case-insensitive) or with slug
    /// `name`, plus all their descendants.
    pub(super) fn category_ids_matching(&self, owner: OwnerId, name: &str) -> Vec<CategoryId> {
        let tree = self.tree(owner);
        let wanted = name.trim();
        let mut ids: Vec<CategoryId> = Vec::new();
        let matches = tree
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case(wanted) || c.slug.as_str() == wanted)
            .map(|c| c.id)
            .collect::<Vec<_>>();
        for root in matches {
            for category in tree.descendants(root, true) {
                if !ids.contains(&category.id) {
                    ids.push(category.id);
                }
            }
        }
        ids
    }

    /// Remove `attribute` from every category of `owner`.
    pub(super) fn forget_category_attribute(
        &self,
        owner: OwnerId,
        attribute: catalog_products::AttributeId,
    ) -> DomainResult<()> {
        self.with_tree(owner, |tree| {
            let affected: Vec<(CategoryId, Vec<_>)> = tree
                .iter()
                .filter(|c| c.attributes.contains(&attribute))
                .map(|c| {
                    let kept = c.attributes.iter().copied().filter(|a| *a != attribute).collect();
                    (c.id, kept)
                })
                .collect();
            for (id, kept) in affected {
                tree.set_attributes(id, kept)?;
            }
            Ok(())
        })
    }
}

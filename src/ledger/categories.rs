// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category forest capped at three levels (root, child, grandchild).

use std::collections::{HashMap, HashSet, VecDeque};

use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use serde::Serialize;

use super::Ledger;
use crate::db::text_column;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryUpdate, NewCategory};
use crate::notify::Change;
use crate::utils::{new_id, require_name};

/// Deepest allowed depth; a root is depth 0.
pub const MAX_DEPTH: usize = 2;

const COLUMNS: &str = "id, user_id, name, type, parent_id, icon";

#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    pub category: Category,
    pub depth: usize,
    pub children: Vec<CategoryNode>,
}

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        r#type: text_column(r, 3)?,
        parent_id: r.get(4)?,
        icon: r.get(5)?,
    })
}

/// Number of parent hops from `category_id` to its root. `None` is depth 0.
///
/// A parent chain that revisits a category, or points at a category that does
/// not exist, is reported as [`LedgerError::Integrity`].
pub fn category_depth(category_id: Option<&str>, all: &[Category]) -> LedgerResult<usize> {
    let Some(start) = category_id else {
        return Ok(0);
    };
    let by_id: HashMap<&str, &Category> = all.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut current = *by_id
        .get(start)
        .ok_or_else(|| LedgerError::not_found("Category", start))?;
    let mut seen = HashSet::from([current.id.as_str()]);
    let mut depth = 0;
    while let Some(parent_id) = current.parent_id.as_deref() {
        let parent = *by_id.get(parent_id).ok_or_else(|| {
            LedgerError::Integrity(format!(
                "category '{}' points at missing parent '{}'",
                current.name, parent_id
            ))
        })?;
        if !seen.insert(parent.id.as_str()) {
            return Err(LedgerError::Integrity(format!(
                "category cycle detected through '{}'",
                parent.name
            )));
        }
        depth += 1;
        current = parent;
    }
    Ok(depth)
}

fn children_index(all: &[Category]) -> HashMap<&str, Vec<&Category>> {
    let mut index: HashMap<&str, Vec<&Category>> = HashMap::new();
    for c in all {
        if let Some(parent) = c.parent_id.as_deref() {
            index.entry(parent).or_default().push(c);
        }
    }
    index
}

/// `root` followed by every category below it, breadth first.
pub fn descendant_ids(root: &str, all: &[Category]) -> Vec<String> {
    let children = children_index(all);
    let mut out = vec![root.to_string()];
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        for child in children.get(id).into_iter().flatten() {
            if seen.insert(child.id.as_str()) {
                out.push(child.id.clone());
                queue.push_back(child.id.as_str());
            }
        }
    }
    out
}

/// Levels below `root` (0 for a leaf).
fn subtree_height(root: &str, all: &[Category]) -> usize {
    let children = children_index(all);
    let mut seen = HashSet::from([root]);
    let mut frontier = vec![root];
    let mut height = 0;
    loop {
        let mut next = Vec::new();
        for id in &frontier {
            for child in children.get(id).into_iter().flatten() {
                if seen.insert(child.id.as_str()) {
                    next.push(child.id.as_str());
                }
            }
        }
        if next.is_empty() {
            return height;
        }
        height += 1;
        frontier = next;
    }
}

/// Roots sorted by name, each with its children nested. Categories that are
/// unreachable from a root (cycles, dangling parents) are left out.
pub fn build_tree(all: &[Category]) -> Vec<CategoryNode> {
    fn attach(
        cat: &Category,
        depth: usize,
        children: &HashMap<&str, Vec<&Category>>,
        seen: &mut HashSet<String>,
    ) -> CategoryNode {
        let mut kids: Vec<&Category> = children
            .get(cat.id.as_str())
            .cloned()
            .unwrap_or_default();
        kids.sort_by(|a, b| a.name.cmp(&b.name));
        let mut nodes = Vec::with_capacity(kids.len());
        for kid in kids {
            if seen.insert(kid.id.clone()) {
                nodes.push(attach(kid, depth + 1, children, seen));
            }
        }
        CategoryNode {
            category: cat.clone(),
            depth,
            children: nodes,
        }
    }

    let children = children_index(all);
    let mut roots: Vec<&Category> = all.iter().filter(|c| c.parent_id.is_none()).collect();
    roots.sort_by(|a, b| a.name.cmp(&b.name));
    let mut seen = HashSet::new();
    let mut tree = Vec::with_capacity(roots.len());
    for root in roots {
        if seen.insert(root.id.clone()) {
            tree.push(attach(root, 0, &children, &mut seen));
        }
    }
    tree
}

impl Ledger {
    pub fn list_categories(&self, user_id: &str) -> LedgerResult<Vec<Category>> {
        let sql = format!("SELECT {COLUMNS} FROM categories WHERE user_id=?1 ORDER BY name, id");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], category_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_category(&self, user_id: &str, id: &str) -> LedgerResult<Category> {
        let sql = format!("SELECT {COLUMNS} FROM categories WHERE user_id=?1 AND id=?2");
        self.conn()
            .query_row(&sql, params![user_id, id], category_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("Category", id))
    }

    /// Look a category up by exact id, falling back to a case-insensitive name.
    pub fn resolve_category(&self, user_id: &str, ident: &str) -> LedgerResult<Category> {
        let ident = ident.trim();
        let all = self.list_categories(user_id)?;
        if let Some(c) = all.iter().find(|c| c.id == ident) {
            return Ok(c.clone());
        }
        let mut matches = all.into_iter().filter(|c| c.name.eq_ignore_ascii_case(ident));
        match (matches.next(), matches.next()) {
            (Some(c), None) => Ok(c),
            (Some(_), Some(_)) => Err(LedgerError::Validation(format!(
                "category name '{}' is ambiguous, use its id",
                ident
            ))),
            _ => Err(LedgerError::not_found("Category", ident)),
        }
    }

    pub fn category_depth(&self, user_id: &str, id: Option<&str>) -> LedgerResult<usize> {
        let all = self.list_categories(user_id)?;
        category_depth(id, &all)
    }

    pub fn category_tree(&self, user_id: &str) -> LedgerResult<Vec<CategoryNode>> {
        Ok(build_tree(&self.list_categories(user_id)?))
    }

    pub fn create_category(&self, user_id: &str, new: NewCategory) -> LedgerResult<Category> {
        let name = require_name(&new.name, "Category name")?;
        if let Some(parent) = new.parent_id.as_deref() {
            let all = self.list_categories(user_id)?;
            if category_depth(Some(parent), &all)? >= MAX_DEPTH {
                return Err(LedgerError::Validation("max depth exceeded".into()));
            }
        }

        let category = Category {
            id: new_id(),
            user_id: user_id.to_string(),
            name,
            r#type: new.r#type,
            parent_id: new.parent_id,
            icon: new.icon,
        };
        self.conn().execute(
            "INSERT INTO categories(id, user_id, name, type, parent_id, icon) VALUES (?1,?2,?3,?4,?5,?6)",
            params![
                category.id,
                category.user_id,
                category.name,
                category.r#type.as_str(),
                category.parent_id,
                category.icon
            ],
        )?;
        tracing::info!(user_id, category = %category.name, "category created");
        self.notify(Change::Categories);
        Ok(category)
    }

    pub fn update_category(
        &self,
        user_id: &str,
        id: &str,
        update: CategoryUpdate,
    ) -> LedgerResult<Category> {
        let mut category = self.get_category(user_id, id)?;
        if let Some(name) = update.name {
            category.name = require_name(&name, "Category name")?;
        }
        if let Some(kind) = update.r#type {
            category.r#type = kind;
        }
        if let Some(icon) = update.icon {
            category.icon = Some(icon);
        }
        self.conn().execute(
            "UPDATE categories SET name=?1, type=?2, icon=?3 WHERE id=?4 AND user_id=?5",
            params![
                category.name,
                category.r#type.as_str(),
                category.icon,
                id,
                user_id
            ],
        )?;
        self.notify(Change::Categories);
        Ok(category)
    }

    /// Re-parent `id` (and its subtree) under `new_parent`, or make it a root.
    pub fn move_category(
        &self,
        user_id: &str,
        id: &str,
        new_parent: Option<&str>,
    ) -> LedgerResult<Category> {
        let all = self.list_categories(user_id)?;
        let mut category = all
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found("Category", id))?;

        if let Some(parent) = new_parent {
            if descendant_ids(id, &all).iter().any(|d| d == parent) {
                return Err(LedgerError::Validation(format!(
                    "cannot move '{}' under itself or one of its descendants",
                    category.name
                )));
            }
            let resulting = category_depth(Some(parent), &all)? + 1 + subtree_height(id, &all);
            if resulting > MAX_DEPTH {
                return Err(LedgerError::Validation("max depth exceeded".into()));
            }
        }

        category.parent_id = new_parent.map(str::to_string);
        self.conn().execute(
            "UPDATE categories SET parent_id=?1 WHERE id=?2 AND user_id=?3",
            params![category.parent_id, id, user_id],
        )?;
        self.notify(Change::Categories);
        Ok(category)
    }

    /// Delete `id` and everything below it. Refused while any transaction
    /// references a category in that subtree. Returns the deleted ids.
    pub fn delete_category(&self, user_id: &str, id: &str) -> LedgerResult<Vec<String>> {
        let all = self.list_categories(user_id)?;
        let target = all
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| LedgerError::not_found("Category", id))?;
        let ids = descendant_ids(id, &all);

        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "SELECT COUNT(*) FROM transactions WHERE user_id=? AND category_id IN ({placeholders})"
        );
        let bound = std::iter::once(user_id).chain(ids.iter().map(String::as_str));
        let referenced: i64 = self
            .conn()
            .query_row(&sql, params_from_iter(bound), |r| r.get(0))?;
        if referenced > 0 {
            return Err(LedgerError::Conflict(format!(
                "category '{}' has {} associated transaction(s); re-assign them first",
                target.name, referenced
            )));
        }

        let tx = self.conn().unchecked_transaction()?;
        for cid in &ids {
            tx.execute(
                "DELETE FROM categories WHERE id=?1 AND user_id=?2",
                params![cid, user_id],
            )?;
        }
        let unlinked = self.unlink_categories(&tx, user_id, &ids)?;
        tx.commit()?;

        tracing::info!(user_id, category = %target.name, removed = ids.len(), "category subtree deleted");
        self.notify(Change::Categories);
        if unlinked > 0 {
            self.notify(Change::Wallets);
        }
        Ok(ids)
    }

    /// Remove every category of the user; refused while any transaction exists.
    pub fn delete_all_categories(&self, user_id: &str) -> LedgerResult<usize> {
        let txns: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id=?1",
            params![user_id],
            |r| r.get(0),
        )?;
        if txns > 0 {
            return Err(LedgerError::Conflict(
                "cannot delete categories while transactions exist; delete them first".into(),
            ));
        }
        let tx = self.conn().unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM categories WHERE user_id=?1", params![user_id])?;
        tx.execute(
            "UPDATE wallets SET linked_category_ids='[]' WHERE user_id=?1",
            params![user_id],
        )?;
        tx.commit()?;
        self.notify(Change::Categories);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryType;

    fn cat(id: &str, parent: Option<&str>) -> Category {
        Category {
            id: id.into(),
            user_id: "u".into(),
            name: id.to_uppercase(),
            r#type: EntryType::Expense,
            parent_id: parent.map(Into::into),
            icon: None,
        }
    }

    #[test]
    fn depth_counts_hops_to_root() {
        let all = vec![cat("a", None), cat("b", Some("a")), cat("c", Some("b"))];
        assert_eq!(category_depth(None, &all).unwrap(), 0);
        assert_eq!(category_depth(Some("a"), &all).unwrap(), 0);
        assert_eq!(category_depth(Some("c"), &all).unwrap(), 2);
    }

    #[test]
    fn cycle_is_an_integrity_error() {
        let all = vec![cat("a", Some("c")), cat("b", Some("a")), cat("c", Some("b"))];
        assert!(category_depth(Some("a"), &all).unwrap_err().is_integrity());
        let selfloop = vec![cat("x", Some("x"))];
        assert!(category_depth(Some("x"), &selfloop).unwrap_err().is_integrity());
    }

    #[test]
    fn dangling_parent_is_an_integrity_error() {
        let all = vec![cat("a", Some("gone"))];
        assert!(category_depth(Some("a"), &all).unwrap_err().is_integrity());
    }

    #[test]
    fn descendants_and_height() {
        let all = vec![
            cat("a", None),
            cat("b", Some("a")),
            cat("c", Some("a")),
            cat("d", Some("b")),
            cat("e", None),
        ];
        assert_eq!(descendant_ids("a", &all), vec!["a", "b", "c", "d"]);
        assert_eq!(descendant_ids("e", &all), vec!["e"]);
        assert_eq!(subtree_height("a", &all), 2);
        assert_eq!(subtree_height("d", &all), 0);
    }

    #[test]
    fn tree_skips_unreachable_nodes() {
        let all = vec![cat("a", None), cat("b", Some("a")), cat("x", Some("y")), cat("y", Some("x"))];
        let tree = build_tree(&all);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].category.id, "b");
        assert_eq!(tree[0].children[0].depth, 1);
    }
}

//! The host-owned selection and the selection-aware dispatch rule.
//!
//! Acting on a selected element acts on the whole selection; acting on an
//! unselected element acts on it alone.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

/// Ids of the currently selected topics and associations, in selection order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
	/// Selected topic ids.
	pub topic_ids: Vec<i64>,
	/// Selected association ids.
	pub assoc_ids: Vec<i64>,
}

/// Selection shared between the host and the view. The view only reads it.
pub type SharedSelection = Rc<RefCell<Selection>>;

/// Which half of the selection a dispatch consults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionKind {
	/// Topic ids.
	Topics,
	/// Association ids.
	Assocs,
}

impl Selection {
	/// Selected ids of one kind, in selection order.
	pub fn ids(&self, kind: SelectionKind) -> &[i64] {
		match kind {
			SelectionKind::Topics => &self.topic_ids,
			SelectionKind::Assocs => &self.assoc_ids,
		}
	}

	/// Whether `id` is selected as `kind`.
	pub fn contains(&self, kind: SelectionKind, id: i64) -> bool {
		self.ids(kind).contains(&id)
	}

	/// Nothing of either kind is selected.
	pub fn is_empty(&self) -> bool {
		self.topic_ids.is_empty() && self.assoc_ids.is_empty()
	}

	/// Adds an id, keeping selection order and ignoring duplicates.
	pub fn add(&mut self, kind: SelectionKind, id: i64) {
		let ids = self.ids_mut(kind);
		if !ids.contains(&id) {
			ids.push(id);
		}
	}

	/// Drops an id if present.
	pub fn remove(&mut self, kind: SelectionKind, id: i64) {
		self.ids_mut(kind).retain(|&i| i != id);
	}

	fn ids_mut(&mut self, kind: SelectionKind) -> &mut Vec<i64> {
		match kind {
			SelectionKind::Topics => &mut self.topic_ids,
			SelectionKind::Assocs => &mut self.assoc_ids,
		}
	}
}

/// Ids an action on `clicked` applies to.
///
/// Returns a snapshot of the selection when `clicked` is a member, so the
/// result is unaffected by handlers that change the selection later.
pub fn dispatch_targets(selection: &Selection, kind: SelectionKind, clicked: i64) -> Vec<i64> {
	let ids = selection.ids(kind);
	if ids.contains(&clicked) {
		debug!("invoke selection {:?}", ids);
		ids.to_vec()
	} else {
		debug!("invoke clicked {}", clicked);
		vec![clicked]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn selection(topics: &[i64], assocs: &[i64]) -> Selection {
		Selection {
			topic_ids: topics.to_vec(),
			assoc_ids: assocs.to_vec(),
		}
	}

	#[test]
	fn selected_member_acts_on_whole_selection() {
		let sel = selection(&[3, 1, 2], &[]);
		assert_eq!(dispatch_targets(&sel, SelectionKind::Topics, 1), vec![3, 1, 2]);
	}

	#[test]
	fn unselected_member_acts_alone() {
		let sel = selection(&[3, 1, 2], &[]);
		assert_eq!(dispatch_targets(&sel, SelectionKind::Topics, 9), vec![9]);
	}

	#[test]
	fn kinds_are_consulted_separately() {
		let sel = selection(&[5], &[]);
		assert_eq!(dispatch_targets(&sel, SelectionKind::Assocs, 5), vec![5]);
	}

	#[test]
	fn add_ignores_duplicates() {
		let mut sel = Selection::default();
		sel.add(SelectionKind::Topics, 1);
		sel.add(SelectionKind::Topics, 1);
		sel.add(SelectionKind::Topics, 2);
		assert_eq!(sel.topic_ids, vec![1, 2]);
		sel.remove(SelectionKind::Topics, 1);
		assert_eq!(sel.ids(SelectionKind::Topics), &[2]);
		assert!(!sel.is_empty());
	}
}

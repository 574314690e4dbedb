//! Context commands and the open context menu.

use std::fmt;
use std::rc::Rc;

use super::selection::SelectionKind;
use super::types::{Position, Target};

/// Called with a topic or association id.
pub type CommandHandler = Rc<dyn Fn(i64)>;

/// One context menu entry supplied by the host.
#[derive(Clone)]
pub struct ContextCommand {
	pub label: String,
	pub handler: CommandHandler,
}

impl ContextCommand {
	pub fn new(label: impl Into<String>, handler: impl Fn(i64) + 'static) -> Self {
		Self {
			label: label.into(),
			handler: Rc::new(handler),
		}
	}
}

impl fmt::Debug for ContextCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContextCommand").field("label", &self.label).finish()
	}
}

/// Context commands per element kind.
#[derive(Clone, Debug, Default)]
pub struct ContextCommands {
	pub topic: Vec<ContextCommand>,
	pub assoc: Vec<ContextCommand>,
}

impl ContextCommands {
	/// Commands offered for a target: topic commands for topics, association
	/// commands for edges and association proxies.
	pub fn for_target(&self, target: Target) -> &[ContextCommand] {
		match target {
			Target::Topic(_) => &self.topic,
			Target::Assoc(_) => &self.assoc,
		}
	}
}

/// Selection half a target dispatches against.
pub fn selection_kind(target: Target) -> SelectionKind {
	match target {
		Target::Topic(_) => SelectionKind::Topics,
		Target::Assoc(_) => SelectionKind::Assocs,
	}
}

/// A context menu open on an element.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextMenu {
	pub target: Target,
	/// Canvas pixel position the menu opened at.
	pub at: Position,
	pub labels: Vec<String>,
}

impl ContextMenu {
	pub fn open(commands: &ContextCommands, target: Target, at: Position) -> Self {
		Self {
			target,
			at,
			labels: commands
				.for_target(target)
				.iter()
				.map(|cmd| cmd.label.clone())
				.collect(),
		}
	}
}

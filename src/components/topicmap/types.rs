//! Topicmap data structures: the input model and the resolved element identities.

use serde::{Deserialize, Serialize};

/// A point in model space (or screen space, depending on context).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// A topic as placed on the topicmap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTopic {
	/// Element id of the node. For ordinary topics this is the topic id.
	pub id: i64,
	pub label: String,
	/// Icon code point, looked up in the icon font.
	pub icon: String,
	/// Stored position. Topics without one are placed by the auto layout.
	#[serde(default)]
	pub pos: Option<Position>,
	/// Set when this node stands in for an association.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub assoc_id: Option<i64>,
}

/// An association drawn as an edge between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewAssoc {
	pub id: i64,
	#[serde(default)]
	pub label: Option<String>,
	/// Element id of the first player node.
	pub topic_id1: i64,
	/// Element id of the second player node.
	pub topic_id2: i64,
}

/// Complete topicmap: topics (including association proxies) and associations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicmapData {
	#[serde(default)]
	pub topics: Vec<ViewTopic>,
	#[serde(default)]
	pub assocs: Vec<ViewAssoc>,
}

/// What a node stands for.
///
/// A proxy node represents an association; its element id is not the
/// association id, so domain code must go through [`NodeKind::target`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Topic(i64),
	AssocProxy(i64),
}

impl NodeKind {
	/// Classifies a topic by its proxy tag.
	pub fn of(topic: &ViewTopic) -> Self {
		match topic.assoc_id {
			Some(assoc_id) => NodeKind::AssocProxy(assoc_id),
			None => NodeKind::Topic(topic.id),
		}
	}

	/// The domain object this node represents.
	pub fn target(self) -> Target {
		match self {
			NodeKind::Topic(id) => Target::Topic(id),
			NodeKind::AssocProxy(id) => Target::Assoc(id),
		}
	}

	pub fn is_proxy(self) -> bool {
		matches!(self, NodeKind::AssocProxy(_))
	}
}

/// Resolved domain identity of a canvas element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
	Topic(i64),
	Assoc(i64),
}

impl Target {
	pub fn id(self) -> i64 {
		match self {
			Target::Topic(id) | Target::Assoc(id) => id,
		}
	}
}

/// A canvas element addressed by its view identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Element {
	/// A node, by element id.
	Node(i64),
	/// An edge, by association id.
	Edge(i64),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn proxy_tag_becomes_assoc_target() {
		let topic = ViewTopic {
			id: 9001,
			label: "proxy".into(),
			icon: "\u{f10c}".into(),
			pos: None,
			assoc_id: Some(42),
		};
		let kind = NodeKind::of(&topic);
		assert_eq!(kind, NodeKind::AssocProxy(42));
		assert_eq!(kind.target(), Target::Assoc(42));
		assert!(kind.is_proxy());
	}

	#[test]
	fn parses_topicmap_json() {
		let json = r#"{
			"topics": [
				{ "id": 1, "label": "Berlin", "icon": "", "pos": { "x": 10, "y": 20 } },
				{ "id": 7, "label": "", "icon": "", "assocId": 5 }
			],
			"assocs": [ { "id": 5, "topicId1": 1, "topicId2": 3 } ]
		}"#;
		let data: TopicmapData = serde_json::from_str(json).unwrap();
		assert_eq!(data.topics.len(), 2);
		assert_eq!(data.topics[0].pos, Some(Position::new(10.0, 20.0)));
		assert_eq!(NodeKind::of(&data.topics[1]), NodeKind::AssocProxy(5));
		assert_eq!(data.assocs[0].label, None);
	}
}

//! UI components.

pub mod topicmap;

//! Deserialization of declared trees
//!
//! A value is either a string (a file with those contents) or a table:
//!
//! | Key        | Types     | Description
//! |------------|-----------|---------------------------
//! | `type`     | All       | `"file"` or `"dir"`; defaults to `dir` if `children` is given
//! | `contents` | File      | Literal contents (also accepted as `data`)
//! | `skip`     | File      | Leave this file alone when materializing
//! | `children` | Directory | A table of further entries
use std::{collections::BTreeMap, fmt};

use anyhow::{bail, Context as _};
use serde::{
    de::{self, value::MapAccessDeserializer, Error as _, MapAccess, Visitor},
    Deserialize, Deserializer,
};

use crate::{Content, DirNode, FileNode, Kind, Node, Tree};

enum RawNode {
    Text(String),
    Table(RawTable),
}

struct RawNodeVisitor;

impl<'de> Visitor<'de> for RawNodeVisitor {
    type Value = RawNode;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("the contents of a file, or a table describing an entry")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(RawNode::Text(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(RawNode::Text(value))
    }

    // Unknown keys of a table are reported by name
    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        RawTable::deserialize(MapAccessDeserializer::new(map)).map(RawNode::Table)
    }
}

impl<'de> Deserialize<'de> for RawNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawNodeVisitor)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    #[serde(rename = "type")]
    kind: Option<RawKind>,
    #[serde(alias = "data")]
    contents: Option<String>,
    skip: Option<bool>,
    children: Option<BTreeMap<String, RawNode>>,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    File,
    Dir,
}

impl TryFrom<RawNode> for Node {
    type Error = anyhow::Error;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let table = match raw {
            RawNode::Text(text) => return Ok(FileNode::new().with_content(text).into()),
            RawNode::Table(table) => table,
        };
        let kind = match (table.kind, &table.children) {
            (Some(RawKind::File), _) => Kind::File,
            (Some(RawKind::Dir), _) | (None, Some(_)) => Kind::Dir,
            (None, None) => Kind::File,
        };
        match kind {
            Kind::File => {
                if table.children.is_some() {
                    bail!("A file cannot have children");
                }
                Ok(Node::File(FileNode {
                    content: table.contents.map(Content::Literal),
                    skip: table.skip.unwrap_or(false),
                }))
            }
            Kind::Dir => {
                if table.contents.is_some() {
                    bail!("A directory cannot have contents");
                }
                if table.skip == Some(true) {
                    bail!("Only files may be skipped");
                }
                let children = match table.children {
                    None => None,
                    Some(raw_children) => {
                        let mut tree = Tree::new();
                        for (name, raw_child) in raw_children {
                            let child = Node::try_from(raw_child)
                                .with_context(|| format!("In entry \"{name}\""))?;
                            tree.insert(name, child);
                        }
                        Some(tree)
                    }
                };
                Ok(Node::Directory(DirNode { children }))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawNode::deserialize(deserializer)?;
        Node::try_from(raw).map_err(|e| D::Error::custom(format!("{e:#}")))
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = BTreeMap::<String, Node>::deserialize(deserializer)?;
        Ok(Tree { entries })
    }
}

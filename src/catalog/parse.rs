use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

use super::TagNode;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("document is empty")]
    Empty,
    #[error("expected a mapping, sequence or string at the top level, found {0}")]
    UnsupportedRoot(&'static str),
    #[error("mapping keys must be scalars, found {0}")]
    UnsupportedKey(&'static str),
}

/// Parses every YAML document in `content`; the last one wins.
pub(crate) fn parse_documents(content: &str) -> Result<TagNode, DocumentError> {
    let mut root = None;
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document)?;
        root = Some(root_node(value)?);
    }
    root.ok_or(DocumentError::Empty)
}

fn root_node(value: Value) -> Result<TagNode, DocumentError> {
    match value {
        Value::Mapping(_) | Value::Sequence(_) | Value::String(_) => {
            convert(value).map(|node| node.unwrap_or(TagNode::Group(IndexMap::new())))
        }
        Value::Tagged(tagged) => root_node(tagged.value),
        other => Err(DocumentError::UnsupportedRoot(kind_name(&other))),
    }
}

fn convert(value: Value) -> Result<Option<TagNode>, DocumentError> {
    let node = match value {
        Value::Null => return Ok(None),
        Value::Bool(flag) => TagNode::Leaf(flag.to_string()),
        Value::Number(number) => TagNode::Leaf(number.to_string()),
        Value::String(text) => TagNode::Leaf(text),
        Value::Sequence(items) => {
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                if let Some(node) = convert(item)? {
                    nodes.push(node);
                }
            }
            TagNode::Sequence(nodes)
        }
        Value::Mapping(mapping) => {
            let mut children = IndexMap::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = scalar_key(key)?;
                // `key:` with nothing after it inserts the key itself
                let node = convert(value)?.unwrap_or_else(|| TagNode::Leaf(key.clone()));
                children.insert(key, node);
            }
            TagNode::Group(children)
        }
        Value::Tagged(tagged) => return convert(tagged.value),
    };
    Ok(Some(node))
}

fn scalar_key(key: Value) -> Result<String, DocumentError> {
    match key {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Tagged(tagged) => scalar_key(tagged.value),
        other => Err(DocumentError::UnsupportedKey(kind_name(&other))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

//! Feature-set text codec, version 1.
//!
//! A persisted feature set is written as `{name1,name2,...}`: names sorted,
//! separated by `,`, wrapped in braces. Inside a name, `\`, `,`, `{` and `}`
//! are escaped with a backslash. The rule writer and the validator both go
//! through this module, so a name survives the round trip byte for byte.
//!
//! In JSON documents a feature set is a plain array of strings instead.

use crate::error::{ItemsetParseError, Result};
use crate::itemset::Itemset;
use crate::schema::Schema;
use crate::types::FeatureId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CODEC_VERSION: u32 = 1;

const OPEN: char = '{';
const CLOSE: char = '}';
const DELIMITER: char = ',';
const ESCAPE: char = '\\';

/// A non-empty set of feature names, detached from any schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSet(Vec<String>);

impl FeatureSet {
    /// Build from names. Rejects empty sets, empty names and duplicates.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ItemsetParseError::EmptySet.into());
        }
        names.sort();
        if let Some(empty) = names.iter().find(|n| n.is_empty()) {
            return Err(ItemsetParseError::EmptyElement(empty.clone()).into());
        }
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            let input = names.join(",");
            return Err(ItemsetParseError::DuplicateElement {
                name: pair[0].clone(),
                input,
            }
            .into());
        }
        Ok(Self(names))
    }

    pub fn from_itemset(items: &Itemset, schema: &Schema) -> Self {
        let mut names: Vec<String> = items.iter().map(|id| schema.name(id).to_string()).collect();
        names.sort();
        Self(names)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Resolve names against a table schema. Names absent from the schema
    /// are returned separately rather than failing.
    pub fn resolve(&self, schema: &Schema) -> (Vec<FeatureId>, Vec<&str>) {
        let mut found = Vec::with_capacity(self.0.len());
        let mut missing = Vec::new();
        for name in &self.0 {
            match schema.id_of(name) {
                Some(id) => found.push(id),
                None => missing.push(name.as_str()),
            }
        }
        (found, missing)
    }

    /// Encode in the v1 text form.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.0.iter().map(|n| n.len() + 1).sum::<usize>() + 2);
        out.push(OPEN);
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(DELIMITER);
            }
            for c in name.chars() {
                if matches!(c, ESCAPE | DELIMITER | OPEN | CLOSE) {
                    out.push(ESCAPE);
                }
                out.push(c);
            }
        }
        out.push(CLOSE);
        out
    }

    /// Decode the v1 text form. Any malformed input is an error; nothing is
    /// silently dropped.
    pub fn decode(input: &str) -> Result<Self> {
        let inner = input
            .strip_prefix(OPEN)
            .and_then(|s| s.strip_suffix(CLOSE))
            .ok_or_else(|| ItemsetParseError::MissingBraces(input.to_string()))?;
        if inner.is_empty() {
            return Err(ItemsetParseError::EmptySet.into());
        }

        let mut names = Vec::new();
        let mut current = String::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                ESCAPE => match chars.next() {
                    Some(e @ (ESCAPE | DELIMITER | OPEN | CLOSE)) => current.push(e),
                    Some(other) => {
                        return Err(ItemsetParseError::InvalidEscape {
                            found: other,
                            input: input.to_string(),
                        }
                        .into())
                    }
                    None => return Err(ItemsetParseError::DanglingEscape(input.to_string()).into()),
                },
                DELIMITER => {
                    if current.is_empty() {
                        return Err(ItemsetParseError::EmptyElement(input.to_string()).into());
                    }
                    names.push(std::mem::take(&mut current));
                }
                OPEN | CLOSE => {
                    return Err(ItemsetParseError::UnescapedDelimiter {
                        found: c,
                        input: input.to_string(),
                    }
                    .into())
                }
                _ => current.push(c),
            }
        }
        if current.is_empty() {
            return Err(ItemsetParseError::EmptyElement(input.to_string()).into());
        }
        names.push(current);

        names.sort();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(ItemsetParseError::DuplicateElement {
                name: pair[0].clone(),
                input: input.to_string(),
            }
            .into());
        }
        Ok(Self(names))
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for FeatureSet {
    type Err = crate::error::RuleMineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl TryFrom<Vec<String>> for FeatureSet {
    type Error = crate::error::RuleMineError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::from_names(names)
    }
}

impl From<FeatureSet> for Vec<String> {
    fn from(set: FeatureSet) -> Self {
        set.0
    }
}

/// Split one line of a delimited record on `delimiter`, honouring backslash
/// escapes and never splitting inside an encoded feature set's braces.
/// Escapes are kept in the fields so each field can be handed to
/// [`FeatureSet::decode`] unchanged.
pub fn split_escaped(line: &str, delimiter: char) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            ESCAPE => escaped = true,
            OPEN => depth += 1,
            CLOSE => depth = depth.saturating_sub(1),
            _ if c == delimiter && depth == 0 => {
                fields.push(&line[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

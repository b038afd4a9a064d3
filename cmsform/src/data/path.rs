use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a [`NamePath`]: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        PathSegment::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        PathSegment::Key(s)
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        PathSegment::Index(i)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{i}"),
            PathSegment::Key(k) => f.write_str(k),
        }
    }
}

/// Location of a value inside a form value tree, from the model root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamePath(Vec<PathSegment>);

impl NamePath {
    pub fn root() -> Self {
        NamePath(Vec::new())
    }

    /// Parse a dot-separated path; all-digit segments become indices.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Self::root();
        }
        s.split('.')
            .map(|seg| match seg.parse::<usize>() {
                Ok(i) => PathSegment::Index(i),
                Err(_) => PathSegment::Key(seg.to_string()),
            })
            .collect()
    }

    /// This path extended by an object key.
    pub fn key(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Key(key.to_string()));
        next
    }

    /// This path extended by an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Index(index));
        next
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }
}

impl FromIterator<PathSegment> for NamePath {
    fn from_iter<T: IntoIterator<Item = PathSegment>>(iter: T) -> Self {
        NamePath(iter.into_iter().collect())
    }
}

impl From<Vec<PathSegment>> for NamePath {
    fn from(v: Vec<PathSegment>) -> Self {
        NamePath(v)
    }
}

impl fmt::Display for NamePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

/// Build a [`NamePath`] from mixed keys and indices: `path!["b", 2, "c"]`.
#[macro_export]
macro_rules! path {
    ($($seg:expr),* $(,)?) => {
        $crate::data::path::NamePath::from(vec![$($crate::data::path::PathSegment::from($seg)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_agree() {
        let p = NamePath::parse("blocks.2.title");
        assert_eq!(
            p.segments(),
            &[
                PathSegment::Key("blocks".into()),
                PathSegment::Index(2),
                PathSegment::Key("title".into()),
            ]
        );
        assert_eq!(p.to_string(), "blocks.2.title");
        assert!(NamePath::parse("").is_empty());
    }

    #[test]
    fn builders_do_not_mutate_parent() {
        let parent = NamePath::root().key("b");
        let child = parent.index(2).key("c");
        assert_eq!(parent.len(), 1);
        assert_eq!(child, path!["b", 2usize, "c"]);
    }

    #[test]
    fn serializes_as_mixed_array() {
        let p = path!["b", 0usize, "c"];
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"["b",0,"c"]"#);
    }
}

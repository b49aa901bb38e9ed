//! Source locations for operations and diagnostics.

use std::collections::HashMap;

use cranelift_entity::PrimaryMap;
use serde::{Deserialize, Serialize};

use crate::refs::PathRef;

/// Byte range within a source file.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: PathRef,
    pub span: Span,
}

impl Location {
    pub const fn new(path: PathRef, span: Span) -> Self {
        Self { path, span }
    }
}

/// Source file names seen while reading a design, each stored once.
#[derive(Default)]
pub struct PathInterner {
    names: PrimaryMap<PathRef, String>,
    index: HashMap<String, PathRef>,
}

impl PathInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, path: impl Into<String>) -> PathRef {
        let path = path.into();
        match self.index.get(&path) {
            Some(&known) => known,
            None => {
                let r = self.names.push(path.clone());
                self.index.insert(path, r);
                r
            }
        }
    }

    pub fn get(&self, r: PathRef) -> &str {
        &self.names[r]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_interned_once() {
        let mut paths = PathInterner::new();
        let top = paths.intern("Top.fir");
        assert_eq!(paths.intern("Top.fir".to_owned()), top);
        assert_ne!(paths.intern("Leaf.fir"), top);
        assert_eq!(paths.get(top), "Top.fir");
    }
}

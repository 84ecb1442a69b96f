//! Location tracking inside a token stream.

use core::fmt::{self, Write};

/// A single step of a [`JsonPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Inside an array, at the given element index.
    Index(usize),
    /// Inside an object, after reading the given member name (if any yet).
    Member(Option<String>),
}

/// The position of a reader or writer inside a document, rendered as
/// `$.members[2].name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    steps: Vec<PathStep>,
}

impl JsonPath {
    /// An empty path pointing at the document root.
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Entered an array.
    pub fn push_array(&mut self) {
        self.steps.push(PathStep::Index(0));
    }

    /// Entered an object.
    pub fn push_object(&mut self) {
        self.steps.push(PathStep::Member(None));
    }

    /// Left the innermost container.
    pub fn pop(&mut self) {
        self.steps.pop();
    }

    /// Read a member name in the innermost object.
    pub fn set_name(&mut self, name: &str) {
        if let Some(PathStep::Member(slot)) = self.steps.last_mut() {
            *slot = Some(name.to_owned());
        }
    }

    /// Finished a value in the innermost array.
    pub fn advance(&mut self) {
        if let Some(PathStep::Index(index)) = self.steps.last_mut() {
            *index += 1;
        }
    }

    /// The steps from the root inwards.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Nesting depth.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Format the path as a string.
    pub fn format(&self) -> String {
        let mut out = String::from("$");
        for step in &self.steps {
            match step {
                PathStep::Index(index) => {
                    let _ = write!(out, "[{index}]");
                }
                PathStep::Member(name) => {
                    out.push('.');
                    if let Some(name) = name {
                        out.push_str(name);
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

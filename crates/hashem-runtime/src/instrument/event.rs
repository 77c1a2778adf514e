use std::fmt;

use hashem_syntax::{NodeTags, SourceSection};

use crate::error::RuntimeError;
use crate::memory::{CallStack, Frame};
use crate::value::Value;

/// View of one enter or return event. Only valid during the callback.
pub struct ExecutionEvent<'a> {
    pub(crate) tags: NodeTags,
    pub(crate) section: &'a SourceSection,
    pub(crate) root_name: &'a str,
    pub(crate) inputs: &'a [Value],
    pub(crate) return_value: Option<&'a Value>,
    pub(crate) exception: Option<&'a RuntimeError>,
    pub(crate) stack: &'a CallStack,
}

impl<'a> ExecutionEvent<'a> {
    /// Tags of the node itself, independent of the filter that matched it.
    #[must_use]
    pub fn tags(&self) -> NodeTags {
        self.tags
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.tags.contains(NodeTags::ROOT)
    }

    #[must_use]
    pub fn is_statement(&self) -> bool {
        self.tags.contains(NodeTags::STATEMENT)
    }

    #[must_use]
    pub fn is_expression(&self) -> bool {
        self.tags.contains(NodeTags::EXPRESSION)
    }

    #[must_use]
    pub fn section(&self) -> &'a SourceSection {
        self.section
    }

    /// Name of the function the node belongs to.
    #[must_use]
    pub fn root_name(&self) -> &'a str {
        self.root_name
    }

    /// Values of the nearest observed expression children, in evaluation order.
    #[must_use]
    pub fn input_values(&self) -> &'a [Value] {
        self.inputs
    }

    #[must_use]
    pub fn return_value(&self) -> Option<&'a Value> {
        self.return_value
    }

    #[must_use]
    pub fn exception(&self) -> Option<&'a RuntimeError> {
        self.exception
    }

    /// Number of active invocations.
    #[must_use]
    pub fn call_depth(&self) -> u32 {
        self.stack.depth()
    }

    /// Live frames, innermost first.
    pub fn frames(&self) -> impl Iterator<Item = &'a Frame> + 'a {
        self.stack.frames().iter().rev()
    }
}

impl fmt::Debug for ExecutionEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionEvent")
            .field("tags", &self.tags)
            .field("section", self.section)
            .field("root", &self.root_name)
            .field("inputs", &self.inputs)
            .field("return_value", &self.return_value)
            .field("exception", &self.exception)
            .finish()
    }
}

//! Postfix (RPN) output streams.
//!
//! Recognizers append elements; the engine executes them left to right on a
//! value stack. Once appended, an element is never modified, which is what
//! lets the engine undo a declined recognizer attempt by truncating.

use std::fmt;

use crate::{EvalError, FunctionDescriptor};

/// One entry of a postfix stream.
#[derive(Clone, Debug)]
pub enum Element<T> {
    /// A literal value.
    Constant(T),
    /// A value bound by the host. Evaluated exactly like a constant; kept
    /// separate so hosts and tools can tell the two apart.
    Variable(T),
    /// Pop `arity` operands, call `function` with them in push order, push
    /// the result.
    Call {
        function: FunctionDescriptor<T>,
        arity: usize,
    },
}

impl<T> Element<T> {
    /// The pushed value of a constant or variable.
    pub fn value(&self) -> Option<&T> {
        match self {
            Element::Constant(value) | Element::Variable(value) => Some(value),
            Element::Call { .. } => None,
        }
    }

    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, Element::Call { .. })
    }

    /// Net change in stack depth caused by executing this element, given
    /// that enough operands are available.
    pub fn stack_effect(&self) -> isize {
        match self {
            Element::Constant(_) | Element::Variable(_) => 1,
            Element::Call { arity, .. } => 1 - isize::try_from(*arity).unwrap_or(isize::MAX),
        }
    }
}

/// An ordered stream of [`Element`]s.
#[derive(Clone, Debug)]
pub struct PostfixExpression<T> {
    elements: Vec<Element<T>>,
}

impl<T> PostfixExpression<T> {
    pub fn new() -> Self {
        PostfixExpression {
            elements: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PostfixExpression {
            elements: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, element: Element<T>) {
        self.elements.push(element);
    }

    pub fn push_constant(&mut self, value: T) {
        self.push(Element::Constant(value));
    }

    pub fn push_variable(&mut self, value: T) {
        self.push(Element::Variable(value));
    }

    pub fn push_call(&mut self, function: FunctionDescriptor<T>, arity: usize) {
        self.push(Element::Call { function, arity });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element<T>> {
        self.elements.iter()
    }

    #[inline]
    pub fn elements(&self) -> &[Element<T>] {
        &self.elements
    }

    pub fn last(&self) -> Option<&Element<T>> {
        self.elements.last()
    }

    /// Drop every element, keeping the allocation.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Discard elements appended after the stream had `len` elements.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.elements.truncate(len);
    }

    /// Check the stream's shape without calling any function.
    ///
    /// Reports the same errors evaluation would: the first call lacking
    /// operands, or a final depth other than one.
    pub fn verify(&self) -> Result<(), EvalError> {
        let mut depth = 0usize;
        for (position, element) in self.elements.iter().enumerate() {
            match element {
                Element::Constant(_) | Element::Variable(_) => depth += 1,
                Element::Call { arity, .. } => {
                    if depth < *arity {
                        return Err(EvalError::StackUnderflow {
                            position,
                            needed: *arity,
                            available: depth,
                        });
                    }
                    depth = depth - arity + 1;
                }
            }
        }
        if depth == 1 {
            Ok(())
        } else {
            Err(EvalError::InvalidStackSize { size: depth })
        }
    }
}

impl<T> Default for PostfixExpression<T> {
    fn default() -> Self {
        PostfixExpression::new()
    }
}

impl<T> Extend<Element<T>> for PostfixExpression<T> {
    fn extend<I: IntoIterator<Item = Element<T>>>(&mut self, iter: I) {
        self.elements.extend(iter);
    }
}

impl<T> FromIterator<Element<T>> for PostfixExpression<T> {
    fn from_iter<I: IntoIterator<Item = Element<T>>>(iter: I) -> Self {
        PostfixExpression {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a PostfixExpression<T> {
    type Item = &'a Element<T>;
    type IntoIter = std::slice::Iter<'a, Element<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T: fmt::Display> fmt::Display for Element<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Constant(value) => write!(f, "{value}"),
            Element::Variable(value) => write!(f, "${value}"),
            Element::Call { arity, .. } => write!(f, "<fn/{arity}>"),
        }
    }
}

/// Space-separated RPN text, e.g. `3 4 <fn/2>`.
impl<T: fmt::Display> fmt::Display for PostfixExpression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, element) in self.elements.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

//! Function descriptors: a priority plus a host callable.

use std::fmt;
use std::sync::Arc;

/// A host callable taking the popped operands in push order.
///
/// Callables are shared, so copying a descriptor into an output stream does
/// not copy the closure.
pub type Callable<T> = Arc<dyn Fn(&[T]) -> T + Send + Sync>;

/// One overload of a function: its priority and the code to run.
///
/// Priority is an opaque ordering hint for recognizers choosing between
/// overloads; the engine itself never reads it.
pub struct FunctionDescriptor<T> {
    priority: i32,
    callable: Callable<T>,
}

impl<T> FunctionDescriptor<T> {
    pub fn new<F>(priority: i32, callable: F) -> Self
    where
        F: Fn(&[T]) -> T + Send + Sync + 'static,
    {
        FunctionDescriptor {
            priority,
            callable: Arc::new(callable),
        }
    }

    /// Wrap an already shared callable.
    pub fn from_shared(priority: i32, callable: Callable<T>) -> Self {
        FunctionDescriptor { priority, callable }
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    pub fn callable(&self) -> &Callable<T> {
        &self.callable
    }

    /// Invoke the callable. `args[0]` is the deepest operand.
    #[inline]
    pub fn call(&self, args: &[T]) -> T {
        (self.callable)(args)
    }

    /// Whether both descriptors share the same callable instance.
    pub fn same_callable(&self, other: &FunctionDescriptor<T>) -> bool {
        Arc::ptr_eq(&self.callable, &other.callable)
    }
}

impl<T> Clone for FunctionDescriptor<T> {
    fn clone(&self) -> Self {
        FunctionDescriptor {
            priority: self.priority,
            callable: Arc::clone(&self.callable),
        }
    }
}

impl<T> fmt::Debug for FunctionDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("priority", &self.priority)
            .field("callable", &format_args!("<fn@{:p}>", Arc::as_ptr(&self.callable)))
            .finish()
    }
}

use std::fmt::Display;

use error_stack::Context;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KernelError {
    NotFound,
    Conflict,
    Validation,
    DuplicateId,
    NoValidItems,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::NotFound => write!(f, "Entity not found"),
            KernelError::Conflict => write!(f, "Entity is still referenced or locked"),
            KernelError::Validation => write!(f, "Invalid entity"),
            KernelError::DuplicateId => write!(f, "Entity id already exists"),
            KernelError::NoValidItems => write!(f, "No order item could be reserved"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}

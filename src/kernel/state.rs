//! Kernel lifecycle states

use std::fmt;

/// Lifecycle of a fit kernel.
///
/// `Configuring -> Ready -> Fitting -> Done`. Any configuration change, or a
/// new fit after `Done`, returns the kernel to `Configuring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelState {
    /// Equation, ranges and variables may be edited freely
    #[default]
    Configuring,

    /// Data spaces have been rebuilt for a fit
    Ready,

    /// Ranges are being fitted
    Fitting,

    /// A fit finished and its report is available
    Done,
}

impl fmt::Display for KernelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KernelState::Configuring => "Configuring",
            KernelState::Ready => "Ready",
            KernelState::Fitting => "Fitting",
            KernelState::Done => "Done",
        };
        write!(f, "{}", name)
    }
}

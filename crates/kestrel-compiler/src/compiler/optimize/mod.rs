//! IR optimization passes
//!
//! The only pass is the control-flow inliner: sends of the conditional and
//! loop selectors whose arguments are literal blocks become native `if` and
//! `while` constructs, and non-local returns left with no block activation
//! between them and the method become plain returns.

mod inline;

pub use inline::Inliner;

use log::debug;

use crate::compiler::ir::IrMethod;
use crate::error::CompileResult;

/// Conditional selectors. Their block arguments must be literal blocks
/// without parameters.
pub const INLINED_SELECTORS: &[&str] = &[
    "ifTrue:",
    "ifFalse:",
    "ifTrue:ifFalse:",
    "ifFalse:ifTrue:",
    "ifNil:",
    "ifNotNil:",
    "ifNil:ifNotNil:",
    "ifNotNil:ifNil:",
];

/// Loop selectors, inlined only in statement position
pub const LOOP_SELECTORS: &[&str] = &["whileTrue:", "whileFalse:", "whileTrue", "whileFalse"];

pub fn is_conditional_selector(selector: &str) -> bool {
    INLINED_SELECTORS.contains(&selector)
}

pub fn is_loop_selector(selector: &str) -> bool {
    LOOP_SELECTORS.contains(&selector)
}

/// Selectors the analyzer flags as inlining candidates
pub fn is_inlinable_selector(selector: &str) -> bool {
    is_conditional_selector(selector) || is_loop_selector(selector)
}

/// Optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptLevel {
    /// Every send is dispatched
    None,
    #[default]
    Inline,
}

/// Runs the enabled passes over a method
#[derive(Debug, Default)]
pub struct Optimizer {
    level: OptLevel,
}

impl Optimizer {
    pub fn new(level: OptLevel) -> Self {
        Self { level }
    }

    pub fn none() -> Self {
        Self::new(OptLevel::None)
    }

    pub fn level(&self) -> OptLevel {
        self.level
    }

    pub fn optimize(&self, method: &mut IrMethod) -> CompileResult<OptStats> {
        if self.level == OptLevel::None {
            return Ok(OptStats::default());
        }

        let stats = Inliner::new(method).run()?;
        debug!(
            "{}: inlined {} conditionals, {} loops, downgraded {} non-local returns",
            method.selector,
            stats.sends_inlined,
            stats.loops_inlined,
            stats.non_local_returns_downgraded
        );
        Ok(stats)
    }
}

/// Statistics about optimizations performed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptStats {
    pub sends_inlined: usize,
    pub loops_inlined: usize,
    /// Non-local returns turned into local returns
    pub non_local_returns_downgraded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_sets() {
        assert!(is_inlinable_selector("ifTrue:ifFalse:"));
        assert!(is_inlinable_selector("whileFalse"));
        assert!(!is_inlinable_selector("ifEmpty:"));
        assert!(is_conditional_selector("ifNotNil:ifNil:"));
        assert!(!is_conditional_selector("whileTrue:"));
        assert!(is_loop_selector("whileTrue:"));
    }

    #[test]
    fn test_default_level_inlines() {
        assert_eq!(OptLevel::default(), OptLevel::Inline);
        assert_eq!(Optimizer::none().level(), OptLevel::None);
    }
}

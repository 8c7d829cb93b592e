//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `config` - Effective configuration display
//! - `core` - Shared utilities (config loading, snapshot loading, reference date)
//! - `import` - Statement review and import
//! - `reports` - Dashboard view commands (summary, categories, trend, budget, expenses, ...)

pub mod config;
pub mod core;
pub mod import;
pub mod reports;

// Re-export command functions for main.rs
pub use config::*;
pub use core::*;
pub use import::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

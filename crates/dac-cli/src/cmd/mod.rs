pub mod diff;
pub mod export_rule;
pub mod pull;
pub mod push;
pub mod sync;
pub mod validate;

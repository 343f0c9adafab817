//! Row models and DTOs, one module per table.

pub mod audit_log;
pub mod proposal;
pub mod reality_rule;
pub mod reference_image;
pub mod request;
pub mod size_category;
pub mod stage1_cache;
pub mod style_pack;

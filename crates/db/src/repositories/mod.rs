//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod audit_log_repo;
pub mod proposal_repo;
pub mod reality_rule_repo;
pub mod reference_image_repo;
pub mod request_repo;
pub mod size_category_repo;
pub mod stage1_cache_repo;
pub mod style_pack_repo;

pub use audit_log_repo::AuditLogRepo;
pub use proposal_repo::{ProposalRepo, SelectOutcome};
pub use reality_rule_repo::RealityRuleRepo;
pub use reference_image_repo::ReferenceImageRepo;
pub use request_repo::RequestRepo;
pub use size_category_repo::SizeCategoryRepo;
pub use stage1_cache_repo::Stage1CacheRepo;
pub use style_pack_repo::StylePackRepo;

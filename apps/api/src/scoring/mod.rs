//! Score aggregators. Every skill-based scorer goes through `skill_credit`.

pub mod alignment;
pub mod ats;
pub mod explanation;
pub mod jd_fit;
pub mod skill_credit;
pub mod skill_gap;

pub use alignment::AlignmentReport;
pub use ats::AtsReport;
pub use explanation::RoleExplanation;
pub use jd_fit::JdComparison;
pub use skill_gap::SkillGapReport;

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

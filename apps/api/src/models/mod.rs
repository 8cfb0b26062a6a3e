pub mod candidate;
pub mod matching;
pub mod report;

pub use candidate::CandidateProfile;
pub use matching::{MatchBreakdown, MatchOutcome, MatchResult};
pub use report::{JdSource, Report, ReportMeta, StageWarning, Summary, TargetRole, TargetSource};

pub mod error;
pub mod knowledge;
pub mod plan;
pub mod session;

pub use error::PlannerError;
pub use knowledge::{Concept, KnowledgeSource, Relationship, StaticKnowledge};
pub use plan::{Planner, SubTask};
pub use session::{Session, TaskOutcome, submit_all};

pub mod lesson;
pub mod session;

pub use lesson::{DidacticProcess, GenericRecord, LessonPlanRecord};
pub use session::{Ciclo, PhaseMinutes, SessionEdit, SessionRequest};

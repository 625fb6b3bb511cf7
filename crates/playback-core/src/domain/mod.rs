pub mod belt;
pub mod cycle;
pub mod errors;
pub mod ids;
pub mod practice_state;
pub mod round;
pub mod script;

pub use belt::{Belt, BeltMap};
pub use cycle::{AudioRef, Cycle, CycleType, IntroItem, ItemCategory, KnownSide, RoundItem, TargetSide};
pub use errors::{CycleIntegrityError, IdParseError, RoundStructureError, RoundStructureWarning};
pub use ids::{LegoId, SeedId};
pub use practice_state::{LegoPracticeState, UsePhrase};
pub use round::{Round, RoundValidationEntry, ValidationIssue, ValidationReport};
pub use script::Script;

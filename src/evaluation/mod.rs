mod baseline;
mod errors;
mod plan;
mod run;

pub use baseline::BaselineKind;
pub use errors::EvalError;
pub use plan::{
    EvaluationInfo, EvaluationInputs, EvaluationPlan, NOT_USED, SequentialArgs,
    SequentialRequirements, assemble,
};
pub use run::evaluate;

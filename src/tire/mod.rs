//! tire - wheel identification, Magic-Formula force model, slip kinematics and
//! the combined-slip clamp used by the vehicle each tick.

pub mod types;
pub mod magic_formula;
pub mod kinematics;
pub mod grip;

pub use types::*;
pub use magic_formula::{MagicFormula, MagicFormulaCoefficients};

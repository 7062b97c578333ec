use thiserror::Error;

use crate::FixedRole;

/// Validation failures of the action/recipe model.
///
/// All of these are precondition failures: a run never starts on a model that
/// produces one of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
	#[error("recipe references unknown action '{0}'")]
	MissingAction(String),

	#[error("invalid quantity {0}: must be between 1 and {max}", max = crate::MAX_QUANTITY)]
	InvalidQuantity(u32),

	#[error("action '{0}' is defined more than once")]
	DuplicateAction(String),

	#[error("fixed action '{0}' is not bound to a configured action")]
	UnresolvedRole(FixedRole),

	#[error("invalid shortcut '{0}'")]
	InvalidShortcut(String),

	#[error("recipe '{0}' has no actions")]
	EmptyRecipe(String),

	#[error("unknown recipe '{0}'")]
	UnknownRecipe(String),
}

use serde::{Deserialize, Serialize};

use crate::{Library, ModelError};

/// Upper bound on the repetitions of one run.
pub const MAX_QUANTITY: u32 = 100;

/// Ordered sequence of action references, executed `quantity` times in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
	pub name: String,
	pub actions: Vec<String>,
	#[serde(default = "default_quantity")]
	pub quantity: u32,
	#[serde(default)]
	pub use_food: bool,
	#[serde(default)]
	pub use_potion: bool,
	#[serde(default)]
	pub use_hq_ingredients: bool,
}

fn default_quantity() -> u32 {
	1
}

impl Recipe {
	pub fn new(name: impl Into<String>, actions: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			name: name.into(),
			actions: actions.into_iter().map(Into::into).collect(),
			quantity: default_quantity(),
			use_food: false,
			use_potion: false,
			use_hq_ingredients: false,
		}
	}

	pub fn with_quantity(mut self, quantity: u32) -> Self {
		self.quantity = quantity;
		self
	}

	pub fn with_food(mut self, use_food: bool) -> Self {
		self.use_food = use_food;
		self
	}

	pub fn with_potion(mut self, use_potion: bool) -> Self {
		self.use_potion = use_potion;
		self
	}

	pub fn with_hq_ingredients(mut self, use_hq_ingredients: bool) -> Self {
		self.use_hq_ingredients = use_hq_ingredients;
		self
	}

	/// Checks quantity bounds and that every step names an action of `library`.
	pub fn validate(&self, library: &Library) -> Result<(), ModelError> {
		if !(1..=MAX_QUANTITY).contains(&self.quantity) {
			return Err(ModelError::InvalidQuantity(self.quantity));
		}
		if self.actions.is_empty() {
			return Err(ModelError::EmptyRecipe(self.name.clone()));
		}
		if let Some(missing) = self.actions.iter().find(|name| library.action(name).is_none()) {
			return Err(ModelError::MissingAction(missing.clone()));
		}
		Ok(())
	}
}

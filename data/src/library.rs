//! The validated, strongly-typed form of the persisted document.
//!
//! A [`Library`] is built once from a [`Document`] and handed to the engine,
//! which snapshots what it needs into a [`Plan`] when a run starts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Action, FixedRole, ModelError, Recipe};

/// The persisted configuration document, as deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	#[serde(default)]
	pub recipes: Vec<Recipe>,
	#[serde(default)]
	pub actions: Vec<Action>,
	#[serde(default)]
	pub fixed_actions: BTreeMap<FixedRole, String>,
}

impl Document {
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Reject duplicate action names and build the lookup structure.
	pub fn into_library(self) -> Result<Library, ModelError> {
		let mut actions = BTreeMap::new();
		for action in self.actions {
			let name = action.name.clone();
			if actions.insert(name.clone(), action).is_some() {
				return Err(ModelError::DuplicateAction(name));
			}
		}

		Ok(Library {
			actions,
			fixed: self.fixed_actions,
			recipes: self.recipes,
		})
	}
}

/// Action library, fixed-role bindings and saved recipes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Library {
	actions: BTreeMap<String, Action>,
	fixed: BTreeMap<FixedRole, String>,
	recipes: Vec<Recipe>,
}

impl Library {
	pub fn action(&self, name: &str) -> Option<&Action> {
		self.actions.get(name)
	}

	pub fn recipe(&self, name: &str) -> Option<&Recipe> {
		self.recipes.iter().find(|r| r.name == name)
	}

	pub fn recipes(&self) -> &[Recipe] {
		&self.recipes
	}

	pub fn fixed_binding(&self, role: FixedRole) -> Option<&str> {
		self.fixed.get(&role).map(String::as_str)
	}

	/// Resolve a fixed role to the action it is bound to.
	pub fn fixed(&self, role: FixedRole) -> Result<&Action, ModelError> {
		self.fixed_binding(role)
			.and_then(|name| self.action(name))
			.ok_or(ModelError::UnresolvedRole(role))
	}

	/// Every role must resolve before a run may start.
	pub fn validate_fixed(&self) -> Result<(), ModelError> {
		FixedRole::ALL.iter().try_for_each(|role| self.fixed(*role).map(|_| ()))
	}

	pub fn insert_action(&mut self, action: Action) -> Result<(), ModelError> {
		if self.actions.contains_key(&action.name) {
			return Err(ModelError::DuplicateAction(action.name));
		}
		self.actions.insert(action.name.clone(), action);
		Ok(())
	}

	pub fn insert_recipe(&mut self, recipe: Recipe) {
		self.recipes.retain(|r| r.name != recipe.name);
		self.recipes.push(recipe);
	}
}

/// Everything a run needs, copied out of the library when the run starts.
///
/// Later edits to the library do not reach an in-flight run.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
	pub recipe: Recipe,
	pub steps: Vec<Action>,
	fixed: BTreeMap<FixedRole, Action>,
}

impl Plan {
	pub fn prepare(library: &Library, recipe: &Recipe) -> Result<Self, ModelError> {
		recipe.validate(library)?;
		library.validate_fixed()?;

		let steps = recipe
			.actions
			.iter()
			.map(|name| library.action(name).cloned().ok_or_else(|| ModelError::MissingAction(name.clone())))
			.collect::<Result<Vec<_>, _>>()?;
		let fixed = FixedRole::ALL
			.iter()
			.map(|role| library.fixed(*role).map(|action| (*role, action.clone())))
			.collect::<Result<BTreeMap<_, _>, _>>()?;

		Ok(Self {
			recipe: recipe.clone(),
			steps,
			fixed,
		})
	}

	pub fn quantity(&self) -> u32 {
		self.recipe.quantity
	}

	pub fn fixed(&self, role: FixedRole) -> &Action {
		// `prepare` resolved every role.
		&self.fixed[&role]
	}
}

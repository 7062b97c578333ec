use std::fmt;

use serde::{Deserialize, Serialize};

/// System-reserved roles that must each be bound to one configured action before a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedRole {
	#[serde(alias = "confirm_action")]
	Confirm,
	#[serde(alias = "cancel_action")]
	Cancel,
	#[serde(alias = "recipe_book_action")]
	RecipeBook,
	#[serde(alias = "food_action")]
	Food,
	#[serde(alias = "potion_action")]
	Potion,
	#[serde(alias = "up_action")]
	Up,
	#[serde(alias = "down_action")]
	Down,
	#[serde(alias = "left_action")]
	Left,
	#[serde(alias = "right_action")]
	Right,
}

impl FixedRole {
	pub const ALL: [FixedRole; 9] = [
		FixedRole::Confirm,
		FixedRole::Cancel,
		FixedRole::RecipeBook,
		FixedRole::Food,
		FixedRole::Potion,
		FixedRole::Up,
		FixedRole::Down,
		FixedRole::Left,
		FixedRole::Right,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			FixedRole::Confirm => "confirm",
			FixedRole::Cancel => "cancel",
			FixedRole::RecipeBook => "recipe_book",
			FixedRole::Food => "food",
			FixedRole::Potion => "potion",
			FixedRole::Up => "up",
			FixedRole::Down => "down",
			FixedRole::Left => "left",
			FixedRole::Right => "right",
		}
	}
}

impl fmt::Display for FixedRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

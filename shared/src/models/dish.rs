//! Dish Model

use serde::{Deserialize, Serialize};

/// Dish type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DishType {
    Drink,
    Food,
    Snack,
}

/// Dish catalog entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    /// Unit price in integer VND
    pub price: i64,
    pub dish_type: DishType,
}

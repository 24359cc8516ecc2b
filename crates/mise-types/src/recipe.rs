use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit an ingredient quantity is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementUnit {
    G,
    Ml,
    Tsp,
    Tbsp,
    Cup,
    Oz,
    Lb,
    Count,
}

impl MeasurementUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementUnit::G => "g",
            MeasurementUnit::Ml => "ml",
            MeasurementUnit::Tsp => "tsp",
            MeasurementUnit::Tbsp => "tbsp",
            MeasurementUnit::Cup => "cup",
            MeasurementUnit::Oz => "oz",
            MeasurementUnit::Lb => "lb",
            MeasurementUnit::Count => "count",
        }
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: MeasurementUnit,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: MeasurementUnit) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit,
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "count" reads better without the unit: "2 eggs"
        match self.unit {
            MeasurementUnit::Count => write!(f, "{} {}", self.quantity, self.name),
            unit => write!(f, "{} {} {}", self.quantity, unit, self.name),
        }
    }
}

/// Contents of a recipe, shared by suggestions and persisted recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecipeBody {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub servings: u32,
    pub total_time_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl RecipeBody {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = servings;
        self
    }

    pub fn with_total_time(mut self, minutes: u32) -> Self {
        self.total_time_minutes = minutes;
        self
    }
}

/// A recipe persisted in the user's recipe book (result of accepting a suggestion)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecipe {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_recipe_id: Option<String>,
    pub thread_id: String,
    #[serde(default)]
    pub is_favorite: bool,
    pub latest_version_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub recipe: RecipeBody,
}

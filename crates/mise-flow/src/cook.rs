use mise_types::{Ingredient, RecipeBody};

/// Step-by-step cursor used while cooking a saved recipe
#[derive(Debug, Clone)]
pub struct CookMode {
    recipe: RecipeBody,
    index: usize,
    show_ingredients: bool,
}

impl CookMode {
    /// Open at a 1-based step, clamped to the recipe's steps
    pub fn new(recipe: RecipeBody, step: usize) -> Self {
        let last = recipe.steps.len().saturating_sub(1);
        let index = step.saturating_sub(1).min(last);
        Self {
            recipe,
            index,
            show_ingredients: false,
        }
    }

    pub fn recipe(&self) -> &RecipeBody {
        &self.recipe
    }

    pub fn current_step(&self) -> Option<&str> {
        self.recipe.steps.get(self.index).map(String::as_str)
    }

    /// 1-based number of the current step, 0 for a recipe without steps
    pub fn step_number(&self) -> usize {
        if self.recipe.steps.is_empty() {
            0
        } else {
            self.index + 1
        }
    }

    pub fn total_steps(&self) -> usize {
        self.recipe.steps.len()
    }

    pub fn next(&mut self) -> usize {
        if self.index + 1 < self.recipe.steps.len() {
            self.index += 1;
        }
        self.step_number()
    }

    pub fn previous(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.step_number()
    }

    /// Fraction of steps reached, 0.0 for a recipe without steps
    pub fn progress(&self) -> f32 {
        if self.recipe.steps.is_empty() {
            return 0.0;
        }
        (self.index + 1) as f32 / self.recipe.steps.len() as f32
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.recipe.steps.len()
    }

    pub fn toggle_ingredients(&mut self) -> bool {
        self.show_ingredients = !self.show_ingredients;
        self.show_ingredients
    }

    pub fn showing_ingredients(&self) -> bool {
        self.show_ingredients
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.recipe.ingredients
    }
}

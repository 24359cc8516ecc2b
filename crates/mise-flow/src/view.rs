use std::fmt::Write;

use mise_types::{Suggestion, ThreadState};

use crate::error::FlowError;

/// Point-in-time copy of a controller's state for presentation
#[derive(Debug, Clone)]
pub struct ThreadView {
    pub thread: ThreadState,
    pub current_index: usize,
    pub current_suggestion: Option<Suggestion>,
    pub rejecting: bool,
    pub accepting: bool,
    pub error: Option<FlowError>,
    pub accepted_recipe_id: Option<String>,
}

impl ThreadView {
    pub fn total(&self) -> usize {
        self.thread.suggestions.len()
    }

    /// 1-based position for display, 0 when the thread is empty
    pub fn position(&self) -> usize {
        if self.thread.suggestions.is_empty() {
            0
        } else {
            self.current_index + 1
        }
    }

    /// Controls should be disabled while either operation is pending
    pub fn is_busy(&self) -> bool {
        self.rejecting || self.accepting
    }
}

/// Render the suggestion under the cursor as plain text
pub fn render_card(view: &ThreadView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Suggestion for: {}", view.thread.original_prompt);
    if view.thread.current_prompt != view.thread.original_prompt {
        let _ = writeln!(out, "Refined: {}", view.thread.current_prompt);
    }

    match &view.current_suggestion {
        Some(suggestion) => {
            let recipe = suggestion.recipe();
            let _ = writeln!(out, "[{}/{}] {}", view.position(), view.total(), recipe.title);
            if !recipe.description.is_empty() {
                let _ = writeln!(out, "{}", recipe.description);
            }
            let _ = writeln!(
                out,
                "Serves {} | {} min",
                recipe.servings, recipe.total_time_minutes
            );

            if !recipe.ingredients.is_empty() {
                let _ = writeln!(out, "\nIngredients:");
                for ingredient in &recipe.ingredients {
                    let _ = writeln!(out, "  - {}", ingredient);
                }
            }
            if !recipe.steps.is_empty() {
                let _ = writeln!(out, "\nSteps:");
                for (i, step) in recipe.steps.iter().enumerate() {
                    let _ = writeln!(out, "  {}. {}", i + 1, step);
                }
            }
            if !suggestion.response_text.is_empty() {
                let _ = writeln!(out, "\n> {}", suggestion.response_text);
            }
        }
        None => {
            let _ = writeln!(out, "No suggestions yet.");
        }
    }

    if view.rejecting {
        let _ = writeln!(out, "Finding another suggestion...");
    }
    if view.accepting {
        let _ = writeln!(out, "Saving recipe...");
    }
    if let Some(recipe_id) = &view.accepted_recipe_id {
        let _ = writeln!(out, "Saved as recipe {}", recipe_id);
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "Error: {}", error.message());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use mise_client::ClientError;
    use mise_types::{Ingredient, MeasurementUnit, RecipeBody};

    fn view() -> ThreadView {
        let recipe = RecipeBody::new("Pancakes", "Fluffy")
            .with_ingredient(Ingredient::new("flour", 1.5, MeasurementUnit::Cup))
            .with_ingredient(Ingredient::new("eggs", 2.0, MeasurementUnit::Count))
            .with_step("Mix")
            .with_step("Fry")
            .with_servings(4)
            .with_total_time(20);
        let suggestion = Suggestion::new("s1", "t1", recipe, "Sunday treat");
        let thread = ThreadState::new("t1", "breakfast").with_suggestion(suggestion.clone());
        ThreadView {
            thread,
            current_index: 0,
            current_suggestion: Some(suggestion),
            rejecting: false,
            accepting: false,
            error: None,
            accepted_recipe_id: None,
        }
    }

    #[test]
    fn test_card_contains_recipe_details() {
        let card = render_card(&view());

        assert!(card.starts_with("Suggestion for: breakfast\n[1/1] Pancakes"));
        assert!(!card.contains("Refined:"));
        assert!(card.contains("[1/1] Pancakes"));
        assert!(card.contains("Serves 4 | 20 min"));
        assert!(card.contains("  - 1.5 cup flour"));
        assert!(card.contains("  2. Fry"));
        assert!(card.contains("> Sunday treat"));
        assert!(!card.contains("Error"));
    }

    #[test]
    fn test_card_header_keeps_original_prompt() {
        let mut view = view();
        view.thread.current_prompt = "savoury breakfast".to_string();

        let card = render_card(&view);
        assert!(card.starts_with("Suggestion for: breakfast\nRefined: savoury breakfast\n"));
    }

    #[test]
    fn test_card_shows_pending_and_error() {
        let mut view = view();
        view.rejecting = true;
        view.error = Some(FlowError::new(
            Operation::Accept,
            ClientError::Internal("boom".to_string()),
        ));

        let card = render_card(&view);
        assert!(card.contains("Finding another suggestion..."));
        assert!(card.contains("Error:"));
        assert!(view.is_busy());
    }

    #[test]
    fn test_empty_thread_card() {
        let view = ThreadView {
            thread: ThreadState::new("t1", "anything"),
            current_index: 0,
            current_suggestion: None,
            rejecting: false,
            accepting: false,
            error: None,
            accepted_recipe_id: None,
        };

        assert_eq!(view.position(), 0);
        assert!(render_card(&view).contains("No suggestions yet."));
    }
}

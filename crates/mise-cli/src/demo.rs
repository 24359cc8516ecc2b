// Offline catalogue used by `--offline`

use std::sync::Arc;

use async_trait::async_trait;
use mise::{
    ClientError, GeneratedSuggestion, Ingredient, MeasurementUnit as U, MemoryBackend, RecipeBody,
    SuggestionSource,
};

/// Cycles through a small fixed catalogue, skipping titles the thread already saw
pub struct CatalogueSource {
    recipes: Vec<RecipeBody>,
}

impl CatalogueSource {
    pub fn new() -> Self {
        Self {
            recipes: catalogue(),
        }
    }
}

#[async_trait]
impl SuggestionSource for CatalogueSource {
    async fn generate(
        &self,
        prompt: &str,
        previous_titles: &[String],
    ) -> Result<GeneratedSuggestion, ClientError> {
        let recipe = self
            .recipes
            .iter()
            .find(|r| !previous_titles.contains(&r.title))
            .cloned()
            .ok_or(ClientError::EmptyResponse)?;
        tracing::debug!(prompt, title = %recipe.title, "Offline suggestion");
        Ok(GeneratedSuggestion::new(
            recipe,
            format!("Here is an idea for \"{}\".", prompt),
        ))
    }

    async fn answer(
        &self,
        _question: &str,
        recipe: &RecipeBody,
    ) -> Result<String, ClientError> {
        Ok(format!(
            "Offline mode can't answer questions, but {} serves {}.",
            recipe.title, recipe.servings
        ))
    }

    async fn modify(&self, prompt: &str, recipe: &RecipeBody) -> Result<RecipeBody, ClientError> {
        let mut modified = recipe.clone();
        modified.description = format!("{} (adjusted: {})", recipe.description, prompt);
        Ok(modified)
    }
}

pub fn backend() -> Arc<MemoryBackend> {
    Arc::new(MemoryBackend::new(Arc::new(CatalogueSource::new())))
}

fn catalogue() -> Vec<RecipeBody> {
    vec![
        RecipeBody::new("Red Lentil Dal", "Creamy lentils with cumin and tomato")
            .with_ingredient(Ingredient::new("red lentils", 200.0, U::G))
            .with_ingredient(Ingredient::new("chopped tomatoes", 400.0, U::G))
            .with_ingredient(Ingredient::new("cumin seeds", 1.0, U::Tsp))
            .with_step("Rinse the lentils")
            .with_step("Toast the cumin, add tomatoes and lentils")
            .with_step("Simmer for 25 minutes, stirring often")
            .with_servings(2)
            .with_total_time(35),
        RecipeBody::new("Shakshuka", "Eggs poached in spiced pepper sauce")
            .with_ingredient(Ingredient::new("eggs", 4.0, U::Count))
            .with_ingredient(Ingredient::new("peppers", 2.0, U::Count))
            .with_ingredient(Ingredient::new("passata", 500.0, U::Ml))
            .with_step("Soften the peppers")
            .with_step("Add passata and simmer until thick")
            .with_step("Crack in the eggs, cover and cook until set")
            .with_servings(2)
            .with_total_time(30),
        RecipeBody::new("Fried Rice", "Leftover rice with egg and greens")
            .with_ingredient(Ingredient::new("cooked rice", 2.0, U::Cup))
            .with_ingredient(Ingredient::new("soy sauce", 2.0, U::Tbsp))
            .with_ingredient(Ingredient::new("eggs", 2.0, U::Count))
            .with_step("Scramble the eggs and set aside")
            .with_step("Fry the rice until crisp")
            .with_step("Toss everything with soy sauce")
            .with_servings(2)
            .with_total_time(15),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mise::SuggestionBackend;

    #[tokio::test]
    async fn test_catalogue_never_repeats_within_a_thread() {
        let backend = backend();
        let thread = backend.start_thread("dinner").await.unwrap();
        let second = backend.request_next_suggestion(&thread.id, None).await.unwrap();
        let third = backend.request_next_suggestion(&thread.id, None).await.unwrap();

        assert_ne!(thread.suggestions[0].suggestion.title, second.suggestion.title);
        assert_ne!(second.suggestion.title, third.suggestion.title);

        let err = backend.request_next_suggestion(&thread.id, None).await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyResponse));
    }
}

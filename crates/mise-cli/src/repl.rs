// Interactive loops for browsing suggestions and cooking a recipe

use anyhow::Result;
use mise::{render_card, AcceptOutcome, CookMode, RecipeBody, RejectOutcome, SuggestionThread};
use tokio::io::{AsyncBufReadExt, BufReader};

const THREAD_HELP: &str = "n [refined prompt] next | b back | f forward | a accept | q quit";
const COOK_HELP: &str = "n next | p previous | i ingredients | q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadCommand {
    Next(Option<String>),
    Back,
    Forward,
    Accept,
    Quit,
    Help,
}

impl ThreadCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word {
            "n" | "next" => {
                let prompt = (!rest.is_empty()).then(|| rest.to_string());
                ThreadCommand::Next(prompt)
            }
            "b" | "back" => ThreadCommand::Back,
            "f" | "forward" => ThreadCommand::Forward,
            "a" | "accept" => ThreadCommand::Accept,
            "q" | "quit" => ThreadCommand::Quit,
            "h" | "help" | "?" => ThreadCommand::Help,
            _ => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookCommand {
    Next,
    Previous,
    Ingredients,
    Quit,
}

impl CookCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "" | "n" | "next" => Some(CookCommand::Next),
            "p" | "prev" | "previous" => Some(CookCommand::Previous),
            "i" | "ingredients" => Some(CookCommand::Ingredients),
            "q" | "quit" => Some(CookCommand::Quit),
            _ => None,
        }
    }
}

/// Drive a suggestion thread from stdin until the user accepts or quits
pub async fn run_thread(thread: SuggestionThread) -> Result<()> {
    println!("Thread {}\n", thread.thread_id());
    println!("{}", render_card(&thread.snapshot()));
    println!("{}", THREAD_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = ThreadCommand::parse(&line) else {
            println!("Unknown command. {}", THREAD_HELP);
            continue;
        };

        match command {
            ThreadCommand::Next(prompt) => {
                thread.clear_error();
                println!("Finding another suggestion...");
                if let RejectOutcome::Failed(err) = thread.reject(prompt).await {
                    tracing::debug!(error = %err, "Reject failed");
                }
            }
            ThreadCommand::Back => {
                thread.back();
            }
            ThreadCommand::Forward => {
                if !thread.can_go_forward() {
                    println!("No newer suggestion yet, use n to ask for one.");
                }
                thread.forward();
            }
            ThreadCommand::Accept => {
                thread.clear_error();
                match thread
                    .accept_then(|recipe_id| println!("Saved to your recipes as {}", recipe_id))
                    .await
                {
                    AcceptOutcome::Accepted(recipe) => {
                        println!("Cook it with: mise cook {}", recipe.id);
                        return Ok(());
                    }
                    AcceptOutcome::Busy => println!("Already saving..."),
                    AcceptOutcome::Failed(err) => tracing::debug!(error = %err, "Accept failed"),
                }
            }
            ThreadCommand::Quit => return Ok(()),
            ThreadCommand::Help => {
                println!("{}", THREAD_HELP);
                continue;
            }
        }
        println!("{}", render_card(&thread.snapshot()));
    }
    Ok(())
}

/// Print the current cook-mode step
pub fn render_step(cook: &CookMode) -> String {
    let mut out = format!(
        "{} | Step {}/{} ({:.0}%)\n",
        cook.recipe().title,
        cook.step_number(),
        cook.total_steps(),
        cook.progress() * 100.0
    );
    if cook.showing_ingredients() {
        for ingredient in cook.ingredients() {
            out.push_str(&format!("  - {}\n", ingredient));
        }
    }
    match cook.current_step() {
        Some(step) => out.push_str(step),
        None => out.push_str("This recipe has no steps."),
    }
    out
}

/// Full recipe text, as printed after a modification
pub fn render_recipe(recipe: &RecipeBody) -> String {
    let mut out = format!(
        "{}\n{}\nServes {} | {} min\n",
        recipe.title, recipe.description, recipe.servings, recipe.total_time_minutes
    );
    for ingredient in &recipe.ingredients {
        out.push_str(&format!("  - {}\n", ingredient));
    }
    for (i, step) in recipe.steps.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, step));
    }
    out
}

pub async fn run_cook(mut cook: CookMode) -> Result<()> {
    println!("{}", render_step(&cook));
    println!("{}", COOK_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match CookCommand::parse(&line) {
            Some(CookCommand::Next) => {
                if cook.is_last() {
                    println!("That was the last step. Enjoy!");
                    return Ok(());
                }
                cook.next();
            }
            Some(CookCommand::Previous) => {
                cook.previous();
            }
            Some(CookCommand::Ingredients) => {
                cook.toggle_ingredients();
            }
            Some(CookCommand::Quit) => return Ok(()),
            None => {
                println!("Unknown command. {}", COOK_HELP);
                continue;
            }
        }
        println!("{}", render_step(&cook));
    }
    Ok(())
}

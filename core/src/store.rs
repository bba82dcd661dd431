use std::collections::BTreeMap;

use chrono::Utc;

use crate::models::{
    Achievement, Category, CategoryRef, Ingredient, NewAchievement, NewCategory, NewIngredient,
    NewNutritionInfo, NewRecipe, NewSavedRecipe, NewStep, NewUser, NutritionInfo, Recipe,
    RecipeAuthor, RecipeWithDetails, SAVE_MILESTONE_INTERVAL, SAVE_RECIPES_ACHIEVEMENT,
    SavedRecipe, Step, UpdateAchievement, UpdateCategory, UpdateIngredient, UpdateNutritionInfo,
    UpdateRecipe, UpdateStep, User,
};

/// Authoritative in-memory repository for every entity. One ordered map
/// and one monotonic id counter per entity type; ids start at 1 and are
/// never reused, even after deletes.
///
/// The store is the only writer of entity state. It signals absence with
/// `Option`/`bool` and never validates input — callers validate before
/// mutating. All methods are synchronous; callers that share a store
/// across threads wrap it in a mutex.
pub struct Store {
    users: BTreeMap<i64, User>,
    recipes: BTreeMap<i64, Recipe>,
    ingredients: BTreeMap<i64, Ingredient>,
    steps: BTreeMap<i64, Step>,
    categories: BTreeMap<i64, Category>,
    saved_recipes: BTreeMap<i64, SavedRecipe>,
    achievements: BTreeMap<i64, Achievement>,
    nutrition: BTreeMap<i64, NutritionInfo>,

    next_user_id: i64,
    next_recipe_id: i64,
    next_ingredient_id: i64,
    next_step_id: i64,
    next_category_id: i64,
    next_saved_recipe_id: i64,
    next_achievement_id: i64,
    next_nutrition_id: i64,
}

pub const DEFAULT_PAGE_LIMIT: usize = 100;

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Store {
            users: BTreeMap::new(),
            recipes: BTreeMap::new(),
            ingredients: BTreeMap::new(),
            steps: BTreeMap::new(),
            categories: BTreeMap::new(),
            saved_recipes: BTreeMap::new(),
            achievements: BTreeMap::new(),
            nutrition: BTreeMap::new(),
            next_user_id: 1,
            next_recipe_id: 1,
            next_ingredient_id: 1,
            next_step_id: 1,
            next_category_id: 1,
            next_saved_recipe_id: 1,
            next_achievement_id: 1,
            next_nutrition_id: 1,
        }
    }

    // --- Users ---

    #[must_use]
    pub fn get_user(&self, id: i64) -> Option<&User> {
        self.users.get(&id)
    }

    #[must_use]
    pub fn get_user_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|user| user.username == username)
    }

    pub fn create_user(&mut self, new: NewUser) -> User {
        let id = self.next_user_id;
        self.next_user_id += 1;
        let user = User {
            id,
            username: new.username,
            password: new.password,
            email: new.email,
            avatar_url: new.avatar_url,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        user
    }

    // --- Recipes ---

    /// Recipes ordered newest-id-first, windowed by `offset`/`limit`.
    /// No total count accompanies the page; a short page is the only
    /// signal that the listing is exhausted.
    #[must_use]
    pub fn list_recipes(&self, limit: usize, offset: usize) -> Vec<Recipe> {
        self.recipes
            .values()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get_recipe(&self, id: i64) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    /// Joins a recipe with its ingredients, steps, nutrition row, author
    /// block, and category references. Dangling category ids resolve to
    /// an "Uncategorized" placeholder; a missing or dangling author
    /// resolves to "Unknown".
    #[must_use]
    pub fn get_recipe_with_details(&self, id: i64) -> Option<RecipeWithDetails> {
        let recipe = self.recipes.get(&id)?.clone();

        let user = recipe
            .user_id
            .and_then(|user_id| self.users.get(&user_id))
            .map_or(
                RecipeAuthor {
                    username: "Unknown".to_string(),
                    avatar_url: None,
                },
                |user| RecipeAuthor {
                    username: user.username.clone(),
                    avatar_url: user.avatar_url.clone(),
                },
            );

        let categories = recipe
            .category_ids
            .iter()
            .map(|category_id| {
                self.categories.get(category_id).map_or(
                    CategoryRef {
                        id: 0,
                        name: "Uncategorized".to_string(),
                    },
                    |category| CategoryRef {
                        id: category.id,
                        name: category.name.clone(),
                    },
                )
            })
            .collect();

        Some(RecipeWithDetails {
            ingredients: self.list_ingredients_by_recipe(id),
            steps: self.list_steps_by_recipe(id),
            nutrition_info: self.get_nutrition_by_recipe(id).cloned(),
            user,
            categories,
            recipe,
        })
    }

    #[must_use]
    pub fn list_recipes_by_category(
        &self,
        category_id: i64,
        limit: usize,
        offset: usize,
    ) -> Vec<Recipe> {
        self.recipes
            .values()
            .rev()
            .filter(|recipe| recipe.category_ids.contains(&category_id))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring match on title or description,
    /// newest-id-first. All matches are returned; there is no relevance
    /// scoring and no window.
    #[must_use]
    pub fn search_recipes(&self, query: &str) -> Vec<Recipe> {
        let needle = query.to_lowercase();
        self.recipes
            .values()
            .rev()
            .filter(|recipe| {
                recipe.title.to_lowercase().contains(&needle)
                    || recipe.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Stores the recipe and bumps `recipe_count` on every referenced
    /// category that exists. Unknown category ids are kept on the recipe
    /// but count nowhere.
    pub fn create_recipe(&mut self, new: NewRecipe) -> Recipe {
        let id = self.next_recipe_id;
        self.next_recipe_id += 1;
        let recipe = Recipe {
            id,
            title: new.title,
            description: new.description,
            image_url: new.image_url,
            prep_time: new.prep_time,
            cook_time: new.cook_time,
            servings: new.servings,
            calories: new.calories,
            difficulty: new.difficulty,
            created_at: Utc::now(),
            user_id: new.user_id,
            category_ids: new.category_ids,
            rating: 0,
            rating_count: 0,
        };

        for category_id in &recipe.category_ids {
            if let Some(category) = self.categories.get_mut(category_id) {
                category.recipe_count += 1;
            }
        }

        self.recipes.insert(id, recipe.clone());
        recipe
    }

    /// Merges the provided fields over the stored recipe. Category
    /// counters are NOT re-derived when `category_ids` changes, so they
    /// drift from the true membership counts.
    pub fn update_recipe(&mut self, id: i64, update: UpdateRecipe) -> Option<Recipe> {
        let recipe = self.recipes.get_mut(&id)?;
        if let Some(title) = update.title {
            recipe.title = title;
        }
        if let Some(description) = update.description {
            recipe.description = description;
        }
        if let Some(image_url) = update.image_url {
            recipe.image_url = image_url;
        }
        if let Some(prep_time) = update.prep_time {
            recipe.prep_time = prep_time;
        }
        if let Some(cook_time) = update.cook_time {
            recipe.cook_time = cook_time;
        }
        if let Some(servings) = update.servings {
            recipe.servings = servings;
        }
        if let Some(calories) = update.calories {
            recipe.calories = calories;
        }
        if let Some(difficulty) = update.difficulty {
            recipe.difficulty = difficulty;
        }
        if let Some(user_id) = update.user_id {
            recipe.user_id = user_id;
        }
        if let Some(category_ids) = update.category_ids {
            recipe.category_ids = category_ids;
        }
        Some(recipe.clone())
    }

    /// Removes the recipe only. Ingredients, steps, and nutrition rows
    /// referencing it are left in place, and category counters are not
    /// decremented.
    pub fn delete_recipe(&mut self, id: i64) -> bool {
        self.recipes.remove(&id).is_some()
    }

    // --- Ingredients ---

    #[must_use]
    pub fn list_ingredients_by_recipe(&self, recipe_id: i64) -> Vec<Ingredient> {
        self.ingredients
            .values()
            .filter(|ingredient| ingredient.recipe_id == recipe_id)
            .cloned()
            .collect()
    }

    pub fn create_ingredient(&mut self, new: NewIngredient) -> Ingredient {
        let id = self.next_ingredient_id;
        self.next_ingredient_id += 1;
        let ingredient = Ingredient {
            id,
            recipe_id: new.recipe_id,
            name: new.name,
            quantity: new.quantity,
            unit: new.unit,
        };
        self.ingredients.insert(id, ingredient.clone());
        ingredient
    }

    pub fn update_ingredient(&mut self, id: i64, update: UpdateIngredient) -> Option<Ingredient> {
        let ingredient = self.ingredients.get_mut(&id)?;
        if let Some(recipe_id) = update.recipe_id {
            ingredient.recipe_id = recipe_id;
        }
        if let Some(name) = update.name {
            ingredient.name = name;
        }
        if let Some(quantity) = update.quantity {
            ingredient.quantity = quantity;
        }
        if let Some(unit) = update.unit {
            ingredient.unit = unit;
        }
        Some(ingredient.clone())
    }

    pub fn delete_ingredient(&mut self, id: i64) -> bool {
        self.ingredients.remove(&id).is_some()
    }

    // --- Steps ---

    /// Steps ascending by `step_number`. Duplicate step numbers within a
    /// recipe are not prevented; ties keep insertion order.
    #[must_use]
    pub fn list_steps_by_recipe(&self, recipe_id: i64) -> Vec<Step> {
        let mut steps: Vec<Step> = self
            .steps
            .values()
            .filter(|step| step.recipe_id == recipe_id)
            .cloned()
            .collect();
        steps.sort_by_key(|step| step.step_number);
        steps
    }

    pub fn create_step(&mut self, new: NewStep) -> Step {
        let id = self.next_step_id;
        self.next_step_id += 1;
        let step = Step {
            id,
            recipe_id: new.recipe_id,
            step_number: new.step_number,
            instruction: new.instruction,
            timer_minutes: new.timer_minutes,
        };
        self.steps.insert(id, step.clone());
        step
    }

    pub fn update_step(&mut self, id: i64, update: UpdateStep) -> Option<Step> {
        let step = self.steps.get_mut(&id)?;
        if let Some(recipe_id) = update.recipe_id {
            step.recipe_id = recipe_id;
        }
        if let Some(step_number) = update.step_number {
            step.step_number = step_number;
        }
        if let Some(instruction) = update.instruction {
            step.instruction = instruction;
        }
        if let Some(timer_minutes) = update.timer_minutes {
            step.timer_minutes = timer_minutes;
        }
        Some(step.clone())
    }

    pub fn delete_step(&mut self, id: i64) -> bool {
        self.steps.remove(&id).is_some()
    }

    // --- Categories ---

    #[must_use]
    pub fn list_categories(&self) -> Vec<Category> {
        self.categories.values().cloned().collect()
    }

    #[must_use]
    pub fn get_category(&self, id: i64) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn create_category(&mut self, new: NewCategory) -> Category {
        let id = self.next_category_id;
        self.next_category_id += 1;
        let category = Category {
            id,
            name: new.name,
            image_url: new.image_url,
            recipe_count: 0,
        };
        self.categories.insert(id, category.clone());
        category
    }

    pub fn update_category(&mut self, id: i64, update: UpdateCategory) -> Option<Category> {
        let category = self.categories.get_mut(&id)?;
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(image_url) = update.image_url {
            category.image_url = image_url;
        }
        Some(category.clone())
    }

    /// Recipes referencing the deleted category keep the dangling id;
    /// detail views render it as "Uncategorized".
    pub fn delete_category(&mut self, id: i64) -> bool {
        self.categories.remove(&id).is_some()
    }

    // --- Saved recipes ---

    #[must_use]
    pub fn list_saved_recipes_by_user(&self, user_id: i64) -> Vec<SavedRecipe> {
        self.saved_recipes
            .values()
            .rev()
            .filter(|saved| saved.user_id == user_id)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get_saved_recipe_count(&self, user_id: i64) -> i64 {
        self.saved_recipes
            .values()
            .filter(|saved| saved.user_id == user_id)
            .count() as i64
    }

    /// Saves without any uniqueness check, so the same (user, recipe)
    /// pair can be saved repeatedly. Whenever the user's new total is a
    /// multiple of the milestone interval, a `SAVE_RECIPES` achievement
    /// is minted inline with `count` set to that total.
    pub fn create_saved_recipe(&mut self, new: NewSavedRecipe) -> SavedRecipe {
        let id = self.next_saved_recipe_id;
        self.next_saved_recipe_id += 1;
        let saved = SavedRecipe {
            id,
            user_id: new.user_id,
            recipe_id: new.recipe_id,
            saved_at: Utc::now(),
        };
        self.saved_recipes.insert(id, saved.clone());

        let total = self.get_saved_recipe_count(new.user_id);
        if total > 0 && total % SAVE_MILESTONE_INTERVAL == 0 {
            self.create_achievement(NewAchievement {
                user_id: new.user_id,
                kind: SAVE_RECIPES_ACHIEVEMENT.to_string(),
                count: total,
            });
        }

        saved
    }

    /// Deletes the first (oldest) save matching the pair.
    pub fn delete_saved_recipe(&mut self, user_id: i64, recipe_id: i64) -> bool {
        let found = self
            .saved_recipes
            .values()
            .find(|saved| saved.user_id == user_id && saved.recipe_id == recipe_id)
            .map(|saved| saved.id);
        match found {
            Some(id) => self.saved_recipes.remove(&id).is_some(),
            None => false,
        }
    }

    // --- Achievements ---

    #[must_use]
    pub fn list_achievements_by_user(&self, user_id: i64) -> Vec<Achievement> {
        self.achievements
            .values()
            .rev()
            .filter(|achievement| achievement.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn create_achievement(&mut self, new: NewAchievement) -> Achievement {
        let id = self.next_achievement_id;
        self.next_achievement_id += 1;
        let achievement = Achievement {
            id,
            user_id: new.user_id,
            kind: new.kind,
            count: new.count,
            achieved_at: Utc::now(),
        };
        self.achievements.insert(id, achievement.clone());
        achievement
    }

    pub fn update_achievement(
        &mut self,
        id: i64,
        update: UpdateAchievement,
    ) -> Option<Achievement> {
        let achievement = self.achievements.get_mut(&id)?;
        if let Some(user_id) = update.user_id {
            achievement.user_id = user_id;
        }
        if let Some(kind) = update.kind {
            achievement.kind = kind;
        }
        if let Some(count) = update.count {
            achievement.count = count;
        }
        Some(achievement.clone())
    }

    // --- Nutrition ---

    /// First row referencing the recipe; uniqueness is not enforced at
    /// write time.
    #[must_use]
    pub fn get_nutrition_by_recipe(&self, recipe_id: i64) -> Option<&NutritionInfo> {
        self.nutrition
            .values()
            .find(|nutrition| nutrition.recipe_id == recipe_id)
    }

    pub fn create_nutrition_info(&mut self, new: NewNutritionInfo) -> NutritionInfo {
        let id = self.next_nutrition_id;
        self.next_nutrition_id += 1;
        let nutrition = NutritionInfo {
            id,
            recipe_id: new.recipe_id,
            protein: new.protein,
            carbs: new.carbs,
            fats: new.fats,
            fiber: new.fiber,
        };
        self.nutrition.insert(id, nutrition.clone());
        nutrition
    }

    pub fn update_nutrition_info(
        &mut self,
        id: i64,
        update: UpdateNutritionInfo,
    ) -> Option<NutritionInfo> {
        let nutrition = self.nutrition.get_mut(&id)?;
        if let Some(recipe_id) = update.recipe_id {
            nutrition.recipe_id = recipe_id;
        }
        if let Some(protein) = update.protein {
            nutrition.protein = protein;
        }
        if let Some(carbs) = update.carbs {
            nutrition.carbs = carbs;
        }
        if let Some(fats) = update.fats {
            nutrition.fats = fats;
        }
        if let Some(fiber) = update.fiber {
            nutrition.fiber = fiber;
        }
        Some(nutrition.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> NewUser {
        NewUser {
            username: "demouser".to_string(),
            password: "password123".to_string(),
            email: "demo@example.com".to_string(),
            avatar_url: Some("https://example.com/avatar.jpg".to_string()),
        }
    }

    fn sample_recipe(category_ids: Vec<i64>) -> NewRecipe {
        NewRecipe {
            title: "Vegetable Stir Fry".to_string(),
            description: "A quick and colorful vegetable stir fry.".to_string(),
            image_url: "https://example.com/stirfry.jpg".to_string(),
            prep_time: 15,
            cook_time: 10,
            servings: 4,
            calories: Some(220),
            difficulty: "Easy".to_string(),
            user_id: None,
            category_ids,
        }
    }

    fn sample_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            image_url: format!("https://example.com/{}.jpg", name.to_lowercase()),
        }
    }

    #[test]
    fn create_then_get_user_round_trips() {
        let mut store = Store::new();
        let user = store.create_user(sample_user());
        assert_eq!(user.id, 1);

        let fetched = store.get_user(user.id).unwrap();
        assert_eq!(fetched.username, "demouser");
        assert_eq!(fetched.email, "demo@example.com");
        assert_eq!(fetched.created_at, user.created_at);
    }

    #[test]
    fn get_user_by_username_finds_exact_match() {
        let mut store = Store::new();
        store.create_user(sample_user());
        assert!(store.get_user_by_username("demouser").is_some());
        assert!(store.get_user_by_username("Demouser").is_none());
        assert!(store.get_user_by_username("nobody").is_none());
    }

    #[test]
    fn create_then_get_recipe_round_trips() {
        let mut store = Store::new();
        let recipe = store.create_recipe(sample_recipe(vec![]));
        assert_eq!(recipe.id, 1);
        assert_eq!(recipe.rating, 0);
        assert_eq!(recipe.rating_count, 0);

        let fetched = store.get_recipe(recipe.id).unwrap();
        assert_eq!(fetched.title, recipe.title);
        assert_eq!(fetched.created_at, recipe.created_at);
    }

    #[test]
    fn list_recipes_descends_by_id_and_windows() {
        let mut store = Store::new();
        for _ in 0..3 {
            store.create_recipe(sample_recipe(vec![]));
        }

        let ids: Vec<i64> = store.list_recipes(2, 0).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2]);

        let ids: Vec<i64> = store.list_recipes(2, 1).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let ids: Vec<i64> = store.list_recipes(10, 3).iter().map(|r| r.id).collect();
        assert!(ids.is_empty());
    }

    #[test]
    fn recipe_ids_are_not_reused_after_delete() {
        let mut store = Store::new();
        let first = store.create_recipe(sample_recipe(vec![]));
        assert!(store.delete_recipe(first.id));
        let second = store.create_recipe(sample_recipe(vec![]));
        assert_eq!(second.id, first.id + 1);
    }

    #[test]
    fn delete_recipe_semantics() {
        let mut store = Store::new();
        let recipe = store.create_recipe(sample_recipe(vec![]));
        assert!(store.delete_recipe(recipe.id));
        assert!(store.get_recipe(recipe.id).is_none());
        assert!(!store.delete_recipe(recipe.id));
        assert!(!store.delete_recipe(999));
    }

    #[test]
    fn create_recipe_increments_referenced_category_counts() {
        let mut store = Store::new();
        let a = store.create_category(sample_category("Healthy"));
        let b = store.create_category(sample_category("Desserts"));
        let untouched = store.create_category(sample_category("Italian"));

        store.create_recipe(sample_recipe(vec![a.id, b.id]));

        assert_eq!(store.get_category(a.id).unwrap().recipe_count, 1);
        assert_eq!(store.get_category(b.id).unwrap().recipe_count, 1);
        assert_eq!(store.get_category(untouched.id).unwrap().recipe_count, 0);
    }

    #[test]
    fn create_recipe_ignores_unknown_category_ids() {
        let mut store = Store::new();
        let recipe = store.create_recipe(sample_recipe(vec![42]));
        // The dangling id stays on the recipe; no category is touched.
        assert_eq!(recipe.category_ids, vec![42]);
    }

    #[test]
    fn update_recipe_does_not_adjust_category_counts() {
        let mut store = Store::new();
        let a = store.create_category(sample_category("Healthy"));
        let b = store.create_category(sample_category("Desserts"));
        let recipe = store.create_recipe(sample_recipe(vec![a.id]));

        store
            .update_recipe(
                recipe.id,
                UpdateRecipe {
                    category_ids: Some(vec![b.id]),
                    ..UpdateRecipe::default()
                },
            )
            .unwrap();

        // Counters keep their create-time values: a stays 1, b stays 0.
        assert_eq!(store.get_category(a.id).unwrap().recipe_count, 1);
        assert_eq!(store.get_category(b.id).unwrap().recipe_count, 0);
    }

    #[test]
    fn delete_recipe_does_not_decrement_category_counts() {
        let mut store = Store::new();
        let category = store.create_category(sample_category("Healthy"));
        let recipe = store.create_recipe(sample_recipe(vec![category.id]));
        store.delete_recipe(recipe.id);
        assert_eq!(store.get_category(category.id).unwrap().recipe_count, 1);
    }

    #[test]
    fn update_recipe_merges_partial_fields() {
        let mut store = Store::new();
        let recipe = store.create_recipe(sample_recipe(vec![]));

        let updated = store
            .update_recipe(
                recipe.id,
                UpdateRecipe {
                    title: Some("Weeknight Stir Fry".to_string()),
                    calories: Some(None),
                    ..UpdateRecipe::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Weeknight Stir Fry");
        assert_eq!(updated.calories, None);
        // Untouched fields survive the merge.
        assert_eq!(updated.servings, 4);
        assert_eq!(updated.difficulty, "Easy");
    }

    #[test]
    fn update_missing_recipe_returns_none() {
        let mut store = Store::new();
        assert!(store.update_recipe(7, UpdateRecipe::default()).is_none());
    }

    #[test]
    fn search_is_case_insensitive_across_title_and_description() {
        let mut store = Store::new();
        let mut pasta = sample_recipe(vec![]);
        pasta.title = "Spaghetti Pasta Bake".to_string();
        store.create_recipe(pasta);
        let mut salad = sample_recipe(vec![]);
        salad.title = "Green Salad".to_string();
        salad.description = "Crisp lettuce with a pasta-free dressing.".to_string();
        store.create_recipe(salad);
        store.create_recipe(sample_recipe(vec![]));

        let results = store.search_recipes("PASTA");
        let ids: Vec<i64> = results.iter().map(|r| r.id).collect();
        // Both matches, newest first, the stir fry excluded.
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn list_recipes_by_category_filters_and_windows() {
        let mut store = Store::new();
        let category = store.create_category(sample_category("Healthy"));
        store.create_recipe(sample_recipe(vec![category.id]));
        store.create_recipe(sample_recipe(vec![]));
        store.create_recipe(sample_recipe(vec![category.id]));

        let ids: Vec<i64> = store
            .list_recipes_by_category(category.id, 100, 0)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![3, 1]);

        let ids: Vec<i64> = store
            .list_recipes_by_category(category.id, 1, 1)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn recipe_details_compose_children_author_and_categories() {
        let mut store = Store::new();
        let user = store.create_user(sample_user());
        let category = store.create_category(sample_category("Healthy"));
        let mut new = sample_recipe(vec![category.id, 42]);
        new.user_id = Some(user.id);
        let recipe = store.create_recipe(new);

        store.create_ingredient(NewIngredient {
            recipe_id: recipe.id,
            name: "broccoli".to_string(),
            quantity: "1/2".to_string(),
            unit: Some("head".to_string()),
        });
        store.create_step(NewStep {
            recipe_id: recipe.id,
            step_number: 2,
            instruction: "Stir fry the vegetables.".to_string(),
            timer_minutes: Some(5),
        });
        store.create_step(NewStep {
            recipe_id: recipe.id,
            step_number: 1,
            instruction: "Chop the vegetables.".to_string(),
            timer_minutes: None,
        });
        store.create_nutrition_info(NewNutritionInfo {
            recipe_id: recipe.id,
            protein: Some(12),
            carbs: Some(30),
            fats: Some(5),
            fiber: Some(6),
        });

        let details = store.get_recipe_with_details(recipe.id).unwrap();
        assert_eq!(details.ingredients.len(), 1);
        assert_eq!(details.steps.len(), 2);
        // Steps come back ordered by step number, not insertion order.
        assert_eq!(details.steps[0].step_number, 1);
        assert_eq!(details.steps[1].step_number, 2);
        assert!(details.nutrition_info.is_some());
        assert_eq!(details.user.username, "demouser");
        assert_eq!(details.categories.len(), 2);
        assert_eq!(details.categories[0].name, "Healthy");
        assert_eq!(details.categories[1].id, 0);
        assert_eq!(details.categories[1].name, "Uncategorized");
    }

    #[test]
    fn recipe_details_placeholder_author_when_unowned() {
        let mut store = Store::new();
        let recipe = store.create_recipe(sample_recipe(vec![]));
        let details = store.get_recipe_with_details(recipe.id).unwrap();
        assert_eq!(details.user.username, "Unknown");
        assert_eq!(details.user.avatar_url, None);
    }

    #[test]
    fn recipe_details_missing_recipe_is_none() {
        let store = Store::new();
        assert!(store.get_recipe_with_details(1).is_none());
    }

    #[test]
    fn ingredients_survive_recipe_delete_as_orphans() {
        let mut store = Store::new();
        let recipe = store.create_recipe(sample_recipe(vec![]));
        store.create_ingredient(NewIngredient {
            recipe_id: recipe.id,
            name: "soy sauce".to_string(),
            quantity: "3".to_string(),
            unit: Some("tbsp".to_string()),
        });

        store.delete_recipe(recipe.id);
        // No cascade: the row remains addressable by recipe id.
        assert_eq!(store.list_ingredients_by_recipe(recipe.id).len(), 1);
    }

    #[test]
    fn save_milestones_mint_achievements_at_multiples_of_five() {
        let mut store = Store::new();
        let user = store.create_user(sample_user());

        for n in 1..=4 {
            store.create_saved_recipe(NewSavedRecipe {
                user_id: user.id,
                recipe_id: n,
            });
            assert!(store.list_achievements_by_user(user.id).is_empty());
        }

        store.create_saved_recipe(NewSavedRecipe {
            user_id: user.id,
            recipe_id: 5,
        });
        let achievements = store.list_achievements_by_user(user.id);
        assert_eq!(achievements.len(), 1);
        assert_eq!(achievements[0].kind, SAVE_RECIPES_ACHIEVEMENT);
        assert_eq!(achievements[0].count, 5);

        for n in 6..=9 {
            store.create_saved_recipe(NewSavedRecipe {
                user_id: user.id,
                recipe_id: n,
            });
            assert_eq!(store.list_achievements_by_user(user.id).len(), 1);
        }

        store.create_saved_recipe(NewSavedRecipe {
            user_id: user.id,
            recipe_id: 10,
        });
        let achievements = store.list_achievements_by_user(user.id);
        assert_eq!(achievements.len(), 2);
        // Newest first: the count-10 milestone leads.
        assert_eq!(achievements[0].count, 10);
    }

    #[test]
    fn save_milestones_are_per_user() {
        let mut store = Store::new();
        let alice = store.create_user(sample_user());
        let bob = store.create_user(NewUser {
            username: "bob".to_string(),
            password: "pw".to_string(),
            email: "bob@example.com".to_string(),
            avatar_url: None,
        });

        for n in 1..=4 {
            store.create_saved_recipe(NewSavedRecipe {
                user_id: alice.id,
                recipe_id: n,
            });
            store.create_saved_recipe(NewSavedRecipe {
                user_id: bob.id,
                recipe_id: n,
            });
        }
        store.create_saved_recipe(NewSavedRecipe {
            user_id: alice.id,
            recipe_id: 5,
        });

        assert_eq!(store.list_achievements_by_user(alice.id).len(), 1);
        assert!(store.list_achievements_by_user(bob.id).is_empty());
    }

    #[test]
    fn duplicate_saves_are_allowed_and_counted() {
        let mut store = Store::new();
        let user = store.create_user(sample_user());
        store.create_saved_recipe(NewSavedRecipe {
            user_id: user.id,
            recipe_id: 1,
        });
        store.create_saved_recipe(NewSavedRecipe {
            user_id: user.id,
            recipe_id: 1,
        });
        assert_eq!(store.get_saved_recipe_count(user.id), 2);
    }

    #[test]
    fn delete_saved_recipe_removes_first_match_only() {
        let mut store = Store::new();
        let user = store.create_user(sample_user());
        store.create_saved_recipe(NewSavedRecipe {
            user_id: user.id,
            recipe_id: 7,
        });
        store.create_saved_recipe(NewSavedRecipe {
            user_id: user.id,
            recipe_id: 7,
        });

        assert!(store.delete_saved_recipe(user.id, 7));
        assert_eq!(store.get_saved_recipe_count(user.id), 1);
        assert!(store.delete_saved_recipe(user.id, 7));
        assert!(!store.delete_saved_recipe(user.id, 7));
    }

    #[test]
    fn update_achievement_merges_fields() {
        let mut store = Store::new();
        let achievement = store.create_achievement(NewAchievement {
            user_id: 1,
            kind: "COOK_RECIPES".to_string(),
            count: 1,
        });

        let updated = store
            .update_achievement(
                achievement.id,
                UpdateAchievement {
                    count: Some(3),
                    ..UpdateAchievement::default()
                },
            )
            .unwrap();
        assert_eq!(updated.count, 3);
        assert_eq!(updated.kind, "COOK_RECIPES");

        assert!(
            store
                .update_achievement(99, UpdateAchievement::default())
                .is_none()
        );
    }

    #[test]
    fn nutrition_lookup_returns_first_match() {
        let mut store = Store::new();
        let first = store.create_nutrition_info(NewNutritionInfo {
            recipe_id: 3,
            protein: Some(10),
            carbs: None,
            fats: None,
            fiber: None,
        });
        store.create_nutrition_info(NewNutritionInfo {
            recipe_id: 3,
            protein: Some(99),
            carbs: None,
            fats: None,
            fiber: None,
        });

        let found = store.get_nutrition_by_recipe(3).unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.protein, Some(10));
    }

    #[test]
    fn categories_list_ascending_by_id() {
        let mut store = Store::new();
        store.create_category(sample_category("Healthy"));
        store.create_category(sample_category("Desserts"));
        let ids: Vec<i64> = store.list_categories().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn update_step_can_clear_timer_with_explicit_null() {
        let mut store = Store::new();
        let step = store.create_step(NewStep {
            recipe_id: 1,
            step_number: 1,
            instruction: "Simmer.".to_string(),
            timer_minutes: Some(10),
        });

        let updated = store
            .update_step(
                step.id,
                UpdateStep {
                    timer_minutes: Some(None),
                    ..UpdateStep::default()
                },
            )
            .unwrap();
        assert_eq!(updated.timer_minutes, None);
    }
}

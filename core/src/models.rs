use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Distinguishes "field omitted" from "field explicitly null" in partial
/// updates. Wrapping the inner `Option` keeps an omitted field untouched
/// while `null` clears it.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// --- Entities ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User as exposed over the API. The password never leaves the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub prep_time: i64,
    pub cook_time: i64,
    pub servings: i64,
    pub calories: Option<i64>,
    pub difficulty: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<i64>,
    pub category_ids: Vec<i64>,
    pub rating: i64,
    pub rating_count: i64,
}

impl Recipe {
    #[must_use]
    pub fn total_time(&self) -> i64 {
        self.prep_time + self.cook_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    /// Free text so fractional amounts like "1/2" survive as written.
    pub quantity: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: i64,
    pub recipe_id: i64,
    pub step_number: i64,
    pub instruction: String,
    pub timer_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    /// Incremented when a recipe referencing this category is created.
    /// Not adjusted on recipe update or delete, so it drifts over time.
    pub recipe_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecipe {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub count: i64,
    pub achieved_at: DateTime<Utc>,
}

/// Milestone tag for saved-recipe achievements.
pub const SAVE_RECIPES_ACHIEVEMENT: &str = "SAVE_RECIPES";

/// A saved-recipe achievement is minted every time the user's total
/// crosses a multiple of this interval.
pub const SAVE_MILESTONE_INTERVAL: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionInfo {
    pub id: i64,
    pub recipe_id: i64,
    pub protein: Option<i64>,
    pub carbs: Option<i64>,
    pub fats: Option<i64>,
    pub fiber: Option<i64>,
}

// --- Composed view ---

/// Author block embedded in a recipe detail response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeAuthor {
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Category reference embedded in a recipe detail response. Unresolvable
/// category ids are rendered as `{id: 0, name: "Uncategorized"}`.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeWithDetails {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition_info: Option<NutritionInfo>,
    pub user: RecipeAuthor,
    pub categories: Vec<CategoryRef>,
}

// --- Insert shapes ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub prep_time: i64,
    pub cook_time: i64,
    pub servings: i64,
    #[serde(default)]
    pub calories: Option<i64>,
    pub difficulty: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIngredient {
    pub recipe_id: i64,
    pub name: String,
    pub quantity: String,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStep {
    pub recipe_id: i64,
    pub step_number: i64,
    pub instruction: String,
    #[serde(default)]
    pub timer_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavedRecipe {
    pub user_id: i64,
    pub recipe_id: i64,
}

fn default_achievement_count() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAchievement {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_achievement_count")]
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNutritionInfo {
    pub recipe_id: i64,
    #[serde(default)]
    pub protein: Option<i64>,
    #[serde(default)]
    pub carbs: Option<i64>,
    #[serde(default)]
    pub fats: Option<i64>,
    #[serde(default)]
    pub fiber: Option<i64>,
}

// --- Partial update shapes ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::option_option)]
pub struct UpdateRecipe {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub servings: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub calories: Option<Option<i64>>,
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub user_id: Option<Option<i64>>,
    pub category_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::option_option)]
pub struct UpdateIngredient {
    pub recipe_id: Option<i64>,
    pub name: Option<String>,
    pub quantity: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub unit: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::option_option)]
pub struct UpdateStep {
    pub recipe_id: Option<i64>,
    pub step_number: Option<i64>,
    pub instruction: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub timer_minutes: Option<Option<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAchievement {
    pub user_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::option_option)]
pub struct UpdateNutritionInfo {
    pub recipe_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub protein: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub carbs: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub fats: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub fiber: Option<Option<i64>>,
}

// --- Validation ---

/// One failed check on a request body, keyed by the JSON field name.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

fn require_non_empty(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    }
}

fn require_non_negative(errors: &mut Vec<FieldError>, field: &'static str, value: i64) {
    if value < 0 {
        errors.push(FieldError::new(field, "must not be negative"));
    }
}

fn require_positive(errors: &mut Vec<FieldError>, field: &'static str, value: i64) {
    if value < 1 {
        errors.push(FieldError::new(field, "must be at least 1"));
    }
}

#[must_use]
pub fn validate_new_user(user: &NewUser) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty(&mut errors, "username", &user.username);
    require_non_empty(&mut errors, "password", &user.password);
    require_non_empty(&mut errors, "email", &user.email);
    errors
}

// Difficulty is free text by convention ("Easy"/"Medium"/"Hard") and
// deliberately not constrained here.
#[must_use]
pub fn validate_new_recipe(recipe: &NewRecipe) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty(&mut errors, "title", &recipe.title);
    require_non_empty(&mut errors, "description", &recipe.description);
    require_non_empty(&mut errors, "imageUrl", &recipe.image_url);
    require_non_negative(&mut errors, "prepTime", recipe.prep_time);
    require_non_negative(&mut errors, "cookTime", recipe.cook_time);
    require_positive(&mut errors, "servings", recipe.servings);
    if let Some(calories) = recipe.calories {
        require_non_negative(&mut errors, "calories", calories);
    }
    errors
}

#[must_use]
pub fn validate_update_recipe(update: &UpdateRecipe) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(ref title) = update.title {
        require_non_empty(&mut errors, "title", title);
    }
    if let Some(ref description) = update.description {
        require_non_empty(&mut errors, "description", description);
    }
    if let Some(ref image_url) = update.image_url {
        require_non_empty(&mut errors, "imageUrl", image_url);
    }
    if let Some(prep_time) = update.prep_time {
        require_non_negative(&mut errors, "prepTime", prep_time);
    }
    if let Some(cook_time) = update.cook_time {
        require_non_negative(&mut errors, "cookTime", cook_time);
    }
    if let Some(servings) = update.servings {
        require_positive(&mut errors, "servings", servings);
    }
    if let Some(Some(calories)) = update.calories {
        require_non_negative(&mut errors, "calories", calories);
    }
    errors
}

#[must_use]
pub fn validate_new_ingredient(ingredient: &NewIngredient) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_positive(&mut errors, "recipeId", ingredient.recipe_id);
    require_non_empty(&mut errors, "name", &ingredient.name);
    errors
}

#[must_use]
pub fn validate_update_ingredient(update: &UpdateIngredient) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(recipe_id) = update.recipe_id {
        require_positive(&mut errors, "recipeId", recipe_id);
    }
    if let Some(ref name) = update.name {
        require_non_empty(&mut errors, "name", name);
    }
    errors
}

#[must_use]
pub fn validate_new_step(step: &NewStep) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_positive(&mut errors, "recipeId", step.recipe_id);
    require_positive(&mut errors, "stepNumber", step.step_number);
    require_non_empty(&mut errors, "instruction", &step.instruction);
    if let Some(timer) = step.timer_minutes {
        require_non_negative(&mut errors, "timerMinutes", timer);
    }
    errors
}

#[must_use]
pub fn validate_update_step(update: &UpdateStep) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(recipe_id) = update.recipe_id {
        require_positive(&mut errors, "recipeId", recipe_id);
    }
    if let Some(step_number) = update.step_number {
        require_positive(&mut errors, "stepNumber", step_number);
    }
    if let Some(ref instruction) = update.instruction {
        require_non_empty(&mut errors, "instruction", instruction);
    }
    if let Some(Some(timer)) = update.timer_minutes {
        require_non_negative(&mut errors, "timerMinutes", timer);
    }
    errors
}

#[must_use]
pub fn validate_new_category(category: &NewCategory) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty(&mut errors, "name", &category.name);
    require_non_empty(&mut errors, "imageUrl", &category.image_url);
    errors
}

#[must_use]
pub fn validate_update_category(update: &UpdateCategory) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(ref name) = update.name {
        require_non_empty(&mut errors, "name", name);
    }
    if let Some(ref image_url) = update.image_url {
        require_non_empty(&mut errors, "imageUrl", image_url);
    }
    errors
}

#[must_use]
pub fn validate_new_saved_recipe(saved: &NewSavedRecipe) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_positive(&mut errors, "userId", saved.user_id);
    require_positive(&mut errors, "recipeId", saved.recipe_id);
    errors
}

#[must_use]
pub fn validate_new_achievement(achievement: &NewAchievement) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_positive(&mut errors, "userId", achievement.user_id);
    require_non_empty(&mut errors, "type", &achievement.kind);
    require_non_negative(&mut errors, "count", achievement.count);
    errors
}

#[must_use]
pub fn validate_new_nutrition_info(nutrition: &NewNutritionInfo) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_positive(&mut errors, "recipeId", nutrition.recipe_id);
    for (field, value) in [
        ("protein", nutrition.protein),
        ("carbs", nutrition.carbs),
        ("fats", nutrition.fats),
        ("fiber", nutrition.fiber),
    ] {
        if let Some(grams) = value {
            require_non_negative(&mut errors, field, grams);
        }
    }
    errors
}

#[must_use]
pub fn validate_update_nutrition_info(update: &UpdateNutritionInfo) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(recipe_id) = update.recipe_id {
        require_positive(&mut errors, "recipeId", recipe_id);
    }
    for (field, value) in [
        ("protein", update.protein),
        ("carbs", update.carbs),
        ("fats", update.fats),
        ("fiber", update.fiber),
    ] {
        if let Some(Some(grams)) = value {
            require_non_negative(&mut errors, field, grams);
        }
    }
    errors
}

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use tower_http::limit::RequestBodyLimitLayer;

use savory_core::models::{
    Achievement, Category, FieldError, Ingredient, NewAchievement, NewCategory, NewIngredient,
    NewNutritionInfo, NewRecipe, NewSavedRecipe, NewStep, NewUser, NutritionInfo, Recipe,
    RecipeWithDetails, SavedRecipe, Step, UpdateCategory, UpdateIngredient, UpdateNutritionInfo,
    UpdateRecipe, UpdateStep, UserProfile, validate_new_achievement,
    validate_new_category, validate_new_ingredient, validate_new_nutrition_info,
    validate_new_recipe, validate_new_saved_recipe, validate_new_step, validate_new_user,
    validate_update_category, validate_update_ingredient, validate_update_nutrition_info,
    validate_update_recipe, validate_update_step,
};
use savory_core::store::{DEFAULT_PAGE_LIMIT, Store};

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

// The listing filters key off well-known seed categories and a calorie
// threshold.
const VEGETARIAN_CATEGORY_ID: i64 = 3;
const QUICK_MEALS_CATEGORY_ID: i64 = 4;
const LOW_CARB_MAX_CALORIES: i64 = 300;
const GLUTEN_KEYWORDS: [&str; 3] = ["bread", "pasta", "pizza"];

#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<Store>>,
}

impl AppState {
    fn store(&self) -> MutexGuard<'_, Store> {
        self.store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Query types ---

#[derive(Deserialize)]
struct RecipeListQuery {
    limit: Option<usize>,
    offset: Option<usize>,
    filters: Option<String>,
    sort: Option<String>,
}

#[derive(Deserialize)]
struct PageQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

// --- Error handling ---

enum ApiError {
    Validation(Vec<FieldError>),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::to_value(errors).unwrap_or_default(),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.into()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.into()),
            Self::Internal(err) => {
                eprintln!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

fn checked(errors: Vec<FieldError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- User handlers ---

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    checked(validate_new_user(&req))?;

    let mut store = state.store();
    if store.get_user_by_username(&req.username).is_some() {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }
    let user = store.create_user(req);
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>, ApiError> {
    let store = state.store();
    let user = store
        .get_user(id)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user.clone().into()))
}

// --- Recipe listing ---

fn passes_filters(recipe: &Recipe, filters: &[&str]) -> bool {
    if filters.contains(&"vegetarian") && !recipe.category_ids.contains(&VEGETARIAN_CATEGORY_ID) {
        return false;
    }
    if filters.contains(&"quick-meals") && !recipe.category_ids.contains(&QUICK_MEALS_CATEGORY_ID)
    {
        return false;
    }
    if filters.contains(&"low-carb") && recipe.calories.unwrap_or(0) > LOW_CARB_MAX_CALORIES {
        return false;
    }
    if filters.contains(&"gluten-free") {
        let title = recipe.title.to_lowercase();
        if GLUTEN_KEYWORDS.iter().any(|keyword| title.contains(keyword)) {
            return false;
        }
    }
    true
}

fn difficulty_rank(difficulty: &str) -> i64 {
    match difficulty {
        "Easy" => 1,
        "Medium" => 2,
        "Hard" => 3,
        // Free-text difficulties sort after the known ladder.
        _ => 4,
    }
}

fn sort_recipes(recipes: &mut [Recipe], sort: &str) {
    match sort {
        "newest" => recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        "time-asc" => recipes.sort_by_key(Recipe::total_time),
        "time-desc" => recipes.sort_by(|a, b| b.total_time().cmp(&a.total_time())),
        "difficulty" => recipes.sort_by_key(|recipe| difficulty_rank(&recipe.difficulty)),
        // "popularity" and anything unrecognized
        _ => recipes.sort_by(|a, b| b.rating_count.cmp(&a.rating_count)),
    }
}

async fn list_recipes(
    State(state): State<AppState>,
    Query(params): Query<RecipeListQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = params.offset.unwrap_or(0);

    // The window is cut before filtering, so a filtered page can come
    // back shorter than `limit` even when more matches exist beyond it.
    let mut recipes = state.store().list_recipes(limit, offset);

    if let Some(ref filters) = params.filters {
        let filters: Vec<&str> = filters.split(',').collect();
        recipes.retain(|recipe| passes_filters(recipe, &filters));
    }

    sort_recipes(&mut recipes, params.sort.as_deref().unwrap_or("popularity"));

    Ok(Json(recipes))
}

// --- Recipe handlers ---

async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeWithDetails>, ApiError> {
    let store = state.store();
    let detail = store
        .get_recipe_with_details(id)
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;
    Ok(Json(detail))
}

async fn create_recipe(
    State(state): State<AppState>,
    Json(req): Json<NewRecipe>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    checked(validate_new_recipe(&req))?;
    let recipe = state.store().create_recipe(req);
    Ok((StatusCode::CREATED, Json(recipe)))
}

async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRecipe>,
) -> Result<Json<Recipe>, ApiError> {
    checked(validate_update_recipe(&req))?;
    let recipe = state
        .store()
        .update_recipe(id, req)
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;
    Ok(Json(recipe))
}

async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_recipe(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Recipe not found".to_string()))
    }
}

async fn search_recipes(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Json<Vec<Recipe>> {
    Json(state.store().search_recipes(&query))
}

// --- Ingredient handlers ---

async fn list_recipe_ingredients(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> Json<Vec<Ingredient>> {
    Json(state.store().list_ingredients_by_recipe(recipe_id))
}

async fn create_ingredient(
    State(state): State<AppState>,
    Json(req): Json<NewIngredient>,
) -> Result<(StatusCode, Json<Ingredient>), ApiError> {
    checked(validate_new_ingredient(&req))?;
    let ingredient = state.store().create_ingredient(req);
    Ok((StatusCode::CREATED, Json(ingredient)))
}

async fn update_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateIngredient>,
) -> Result<Json<Ingredient>, ApiError> {
    checked(validate_update_ingredient(&req))?;
    let ingredient = state
        .store()
        .update_ingredient(id, req)
        .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))?;
    Ok(Json(ingredient))
}

async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_ingredient(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Ingredient not found".to_string()))
    }
}

// --- Step handlers ---

async fn list_recipe_steps(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> Json<Vec<Step>> {
    Json(state.store().list_steps_by_recipe(recipe_id))
}

async fn create_step(
    State(state): State<AppState>,
    Json(req): Json<NewStep>,
) -> Result<(StatusCode, Json<Step>), ApiError> {
    checked(validate_new_step(&req))?;
    let step = state.store().create_step(req);
    Ok((StatusCode::CREATED, Json(step)))
}

async fn update_step(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStep>,
) -> Result<Json<Step>, ApiError> {
    checked(validate_update_step(&req))?;
    let step = state
        .store()
        .update_step(id, req)
        .ok_or_else(|| ApiError::NotFound("Step not found".to_string()))?;
    Ok(Json(step))
}

async fn delete_step(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_step(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Step not found".to_string()))
    }
}

// --- Category handlers ---

async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.store().list_categories())
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, ApiError> {
    let store = state.store();
    let category = store
        .get_category(id)
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(Json(category.clone()))
}

async fn list_category_recipes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<PageQuery>,
) -> Json<Vec<Recipe>> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = params.offset.unwrap_or(0);
    Json(state.store().list_recipes_by_category(id, limit, offset))
}

async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    checked(validate_new_category(&req))?;
    let category = state.store().create_category(req);
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCategory>,
) -> Result<Json<Category>, ApiError> {
    checked(validate_update_category(&req))?;
    let category = state
        .store()
        .update_category(id, req)
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_category(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Category not found".to_string()))
    }
}

// --- Saved recipe handlers ---

async fn list_saved_recipes(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Json<Vec<SavedRecipe>> {
    Json(state.store().list_saved_recipes_by_user(user_id))
}

async fn get_saved_recipe_count(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Json<serde_json::Value> {
    let count = state.store().get_saved_recipe_count(user_id);
    Json(serde_json::json!({ "count": count }))
}

async fn create_saved_recipe(
    State(state): State<AppState>,
    Json(req): Json<NewSavedRecipe>,
) -> Result<(StatusCode, Json<SavedRecipe>), ApiError> {
    checked(validate_new_saved_recipe(&req))?;
    let saved = state.store().create_saved_recipe(req);
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn delete_saved_recipe(
    State(state): State<AppState>,
    Path((user_id, recipe_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_saved_recipe(user_id, recipe_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Saved recipe not found".to_string()))
    }
}

// --- Achievement handlers ---

async fn list_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Json<Vec<Achievement>> {
    Json(state.store().list_achievements_by_user(user_id))
}

async fn create_achievement(
    State(state): State<AppState>,
    Json(req): Json<NewAchievement>,
) -> Result<(StatusCode, Json<Achievement>), ApiError> {
    checked(validate_new_achievement(&req))?;
    let achievement = state.store().create_achievement(req);
    Ok((StatusCode::CREATED, Json(achievement)))
}

// --- Nutrition handlers ---

async fn get_recipe_nutrition(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> Result<Json<NutritionInfo>, ApiError> {
    let store = state.store();
    let nutrition = store
        .get_nutrition_by_recipe(recipe_id)
        .ok_or_else(|| ApiError::NotFound("Nutrition information not found".to_string()))?;
    Ok(Json(nutrition.clone()))
}

async fn create_nutrition_info(
    State(state): State<AppState>,
    Json(req): Json<NewNutritionInfo>,
) -> Result<(StatusCode, Json<NutritionInfo>), ApiError> {
    checked(validate_new_nutrition_info(&req))?;
    let nutrition = state.store().create_nutrition_info(req);
    Ok((StatusCode::CREATED, Json(nutrition)))
}

async fn update_nutrition_info(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateNutritionInfo>,
) -> Result<Json<NutritionInfo>, ApiError> {
    checked(validate_update_nutrition_info(&req))?;
    let nutrition = state
        .store()
        .update_nutrition_info(id, req)
        .ok_or_else(|| ApiError::NotFound("Nutrition information not found".to_string()))?;
    Ok(Json(nutrition))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/users", post(create_user))
        .route("/api/users/{id}", get(get_user))
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/api/recipes/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/api/recipes/search/{query}", get(search_recipes))
        .route(
            "/api/recipes/{id}/ingredients",
            get(list_recipe_ingredients),
        )
        .route("/api/ingredients", post(create_ingredient))
        .route(
            "/api/ingredients/{id}",
            put(update_ingredient).delete(delete_ingredient),
        )
        .route("/api/recipes/{id}/steps", get(list_recipe_steps))
        .route("/api/steps", post(create_step))
        .route(
            "/api/steps/{id}",
            put(update_step).delete(delete_step),
        )
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/api/categories/{id}/recipes", get(list_category_recipes))
        .route(
            "/api/users/{id}/saved-recipes",
            get(list_saved_recipes),
        )
        .route(
            "/api/users/{id}/saved-recipes/count",
            get(get_saved_recipe_count),
        )
        .route("/api/saved-recipes", post(create_saved_recipe))
        .route(
            "/api/users/{id}/saved-recipes/{recipe_id}",
            delete(delete_saved_recipe),
        )
        .route(
            "/api/users/{id}/achievements",
            get(list_achievements),
        )
        .route("/api/achievements", post(create_achievement))
        .route(
            "/api/recipes/{id}/nutrition",
            get(get_recipe_nutrition),
        )
        .route("/api/nutrition", post(create_nutrition_info))
        .route(
            "/api/nutrition/{id}",
            put(update_nutrition_info),
        )
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(store: Store, port: u16, bind: &str) -> anyhow::Result<()> {
    let state = AppState {
        store: Arc::new(Mutex::new(store)),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}

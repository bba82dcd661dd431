//! Sample catalog loaded at startup so a fresh server has something to
//! browse. One demo user, six categories, eight recipes, with full
//! ingredient, step, and nutrition data for the first four recipes.

use crate::models::{
    NewCategory, NewIngredient, NewNutritionInfo, NewRecipe, NewStep, NewUser,
};
use crate::store::Store;

struct RecipeSeed {
    title: &'static str,
    description: &'static str,
    image_url: &'static str,
    prep_time: i64,
    cook_time: i64,
    servings: i64,
    calories: i64,
    difficulty: &'static str,
    // Indexes into the seeded category list.
    categories: &'static [usize],
}

const CATEGORIES: &[(&str, &str)] = &[
    (
        "Healthy",
        "https://images.unsplash.com/photo-1546069901-ba9599a7e63c",
    ),
    (
        "Desserts",
        "https://images.unsplash.com/photo-1551024601-bec78aea704b",
    ),
    (
        "Vegetarian",
        "https://images.unsplash.com/photo-1512621776951-a57141f2eefd",
    ),
    (
        "Quick & Easy",
        "https://images.unsplash.com/photo-1563379926898-05f4575a45d8",
    ),
    (
        "Italian",
        "https://images.unsplash.com/photo-1498579150354-977475b7ea0b",
    ),
    (
        "Breakfast",
        "https://images.unsplash.com/photo-1511690656952-34342bb7c2f2",
    ),
];

const RECIPES: &[RecipeSeed] = &[
    RecipeSeed {
        title: "Creamy Tuscan Garlic Chicken",
        description: "A rich and creamy Italian-inspired dish with sun-dried tomatoes and spinach. Perfect for a weeknight dinner!",
        image_url: "https://images.unsplash.com/photo-1551183053-bf91a1d81141",
        prep_time: 10,
        cook_time: 20,
        servings: 4,
        calories: 450,
        difficulty: "Easy",
        categories: &[4, 3],
    },
    RecipeSeed {
        title: "Classic Margherita Pizza",
        description: "A simple yet delicious classic Italian pizza with fresh tomatoes, mozzarella, and basil. The perfect combination of flavors!",
        image_url: "https://images.unsplash.com/photo-1519708227418-c8fd9a32b7a2",
        prep_time: 20,
        cook_time: 25,
        servings: 4,
        calories: 320,
        difficulty: "Medium",
        categories: &[4, 2],
    },
    RecipeSeed {
        title: "Rainbow Smoothie Bowl",
        description: "A vibrant and nutritious breakfast bowl packed with antioxidants, vitamins, and fresh fruits for a perfect start to your day.",
        image_url: "https://images.unsplash.com/photo-1585032226651-759b368d7246",
        prep_time: 10,
        cook_time: 5,
        servings: 1,
        calories: 280,
        difficulty: "Easy",
        categories: &[0, 5, 2],
    },
    RecipeSeed {
        title: "Asian-Style Grilled Salmon",
        description: "Delicious salmon with Asian-inspired flavors including soy sauce, ginger, and sesame oil. Served with steamed vegetables.",
        image_url: "https://images.unsplash.com/photo-1467003909585-2f8a72700288",
        prep_time: 10,
        cook_time: 15,
        servings: 4,
        calories: 380,
        difficulty: "Medium",
        categories: &[0, 3],
    },
    RecipeSeed {
        title: "Chocolate Chip Cookies",
        description: "Classic homemade chocolate chip cookies with a soft, chewy center and crispy edges. Perfect for dessert or an afternoon treat!",
        image_url: "https://images.unsplash.com/photo-1499636136210-6f4ee915583e",
        prep_time: 15,
        cook_time: 10,
        servings: 24,
        calories: 120,
        difficulty: "Easy",
        categories: &[1],
    },
    RecipeSeed {
        title: "Vegetable Stir Fry",
        description: "A quick and colorful vegetable stir fry with a savory sauce. Ready in minutes and packed with nutrients!",
        image_url: "https://images.unsplash.com/photo-1512621776951-a57141f2eefd",
        prep_time: 15,
        cook_time: 10,
        servings: 4,
        calories: 220,
        difficulty: "Easy",
        categories: &[2, 3, 0],
    },
    RecipeSeed {
        title: "Avocado Toast with Poached Egg",
        description: "Creamy avocado on toasted artisan bread topped with a perfectly poached egg. A breakfast classic with a modern twist!",
        image_url: "https://images.unsplash.com/photo-1482049016688-2d3e1b311543",
        prep_time: 5,
        cook_time: 10,
        servings: 1,
        calories: 320,
        difficulty: "Medium",
        categories: &[5, 3],
    },
    RecipeSeed {
        title: "Spaghetti Carbonara",
        description: "Authentic Italian pasta dish with eggs, Pecorino Romano cheese, pancetta, and black pepper. A simple yet elegant meal!",
        image_url: "https://images.unsplash.com/photo-1600803907087-f56d462fd26b",
        prep_time: 10,
        cook_time: 15,
        servings: 4,
        calories: 480,
        difficulty: "Medium",
        categories: &[4],
    },
];

// (recipe index, name, quantity, unit)
const INGREDIENTS: &[(usize, &str, &str, &str)] = &[
    (0, "boneless skinless chicken breasts", "4", ""),
    (0, "olive oil", "2", "tbsp"),
    (0, "heavy cream", "1", "cup"),
    (0, "chicken broth", "1/2", "cup"),
    (0, "garlic powder", "1", "tsp"),
    (0, "Italian seasoning", "1", "tsp"),
    (0, "sun-dried tomatoes", "1/2", "cup"),
    (0, "spinach", "2", "cups"),
    (1, "pizza dough", "1", ""),
    (1, "tomato sauce", "1/2", "cup"),
    (1, "fresh mozzarella cheese", "8", "oz"),
    (1, "extra virgin olive oil", "2", "tbsp"),
    (1, "fresh basil leaves", "10", ""),
    (1, "salt and pepper", "", "to taste"),
    (2, "frozen banana", "1", ""),
    (2, "frozen berries", "1", "cup"),
    (2, "Greek yogurt", "1/2", "cup"),
    (2, "almond milk", "1/4", "cup"),
    (2, "honey or maple syrup", "1", "tbsp"),
    (2, "toppings: sliced fruits, granola, chia seeds", "", "as needed"),
    (3, "salmon fillets", "4", "(6 oz each)"),
    (3, "soy sauce", "3", "tbsp"),
    (3, "honey", "2", "tbsp"),
    (3, "sesame oil", "1", "tbsp"),
    (3, "grated ginger", "1", "tbsp"),
    (3, "garlic, minced", "2", "cloves"),
    (3, "sliced green onions", "", "for garnish"),
    (3, "sesame seeds", "", "for garnish"),
];

// (recipe index, step number, instruction, timer minutes)
const STEPS: &[(usize, i64, &str, i64)] = &[
    (0, 1, "Season chicken breasts with salt, pepper, and Italian seasoning on both sides.", 5),
    (0, 2, "Heat olive oil in a large skillet over medium-high heat. Add chicken and cook for 5-7 minutes per side until golden brown and cooked through. Remove chicken from the pan and set aside.", 15),
    (0, 3, "In the same pan, add chicken broth to deglaze, scraping up any browned bits. Add heavy cream, garlic powder, and Italian seasoning. Bring to a simmer.", 5),
    (0, 4, "Add sun-dried tomatoes and simmer for 1-2 minutes. Add spinach and stir until wilted. Return chicken to the pan and spoon sauce over it. Simmer for an additional 2-3 minutes until heated through.", 5),
    (1, 1, "Preheat oven to 475\u{b0}F (245\u{b0}C) with a pizza stone or baking sheet inside.", 30),
    (1, 2, "On a floured surface, stretch the pizza dough into a 12-inch circle.", 5),
    (1, 3, "Spread tomato sauce evenly over the dough, leaving a 1-inch border for the crust.", 2),
    (1, 4, "Tear the mozzarella into pieces and distribute evenly over the sauce.", 2),
    (1, 5, "Carefully transfer the pizza to the preheated stone or baking sheet. Bake for 10-12 minutes until the crust is golden and the cheese is bubbling.", 12),
    (1, 6, "Remove from oven, drizzle with olive oil, and scatter fresh basil leaves on top. Season with salt and pepper to taste.", 1),
    (2, 1, "Place the frozen banana, berries, Greek yogurt, almond milk, and sweetener in a blender.", 2),
    (2, 2, "Blend until smooth and creamy. The mixture should be thick enough to eat with a spoon.", 3),
    (2, 3, "Pour into a bowl and arrange toppings in a decorative pattern.", 5),
    (3, 1, "In a bowl, mix soy sauce, honey, sesame oil, ginger, and garlic to make the marinade.", 5),
    (3, 2, "Place salmon fillets in a shallow dish and pour the marinade over them, turning to coat. Let marinate for at least 15 minutes, or up to 1 hour in the refrigerator.", 15),
    (3, 3, "Preheat grill or grill pan to medium-high heat.", 5),
    (3, 4, "Remove salmon from marinade and grill for 4-5 minutes per side, or until fish flakes easily with a fork.", 10),
    (3, 5, "Garnish with sliced green onions and sesame seeds before serving.", 1),
];

// (recipe index, protein, carbs, fats, fiber)
const NUTRITION: &[(usize, i64, i64, i64, i64)] = &[
    (0, 38, 12, 28, 3),
    (1, 15, 42, 10, 2),
    (2, 12, 45, 5, 8),
    (3, 32, 8, 18, 1),
];

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl Store {
    /// A store preloaded with the sample catalog.
    #[must_use]
    pub fn with_sample_data() -> Self {
        let mut store = Store::new();

        let user = store.create_user(NewUser {
            username: "demouser".to_string(),
            password: "password123".to_string(),
            email: "demo@example.com".to_string(),
            avatar_url: Some("https://randomuser.me/api/portraits/women/44.jpg".to_string()),
        });

        let category_ids: Vec<i64> = CATEGORIES
            .iter()
            .map(|&(name, image_url)| {
                store
                    .create_category(NewCategory {
                        name: name.to_string(),
                        image_url: image_url.to_string(),
                    })
                    .id
            })
            .collect();

        let recipe_ids: Vec<i64> = RECIPES
            .iter()
            .map(|seed| {
                store
                    .create_recipe(NewRecipe {
                        title: seed.title.to_string(),
                        description: seed.description.to_string(),
                        image_url: seed.image_url.to_string(),
                        prep_time: seed.prep_time,
                        cook_time: seed.cook_time,
                        servings: seed.servings,
                        calories: Some(seed.calories),
                        difficulty: seed.difficulty.to_string(),
                        user_id: Some(user.id),
                        category_ids: seed.categories.iter().map(|&i| category_ids[i]).collect(),
                    })
                    .id
            })
            .collect();

        for &(recipe, name, quantity, unit) in INGREDIENTS {
            store.create_ingredient(NewIngredient {
                recipe_id: recipe_ids[recipe],
                name: name.to_string(),
                quantity: quantity.to_string(),
                unit: non_empty(unit),
            });
        }

        for &(recipe, step_number, instruction, timer_minutes) in STEPS {
            store.create_step(NewStep {
                recipe_id: recipe_ids[recipe],
                step_number,
                instruction: instruction.to_string(),
                timer_minutes: Some(timer_minutes),
            });
        }

        for &(recipe, protein, carbs, fats, fiber) in NUTRITION {
            store.create_nutrition_info(NewNutritionInfo {
                recipe_id: recipe_ids[recipe],
                protein: Some(protein),
                carbs: Some(carbs),
                fats: Some(fats),
                fiber: Some(fiber),
            });
        }

        store
    }
}

#[cfg(test)]
mod tests {
    use crate::store::Store;

    #[test]
    fn sample_catalog_shape() {
        let store = Store::with_sample_data();
        assert!(store.get_user_by_username("demouser").is_some());
        assert_eq!(store.list_categories().len(), 6);
        assert_eq!(store.list_recipes(100, 0).len(), 8);
    }

    #[test]
    fn first_four_recipes_have_full_details() {
        let store = Store::with_sample_data();
        for id in 1..=4 {
            let details = store.get_recipe_with_details(id).unwrap();
            assert!(!details.ingredients.is_empty(), "recipe {id} ingredients");
            assert!(!details.steps.is_empty(), "recipe {id} steps");
            assert!(details.nutrition_info.is_some(), "recipe {id} nutrition");
            assert_eq!(details.user.username, "demouser");
        }
    }

    #[test]
    fn category_counts_reflect_seeded_memberships() {
        let store = Store::with_sample_data();
        let healthy = store.get_category(1).unwrap();
        assert_eq!(healthy.name, "Healthy");
        assert_eq!(healthy.recipe_count, 3);
        let italian = store.get_category(5).unwrap();
        assert_eq!(italian.name, "Italian");
        assert_eq!(italian.recipe_count, 3);
    }
}

use axum::{
    extract::State,
    routing::{get, patch},
    Router,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, DbErr, EntityTrait, IntoActiveModel, ModelTrait,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_valid::Validate;

use entity::{Drink, DrinkActive, DrinkColumn, DrinkEntity, Ingredient, Recipe};

use super::{
    auth::{Authorized, DeleteDrinks, GetDrinksDetail, PatchDrinks, PostDrinks},
    envelope::{Deleted, Envelope},
    extract::{Json, Path},
    AppState, Error,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/drinks", get(drinks).post(create))
        .route("/drinks-detail", get(detail))
        .route("/drinks/:id", patch(update).delete(delete))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrinkView<I> {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<I>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Drinks<I> {
    pub drinks: Vec<DrinkView<I>>,
}

/// Public representation: colors and proportions only.
pub fn short(drink: &Drink) -> DrinkView<ShortIngredient> {
    DrinkView {
        id: drink.id,
        title: drink.title.to_owned(),
        recipe: drink
            .recipe
            .0
            .iter()
            .map(|i| ShortIngredient {
                color: i.color.to_owned(),
                parts: i.parts,
            })
            .collect(),
    }
}

pub fn long(drink: &Drink) -> DrinkView<Ingredient> {
    DrinkView {
        id: drink.id,
        title: drink.title.to_owned(),
        recipe: drink.recipe.0.to_owned(),
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IngredientInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(min_length = 1)]
    pub color: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(min_length = 1)]
    pub name: String,
    #[validate(minimum = 1)]
    pub parts: u32,
}

impl From<IngredientInput> for Ingredient {
    fn from(value: IngredientInput) -> Self {
        Ingredient {
            color: value.color,
            name: value.name,
            parts: value.parts,
        }
    }
}

impl From<&Ingredient> for IngredientInput {
    fn from(value: &Ingredient) -> Self {
        IngredientInput {
            color: value.color.to_owned(),
            name: value.name.to_owned(),
            parts: value.parts,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewDrink {
    #[serde(deserialize_with = "trimmed")]
    #[validate(min_length = 1)]
    #[validate(max_length = 80)]
    pub title: String,
    #[serde(deserialize_with = "one_or_many")]
    #[validate(min_items = 1)]
    pub recipe: Vec<IngredientInput>,
}

impl NewDrink {
    fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::Unprocessable(e.to_string()))?;
        for ingredient in self.recipe.iter() {
            ingredient
                .validate()
                .map_err(|e| Error::Unprocessable(e.to_string()))?;
        }
        Ok(())
    }

    fn recipe(&self) -> Recipe {
        Recipe(self.recipe.iter().cloned().map(Ingredient::from).collect())
    }
}

#[derive(Debug, Deserialize)]
pub struct DrinkPatch {
    #[serde(default, deserialize_with = "maybe_trimmed")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "maybe_one_or_many")]
    pub recipe: Option<Vec<IngredientInput>>,
}

impl DrinkPatch {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }

    /// The drink as it would look once the patch is applied.
    fn apply(self, drink: &Drink) -> NewDrink {
        NewDrink {
            title: self.title.unwrap_or_else(|| drink.title.to_owned()),
            recipe: self
                .recipe
                .unwrap_or_else(|| drink.recipe.0.iter().map(IngredientInput::from).collect()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![t],
        }
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    OneOrMany::deserialize(deserializer).map(Vec::from)
}

fn maybe_one_or_many<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<OneOrMany<T>>::deserialize(deserializer).map(|o| o.map(Vec::from))
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_owned())
}

fn maybe_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|o| o.map(|s| s.trim().to_owned()))
}

fn unprocessable(e: DbErr) -> Error {
    tracing::warn!(error = %e, "Could not store drink");
    Error::Unprocessable(e.to_string())
}

pub async fn drinks(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Drinks<ShortIngredient>>>, Error> {
    let drinks = DrinkEntity::find()
        .order_by_asc(DrinkColumn::Id)
        .all(&state.db)
        .await?;
    if drinks.is_empty() {
        return Err(Error::NotFound);
    }
    Ok(Json(Envelope::new(Drinks {
        drinks: drinks.iter().map(short).collect(),
    })))
}

pub async fn detail(
    _: Authorized<GetDrinksDetail>,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Drinks<Ingredient>>>, Error> {
    let drinks = DrinkEntity::find()
        .order_by_asc(DrinkColumn::Id)
        .all(&state.db)
        .await?;
    if drinks.is_empty() {
        return Err(Error::NotFound);
    }
    Ok(Json(Envelope::new(Drinks {
        drinks: drinks.iter().map(long).collect(),
    })))
}

pub async fn create(
    _: Authorized<PostDrinks>,
    State(state): State<AppState>,
    Json(payload): Json<NewDrink>,
) -> Result<Json<Envelope<Drinks<Ingredient>>>, Error> {
    payload.check()?;
    let tx = state.db.begin().await?;
    let drink = DrinkActive {
        id: NotSet,
        title: Set(payload.title.to_owned()),
        recipe: Set(payload.recipe()),
    }
    .insert(&tx)
    .await
    .map_err(unprocessable)?;
    tx.commit().await?;
    tracing::info!(id = drink.id, title = %drink.title, "Created drink");
    Ok(Json(Envelope::new(Drinks {
        drinks: vec![long(&drink)],
    })))
}

pub async fn update(
    _: Authorized<PatchDrinks>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<DrinkPatch>,
) -> Result<Json<Envelope<Drinks<Ingredient>>>, Error> {
    let tx = state.db.begin().await?;
    let drink = DrinkEntity::find_by_id(id)
        .one(&tx)
        .await?
        .ok_or(Error::NotFound)?;
    if patch.is_empty() {
        return Err(Error::Unprocessable(
            "Either a title or a recipe is required".to_string(),
        ));
    }
    let candidate = patch.apply(&drink);
    candidate.check()?;

    let mut active = drink.into_active_model();
    active.title = Set(candidate.title.to_owned());
    active.recipe = Set(candidate.recipe());
    let drink = active.update(&tx).await.map_err(unprocessable)?;
    tx.commit().await?;
    tracing::info!(id = drink.id, title = %drink.title, "Updated drink");
    Ok(Json(Envelope::new(Drinks {
        drinks: vec![long(&drink)],
    })))
}

pub async fn delete(
    _: Authorized<DeleteDrinks>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope<Deleted>>, Error> {
    let tx = state.db.begin().await?;
    let drink = DrinkEntity::find_by_id(id)
        .one(&tx)
        .await?
        .ok_or(Error::NotFound)?;
    drink.delete(&tx).await.map_err(unprocessable)?;
    tx.commit().await?;
    tracing::info!(id, "Deleted drink");
    Ok(Json(Envelope::new(Deleted { delete: id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mocha() -> Drink {
        Drink {
            id: 1,
            title: "Mocha".to_string(),
            recipe: Recipe(vec![
                Ingredient {
                    color: "brown".to_string(),
                    name: "espresso".to_string(),
                    parts: 1,
                },
                Ingredient {
                    color: "white".to_string(),
                    name: "milk".to_string(),
                    parts: 2,
                },
            ]),
        }
    }

    #[test]
    fn short_view_hides_ingredient_names() {
        let value = serde_json::to_value(short(&mocha())).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "title": "Mocha",
                "recipe": [{"color": "brown", "parts": 1}, {"color": "white", "parts": 2}],
            })
        );
    }

    #[test]
    fn long_view_keeps_ingredient_names() {
        let value = serde_json::to_value(long(&mocha())).unwrap();
        assert_eq!(value["recipe"][1]["name"], "milk");
    }

    #[test]
    fn single_ingredient_is_accepted() {
        let drink: NewDrink = serde_json::from_value(json!({
            "title": "Water",
            "recipe": {"color": "blue", "name": "water", "parts": 1},
        }))
        .unwrap();
        assert_eq!(drink.recipe.len(), 1);
        assert!(drink.check().is_ok());
    }

    #[test]
    fn empty_recipe_is_rejected() {
        let drink: NewDrink = serde_json::from_value(json!({"title": "Air", "recipe": []})).unwrap();
        assert!(matches!(drink.check(), Err(Error::Unprocessable(_))));
    }

    #[test]
    fn zero_parts_are_rejected() {
        let drink: NewDrink = serde_json::from_value(json!({
            "title": "Ghost",
            "recipe": [{"color": "clear", "name": "nothing", "parts": 0}],
        }))
        .unwrap();
        assert!(drink.check().is_err());
    }

    #[test]
    fn blank_fields_are_rejected() {
        let drink: NewDrink = serde_json::from_value(json!({
            "title": "   ",
            "recipe": [{"color": " ", "name": " ", "parts": 1}],
        }))
        .unwrap();
        assert_eq!(drink.title, "");
        assert_eq!(drink.recipe[0].name, "");
        assert!(drink.check().is_err());

        let drink: NewDrink = serde_json::from_value(json!({
            "title": "Latte",
            "recipe": [{"color": "\t", "name": "milk", "parts": 1}],
        }))
        .unwrap();
        assert!(drink.check().is_err());
    }

    #[test]
    fn padded_title_is_trimmed() {
        let patch: DrinkPatch = serde_json::from_value(json!({"title": "  Flat White "})).unwrap();
        assert_eq!(patch.apply(&mocha()).title, "Flat White");
    }

    #[test]
    fn patch_keeps_untouched_fields() {
        let patch: DrinkPatch = serde_json::from_value(json!({"title": "Caffe Mocha"})).unwrap();
        assert!(!patch.is_empty());
        let drink = patch.apply(&mocha());
        assert_eq!(drink.title, "Caffe Mocha");
        assert_eq!(drink.recipe().0, mocha().recipe.0);
    }

    #[test]
    fn empty_patch_is_detected() {
        let patch: DrinkPatch = serde_json::from_value(json!({})).unwrap();
        assert!(patch.is_empty());
    }
}

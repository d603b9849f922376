use crate::domain::drink_model::parse_recipe;
use crate::domain::drink_model::serialize_recipe;
use crate::domain::drink_model::CreateDrinkInput;
use crate::domain::drink_model::Drink;
use crate::domain::drink_model::DrinkRow;
use crate::domain::drink_model::DrinkView;
use crate::domain::drink_model::LongDrink;
use crate::domain::drink_model::Projection;
use crate::domain::drink_model::UpdateDrinkInput;
use crate::providers::state::SqliteStateImpl;
use log::error;
use log::info;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrinkStoreError {
    #[error("drink not found")]
    NotFound,
    #[error("{0}")]
    Invalid(&'static str),
    #[error("malformed recipe: {0}")]
    MalformedRecipe(#[from] serde_json::Error),
    #[error("could not persist drink: {0}")]
    Unprocessable(sqlx::Error),
    #[error(transparent)]
    StateImplError(sqlx::Error),
    #[error("stored recipe for drink {id} is unreadable: {source}")]
    CorruptRecipe { id: i64, source: serde_json::Error },
}

#[derive(Clone)]
pub struct DrinkStore {
    state: Arc<SqliteStateImpl>,
}

impl DrinkStore {
    pub fn new(state: Arc<SqliteStateImpl>) -> Self {
        Self { state }
    }
}

impl DrinkStore {
    // empty table is NotFound, not an empty list
    pub async fn list_all(&self, projection: Projection) -> Result<Vec<DrinkView>, DrinkStoreError> {
        let rows = self.state.find_all_drinks().await.map_err(|err| {
            error!("could not list drinks: {}", err);
            DrinkStoreError::StateImplError(err)
        })?;

        if rows.is_empty() {
            return Err(DrinkStoreError::NotFound);
        }

        rows.iter()
            .map(|row| to_drink(row).map(|drink| drink.project(projection)))
            .collect()
    }
}

impl DrinkStore {
    pub async fn create(&self, input: CreateDrinkInput) -> Result<LongDrink, DrinkStoreError> {
        let (title, recipe) = match (input.title, input.recipe) {
            (Some(title), Some(recipe)) => Ok((title, recipe)),
            (None, _) => Err(DrinkStoreError::Invalid("title is required")),
            (_, None) => Err(DrinkStoreError::Invalid("recipe is required")),
        }?;

        let recipe = parse_recipe(recipe)?;
        let serialized_recipe = serialize_recipe(&recipe)?;

        info!("creating drink with title {}", title);

        let id = self
            .state
            .insert_drink(&title, &serialized_recipe)
            .await
            .map_err(|err| {
                error!("could not insert drink {}: {}", title, err);
                DrinkStoreError::Unprocessable(err)
            })?;

        info!("drink created with id {}", id);

        Ok(Drink { id, title, recipe }.long())
    }
}

impl DrinkStore {
    pub async fn update(
        &self,
        id: i64,
        input: UpdateDrinkInput,
    ) -> Result<LongDrink, DrinkStoreError> {
        let row = self.find_row(id).await?;

        info!("updating drink with id {}", id);

        let mut drink = to_drink(&row)?;

        if let Some(title) = input.title {
            drink.title = title;
        }

        if let Some(recipe) = input.recipe {
            drink.recipe = parse_recipe(recipe)?;
        }

        let updated = DrinkRow {
            id,
            title: drink.title.clone(),
            recipe: serialize_recipe(&drink.recipe)?,
        };

        self.state.update_drink(&updated).await.map_err(|err| {
            error!("could not update drink {}: {}", id, err);
            DrinkStoreError::Unprocessable(err)
        })?;

        info!("drink updated with id {}", id);

        Ok(drink.long())
    }
}

impl DrinkStore {
    pub async fn delete(&self, id: i64) -> Result<i64, DrinkStoreError> {
        let deleted = self.state.delete_drink_by_id(id).await.map_err(|err| {
            error!("could not delete drink {}: {}", id, err);
            DrinkStoreError::Unprocessable(err)
        })?;

        if deleted == 0 {
            return Err(DrinkStoreError::NotFound);
        }

        info!("drink deleted with id {}", id);

        Ok(id)
    }
}

impl DrinkStore {
    async fn find_row(&self, id: i64) -> Result<DrinkRow, DrinkStoreError> {
        match self.state.find_drink_by_id(id).await {
            Err(err) => {
                error!("could not look up drink {}: {}", id, err);
                Err(DrinkStoreError::Unprocessable(err))
            }
            Ok(None) => Err(DrinkStoreError::NotFound),
            Ok(Some(row)) => Ok(row),
        }
    }
}

fn to_drink(row: &DrinkRow) -> Result<Drink, DrinkStoreError> {
    Drink::try_from(row).map_err(|source| {
        error!("stored recipe for drink {} is unreadable: {}", row.id, source);
        DrinkStoreError::CorruptRecipe { id: row.id, source }
    })
}

use std::sync::Arc;

use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use super::{distinct_menu_item_ids, validate_lines};
use crate::{
    app_error::AppError,
    authz::SharedCartScope,
    domain::{
        ItemLine, MAX_LINE_QUANTITY,
        shared_cart::{NewSharedCart, SharedCart},
        user::{Country, User},
    },
    store::{Store, StoreError},
};

/// Random bytes behind a share code; hex encoding doubles the length.
pub const SHARE_CODE_BYTES: usize = 6;

pub const DEFAULT_SHARE_CODE_ATTEMPTS: u32 = 5;

pub type ShareCodeGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// 12 lowercase hex characters from the thread-local CSPRNG.
pub fn generate_share_code() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; SHARE_CODE_BYTES] = rng.random();
    hex::encode(bytes)
}

fn add_quantity(current: i32, added: i32, menu_item_id: Uuid) -> Result<i32, AppError> {
    current
        .checked_add(added)
        .filter(|total| *total <= MAX_LINE_QUANTITY)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Quantity for menu item {menu_item_id} would exceed {MAX_LINE_QUANTITY}"
            ))
        })
}

/// Folds repeated menu items into one line, keeping first-seen order.
fn merge_lines(lines: Vec<ItemLine>) -> Result<Vec<ItemLine>, AppError> {
    let mut merged: Vec<ItemLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged
            .iter_mut()
            .find(|existing| existing.menu_item_id == line.menu_item_id)
        {
            Some(existing) => {
                existing.quantity =
                    add_quantity(existing.quantity, line.quantity, line.menu_item_id)?;
            }
            None => merged.push(line),
        }
    }
    Ok(merged)
}

/// Carts shared with everyone in a country through a share code.
#[derive(Clone)]
pub struct SharedCartRegistry {
    store: Arc<dyn Store>,
    code_attempts: u32,
    generate_code: ShareCodeGenerator,
}

impl SharedCartRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            code_attempts: DEFAULT_SHARE_CODE_ATTEMPTS,
            generate_code: Arc::new(generate_share_code),
        }
    }

    pub fn with_code_attempts(mut self, attempts: u32) -> Self {
        self.code_attempts = attempts.max(1);
        self
    }

    pub fn with_code_generator(mut self, generator: ShareCodeGenerator) -> Self {
        self.generate_code = generator;
        self
    }

    async fn ensure_menu_items_exist(&self, lines: &[ItemLine]) -> Result<(), AppError> {
        let ids = distinct_menu_item_ids(lines);
        let found = self.store.find_menu_items(&ids).await?;
        if found.len() != ids.len() {
            return Err(AppError::NotFound(
                "One or more menu items not found".into(),
            ));
        }
        Ok(())
    }

    /// Creates a cart visible to everyone in `country`. A share code that collides with an
    /// existing one is regenerated, up to the configured number of attempts.
    pub async fn create(
        &self,
        user: &User,
        country: Country,
        items: Vec<ItemLine>,
    ) -> Result<SharedCart, AppError> {
        validate_lines(&items)?;
        let lines = merge_lines(items)?;
        self.ensure_menu_items_exist(&lines).await?;

        for attempt in 1..=self.code_attempts {
            let new_cart = NewSharedCart {
                share_code: (self.generate_code)(),
                country,
                created_by_id: user.id,
                lines: lines.clone(),
            };

            match self.store.insert_shared_cart(new_cart).await {
                Ok(cart) => return Ok(cart),
                Err(StoreError::Conflict(constraint)) => {
                    debug!(attempt, %constraint, "Share code collision, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AppError::Conflict(
            "Could not allocate a unique share code".into(),
        ))
    }

    pub async fn find_by_country(&self, user: &User) -> Result<Vec<SharedCart>, AppError> {
        let carts = self
            .store
            .list_shared_carts(SharedCartScope::for_user(user))
            .await?;
        Ok(carts)
    }

    /// Share codes never bypass the country partition.
    pub async fn find_by_code(&self, code: &str, user: &User) -> Result<SharedCart, AppError> {
        let cart = self
            .store
            .find_shared_cart_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("Shared cart not found".into()))?;

        if cart.country != user.country {
            return Err(AppError::Forbidden(
                "This shared cart is not available in your country".into(),
            ));
        }

        Ok(cart)
    }

    pub async fn find_mine(&self, user_id: Uuid) -> Result<Vec<SharedCart>, AppError> {
        let carts = self
            .store
            .list_shared_carts(SharedCartScope::created_by(user_id))
            .await?;
        Ok(carts)
    }

    /// Any user of the cart's country may add items. Quantities of menu items already in the
    /// cart are incremented.
    pub async fn add_items(
        &self,
        shared_cart_id: Uuid,
        items: Vec<ItemLine>,
        user: &User,
    ) -> Result<SharedCart, AppError> {
        validate_lines(&items)?;

        let cart = self
            .store
            .find_shared_cart(shared_cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shared cart not found".into()))?;

        if cart.country != user.country {
            return Err(AppError::Forbidden(
                "You can only add items to shared carts in your country".into(),
            ));
        }

        // Early rejection only; the store enforces the cap atomically against concurrent adds.
        let lines = merge_lines(items)?;
        for line in &lines {
            let current = cart
                .items
                .iter()
                .find(|item| item.menu_item.id == line.menu_item_id)
                .map_or(0, |item| item.quantity);
            add_quantity(current, line.quantity, line.menu_item_id)?;
        }
        self.ensure_menu_items_exist(&lines).await?;

        let cart = self
            .store
            .merge_shared_cart_items(shared_cart_id, lines)
            .await?;
        Ok(cart)
    }

    /// Only the creator may delete, whatever the country.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<SharedCart, AppError> {
        let cart = self
            .store
            .find_shared_cart(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shared cart not found".into()))?;

        if cart.created_by.id != user_id {
            return Err(AppError::Forbidden(
                "You can only delete your own shared carts".into(),
            ));
        }

        self.store
            .delete_shared_cart(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shared cart not found".into()))
    }
}

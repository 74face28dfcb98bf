use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::cart::{AddToCartRequest, UpdateCartItemRequest},
    entity::{
        cart_items::{self, Column as CartItemCol, Entity as CartItems},
        carts::{self, Column as CartCol, Entity as Carts},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Cart, CartItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// The user's cart, created on first use.
pub(crate) async fn cart_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> AppResult<carts::Model> {
    if let Some(cart) = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(cart);
    }

    let inserted = carts::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        ..Default::default()
    }
    .insert(db)
    .await;

    match inserted {
        Ok(cart) => Ok(cart),
        // Another request created it first.
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Carts::find()
            .filter(CartCol::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Cart")),
        Err(err) => Err(err.into()),
    }
}

async fn load_cart(state: &AppState, cart: carts::Model) -> AppResult<Cart> {
    let items: Vec<CartItem> = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_asc(CartItemCol::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(item, product)| CartItem::from_entity(item, product.as_ref()))
        .collect();

    let subtotal = items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum();

    Ok(Cart {
        id: cart.id,
        user_id: cart.user_id,
        items,
        subtotal,
    })
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    let cart = cart_for_user(&state.orm, user.user_id).await?;
    let cart = load_cart(state, cart).await?;
    let meta = Meta::total(cart.items.len());
    Ok(ApiResponse::success("Cart", cart, Some(meta)))
}

/// Add a product, or set its quantity when it is already in the cart. The
/// unit price is taken from the product at this moment.
pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<Cart>> {
    payload.validate()?;

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    let unit_price = product.price.ok_or_else(|| {
        AppError::validation(format!("Product {} has no price defined", product.name))
    })?;

    let cart = cart_for_user(&state.orm, user.user_id).await?;

    let existing = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::ProductId.eq(product.id))
        .one(&state.orm)
        .await?;

    match existing {
        Some(item) => {
            let mut active: cart_items::ActiveModel = item.into();
            active.quantity = Set(payload.quantity);
            active.unit_price = Set(unit_price);
            active.update(&state.orm).await?;
        }
        None => {
            cart_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(product.id),
                quantity: Set(payload.quantity),
                unit_price: Set(unit_price),
                ..Default::default()
            }
            .insert(&state.orm)
            .await?;
        }
    }
    touch(state, &cart).await?;

    let cart = load_cart(state, cart).await?;
    Ok(ApiResponse::success("Item added to cart", cart, None))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<Cart>> {
    payload.validate()?;
    let cart = cart_for_user(&state.orm, user.user_id).await?;

    let item = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Cart item"))?;

    let mut active: cart_items::ActiveModel = item.into();
    active.quantity = Set(payload.quantity);
    active.update(&state.orm).await?;
    touch(state, &cart).await?;

    let cart = load_cart(state, cart).await?;
    Ok(ApiResponse::success("Cart item updated", cart, None))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<Cart>> {
    let cart = cart_for_user(&state.orm, user.user_id).await?;

    let result = CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Cart item"));
    }
    touch(state, &cart).await?;

    let cart = load_cart(state, cart).await?;
    Ok(ApiResponse::success("Item removed from cart", cart, None))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    let cart = cart_for_user(&state.orm, user.user_id).await?;
    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&state.orm)
        .await?;
    touch(state, &cart).await?;

    let cart = load_cart(state, cart).await?;
    Ok(ApiResponse::success("Cart cleared", cart, None))
}

async fn touch(state: &AppState, cart: &carts::Model) -> AppResult<()> {
    let mut active: carts::ActiveModel = cart.clone().into();
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;
    Ok(())
}

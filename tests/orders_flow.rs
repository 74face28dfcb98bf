use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::json;
use sorveteria_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    domain::{OrderStatus, Role},
    dto::{
        cart::AddToCartRequest,
        orders::{DirectOrderItem, DirectOrderRequest, PlaceOrderRequest, UpdateOrderStatusRequest},
    },
    entity::{
        OrderItems, Orders, StockRecords, order_items::Column as OrderItemCol,
        orders::Column as OrderCol, products, stock_records, users,
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{cart_service, direct_order_service, order_service, product_service, user_service},
    state::AppState,
};
use uuid::Uuid;

// Database flows. Each test creates its own users and products, so they can
// run in parallel against a shared database.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run order flow tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "segredo-de-teste".into(),
        jwt_ttl_hours: 1,
        notify_capacity: 8,
    };
    Ok(Some(AppState::without_notifications(pool, config)))
}

async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Teste {}", role.as_str())),
        email: Set(format!("{}@teste.sorveteria.com", Uuid::new_v4())),
        password_hash: Set("dummy".into()),
        role: Set(role),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

async fn create_product(state: &AppState, name: &str, cents: i64) -> anyhow::Result<Uuid> {
    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        price: Set(Some(Decimal::new(cents, 2))),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

async fn add_stock(state: &AppState, product_id: Uuid, quantity: i32) -> anyhow::Result<Uuid> {
    let record = stock_records::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        quantity: Set(quantity),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;
    Ok(record.id)
}

async fn tracked_stock(state: &AppState, record_id: Uuid) -> anyhow::Result<i32> {
    let record = StockRecords::find_by_id(record_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("stock record vanished"))?;
    Ok(record.quantity)
}

fn address() -> serde_json::Value {
    json!({ "rua": "Rua das Flores", "numero": "42", "cidade": "Campinas" })
}

async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<()> {
    cart_service::add_item(state, user, AddToCartRequest { product_id, quantity }).await?;
    Ok(())
}

async fn place_pending_order(state: &AppState, user: &AuthUser) -> anyhow::Result<Uuid> {
    let product = create_product(state, "Picolé de Uva", 700).await?;
    add_to_cart(state, user, product, 1).await?;
    let resp = order_service::place_from_cart(
        state,
        user,
        PlaceOrderRequest {
            delivery_address: address(),
        },
    )
    .await?;
    let placed = resp.data.ok_or_else(|| anyhow::anyhow!("missing order"))?;
    Ok(placed.order.id)
}

#[tokio::test]
async fn cart_checkout_prices_items_and_empties_the_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Cliente).await?;
    let chocolate = create_product(&state, "Sorvete de Chocolate", 1000).await?;
    let limao = create_product(&state, "Picolé de Limão", 500).await?;

    add_to_cart(&state, &customer, chocolate, 2).await?;
    add_to_cart(&state, &customer, limao, 1).await?;

    let resp = order_service::place_from_cart(
        &state,
        &customer,
        PlaceOrderRequest {
            delivery_address: address(),
        },
    )
    .await?;
    let placed = resp.data.ok_or_else(|| anyhow::anyhow!("missing order"))?;

    assert_eq!(placed.order.total_amount, Decimal::new(2500, 2));
    assert_eq!(placed.order.status, OrderStatus::Pendente);
    assert_eq!(placed.order.user_id, customer.user_id);
    assert_eq!(placed.items.len(), 2);

    let stored_items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(placed.order.id))
        .count(&state.orm)
        .await?;
    assert_eq!(stored_items, 2);

    let cart = cart_service::get_cart(&state, &customer)
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("missing cart"))?;
    assert!(cart.items.is_empty());
    assert_eq!(cart.subtotal, Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn empty_cart_creates_no_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Cliente).await?;
    cart_service::get_cart(&state, &customer).await?;

    let err = order_service::place_from_cart(
        &state,
        &customer,
        PlaceOrderRequest {
            delivery_address: address(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(customer.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(orders, 0);
    Ok(())
}

#[tokio::test]
async fn direct_order_decrements_stock_and_refuses_oversell() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let staff = create_user(&state, Role::Operador).await?;
    let customer = create_user(&state, Role::Cliente).await?;
    let acai = create_product(&state, "Açaí na Tigela", 1890).await?;
    let record = add_stock(&state, acai, 5).await?;

    let request = |quantity| DirectOrderRequest {
        user_id: customer.user_id,
        delivery_address: address(),
        items: vec![DirectOrderItem {
            product_id: acai,
            quantity,
        }],
        notes: Some("Entregar no balcão".into()),
    };

    let resp = direct_order_service::create_direct_order(&state, &staff, request(3)).await?;
    let placed = resp.data.ok_or_else(|| anyhow::anyhow!("missing order"))?;
    assert_eq!(placed.order.total_amount, Decimal::new(5670, 2));
    assert_eq!(placed.order.user_id, customer.user_id);
    assert_eq!(tracked_stock(&state, record).await?, 2);

    let before = Orders::find()
        .filter(OrderCol::UserId.eq(customer.user_id))
        .count(&state.orm)
        .await?;
    let err = direct_order_service::create_direct_order(&state, &staff, request(3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("Available: 2")));

    assert_eq!(tracked_stock(&state, record).await?, 2);
    let after = Orders::find()
        .filter(OrderCol::UserId.eq(customer.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn cart_checkout_does_not_touch_stock() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Cliente).await?;
    let sundae = create_product(&state, "Sundae", 1590).await?;
    let record = add_stock(&state, sundae, 4).await?;

    add_to_cart(&state, &customer, sundae, 2).await?;
    order_service::place_from_cart(
        &state,
        &customer,
        PlaceOrderRequest {
            delivery_address: address(),
        },
    )
    .await?;

    assert_eq!(tracked_stock(&state, record).await?, 4);
    Ok(())
}

#[tokio::test]
async fn owner_cancels_only_pending_orders() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Cliente).await?;
    let staff = create_user(&state, Role::Operador).await?;

    let pending = place_pending_order(&state, &customer).await?;
    let cancelled = order_service::cancel_order(&state, &customer, pending)
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("missing order"))?;
    assert_eq!(cancelled.status, OrderStatus::Cancelado);

    let shipped = place_pending_order(&state, &customer).await?;
    for status in ["processando", "enviado"] {
        order_service::update_status(
            &state,
            &staff,
            shipped,
            UpdateOrderStatusRequest {
                status: Some(status.into()),
            },
        )
        .await?;
    }
    let err = order_service::cancel_order(&state, &customer, shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn strangers_cannot_cancel_or_read_an_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, Role::Cliente).await?;
    let stranger = create_user(&state, Role::Cliente).await?;
    let order_id = place_pending_order(&state, &owner).await?;

    let err = order_service::cancel_order(&state, &stranger, order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = order_service::get_order(&state, &stranger, order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("order vanished"))?;
    assert_eq!(order.status, OrderStatus::Pendente);
    Ok(())
}

async fn set_status(
    state: &AppState,
    staff: &AuthUser,
    order_id: Uuid,
    status: &str,
) -> Result<OrderStatus, AppError> {
    let resp = order_service::update_status(
        state,
        staff,
        order_id,
        UpdateOrderStatusRequest {
            status: Some(status.into()),
        },
    )
    .await?;
    resp.data
        .map(|order| order.status)
        .ok_or_else(|| AppError::not_found("Order"))
}

#[tokio::test]
async fn staff_transitions_follow_the_lifecycle() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Cliente).await?;
    let staff = create_user(&state, Role::Admin).await?;
    let order_id = place_pending_order(&state, &customer).await?;

    let unknown = set_status(&state, &staff, order_id, "perdido").await.unwrap_err();
    assert!(matches!(unknown, AppError::Validation(_)));

    assert_eq!(
        set_status(&state, &staff, order_id, "processando").await?,
        OrderStatus::Processando
    );
    let backwards = set_status(&state, &staff, order_id, "pendente").await.unwrap_err();
    assert!(matches!(backwards, AppError::Validation(_)));

    assert!(
        set_status(&state, &staff, order_id, "entregue").await.is_err(),
        "processando cannot jump to entregue"
    );
    assert_eq!(
        set_status(&state, &staff, order_id, "enviado").await?,
        OrderStatus::Enviado
    );
    assert_eq!(
        set_status(&state, &staff, order_id, "entregue").await?,
        OrderStatus::Entregue
    );

    let terminal = set_status(&state, &staff, order_id, "cancelado").await.unwrap_err();
    assert!(matches!(terminal, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn unpriced_cart_item_rolls_back_the_checkout() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Cliente).await?;
    let flocos = create_product(&state, "Sorvete de Flocos", 1200).await?;
    add_to_cart(&state, &customer, flocos, 2).await?;

    products::ActiveModel {
        id: Set(flocos),
        price: Set(None),
        ..Default::default()
    }
    .update(&state.orm)
    .await?;

    let err = order_service::place_from_cart(
        &state,
        &customer,
        PlaceOrderRequest {
            delivery_address: address(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(customer.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(orders, 0);

    let cart = cart_service::get_cart(&state, &customer).await?;
    let cart = cart.data.ok_or_else(|| anyhow::anyhow!("missing cart"))?;
    assert_eq!(cart.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn ordered_product_cannot_be_deleted() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Cliente).await?;
    let admin = create_user(&state, Role::Admin).await?;
    let order_id = place_pending_order(&state, &customer).await?;
    let item = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("order has no items"))?;

    let err = product_service::delete_product(&state, &admin, item.product_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .count(&state.orm)
        .await?;
    assert_eq!(items, 1);
    Ok(())
}

#[tokio::test]
async fn customer_with_orders_cannot_be_deleted() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Cliente).await?;
    let admin = create_user(&state, Role::Admin).await?;
    let order_id = place_pending_order(&state, &customer).await?;

    let err = user_service::delete_user(&state, &admin, customer.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(Orders::find_by_id(order_id).one(&state.orm).await?.is_some());

    let newcomer = create_user(&state, Role::Cliente).await?;
    user_service::delete_user(&state, &admin, newcomer.user_id).await?;
    Ok(())
}

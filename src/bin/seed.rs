use rust_decimal::Decimal;
use sorveteria_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    domain::Role,
    services::auth_service::hash_password,
};
use uuid::Uuid;

/// Catalog seeded on an empty database: name, description, price in cents, stock.
const PRODUCTS: [(&str, &str, i64, i32); 6] = [
    ("Sorvete de Chocolate Belga", "Chocolate 70% cacau, pote de 500 ml", 2490, 40),
    ("Sorvete de Morango", "Morangos frescos com creme, pote de 500 ml", 2190, 35),
    ("Picolé de Limão", "Picolé de fruta, sem lactose", 650, 120),
    ("Açaí na Tigela", "Açaí 400 ml com granola e banana", 1890, 50),
    ("Sundae de Doce de Leite", "Sorvete de creme com calda de doce de leite", 1590, 30),
    ("Casquinha Baunilha", "Casquinha crocante com sorvete de baunilha", 500, 200),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(
        &pool,
        "Administrador",
        "admin@sorveteria.com",
        "admin123",
        Role::Admin,
    )
    .await?;
    let operator_id = ensure_user(
        &pool,
        "Operador",
        "operador@sorveteria.com",
        "operador123",
        Role::Operador,
    )
    .await?;
    let customer_id = ensure_user(
        &pool,
        "Cliente Teste",
        "cliente@sorveteria.com",
        "cliente123",
        Role::Cliente,
    )
    .await?;
    let seeded = seed_products(&pool).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Operador ID: {operator_id}, Cliente ID: {customer_id}, new products: {seeded}"
    );
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, updated_at = now()
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Inserts the catalog products that do not exist yet, each with one stock record.
async fn seed_products(pool: &DbPool) -> anyhow::Result<usize> {
    let mut inserted = 0;
    for (name, description, cents, stock) in PRODUCTS {
        let mut tx = pool.begin().await?;
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO products (id, name, description, price)
            SELECT $1, $2, $3, $4
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $2)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(Decimal::new(cents, 2))
        .fetch_optional(&mut *tx)
        .await?;

        if let Some((product_id,)) = row {
            sqlx::query(
                "INSERT INTO stock_records (id, product_id, quantity, location) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(product_id)
            .bind(stock)
            .bind("Freezer principal")
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }
        tx.commit().await?;
    }

    println!("Seeded products");
    Ok(inserted)
}

use user_management_api::{config::AppConfig, db::create_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    ensure_catalog_roles(&pool).await?;
    let alice_id = ensure_user(&pool, "Alice", "alice@example.com", 34).await?;
    let bob_id = ensure_user(&pool, "Bob", "bob@example.com", 27).await?;

    println!("Seed completed. Alice ID: {alice_id}, Bob ID: {bob_id}");
    Ok(())
}

/// The four catalog roles every fresh database carries. The migration seeds
/// them too; this keeps a wiped roles table usable without re-migrating.
async fn ensure_catalog_roles(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let roles = [
        (1, "User"),
        (2, "Admin"),
        (3, "Support"),
        (4, "SuperAdmin"),
    ];

    for (role_id, name) in roles {
        sqlx::query(
            r#"
            INSERT INTO roles (role_id, name)
            VALUES ($1, $2)
            ON CONFLICT (role_id) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(name)
        .execute(pool)
        .await?;
    }

    println!("Ensured catalog roles");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    age: i32,
) -> anyhow::Result<i32> {
    let row: (i32,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, age)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name, age = EXCLUDED.age
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(age)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email}");
    Ok(row.0)
}

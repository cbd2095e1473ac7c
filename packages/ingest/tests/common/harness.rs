//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container is shared by every test in the binary. Each test
//! gets its own freshly created database inside it, so table state never
//! leaks between tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use ingest_core::config::DatabaseConfig;
use ingest_core::PostgresLoader;
use sqlx::{Connection, PgConnection};
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    admin: DatabaseConfig,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

/// Suffix for per-test database names.
static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let admin = DatabaseConfig {
            host: postgres.get_host().await?.to_string(),
            port: postgres.get_host_port_ipv4(5432).await?,
            database: "postgres".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
        };

        Ok(Self {
            admin,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Per-test database plus helpers to read it back.
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &mut TestHarness) {
///     let loader = ctx.loader();
///     // ...
/// }
/// ```
pub struct TestHarness {
    pub database: DatabaseConfig,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Database is dropped with the container
    }
}

impl TestHarness {
    /// Create a fresh, empty database in the shared container.
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let name = format!(
            "ingest_test_{}_{}",
            std::process::id(),
            NEXT_DATABASE.fetch_add(1, Ordering::SeqCst)
        );

        let mut admin = PgConnection::connect_with(&infra.admin.connect_options())
            .await
            .context("Failed to connect to test Postgres")?;
        sqlx::query(&format!("CREATE DATABASE {}", name))
            .execute(&mut admin)
            .await
            .context("Failed to create test database")?;
        admin.close().await?;

        Ok(Self {
            database: DatabaseConfig {
                database: name,
                ..infra.admin.clone()
            },
        })
    }

    pub fn loader(&self) -> PostgresLoader {
        PostgresLoader::new(self.database.connect_options())
    }

    pub async fn connect(&self) -> PgConnection {
        PgConnection::connect_with(&self.database.connect_options())
            .await
            .expect("Failed to connect to test database")
    }
}

use wardrobe_core::config::AppConfig;
use wardrobe_db::repositories::{CategoryRepository, SqlCategoryRepository};
use wardrobe_db::DbPool;

use crate::commands::{
    build_runtime, connect_and_migrate, load_config, CommandResult, StepFailure,
    EXIT_VERIFICATION,
};

/// Preflight for `wardrobe-server`; the server itself is launched by its own binary.
pub fn run() -> CommandResult {
    let config = match load_config("start") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("start") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_and_migrate(&config).await?;
        let categories = category_count(&pool).await;
        pool.close().await;
        categories
    });

    match result {
        Ok(categories) => CommandResult::success("start", preflight_message(&config, categories)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("start", error_class, message, exit_code)
        }
    }
}

async fn category_count(pool: &DbPool) -> Result<usize, StepFailure> {
    let categories = SqlCategoryRepository::new(pool.clone()).list_all().await.map_err(|error| {
        ("schema_check", format!("category table is not queryable: {error}"), EXIT_VERIFICATION)
    })?;
    Ok(categories.len())
}

fn preflight_message(config: &AppConfig, categories: usize) -> String {
    let mut message = format!(
        "preflight passed; wardrobe-server will listen on {}:{}",
        config.server.bind_address, config.server.port
    );
    if categories == 0 {
        message.push_str(" (category catalog is empty; run `wardrobe seed`)");
    }
    message
}

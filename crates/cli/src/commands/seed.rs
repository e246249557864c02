use wardrobe_db::{CategorySeedDataset, DbPool, SeedResult};

use crate::commands::{
    build_runtime, connect_and_migrate, load_config, CommandResult, StepFailure, EXIT_MIGRATION,
    EXIT_VERIFICATION,
};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_and_migrate(&config).await?;

        let run_result = seed_catalog(&pool).await;
        pool.close().await;
        run_result
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", success_message(seeded)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

async fn seed_catalog(pool: &DbPool) -> Result<SeedResult, StepFailure> {
    let seeded = CategorySeedDataset::load(pool)
        .await
        .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))?;

    let verification = CategorySeedDataset::verify(pool)
        .await
        .map_err(|error| ("seed_verification", error.to_string(), EXIT_VERIFICATION))?;

    if !verification.all_present {
        let failed = verification
            .checks
            .iter()
            .filter_map(|(check, passed)| (!passed).then_some(*check))
            .collect::<Vec<_>>();
        return Err(("seed_verification", verification_message(&failed), EXIT_VERIFICATION));
    }
    Ok(seeded)
}

fn success_message(seeded: SeedResult) -> String {
    format!(
        "category catalog loaded: {} categories ({} roots, {} children)",
        seeded.categories_seeded,
        seeded.roots_seeded,
        seeded.categories_seeded - seeded.roots_seeded
    )
}

fn verification_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "some seed categories failed to load".to_string()
    } else {
        format!("seed verification failed for categories: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use wardrobe_db::SeedResult;

    use super::{success_message, verification_message};

    #[test]
    fn verification_message_names_failed_categories() {
        assert_eq!(
            verification_message(&["cat-tops", "cat-tops-tshirt"]),
            "seed verification failed for categories: cat-tops, cat-tops-tshirt"
        );
    }

    #[test]
    fn verification_message_falls_back_to_generic_without_labels() {
        assert_eq!(verification_message(&[]), "some seed categories failed to load");
    }

    #[test]
    fn success_message_splits_roots_and_children() {
        let message = success_message(SeedResult { categories_seeded: 20, roots_seeded: 6 });
        assert_eq!(message, "category catalog loaded: 20 categories (6 roots, 14 children)");
    }
}

use serde::Serialize;
use wardrobe_core::config::{AppConfig, LoadOptions};
use wardrobe_db::{connect_with_settings, migrations, CategorySeedDataset};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

const DATABASE_CHECKS: [&str; 3] = ["database_connectivity", "schema_migrations", "seed_catalog"];

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.extend(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in DATABASE_CHECKS {
                checks.push(skipped(name, "configuration did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: format!("skipped because {reason}"),
    }
}

/// Connectivity, schema and seed catalog checks; later checks are skipped once one fails.
fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![
                DoctorCheck {
                    name: "database_connectivity",
                    status: CheckStatus::Fail,
                    details: format!("failed to initialize async runtime: {error}"),
                },
                skipped("schema_migrations", "the async runtime did not start"),
                skipped("seed_catalog", "the async runtime did not start"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck {
                        name: "database_connectivity",
                        status: CheckStatus::Fail,
                        details: format!("failed to connect to database: {error}"),
                    },
                    skipped("schema_migrations", "the database is unreachable"),
                    skipped("seed_catalog", "the database is unreachable"),
                ];
            }
        };

        let mut checks = vec![DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`", config.database.url),
        }];

        match migrations::pending_versions(&pool).await {
            Ok(pending) if pending.is_empty() => {
                checks.push(DoctorCheck {
                    name: "schema_migrations",
                    status: CheckStatus::Pass,
                    details: "wardrobe schema is up to date".to_string(),
                });
                checks.push(check_seed_catalog(&pool).await);
            }
            Ok(pending) => {
                let versions: Vec<String> = pending.iter().map(i64::to_string).collect();
                checks.push(DoctorCheck {
                    name: "schema_migrations",
                    status: CheckStatus::Fail,
                    details: format!(
                        "pending migrations {}; run `wardrobe migrate`",
                        versions.join(", ")
                    ),
                });
                checks.push(skipped("seed_catalog", "the schema is not ready"));
            }
            Err(error) => {
                checks.push(DoctorCheck {
                    name: "schema_migrations",
                    status: CheckStatus::Fail,
                    details: format!("migration state could not be read: {error}"),
                });
                checks.push(skipped("seed_catalog", "the schema is not ready"));
            }
        }

        pool.close().await;
        checks
    })
}

async fn check_seed_catalog(pool: &wardrobe_db::DbPool) -> DoctorCheck {
    match CategorySeedDataset::verify(pool).await {
        Ok(verification) if verification.all_present => DoctorCheck {
            name: "seed_catalog",
            status: CheckStatus::Pass,
            details: format!("{} seed categories present", verification.checks.len()),
        },
        Ok(verification) => {
            let missing = verification.checks.iter().filter(|(_, present)| !present).count();
            DoctorCheck {
                name: "seed_catalog",
                status: CheckStatus::Fail,
                details: format!(
                    "{missing} of {} seed categories missing; run `wardrobe seed`",
                    verification.checks.len()
                ),
            }
        }
        Err(error) => DoctorCheck {
            name: "seed_catalog",
            status: CheckStatus::Fail,
            details: format!("seed catalog could not be read: {error}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::{render_human, CheckStatus, DoctorCheck, DoctorReport};

    #[test]
    fn human_report_marks_each_check() {
        let report = DoctorReport {
            overall_status: CheckStatus::Fail,
            summary: "doctor: one or more readiness checks failed".to_string(),
            checks: vec![
                DoctorCheck {
                    name: "config_validation",
                    status: CheckStatus::Pass,
                    details: "configuration loaded and validated".to_string(),
                },
                DoctorCheck {
                    name: "seed_catalog",
                    status: CheckStatus::Fail,
                    details: "3 of 40 seed categories missing; run `wardrobe seed`".to_string(),
                },
            ],
        };

        let rendered = render_human(&report);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "doctor: one or more readiness checks failed");
        assert_eq!(lines[1], "- [ok] config_validation: configuration loaded and validated");
        assert!(lines[2].starts_with("- [fail] seed_catalog: 3 of 40"));
    }
}

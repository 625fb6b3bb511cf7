use anyhow::Result;
use colored::Colorize;
use playback_core::domain::{SeedId, ValidationReport};
use playback_core::{generate_script, ResolvedConfig};
use playback_storage::{open_content_db_readonly, SqliteCourseContentRepository};

/// Generate a script from a course content database and print it as pretty JSON.
pub async fn generate(db: &str, course_code: &str, start_seed: u32, end_seed: u32) -> Result<()> {
    let repo = load_repo(db).await?;
    let script = generate_script(
        &repo,
        course_code,
        SeedId::new(start_seed),
        SeedId::new(end_seed),
        &ResolvedConfig::default(),
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&script)?);
    Ok(())
}

/// Generate a script and print its validation report, mirroring spec §4.1's
/// "diagnostic" output rather than the full wire script.
pub async fn validate(db: &str, course_code: &str, start_seed: u32, end_seed: u32) -> Result<()> {
    let repo = load_repo(db).await?;
    let script = generate_script(
        &repo,
        course_code,
        SeedId::new(start_seed),
        SeedId::new(end_seed),
        &ResolvedConfig::default(),
    )
    .await?;

    let report = ValidationReport::from_rounds(&script.rounds);

    if report.valid {
        println!(
            "{} {} rounds, no structural errors",
            "valid:".green().bold(),
            report.total_rounds
        );
    } else {
        println!(
            "{} {} rounds, {} issue(s)",
            "invalid:".red().bold(),
            report.total_rounds,
            report.errors.len()
        );
    }

    for entry in &report.errors {
        println!("  round {}: {:?}", entry.round_number, entry.issue);
    }

    if !report.valid {
        anyhow::bail!("validation failed");
    }
    Ok(())
}

async fn load_repo(db: &str) -> Result<SqliteCourseContentRepository> {
    let pool = open_content_db_readonly(db).await?;
    Ok(SqliteCourseContentRepository::new(pool))
}

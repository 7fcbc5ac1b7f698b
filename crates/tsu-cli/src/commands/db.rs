use anyhow::Result;
use tsu_config::DbConfig;

pub async fn status(cfg: &DbConfig) -> Result<()> {
    let pool = tsu_db::connect(cfg).await?;
    let s = tsu_db::status(&pool).await?;
    let stored = s
        .stored_players
        .map(|n| n.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    println!(
        "db_ok={} has_tournament_table={} stored_players={}",
        s.ok, s.has_tournament_table, stored
    );
    Ok(())
}

pub async fn migrate(cfg: &DbConfig) -> Result<()> {
    let pool = tsu_db::connect(cfg).await?;
    tsu_db::migrate(&pool).await?;
    tracing::info!("migrations applied");
    println!("migrations_applied=true");
    Ok(())
}

//! SQLite-backed rate catalog
//!
//! The engine itself never touches storage; this module lets a deployment
//! keep its hardware rate card in a small SQLite file instead of the
//! built-in defaults.

use anyhow::Result;
use rusqlite::Connection;

use crate::rates::{Environment, RateCard};

/// Initialize the catalog schema.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Hardware $/sqft by pixel pitch bucket and environment
        CREATE TABLE IF NOT EXISTS rates (
            pixel_pitch INTEGER NOT NULL,
            environment TEXT NOT NULL,
            rate_per_sqft REAL NOT NULL,
            PRIMARY KEY (pixel_pitch, environment)
        );
        "#,
    )?;
    Ok(())
}

/// Insert or replace one rate cell.
pub fn upsert_rate(conn: &Connection, pitch_mm: u32, env: Environment, rate: f64) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO rates (pixel_pitch, environment, rate_per_sqft)
         VALUES (?1, ?2, ?3)",
        (pitch_mm, env.as_str(), rate),
    )?;
    Ok(())
}

/// Clear all stored rates (for re-seeding).
pub fn clear_rates(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM rates", [])?;
    Ok(())
}

/// Write the built-in default card into the catalog.
pub fn seed_default_rates(conn: &Connection) -> Result<usize> {
    let card = RateCard::default();
    let mut count = 0;
    for (pitch, env, rate) in card.iter() {
        upsert_rate(conn, pitch, env, rate)?;
        count += 1;
    }
    Ok(count)
}

/// Load the stored rate card. Returns an empty card when the catalog holds
/// no rows; callers decide whether to fall back to the defaults.
pub fn load_rate_card(conn: &Connection) -> Result<RateCard> {
    let mut stmt =
        conn.prepare("SELECT pixel_pitch, environment, rate_per_sqft FROM rates ORDER BY pixel_pitch")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
        ))
    })?;

    let mut card = RateCard::new(Default::default());
    for row in rows {
        let (pitch, env_str, rate) = row?;
        let env = match env_str.as_str() {
            "Indoor" => Environment::Indoor,
            "Outdoor" => Environment::Outdoor,
            other => {
                log::warn!("skipping rate row with unknown environment {other:?}");
                continue;
            }
        };
        card.insert(pitch, env, rate);
    }
    Ok(card)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_and_load_round_trip() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        assert!(load_rate_card(&conn).unwrap().is_empty());

        let count = seed_default_rates(&conn).unwrap();
        assert_eq!(count, 8);

        let card = load_rate_card(&conn).unwrap();
        assert_eq!(card, RateCard::default());
    }

    #[test]
    fn upsert_overwrites_existing_cell() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        seed_default_rates(&conn).unwrap();

        upsert_rate(&conn, 10, Environment::Outdoor, 1950.0).unwrap();
        let card = load_rate_card(&conn).unwrap();
        let rate = card
            .iter()
            .find(|&(p, e, _)| p == 10 && e == Environment::Outdoor)
            .map(|(_, _, r)| r);
        assert_eq!(rate, Some(1950.0));
    }

    #[test]
    fn catalog_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.db");

        {
            let conn = Connection::open(&path).unwrap();
            init_schema(&conn).unwrap();
            seed_default_rates(&conn).unwrap();
        }

        let conn = Connection::open(&path).unwrap();
        init_schema(&conn).unwrap();
        let card = load_rate_card(&conn).unwrap();
        assert_eq!(card, RateCard::default());
    }

    #[test]
    fn clear_empties_the_catalog() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        seed_default_rates(&conn).unwrap();
        clear_rates(&conn).unwrap();
        assert!(load_rate_card(&conn).unwrap().is_empty());
    }
}

//! V002: scoring frequency table.
//! One row per (team, variable, value) with smoothed won/lost counts.

pub const MIGRATION_SQL: &str = r#"
-- team_id NULL is the bucket of leads without a team.
-- Counts are kept >= 0.1 by the engine; the CHECK guards against
-- writers that bypass it.
CREATE TABLE IF NOT EXISTS scoring_frequencies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    team_id INTEGER REFERENCES teams(id) ON DELETE CASCADE,
    variable TEXT NOT NULL,
    value TEXT NOT NULL,
    won_count REAL NOT NULL DEFAULT 0.1 CHECK (won_count >= 0.1),
    lost_count REAL NOT NULL DEFAULT 0.1 CHECK (lost_count >= 0.1)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_scoring_frequencies_variable
    ON scoring_frequencies(variable, team_id);
"#;

//! V001: CRM records the scoring engine reads.
//! teams, stages, tags, leads, lead_tags.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1
) STRICT;

-- Pipeline stages. team_id NULL = shared by every team.
CREATE TABLE IF NOT EXISTS stages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    sequence INTEGER NOT NULL DEFAULT 1,
    team_id INTEGER REFERENCES teams(id) ON DELETE SET NULL,
    is_won INTEGER NOT NULL DEFAULT 0
) STRICT;

CREATE INDEX IF NOT EXISTS idx_stages_sequence ON stages(sequence, id);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
) STRICT;

-- Leads / opportunities. Categorical columns hold foreign ids or short
-- normalized strings; probability columns are written by the engine.
CREATE TABLE IF NOT EXISTS leads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL DEFAULT '',
    stage_id INTEGER REFERENCES stages(id) ON DELETE SET NULL,
    team_id INTEGER REFERENCES teams(id) ON DELETE SET NULL,
    country_id INTEGER,
    state_id INTEGER,
    lang_id INTEGER,
    source_id INTEGER,
    medium_id INTEGER,
    campaign_id INTEGER,
    email_state TEXT CHECK (email_state IN ('correct', 'incorrect')),
    phone_state TEXT CHECK (phone_state IN ('correct', 'incorrect')),
    probability REAL CHECK (probability BETWEEN 0 AND 100),
    automated_probability REAL CHECK (automated_probability BETWEEN 0 AND 100),
    active INTEGER NOT NULL DEFAULT 1,
    create_date INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_leads_create_date ON leads(create_date);
CREATE INDEX IF NOT EXISTS idx_leads_probability ON leads(probability);
CREATE INDEX IF NOT EXISTS idx_leads_team ON leads(team_id);

CREATE TABLE IF NOT EXISTS lead_tags (
    lead_id INTEGER NOT NULL REFERENCES leads(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (lead_id, tag_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_lead_tags_tag ON lead_tags(tag_id);
"#;

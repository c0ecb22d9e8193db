use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

/// A named migration step: `(name, sql)`.
type Migration = (&'static str, &'static str);

const MIGRATIONS: &[Migration] = &[("0001_schema", SCHEMA_SQL), ("0002_seeds", SEEDS_SQL)];

/// Run the idempotent bootstrapper: ensure the `_migrations` ledger exists,
/// then apply every step that has not been recorded yet.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !already_applied {
            conn.execute_batch(sql)
                .with_context(|| format!("running migration {name}"))?;
            conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])?;
            info!("Applied migration: {name}");
        }
    }

    Ok(())
}

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id          TEXT PRIMARY KEY,
        username    TEXT NOT NULL UNIQUE,
        email       TEXT NOT NULL UNIQUE,
        password    TEXT NOT NULL,
        is_admin    INTEGER NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS timelines (
        id              TEXT PRIMARY KEY,
        user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name            TEXT NOT NULL,
        wedding_date    TEXT NOT NULL,
        day_start_hour  INTEGER NOT NULL DEFAULT 6,
        day_end_hour    INTEGER NOT NULL DEFAULT 24,
        created_at      TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX IF NOT EXISTS idx_timelines_user
        ON timelines(user_id, created_at);

    CREATE TABLE IF NOT EXISTS events (
        id          TEXT PRIMARY KEY,
        timeline_id TEXT NOT NULL REFERENCES timelines(id) ON DELETE CASCADE,
        title       TEXT NOT NULL,
        start_time  TEXT NOT NULL,
        end_time    TEXT NOT NULL,
        category    TEXT,
        color       TEXT,
        notes       TEXT,
        created_at  TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX IF NOT EXISTS idx_events_timeline
        ON events(timeline_id, start_time);

    CREATE TABLE IF NOT EXISTS restrictions (
        id          TEXT PRIMARY KEY,
        timeline_id TEXT NOT NULL REFERENCES timelines(id) ON DELETE CASCADE,
        name        TEXT NOT NULL,
        start_time  TEXT NOT NULL,
        end_time    TEXT NOT NULL,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX IF NOT EXISTS idx_restrictions_timeline
        ON restrictions(timeline_id);

    CREATE TABLE IF NOT EXISTS templates (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT,
        created_at  TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS template_events (
        id          TEXT PRIMARY KEY,
        template_id TEXT NOT NULL REFERENCES templates(id) ON DELETE CASCADE,
        title       TEXT NOT NULL,
        start_time  TEXT NOT NULL,
        end_time    TEXT NOT NULL,
        category    TEXT,
        color       TEXT,
        notes       TEXT,
        sort_order  INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_template_events_template
        ON template_events(template_id, sort_order);

    CREATE TABLE IF NOT EXISTS questions (
        id                  TEXT PRIMARY KEY,
        prompt              TEXT NOT NULL,
        category            TEXT,
        default_title       TEXT NOT NULL,
        default_start_time  TEXT NOT NULL,
        default_end_time    TEXT NOT NULL,
        default_color       TEXT,
        sort_order          INTEGER NOT NULL DEFAULT 0,
        active              INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS question_responses (
        id          TEXT PRIMARY KEY,
        user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        timeline_id TEXT NOT NULL REFERENCES timelines(id) ON DELETE CASCADE,
        question_id TEXT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
        answer      INTEGER NOT NULL,
        created_at  TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(timeline_id, question_id)
    );

    CREATE TABLE IF NOT EXISTS password_reset_tokens (
        id          TEXT PRIMARY KEY,
        user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        token_hash  TEXT NOT NULL UNIQUE,
        expires_at  TEXT NOT NULL,
        used_at     TEXT,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX IF NOT EXISTS idx_reset_tokens_user
        ON password_reset_tokens(user_id);

    CREATE TABLE IF NOT EXISTS email_templates (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL UNIQUE,
        subject     TEXT NOT NULL,
        body        TEXT NOT NULL,
        updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS settings (
        key         TEXT PRIMARY KEY,
        value       TEXT NOT NULL,
        updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS share_tokens (
        id          TEXT PRIMARY KEY,
        timeline_id TEXT NOT NULL REFERENCES timelines(id) ON DELETE CASCADE,
        token       TEXT NOT NULL UNIQUE,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );
";

/// Rows a fresh install starts with: settings, the transactional email
/// bodies, one starter template, and a handful of guided questions.
/// Everything is keyed on fixed ids so re-running is a no-op.
const SEEDS_SQL: &str = "
    INSERT OR IGNORE INTO settings (key, value) VALUES
        ('site_name', 'Vowline'),
        ('registration_enabled', 'true'),
        ('default_day_start_hour', '6'),
        ('default_day_end_hour', '24');

    INSERT OR IGNORE INTO email_templates (id, name, subject, body) VALUES
        ('00000000-0000-0000-0000-000000000301', 'password_reset',
         'Reset your {{site_name}} password',
         'Hi {{username}},

Someone asked to reset the password for your {{site_name}} account.
Follow this link within the next 60 minutes to choose a new one:

{{reset_url}}

If this was not you, ignore this email and your password stays unchanged.'),
        ('00000000-0000-0000-0000-000000000302', 'welcome',
         'Welcome to {{site_name}}',
         'Hi {{username}},

Your {{site_name}} account is ready. Create a timeline for your big day,
drop in the blocks that matter, and share the plan with your vendors.');

    INSERT OR IGNORE INTO templates (id, name, description) VALUES
        ('00000000-0000-0000-0000-000000000001', 'Classic full day',
         'A traditional schedule from morning preparations to the send-off.');

    INSERT OR IGNORE INTO template_events
        (id, template_id, title, start_time, end_time, category, color, sort_order) VALUES
        ('00000000-0000-0000-0000-000000000101', '00000000-0000-0000-0000-000000000001',
         'Hair & makeup', '09:00', '12:00', 'preparation', '#f7c8d8', 10),
        ('00000000-0000-0000-0000-000000000102', '00000000-0000-0000-0000-000000000001',
         'Getting dressed', '12:00', '13:00', 'preparation', '#f7c8d8', 20),
        ('00000000-0000-0000-0000-000000000103', '00000000-0000-0000-0000-000000000001',
         'First look', '13:30', '14:00', 'photos', '#c8d8f7', 30),
        ('00000000-0000-0000-0000-000000000104', '00000000-0000-0000-0000-000000000001',
         'Wedding party photos', '14:00', '15:00', 'photos', '#c8d8f7', 40),
        ('00000000-0000-0000-0000-000000000105', '00000000-0000-0000-0000-000000000001',
         'Ceremony', '15:30', '16:15', 'ceremony', '#d8f7c8', 50),
        ('00000000-0000-0000-0000-000000000106', '00000000-0000-0000-0000-000000000001',
         'Cocktail hour', '16:30', '17:30', 'reception', '#f7e8c8', 60),
        ('00000000-0000-0000-0000-000000000107', '00000000-0000-0000-0000-000000000001',
         'Dinner & toasts', '18:00', '20:00', 'reception', '#f7e8c8', 70),
        ('00000000-0000-0000-0000-000000000108', '00000000-0000-0000-0000-000000000001',
         'Dancing', '20:00', '23:00', 'reception', '#e8c8f7', 80),
        ('00000000-0000-0000-0000-000000000109', '00000000-0000-0000-0000-000000000001',
         'Send-off', '23:00', '23:30', 'reception', '#e8c8f7', 90);

    INSERT OR IGNORE INTO questions
        (id, prompt, category, default_title, default_start_time, default_end_time,
         default_color, sort_order) VALUES
        ('00000000-0000-0000-0000-000000000201',
         'Will hair and makeup happen on site?', 'preparation',
         'Hair & makeup', '08:00', '11:00', '#f7c8d8', 10),
        ('00000000-0000-0000-0000-000000000202',
         'Will you have a first look before the ceremony?', 'photos',
         'First look', '13:30', '14:00', '#c8d8f7', 20),
        ('00000000-0000-0000-0000-000000000203',
         'Are you planning a sparkler send-off?', 'reception',
         'Sparkler send-off', '22:30', '23:00', '#e8c8f7', 30);
";

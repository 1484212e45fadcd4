use rusqlite::Connection;
use tracing::debug;

use super::error::{SqliteDaoError, SqliteResult};

pub fn run(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            created_at  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rooms (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            host_id             INTEGER NOT NULL REFERENCES users(id),
            title               TEXT NOT NULL,
            time_per_question   INTEGER NOT NULL DEFAULT 30 CHECK (time_per_question >= 1),
            start_time          INTEGER,
            is_public           INTEGER NOT NULL DEFAULT 1,
            is_published        INTEGER NOT NULL DEFAULT 0,
            created_at          INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS questions (
            id                      INTEGER PRIMARY KEY AUTOINCREMENT,
            room_id                 INTEGER NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
            question_text           TEXT NOT NULL,
            options                 TEXT NOT NULL,
            correct_answer_index    INTEGER NOT NULL,
            order_index             INTEGER NOT NULL,
            image_url               TEXT,
            created_at              INTEGER NOT NULL,
            UNIQUE(room_id, order_index)
        );

        CREATE TABLE IF NOT EXISTS participants (
            room_id     INTEGER NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
            user_id     INTEGER NOT NULL REFERENCES users(id),
            total_score INTEGER NOT NULL DEFAULT 0,
            position    INTEGER,
            joined_at   INTEGER NOT NULL,
            PRIMARY KEY (room_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS answers (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            room_id         INTEGER NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
            question_id     INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            selected_index  INTEGER NOT NULL,
            is_correct      INTEGER NOT NULL,
            score           INTEGER NOT NULL,
            created_at      INTEGER NOT NULL,
            UNIQUE(room_id, question_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_answers_user
            ON answers(user_id, room_id);
        ",
    )
    .map_err(|source| SqliteDaoError::Migrate { source })?;

    debug!("SQLite schema is up to date");
    Ok(())
}

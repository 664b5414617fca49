use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS posts (
            id          INTEGER PRIMARY KEY,
            title       TEXT NOT NULL,
            content     TEXT NOT NULL,
            published   INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            owner_id    INTEGER NOT NULL
                            REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_posts_owner
            ON posts(owner_id);

        CREATE TABLE IF NOT EXISTS votes (
            user_id     INTEGER NOT NULL
                            REFERENCES users(id) ON DELETE CASCADE,
            post_id     INTEGER NOT NULL
                            REFERENCES posts(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, post_id)
        );

        CREATE INDEX IF NOT EXISTS idx_votes_post
            ON votes(post_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

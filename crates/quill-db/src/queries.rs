use rusqlite::{OptionalExtension, Row};

use crate::models::{PostRow, PostWithVotes, UserRow};
use crate::{Database, Result, StoreError};

fn user_from_row(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn post_from_row(row: &Row) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        published: row.get(3)?,
        created_at: row.get(4)?,
        owner_id: row.get(5)?,
    })
}

fn post_with_votes_from_row(row: &Row) -> rusqlite::Result<PostWithVotes> {
    Ok(PostWithVotes {
        post: post_from_row(row)?,
        owner_email: row.get(6)?,
        owner_created_at: row.get(7)?,
        votes: row.get(8)?,
    })
}

/// Shared SELECT head for the vote-annotated post view: post columns, owner
/// columns, and the upvote count via a left outer join grouped by post id.
/// Posts with zero votes still appear, with count 0.
const POST_VIEW_SELECT: &str = "
    SELECT p.id, p.title, p.content, p.published, p.created_at, p.owner_id,
           u.email, u.created_at,
           COUNT(v.user_id) AS votes
    FROM posts p
    JOIN users u ON u.id = p.owner_id
    LEFT JOIN votes v ON v.post_id = p.id";

impl Database {
    // -- Users --

    /// Fails with `StoreError::Conflict` when the email is already taken.
    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<UserRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                "INSERT INTO users (email, password) VALUES (?1, ?2)
                 RETURNING id, email, password, created_at",
                (email, password_hash),
                user_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, email, password, created_at FROM users WHERE email = ?1",
                    [email],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, email, password, created_at FROM users WHERE id = ?1",
                    [id],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Deletes a user; posts and votes cascade via foreign keys.
    pub fn delete_user(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    // -- Posts --

    pub fn create_post(
        &self,
        owner_id: i64,
        title: &str,
        content: &str,
        published: bool,
    ) -> Result<PostRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                "INSERT INTO posts (title, content, published, owner_id)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, title, content, published, created_at, owner_id",
                (title, content, published, owner_id),
                post_from_row,
            )?;
            Ok(row)
        })
    }

    /// Bare post row, used for existence and ownership checks.
    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, title, content, published, created_at, owner_id
                     FROM posts WHERE id = ?1",
                    [id],
                    post_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_post_with_votes(&self, id: i64) -> Result<Option<PostWithVotes>> {
        let sql = format!(
            "{POST_VIEW_SELECT}
             WHERE p.id = ?1
             GROUP BY p.id"
        );
        self.with_conn(|conn| {
            let row = conn
                .query_row(&sql, [id], post_with_votes_from_row)
                .optional()?;
            Ok(row)
        })
    }

    /// Case-sensitive substring match on title (`instr`, since LIKE folds
    /// ASCII case); the empty string matches every post. Ordered by post id,
    /// which is insertion order.
    pub fn list_posts(&self, search: &str, limit: i64, offset: i64) -> Result<Vec<PostWithVotes>> {
        let sql = format!(
            "{POST_VIEW_SELECT}
             WHERE (?1 = '' OR instr(p.title, ?1) > 0)
             GROUP BY p.id
             ORDER BY p.id
             LIMIT ?2 OFFSET ?3"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![search, limit, offset], post_with_votes_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Replaces title/content/published atomically. `NotFound` if the id is
    /// absent (ownership is the caller's concern).
    pub fn update_post(
        &self,
        id: i64,
        title: &str,
        content: &str,
        published: bool,
    ) -> Result<PostRow> {
        self.with_conn(|conn| {
            conn.query_row(
                "UPDATE posts SET title = ?2, content = ?3, published = ?4
                 WHERE id = ?1
                 RETURNING id, title, content, published, created_at, owner_id",
                (id, title, content, published),
                post_from_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound)
        })
    }

    /// Deletes a post; dependent vote rows cascade.
    pub fn delete_post(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    // -- Vote ledger --

    /// Single-row insert; the composite primary key turns a duplicate vote
    /// (including one lost to a concurrent race) into `Conflict`.
    pub fn insert_vote(&self, user_id: i64, post_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO votes (user_id, post_id) VALUES (?1, ?2)",
                (user_id, post_id),
            )?;
            Ok(())
        })
    }

    /// Single-row delete; `NotFound` when the pair was already unvoted.
    pub fn delete_vote(&self, user_id: i64, post_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM votes WHERE user_id = ?1 AND post_id = ?2",
                (user_id, post_id),
            )?;
            if affected == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, StoreError};

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_user(db: &Database, email: &str) -> i64 {
        db.create_user(email, "not-a-real-hash").unwrap().id
    }

    fn seed_post(db: &Database, owner_id: i64, title: &str) -> i64 {
        db.create_post(owner_id, title, "content", true).unwrap().id
    }

    #[test]
    fn duplicate_email_conflicts() {
        let db = db();
        seed_user(&db, "a@example.com");
        let err = db.create_user("a@example.com", "hash2").unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[test]
    fn vote_ledger_state_machine() {
        let db = db();
        let user = seed_user(&db, "a@example.com");
        let post = seed_post(&db, user, "hello");

        // Unvoted -> Voted
        db.insert_vote(user, post).unwrap();
        // Voted + upvote intent = conflict, no mutation
        assert!(matches!(
            db.insert_vote(user, post).unwrap_err(),
            StoreError::Conflict
        ));
        // Voted -> Unvoted
        db.delete_vote(user, post).unwrap();
        // Unvoted + remove intent = not found
        assert!(matches!(
            db.delete_vote(user, post).unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[test]
    fn vote_counts_reflect_ledger() {
        let db = db();
        let alice = seed_user(&db, "alice@example.com");
        let bob = seed_user(&db, "bob@example.com");
        let voted = seed_post(&db, alice, "popular");
        let unvoted = seed_post(&db, alice, "quiet");

        db.insert_vote(alice, voted).unwrap();
        db.insert_vote(bob, voted).unwrap();

        let view = db.get_post_with_votes(voted).unwrap().unwrap();
        assert_eq!(view.votes, 2);
        assert_eq!(view.owner_email, "alice@example.com");

        // Zero-vote posts still appear in the listing, with count 0
        let all = db.list_posts("", 10, 0).unwrap();
        assert_eq!(all.len(), 2);
        let quiet = all.iter().find(|p| p.post.id == unvoted).unwrap();
        assert_eq!(quiet.votes, 0);
    }

    #[test]
    fn list_search_is_case_sensitive_substring() {
        let db = db();
        let user = seed_user(&db, "a@example.com");
        seed_post(&db, user, "Rust is great");
        seed_post(&db, user, "rust is lowercase");
        seed_post(&db, user, "unrelated");

        let hits = db.list_posts("Rust", 10, 0).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].post.title, "Rust is great");

        // Empty search matches all
        assert_eq!(db.list_posts("", 10, 0).unwrap().len(), 3);
    }

    #[test]
    fn list_pagination_in_insertion_order() {
        let db = db();
        let user = seed_user(&db, "a@example.com");
        for i in 0..5 {
            seed_post(&db, user, &format!("post {i}"));
        }

        let page = db.list_posts("", 2, 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].post.title, "post 2");
        assert_eq!(page[1].post.title, "post 3");
    }

    #[test]
    fn deleting_post_cascades_votes() {
        let db = db();
        let user = seed_user(&db, "a@example.com");
        let post = seed_post(&db, user, "doomed");
        db.insert_vote(user, post).unwrap();

        db.delete_post(post).unwrap();

        // Vote rows are gone with the post
        assert!(matches!(
            db.delete_vote(user, post).unwrap_err(),
            StoreError::NotFound
        ));
        assert!(db.get_post_with_votes(post).unwrap().is_none());
    }

    #[test]
    fn deleting_user_cascades_posts_and_votes() {
        let db = db();
        let alice = seed_user(&db, "alice@example.com");
        let bob = seed_user(&db, "bob@example.com");
        let post = seed_post(&db, alice, "alice's post");
        db.insert_vote(bob, post).unwrap();

        db.delete_user(alice).unwrap();

        assert!(db.get_post(post).unwrap().is_none());
        assert!(matches!(
            db.delete_vote(bob, post).unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[test]
    fn update_missing_post_is_not_found() {
        let db = db();
        let err = db.update_post(999, "t", "c", true).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn update_replaces_fields() {
        let db = db();
        let user = seed_user(&db, "a@example.com");
        let post = seed_post(&db, user, "before");

        let updated = db.update_post(post, "after", "new content", false).unwrap();
        assert_eq!(updated.title, "after");
        assert_eq!(updated.content, "new content");
        assert!(!updated.published);
        assert_eq!(updated.owner_id, user);
    }
}

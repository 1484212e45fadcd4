use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use futures::future::BoxFuture;
use rusqlite::{
    Connection, OptionalExtension, Row, TransactionBehavior, params, types::Type,
};
use tracing::info;

use super::{
    error::{SqliteDaoError, SqliteResult},
    migrations,
};
use crate::dao::{
    models::{
        AnswerEntity, AnswerRecordEntity, FeedRoomEntity, GlobalLeaderboardRowEntity,
        LeaderboardRowEntity, NewQuestionEntity, NewRoomEntity, ParticipantEntity,
        QuestionEntity, RoomEntity, RoomProgressEntity, UserEntity,
    },
    quiz_store::QuizStore,
    storage::StorageResult,
};

const IN_MEMORY: &str = ":memory:";

const ROOM_COLUMNS: &str =
    "id, host_id, title, time_per_question, start_time, is_public, is_published, created_at";
const QUESTION_COLUMNS: &str =
    "id, room_id, order_index, question_text, options, correct_answer_index, image_url";

const RANKED_MEMBERS_SQL: &str = "
    WITH members AS (
        SELECT user_id FROM participants WHERE room_id = ?1
        UNION
        SELECT user_id FROM answers WHERE room_id = ?1
    )
    SELECT m.user_id,
           COALESCE(SUM(a.score), 0) AS score,
           ROW_NUMBER() OVER (
               ORDER BY COALESCE(SUM(a.score), 0) DESC,
                        COALESCE(SUM(a.is_correct), 0) DESC,
                        COUNT(a.id) DESC,
                        u.username ASC,
                        m.user_id ASC
           ) AS position
    FROM members m
    JOIN users u ON u.id = m.user_id
    LEFT JOIN answers a ON a.room_id = ?1 AND a.user_id = m.user_id
    GROUP BY m.user_id, u.username";

const ROOM_LEADERBOARD_SQL: &str = "
    SELECT a.user_id,
           u.username,
           COALESCE(SUM(a.score), 0) AS score,
           COALESCE(SUM(a.is_correct), 0) AS correct,
           COUNT(*) AS answered
    FROM answers a
    JOIN users u ON u.id = a.user_id
    WHERE a.room_id = ?1
    GROUP BY a.user_id, u.username
    ORDER BY score DESC, correct DESC, answered DESC, u.username ASC, a.user_id ASC";

const GLOBAL_LEADERBOARD_SQL: &str = "
    SELECT a.user_id,
           u.username,
           COALESCE(SUM(a.score), 0) AS score,
           COALESCE(SUM(a.is_correct), 0) AS correct,
           COUNT(*) AS answered,
           COUNT(DISTINCT a.room_id) AS rooms_played
    FROM answers a
    JOIN users u ON u.id = a.user_id
    GROUP BY a.user_id, u.username
    ORDER BY score DESC, correct DESC, answered DESC, u.username ASC, a.user_id ASC";

const FEED_ROOMS_SQL: &str = "
    SELECT r.id,
           r.title,
           r.is_public,
           r.start_time,
           r.time_per_question,
           (SELECT COUNT(*) FROM questions q WHERE q.room_id = r.id) AS question_count,
           (SELECT COUNT(*) FROM participants p WHERE p.room_id = r.id) AS participant_count
    FROM rooms r
    WHERE ((r.is_public = 1 AND r.is_published = 1)
           OR (r.is_public = 0 AND r.start_time IS NOT NULL))
      AND EXISTS (SELECT 1 FROM questions q WHERE q.room_id = r.id)
    ORDER BY r.created_at DESC, r.id DESC";

/// SQLite-backed [`QuizStore`] sharing a single connection behind a mutex.
#[derive(Clone)]
pub struct SqliteQuizStore {
    inner: Arc<SqliteInner>,
}

struct SqliteInner {
    conn: Mutex<Connection>,
    location: String,
}

impl SqliteQuizStore {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> SqliteResult<Self> {
        let location = path.as_ref().display().to_string();
        let conn = open_connection(&location)?;
        info!(location = %location, "SQLite database opened");
        Ok(Self {
            inner: Arc::new(SqliteInner {
                conn: Mutex::new(conn),
                location,
            }),
        })
    }

    /// Open a private in-memory database, mostly useful for tests.
    pub fn open_in_memory() -> SqliteResult<Self> {
        Self::open(IN_MEMORY)
    }

    /// Run raw SQL against the connection.
    #[cfg(test)]
    pub(crate) async fn execute_batch(&self, sql: &'static str) -> SqliteResult<()> {
        self.blocking("execute_batch", move |conn| conn.execute_batch(sql)).await
    }

    async fn blocking<T, F>(&self, op: &'static str, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut conn = inner.conn.lock().map_err(|_| SqliteDaoError::Poisoned)?;
            f(&mut conn).map_err(|source| SqliteDaoError::Query { op, source })
        })
        .await
        .map_err(|source| SqliteDaoError::Join { op, source })?
    }

    async fn find_user(&self, user_id: i64) -> SqliteResult<Option<UserEntity>> {
        self.blocking("find_user", move |conn| {
            conn.query_row(
                "SELECT id, username FROM users WHERE id = ?1",
                [user_id],
                |row| {
                    Ok(UserEntity {
                        id: row.get(0)?,
                        username: row.get(1)?,
                    })
                },
            )
            .optional()
        })
        .await
    }

    async fn upsert_user(&self, user: UserEntity) -> SqliteResult<()> {
        self.blocking("upsert_user", move |conn| {
            conn.execute(
                "INSERT INTO users (id, username, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (id) DO UPDATE SET username = excluded.username",
                params![user.id, user.username, to_millis(SystemTime::now())],
            )?;
            Ok(())
        })
        .await
    }

    async fn create_room(&self, room: NewRoomEntity) -> SqliteResult<RoomEntity> {
        self.blocking("create_room", move |conn| {
            let sql = format!(
                "INSERT INTO rooms (host_id, title, time_per_question, start_time, is_public, is_published, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
                 RETURNING {ROOM_COLUMNS}"
            );
            conn.query_row(
                &sql,
                params![
                    room.host_id,
                    room.title,
                    room.time_per_question,
                    room.start_time.map(to_millis),
                    room.is_public,
                    to_millis(SystemTime::now()),
                ],
                map_room,
            )
        })
        .await
    }

    async fn find_room(&self, room_id: i64) -> SqliteResult<Option<RoomEntity>> {
        self.blocking("find_room", move |conn| {
            let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?1");
            conn.query_row(&sql, [room_id], map_room).optional()
        })
        .await
    }

    async fn schedule_room(&self, room_id: i64, start_time: Option<SystemTime>) -> SqliteResult<bool> {
        self.blocking("schedule_room", move |conn| {
            let changed = conn.execute(
                "UPDATE rooms SET start_time = ?2 WHERE id = ?1",
                params![room_id, start_time.map(to_millis)],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn publish_room(&self, room_id: i64) -> SqliteResult<bool> {
        self.blocking("publish_room", move |conn| {
            let changed = conn.execute("UPDATE rooms SET is_published = 1 WHERE id = ?1", [room_id])?;
            Ok(changed > 0)
        })
        .await
    }

    async fn list_feed_rooms(&self) -> SqliteResult<Vec<FeedRoomEntity>> {
        self.blocking("list_feed_rooms", |conn| {
            let mut stmt = conn.prepare_cached(FEED_ROOMS_SQL)?;
            let rows = stmt.query_map([], |row| {
                Ok(FeedRoomEntity {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    is_public: row.get(2)?,
                    start_time: row.get::<_, Option<i64>>(3)?.map(from_millis),
                    time_per_question: row.get(4)?,
                    question_count: row.get(5)?,
                    participant_count: row.get(6)?,
                })
            })?;
            rows.collect()
        })
        .await
    }

    async fn add_question(&self, question: NewQuestionEntity) -> SqliteResult<QuestionEntity> {
        self.blocking("add_question", move |conn| {
            let options = serde_json::to_string(&question.options)
                .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
            // The next order index is computed inside the insert so concurrent
            // appends to the same room cannot pick the same value.
            let sql = format!(
                "INSERT INTO questions (room_id, question_text, options, correct_answer_index, order_index, image_url, created_at)
                 SELECT ?1, ?2, ?3, ?4, COALESCE(MAX(order_index), 0) + 1, ?5, ?6
                 FROM questions WHERE room_id = ?1
                 RETURNING {QUESTION_COLUMNS}"
            );
            conn.query_row(
                &sql,
                params![
                    question.room_id,
                    question.text,
                    options,
                    question.correct_answer_index,
                    question.image_url,
                    to_millis(SystemTime::now()),
                ],
                map_question,
            )
        })
        .await
    }

    async fn find_question(&self, room_id: i64, question_id: i64) -> SqliteResult<Option<QuestionEntity>> {
        self.blocking("find_question", move |conn| {
            let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1 AND room_id = ?2");
            conn.query_row(&sql, params![question_id, room_id], map_question)
                .optional()
        })
        .await
    }

    async fn list_questions(&self, room_id: i64) -> SqliteResult<Vec<QuestionEntity>> {
        self.blocking("list_questions", move |conn| {
            let sql = format!(
                "SELECT {QUESTION_COLUMNS} FROM questions WHERE room_id = ?1 ORDER BY order_index ASC, id ASC"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map([room_id], map_question)?;
            rows.collect()
        })
        .await
    }

    async fn count_questions(&self, room_id: i64) -> SqliteResult<u64> {
        self.blocking("count_questions", move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM questions WHERE room_id = ?1",
                [room_id],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    async fn join_room(&self, room_id: i64, user_id: i64) -> SqliteResult<bool> {
        self.blocking("join_room", move |conn| {
            let inserted = conn.execute(
                "INSERT INTO participants (room_id, user_id, total_score, position, joined_at)
                 VALUES (?1, ?2, 0, NULL, ?3)
                 ON CONFLICT (room_id, user_id) DO NOTHING",
                params![room_id, user_id, to_millis(SystemTime::now())],
            )?;
            Ok(inserted > 0)
        })
        .await
    }

    async fn leave_room(&self, room_id: i64, user_id: i64) -> SqliteResult<bool> {
        self.blocking("leave_room", move |conn| {
            let removed = conn.execute(
                "DELETE FROM participants WHERE room_id = ?1 AND user_id = ?2",
                params![room_id, user_id],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn find_participant(&self, room_id: i64, user_id: i64) -> SqliteResult<Option<ParticipantEntity>> {
        self.blocking("find_participant", move |conn| {
            conn.query_row(
                "SELECT room_id, user_id, total_score, position, joined_at
                 FROM participants WHERE room_id = ?1 AND user_id = ?2",
                params![room_id, user_id],
                |row| {
                    Ok(ParticipantEntity {
                        room_id: row.get(0)?,
                        user_id: row.get(1)?,
                        total_score: row.get(2)?,
                        position: row.get(3)?,
                        joined_at: from_millis(row.get(4)?),
                    })
                },
            )
            .optional()
        })
        .await
    }

    async fn upsert_answer(&self, answer: AnswerEntity) -> SqliteResult<()> {
        self.blocking("upsert_answer", move |conn| {
            conn.execute(
                "INSERT INTO answers (room_id, question_id, user_id, selected_index, is_correct, score, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (room_id, question_id, user_id) DO UPDATE SET
                     selected_index = excluded.selected_index,
                     is_correct = excluded.is_correct,
                     score = excluded.score",
                params![
                    answer.room_id,
                    answer.question_id,
                    answer.user_id,
                    answer.selected_index,
                    answer.is_correct,
                    answer.score,
                    to_millis(SystemTime::now()),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn refresh_room_standings(&self, room_id: i64) -> SqliteResult<()> {
        self.blocking("refresh_room_standings", move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let ranked: Vec<(i64, i64, i64)> = {
                let mut stmt = tx.prepare_cached(RANKED_MEMBERS_SQL)?;
                let rows = stmt.query_map([room_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
                rows.collect::<rusqlite::Result<_>>()?
            };
            {
                let mut update = tx.prepare_cached(
                    "UPDATE participants SET total_score = ?3, position = ?4
                     WHERE room_id = ?1 AND user_id = ?2",
                )?;
                for (user_id, score, position) in &ranked {
                    update.execute(params![room_id, user_id, score, position])?;
                }
            }
            tx.commit()
        })
        .await
    }

    async fn list_user_answers(&self, room_id: i64, user_id: i64) -> SqliteResult<Vec<AnswerRecordEntity>> {
        self.blocking("list_user_answers", move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT a.question_id, a.selected_index, a.is_correct, a.score, a.created_at
                 FROM answers a
                 JOIN questions q ON q.id = a.question_id
                 WHERE a.room_id = ?1 AND a.user_id = ?2
                 ORDER BY q.order_index ASC",
            )?;
            let rows = stmt.query_map(params![room_id, user_id], |row| {
                Ok(AnswerRecordEntity {
                    question_id: row.get(0)?,
                    selected_index: row.get(1)?,
                    is_correct: row.get(2)?,
                    score: row.get(3)?,
                    answered_at: from_millis(row.get(4)?),
                })
            })?;
            rows.collect()
        })
        .await
    }

    async fn user_room_progress(&self, user_id: i64, room_ids: Vec<i64>) -> SqliteResult<Vec<RoomProgressEntity>> {
        self.blocking("user_room_progress", move |conn| {
            let mut total_stmt =
                conn.prepare_cached("SELECT COUNT(*) FROM questions WHERE room_id = ?1")?;
            let mut answered_stmt = conn.prepare_cached(
                "SELECT COUNT(*) FROM answers WHERE room_id = ?1 AND user_id = ?2",
            )?;
            room_ids
                .into_iter()
                .map(|room_id| {
                    Ok(RoomProgressEntity {
                        room_id,
                        total_questions: total_stmt.query_row([room_id], |row| row.get(0))?,
                        answered: answered_stmt
                            .query_row(params![room_id, user_id], |row| row.get(0))?,
                    })
                })
                .collect()
        })
        .await
    }

    async fn room_leaderboard(&self, room_id: i64) -> SqliteResult<Vec<LeaderboardRowEntity>> {
        self.blocking("room_leaderboard", move |conn| {
            let mut stmt = conn.prepare_cached(ROOM_LEADERBOARD_SQL)?;
            let rows = stmt.query_map([room_id], |row| {
                Ok(LeaderboardRowEntity {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    score: row.get(2)?,
                    correct: row.get(3)?,
                    answered: row.get(4)?,
                })
            })?;
            rows.collect()
        })
        .await
    }

    async fn global_leaderboard(&self) -> SqliteResult<Vec<GlobalLeaderboardRowEntity>> {
        self.blocking("global_leaderboard", |conn| {
            let mut stmt = conn.prepare_cached(GLOBAL_LEADERBOARD_SQL)?;
            let rows = stmt.query_map([], |row| {
                Ok(GlobalLeaderboardRowEntity {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    score: row.get(2)?,
                    correct: row.get(3)?,
                    answered: row.get(4)?,
                    rooms_played: row.get(5)?,
                })
            })?;
            rows.collect()
        })
        .await
    }

    async fn ping(&self) -> SqliteResult<()> {
        self.blocking("ping", |conn| conn.query_row("SELECT 1", [], |_| Ok(())))
            .await
    }

    async fn reconnect(&self) -> SqliteResult<()> {
        if self.inner.location == IN_MEMORY {
            // Reopening would discard every row of an in-memory database.
            return self.ping().await;
        }
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let fresh = open_connection(&inner.location)?;
            let mut conn = inner.conn.lock().map_err(|_| SqliteDaoError::Poisoned)?;
            *conn = fresh;
            Ok(())
        })
        .await
        .map_err(|source| SqliteDaoError::Join {
            op: "reconnect",
            source,
        })?
    }
}

fn open_connection(location: &str) -> SqliteResult<Connection> {
    let open_err = |source| SqliteDaoError::Open {
        location: location.to_owned(),
        source,
    };
    let conn = Connection::open(location).map_err(open_err)?;

    if location != IN_MEMORY {
        // WAL mode for concurrent readers of the database file
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(open_err)?;
    }
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(open_err)?;

    migrations::run(&conn)?;
    Ok(conn)
}

fn map_room(row: &Row<'_>) -> rusqlite::Result<RoomEntity> {
    Ok(RoomEntity {
        id: row.get(0)?,
        host_id: row.get(1)?,
        title: row.get(2)?,
        time_per_question: row.get(3)?,
        start_time: row.get::<_, Option<i64>>(4)?.map(from_millis),
        is_public: row.get(5)?,
        is_published: row.get(6)?,
        created_at: from_millis(row.get(7)?),
    })
}

fn map_question(row: &Row<'_>) -> rusqlite::Result<QuestionEntity> {
    let raw_options: String = row.get(4)?;
    let options = serde_json::from_str(&raw_options)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(err)))?;
    Ok(QuestionEntity {
        id: row.get(0)?,
        room_id: row.get(1)?,
        order_index: row.get(2)?,
        text: row.get(3)?,
        options,
        correct_answer_index: row.get(5)?,
        image_url: row.get(6)?,
    })
}

fn to_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => i64::try_from(since.as_millis()).unwrap_or(i64::MAX),
        Err(before) => -i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX),
    }
}

fn from_millis(millis: i64) -> SystemTime {
    let offset = Duration::from_millis(millis.unsigned_abs());
    if millis >= 0 {
        UNIX_EPOCH + offset
    } else {
        UNIX_EPOCH - offset
    }
}

impl QuizStore for SqliteQuizStore {
    fn find_user(&self, user_id: i64) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(user_id).await.map_err(Into::into) })
    }

    fn upsert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_user(user).await.map_err(Into::into) })
    }

    fn create_room(&self, room: NewRoomEntity) -> BoxFuture<'static, StorageResult<RoomEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_room(room).await.map_err(Into::into) })
    }

    fn find_room(&self, room_id: i64) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_room(room_id).await.map_err(Into::into) })
    }

    fn schedule_room(
        &self,
        room_id: i64,
        start_time: Option<SystemTime>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .schedule_room(room_id, start_time)
                .await
                .map_err(Into::into)
        })
    }

    fn publish_room(&self, room_id: i64) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.publish_room(room_id).await.map_err(Into::into) })
    }

    fn list_feed_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<FeedRoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_feed_rooms().await.map_err(Into::into) })
    }

    fn add_question(
        &self,
        question: NewQuestionEntity,
    ) -> BoxFuture<'static, StorageResult<QuestionEntity>> {
        let store = self.clone();
        Box::pin(async move { store.add_question(question).await.map_err(Into::into) })
    }

    fn find_question(
        &self,
        room_id: i64,
        question_id: i64,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_question(room_id, question_id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_questions(
        &self,
        room_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_questions(room_id).await.map_err(Into::into) })
    }

    fn count_questions(&self, room_id: i64) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count_questions(room_id).await.map_err(Into::into) })
    }

    fn join_room(&self, room_id: i64, user_id: i64) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.join_room(room_id, user_id).await.map_err(Into::into) })
    }

    fn leave_room(&self, room_id: i64, user_id: i64) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.leave_room(room_id, user_id).await.map_err(Into::into) })
    }

    fn find_participant(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_participant(room_id, user_id)
                .await
                .map_err(Into::into)
        })
    }

    fn upsert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_answer(answer).await.map_err(Into::into) })
    }

    fn refresh_room_standings(&self, room_id: i64) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .refresh_room_standings(room_id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_user_answers(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerRecordEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_user_answers(room_id, user_id)
                .await
                .map_err(Into::into)
        })
    }

    fn user_room_progress(
        &self,
        user_id: i64,
        room_ids: Vec<i64>,
    ) -> BoxFuture<'static, StorageResult<Vec<RoomProgressEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .user_room_progress(user_id, room_ids)
                .await
                .map_err(Into::into)
        })
    }

    fn room_leaderboard(
        &self,
        room_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<LeaderboardRowEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.room_leaderboard(room_id).await.map_err(Into::into) })
    }

    fn global_leaderboard(
        &self,
    ) -> BoxFuture<'static, StorageResult<Vec<GlobalLeaderboardRowEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.global_leaderboard().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.reconnect().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::storage::StorageError;

    async fn seeded_store(users: &[(i64, &str)]) -> SqliteQuizStore {
        let store = SqliteQuizStore::open_in_memory().unwrap();
        for (id, username) in users {
            store
                .upsert_user(UserEntity {
                    id: *id,
                    username: username.to_string(),
                })
                .await
                .unwrap();
        }
        store
    }

    async fn room_with_questions(store: &SqliteQuizStore, host_id: i64, questions: usize) -> (RoomEntity, Vec<QuestionEntity>) {
        let room = store
            .create_room(NewRoomEntity {
                host_id,
                title: "Friday trivia".into(),
                time_per_question: 30,
                is_public: false,
                start_time: Some(SystemTime::now()),
            })
            .await
            .unwrap();
        let mut created = Vec::new();
        for idx in 0..questions {
            created.push(
                store
                    .add_question(NewQuestionEntity {
                        room_id: room.id,
                        text: format!("Question {idx}"),
                        options: vec!["a".into(), "b".into(), "c".into()],
                        correct_answer_index: 1,
                        image_url: None,
                    })
                    .await
                    .unwrap(),
            );
        }
        (room, created)
    }

    fn answer(room_id: i64, question_id: i64, user_id: i64, selected: u32, score: u32) -> AnswerEntity {
        AnswerEntity {
            room_id,
            question_id,
            user_id,
            selected_index: selected,
            is_correct: selected == 1,
            score,
        }
    }

    #[tokio::test]
    async fn resubmission_overwrites_single_row() {
        let store = seeded_store(&[(1, "alice")]).await;
        let (room, questions) = room_with_questions(&store, 1, 1).await;
        let question = &questions[0];

        store.upsert_answer(answer(room.id, question.id, 1, 1, 90)).await.unwrap();
        store.upsert_answer(answer(room.id, question.id, 1, 0, 0)).await.unwrap();

        let answers = store.list_user_answers(room.id, 1).await.unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].selected_index, 0);
        assert!(!answers[0].is_correct);
        assert_eq!(answers[0].score, 0);
    }

    #[tokio::test]
    async fn concurrent_submissions_leave_one_row() {
        let store = seeded_store(&[(1, "alice")]).await;
        let (room, questions) = room_with_questions(&store, 1, 1).await;
        let question_id = questions[0].id;

        let (first, second) = tokio::join!(
            store.upsert_answer(answer(room.id, question_id, 1, 1, 80)),
            store.upsert_answer(answer(room.id, question_id, 1, 1, 70)),
        );
        first.unwrap();
        second.unwrap();

        let answers = store.list_user_answers(room.id, 1).await.unwrap();
        assert_eq!(answers.len(), 1);
        assert!(answers[0].score == 80 || answers[0].score == 70);
    }

    #[tokio::test]
    async fn order_index_is_assigned_sequentially() {
        let store = seeded_store(&[(1, "host")]).await;
        let (room, questions) = room_with_questions(&store, 1, 3).await;

        let orders: Vec<i64> = questions.iter().map(|q| q.order_index).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        let listed = store.list_questions(room.id).await.unwrap();
        assert_eq!(listed, questions);
        assert_eq!(store.count_questions(room.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn question_lookup_is_scoped_to_room() {
        let store = seeded_store(&[(1, "host")]).await;
        let (room, questions) = room_with_questions(&store, 1, 1).await;
        let (other, _) = room_with_questions(&store, 1, 0).await;

        assert!(store.find_question(room.id, questions[0].id).await.unwrap().is_some());
        assert!(store.find_question(other.id, questions[0].id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn standings_follow_leaderboard_order() {
        let store = seeded_store(&[(1, "host"), (2, "bob"), (3, "amy"), (4, "idle")]).await;
        let (room, questions) = room_with_questions(&store, 1, 2).await;
        for user in [2, 3, 4] {
            assert!(store.join_room(room.id, user).await.unwrap());
        }

        store.upsert_answer(answer(room.id, questions[0].id, 2, 1, 50)).await.unwrap();
        store.upsert_answer(answer(room.id, questions[0].id, 3, 1, 50)).await.unwrap();
        store.upsert_answer(answer(room.id, questions[1].id, 3, 0, 0)).await.unwrap();
        store.refresh_room_standings(room.id).await.unwrap();

        let board = store.room_leaderboard(room.id).await.unwrap();
        let order: Vec<i64> = board.iter().map(|row| row.user_id).collect();
        // Equal score and correct count, amy answered more.
        assert_eq!(order, vec![3, 2]);

        for (idx, row) in board.iter().enumerate() {
            let participant = store.find_participant(room.id, row.user_id).await.unwrap().unwrap();
            assert_eq!(participant.total_score, row.score);
            assert_eq!(participant.position, Some(idx as u32 + 1));
        }

        let idle = store.find_participant(room.id, 4).await.unwrap().unwrap();
        assert_eq!(idle.total_score, 0);
        assert_eq!(idle.position, Some(3));
    }

    #[tokio::test]
    async fn join_is_idempotent_and_leave_reports_membership() {
        let store = seeded_store(&[(1, "host"), (2, "bob")]).await;
        let (room, _) = room_with_questions(&store, 1, 1).await;

        assert!(store.join_room(room.id, 2).await.unwrap());
        assert!(!store.join_room(room.id, 2).await.unwrap());
        assert!(store.leave_room(room.id, 2).await.unwrap());
        assert!(!store.leave_room(room.id, 2).await.unwrap());
    }

    #[tokio::test]
    async fn feed_lists_only_eligible_rooms() {
        let store = seeded_store(&[(1, "host")]).await;
        let (scheduled, _) = room_with_questions(&store, 1, 2).await;
        let (empty, _) = room_with_questions(&store, 1, 0).await;
        store.schedule_room(empty.id, Some(SystemTime::now())).await.unwrap();
        let (unscheduled, _) = room_with_questions(&store, 1, 1).await;
        store.schedule_room(unscheduled.id, None).await.unwrap();

        let public = store
            .create_room(NewRoomEntity {
                host_id: 1,
                title: "Open quiz".into(),
                time_per_question: 20,
                is_public: true,
                start_time: None,
            })
            .await
            .unwrap();
        store
            .add_question(NewQuestionEntity {
                room_id: public.id,
                text: "Q".into(),
                options: vec!["x".into(), "y".into()],
                correct_answer_index: 0,
                image_url: None,
            })
            .await
            .unwrap();

        let before_publish: Vec<i64> = store.list_feed_rooms().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(before_publish, vec![scheduled.id]);

        assert!(store.publish_room(public.id).await.unwrap());
        let feed = store.list_feed_rooms().await.unwrap();
        let ids: Vec<i64> = feed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![public.id, scheduled.id]);
        assert_eq!(feed[1].question_count, 2);
    }

    #[tokio::test]
    async fn progress_and_global_totals() {
        let store = seeded_store(&[(1, "host"), (2, "bob")]).await;
        let (first, first_questions) = room_with_questions(&store, 1, 2).await;
        let (second, second_questions) = room_with_questions(&store, 1, 1).await;

        store.upsert_answer(answer(first.id, first_questions[0].id, 2, 1, 40)).await.unwrap();
        store.upsert_answer(answer(second.id, second_questions[0].id, 2, 1, 60)).await.unwrap();

        let progress = store.user_room_progress(2, vec![second.id, first.id]).await.unwrap();
        assert_eq!(progress[0].room_id, second.id);
        assert_eq!((progress[0].total_questions, progress[0].answered), (1, 1));
        assert_eq!((progress[1].total_questions, progress[1].answered), (2, 1));

        let global = store.global_leaderboard().await.unwrap();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].score, 100);
        assert_eq!(global[0].rooms_played, 2);
    }

    #[tokio::test]
    async fn taken_username_is_a_conflict() {
        let store = seeded_store(&[(1, "alice")]).await;
        let err = QuizStore::upsert_user(
            &store,
            UserEntity {
                id: 2,
                username: "alice".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }
}

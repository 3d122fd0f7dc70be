use rusqlite::{params, Row};

use crate::{ctx::BaseParams, db, users::UserId, DB, Result};

use super::{CreateNote, FindNotesResponse, Note, NoteId, UpdateNote};

const NOTE_COLUMNS: &str = "id, author_id, text, created_at, updated_at";

impl<'a> TryFrom<&Row<'a>> for Note {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            author_id: row.get(1)?,
            text: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

/// All notes of an author, newest first.
pub async fn find_notes_by_author(db: DB, author_id: UserId) -> Result<Vec<Note>> {
    let notes = db
        .call(move |conn| {
            let notes = conn
                .prepare(&format!(
                    "SELECT {NOTE_COLUMNS} FROM notes WHERE author_id = ? ORDER BY created_at DESC, rowid DESC"
                ))?
                .query_map(params![author_id], |row| Note::try_from(row))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(notes)
        })
        .await
        .map_err(db::Error::from)?;

    Ok(notes)
}

pub async fn find_notes(BaseParams { db, ctx }: BaseParams) -> Result<FindNotesResponse> {
    let user = ctx.require_user("view notes")?;
    let results = find_notes_by_author(db, user.id).await?;
    Ok(FindNotesResponse { results })
}

pub async fn get_note(note_id: NoteId, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let author_id = ctx.require_user("view a note")?.id;
    let note = db
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ? AND author_id = ?"),
                params![note_id, author_id],
                |row| Note::try_from(row),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)
        .map_err(|e| e.not_found_message("Note not found"))?;

    Ok(note)
}

pub async fn create_note(CreateNote { note_id }: CreateNote, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let author_id = ctx.require_user("create a note")?.id;
    let now = chrono::Utc::now();
    let note = db
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO notes (id, author_id, text, created_at, updated_at) VALUES (?, ?, '', ?, ?)
                    RETURNING {NOTE_COLUMNS}"
                ),
                params![note_id, author_id, now, now],
                |row| Note::try_from(row),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)
        .map_err(|e| e.conflict_message(format!("A note with id '{note_id}' already exists")))?;

    tracing::info!(note_id = %note.id, author_id = %author_id, "note created");
    Ok(note)
}

/// Overwrites the text of any note with this id. Ownership is not checked
/// here; a mismatch is only logged.
pub async fn update_note(note_id: NoteId, UpdateNote { text }: UpdateNote, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let user_id = ctx.require_user("update a note")?.id;
    let note = db
        .call(move |conn| {
            conn.query_row(
                &format!("UPDATE notes SET text = ?, updated_at = ? WHERE id = ? RETURNING {NOTE_COLUMNS}"),
                params![text, chrono::Utc::now(), note_id],
                |row| Note::try_from(row),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)
        .map_err(|e| e.not_found_message("Note not found"))?;

    if note.author_id != user_id {
        tracing::warn!(note_id = %note_id, author_id = %note.author_id, user_id = %user_id, "note updated by a user other than its author");
    }

    Ok(note)
}

pub async fn delete_note(note_id: NoteId, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let author_id = ctx.require_user("delete a note")?.id;
    let note = db
        .call(move |conn| {
            conn.query_row(
                &format!("DELETE FROM notes WHERE id = ? AND author_id = ? RETURNING {NOTE_COLUMNS}"),
                params![note_id, author_id],
                |row| Note::try_from(row),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)
        .map_err(|e| e.not_found_message("Note not found"))?;

    tracing::info!(note_id = %note_id, "note deleted");
    Ok(note)
}

#[cfg(test)]
mod tests {
    use uuid::{uuid, Uuid};

    use super::*;
    use crate::{
        ctx::{Ctx, User},
        db::init_test_db,
        users::auth::{login, LoginUserParameters},
        Error,
    };

    const NOTE_ID: Uuid = uuid!("018f6138-5b4f-722d-97c5-29b927cedbd4");

    async fn user(db: &DB, email: &str) -> Ctx {
        let user = login(
            db.clone(),
            LoginUserParameters {
                user_email: email.into(),
            },
        )
        .await
        .unwrap();

        Ctx::new(Some(User {
            id: user.id,
            email: user.email,
        }))
    }

    #[tokio::test]
    async fn create_then_get_has_empty_text() -> Result<()> {
        let db = init_test_db().await?;
        let ctx = user(&db, "a@mail.com").await;

        let created = create_note(CreateNote { note_id: NOTE_ID }, BaseParams::new(db.clone(), ctx.clone())).await?;
        assert_eq!(created.id, NOTE_ID);
        assert_eq!(created.created_at, created.updated_at);

        let note = get_note(NOTE_ID, BaseParams::new(db, ctx.clone())).await?;
        assert_eq!(note.text, "");
        assert_eq!(Some(note.author_id), ctx.get_user_id());
        Ok(())
    }

    #[tokio::test]
    async fn create_duplicate_is_conflict() -> Result<()> {
        let db = init_test_db().await?;
        let ctx = user(&db, "a@mail.com").await;

        create_note(CreateNote { note_id: NOTE_ID }, BaseParams::new(db.clone(), ctx.clone())).await?;
        let result = create_note(CreateNote { note_id: NOTE_ID }, BaseParams::new(db, ctx)).await;

        assert!(matches!(result, Err(Error::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn requires_user() -> Result<()> {
        let db = init_test_db().await?;

        let result = create_note(CreateNote { note_id: NOTE_ID }, BaseParams::new(db, Ctx::new(None))).await;

        match result {
            Err(Error::Unauthenticated(message)) => assert_eq!(message, "You must be logged in to create a note"),
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn update_persists_exact_text() -> Result<()> {
        let db = init_test_db().await?;
        let ctx = user(&db, "a@mail.com").await;
        create_note(CreateNote { note_id: NOTE_ID }, BaseParams::new(db.clone(), ctx.clone())).await?;

        let text = "Heading\n<p>body with <b>bold</b></p>\n".to_string();
        update_note(NOTE_ID, UpdateNote { text: text.clone() }, BaseParams::new(db.clone(), ctx.clone())).await?;

        let note = get_note(NOTE_ID, BaseParams::new(db, ctx)).await?;
        assert_eq!(note.text, text);
        assert!(note.updated_at >= note.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_note_is_not_found() -> Result<()> {
        let db = init_test_db().await?;
        let ctx = user(&db, "a@mail.com").await;

        let result = update_note(NOTE_ID, UpdateNote { text: "x".into() }, BaseParams::new(db, ctx)).await;

        assert!(matches!(result, Err(Error::NotFound(message)) if message == "Note not found"));
        Ok(())
    }

    #[tokio::test]
    async fn delete_by_other_user_keeps_row() -> Result<()> {
        let db = init_test_db().await?;
        let owner = user(&db, "owner@mail.com").await;
        let other = user(&db, "other@mail.com").await;
        create_note(CreateNote { note_id: NOTE_ID }, BaseParams::new(db.clone(), owner.clone())).await?;

        let result = delete_note(NOTE_ID, BaseParams::new(db.clone(), other)).await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        let notes = find_notes_by_author(db.clone(), owner.get_user_id().unwrap()).await?;
        assert_eq!(notes.len(), 1);

        let deleted = delete_note(NOTE_ID, BaseParams::new(db.clone(), owner.clone())).await?;
        assert_eq!(deleted.id, NOTE_ID);
        assert!(find_notes_by_author(db, owner.get_user_id().unwrap()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn lists_own_notes_newest_first() -> Result<()> {
        let db = init_test_db().await?;
        let ctx = user(&db, "a@mail.com").await;
        let other = user(&db, "b@mail.com").await;

        let ids = [Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7()];
        for id in ids {
            create_note(CreateNote { note_id: id }, BaseParams::new(db.clone(), ctx.clone())).await?;
        }
        create_note(CreateNote { note_id: Uuid::now_v7() }, BaseParams::new(db.clone(), other)).await?;

        let notes = find_notes(BaseParams::new(db, ctx)).await?.results;

        assert_eq!(notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![ids[2], ids[1], ids[0]]);
        Ok(())
    }
}

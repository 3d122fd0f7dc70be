use rusqlite::{named_params, Row};
use serde::Deserialize;

use crate::db::{self, DB};

use super::*;

impl<'a> TryFrom<&Row<'a>> for User {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUserParameters {
    pub user_email: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GetUserByIdParameters {
    pub user_id: UserId,
}

pub type GetUserResponse = User;
pub type LoginUserResponse = User;

/// Finds the user by email, creating it on first sign-in.
pub async fn login(db: DB, args: LoginUserParameters) -> db::Result<LoginUserResponse> {
    let email = args.user_email.trim().to_lowercase();
    let user = db
        .call(move |conn| {
            conn.query_row(
                r#"INSERT INTO users (email) VALUES (:email)
                    ON CONFLICT(email) DO UPDATE SET updated_at = CURRENT_TIMESTAMP
                    RETURNING id, email, created_at, updated_at"#,
                named_params! {
                    ":email": email,
                },
                |r| User::try_from(r),
            )
            .map_err(|e| e.into())
        })
        .await?;

    Ok(user)
}

pub async fn find_one_by_id(db: DB, args: GetUserByIdParameters) -> db::Result<GetUserResponse> {
    let user_id = args.user_id;
    let user = db
        .call(move |conn| {
            conn.query_row(
                "SELECT id, email, created_at, updated_at FROM users WHERE id = ?",
                [args.user_id],
                |r| User::try_from(r),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)
        .map_err(|e| e.not_found_message(format!("User '{}' not found", user_id)))?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::db::{self, init_test_db};

    use super::*;

    #[tokio::test]
    async fn login_creates_user() {
        let db = init_test_db().await.unwrap();
        let user = login(
            db,
            LoginUserParameters {
                user_email: "Test@Mail.com ".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(user.email, "test@mail.com");
        assert!(user.updated_at.is_none());
    }

    #[tokio::test]
    async fn login_twice_returns_same_user() {
        let db = init_test_db().await.unwrap();
        let args = LoginUserParameters {
            user_email: "test@mail.com".into(),
        };

        let first = login(db.clone(), args.clone()).await.unwrap();
        let second = login(db, args).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.updated_at.is_some());
    }

    #[tokio::test]
    async fn get_by_id() {
        let db = init_test_db().await.unwrap();
        let user = login(
            db.clone(),
            LoginUserParameters {
                user_email: "test@mail.com".into(),
            },
        )
        .await
        .unwrap();

        let found = find_one_by_id(db, GetUserByIdParameters { user_id: user.id })
            .await
            .unwrap();

        assert_eq!(found.email, "test@mail.com");
    }

    #[tokio::test]
    async fn not_found() {
        let db = init_test_db().await.unwrap();

        let user = find_one_by_id(
            db,
            GetUserByIdParameters {
                user_id: Uuid::new_v4(),
            },
        )
        .await;

        assert!(matches!(user.err(), Some(db::Error::NotFound(_))));
    }
}

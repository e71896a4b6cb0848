use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,                      // assigned by storage
    pub username: String,
    pub email: String,
    pub password: String,             // plain text, returned as stored
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Attributes accepted on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Equality criteria for find-one lookups.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Username(String),
    Email(String),
}

impl UserFilter {
    pub fn column(&self) -> &'static str {
        match self {
            UserFilter::Username(_) => "username",
            UserFilter::Email(_) => "email",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            UserFilter::Username(v) | UserFilter::Email(v) => v,
        }
    }
}

#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Username,
    Email,
}

impl UserColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            UserColumn::Username => "username",
            UserColumn::Email => "email",
        }
    }
}

#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Column/direction pair for ordered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserOrder {
    pub column: UserColumn,
    pub direction: SortDirection,
}

impl UserOrder {
    pub const fn asc(column: UserColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub const fn desc(column: UserColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }

    /// Renders the ORDER BY body. `collation` keeps text ordering byte-wise
    /// on every backend; `id` always breaks ties.
    pub fn order_by_clause(order: Option<UserOrder>, collation: &str) -> String {
        match order {
            None => "id ASC".to_string(),
            Some(o) => format!(
                "{} COLLATE {} {}, id ASC",
                o.column.as_str(),
                collation,
                o.direction.as_sql()
            ),
        }
    }
}

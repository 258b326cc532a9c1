use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Loan status of a single copy. Stored as the one-letter code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    #[sea_orm(string_value = "m")]
    #[serde(alias = "m")]
    Maintenance,
    #[sea_orm(string_value = "o")]
    #[serde(alias = "o")]
    OnLoan,
    #[sea_orm(string_value = "a")]
    #[serde(alias = "a")]
    Available,
    #[sea_orm(string_value = "r")]
    #[serde(alias = "r")]
    Reserved,
}

impl LoanStatus {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Maintenance => "m",
            Self::OnLoan => "o",
            Self::Available => "a",
            Self::Reserved => "r",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::OnLoan => "On loan",
            Self::Available => "Available",
            Self::Reserved => "Reserved",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" | "maintenance" => Some(Self::Maintenance),
            "o" | "on_loan" => Some(Self::OnLoan),
            "a" | "available" => Some(Self::Available),
            "r" | "reserved" => Some(Self::Reserved),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "book_instance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub imprint: String,
    pub due_back: Option<Date>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

impl Model {
    /// True when the copy has a due date strictly before `today`.
    #[must_use]
    pub fn is_due_on(&self, today: Date) -> bool {
        self.due_back.is_some_and(|due| due < today)
    }

    #[must_use]
    pub fn is_due(&self) -> bool {
        self.is_due_on(chrono::Local::now().date_naive())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Book,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BorrowerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Borrower,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Borrower.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    /// Fresh copies get a random v4 id and start in maintenance.
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            status: Set(LoanStatus::Maintenance),
            ..ActiveModelTrait::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use sea_orm::Iterable;

    fn copy_due(due_back: Option<Date>) -> Model {
        Model {
            id: Uuid::new_v4(),
            book_id: Some(1),
            imprint: "Penguin, 1999".to_string(),
            due_back,
            status: LoanStatus::OnLoan,
            borrower_id: None,
        }
    }

    #[test]
    fn test_is_due_compares_against_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        assert!(copy_due(Some(today - Duration::days(1))).is_due_on(today));
        assert!(!copy_due(Some(today + Duration::days(1))).is_due_on(today));
        assert!(!copy_due(Some(today)).is_due_on(today));
        assert!(!copy_due(None).is_due_on(today));
    }

    #[test]
    fn test_is_due_uses_local_date() {
        let yesterday = chrono::Local::now().date_naive() - Duration::days(1);
        assert!(copy_due(Some(yesterday)).is_due());
        assert!(!copy_due(None).is_due());
    }

    #[test]
    fn test_loan_status_codes() {
        for status in LoanStatus::iter() {
            assert_eq!(LoanStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(LoanStatus::from_code("x"), None);
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
        assert_eq!(LoanStatus::OnLoan.label(), "On loan");
    }

    #[test]
    fn test_loan_status_serde_accepts_codes() {
        let status: LoanStatus = serde_json::from_str("\"a\"").unwrap();
        assert_eq!(status, LoanStatus::Available);
        let status: LoanStatus = serde_json::from_str("\"on_loan\"").unwrap();
        assert_eq!(status, LoanStatus::OnLoan);
        assert_eq!(
            serde_json::to_string(&LoanStatus::Reserved).unwrap(),
            "\"reserved\""
        );
    }
}

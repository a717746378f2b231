use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// UUID, generated locally or by the remote store
    pub id: String,
    /// Positive amount spent
    pub amount: f64,
    /// Category name (not a foreign key, may dangle)
    pub category: String,
    /// Calendar date of the expense (YYYY-MM-DD)
    pub date: String,
    pub description: String,
    /// When the record was created (RFC 3339)
    pub created_at: String,
}

/// Fields supplied by the caller when adding an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: f64,
    pub category: String,
    pub date: String,
    pub description: String,
}

/// Partial update of an expense; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseUpdate {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Expense {
    /// Month key (YYYY-MM) derived from the first seven characters of the date
    pub fn month_key(&self) -> &str {
        self.date.get(0..7).unwrap_or(&self.date)
    }

    /// Parse the date as a calendar day, accepting plain dates and RFC 3339 timestamps
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(&self.date).ok().map(|dt| dt.date_naive()))
    }

    /// Build an expense from caller data plus backend-assigned identity
    pub fn from_new(new_expense: &NewExpense, id: String, created_at: String) -> Self {
        Self {
            id,
            amount: new_expense.amount,
            category: new_expense.category.clone(),
            date: new_expense.date.clone(),
            description: new_expense.description.clone(),
            created_at,
        }
    }
}

impl ExpenseUpdate {
    /// Merge the present fields into an expense; id and created_at never change
    pub fn apply_to(&self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(ref category) = self.category {
            expense.category = category.clone();
        }
        if let Some(ref date) = self.date {
            expense.date = date.clone();
        }
        if let Some(ref description) = self.description {
            expense.description = description.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.description.is_none()
    }
}

/// An expense category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Present once persisted by a backend that assigns ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub color: String, // hex, e.g. "#FF6B6B"
    pub icon: String,
    /// Display position, contiguous from 0 after a reorder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
    #[serde(default)]
    pub is_default: bool,
}

/// Fields supplied by the caller when adding a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// Icon and color used to render an expense's category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub icon: String,
    pub color: String,
}

pub const FALLBACK_CATEGORY_COLOR: &str = "#95E1D3";
pub const FALLBACK_CATEGORY_ICON: &str = "📦";

impl Category {
    pub fn new(name: &str, color: &str, icon: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
            order_index: None,
            is_default: false,
        }
    }

    /// Case-insensitive name comparison used for uniqueness checks
    pub fn has_name_like(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Whether two values denote the same stored record: by id when both have one, else by name
    pub fn same_record(&self, other: &Category) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.name == other.name,
        }
    }

    pub fn style(&self) -> CategoryStyle {
        CategoryStyle {
            icon: self.icon.clone(),
            color: self.color.clone(),
        }
    }
}

impl CategoryStyle {
    pub fn fallback() -> Self {
        Self {
            icon: FALLBACK_CATEGORY_ICON.to_string(),
            color: FALLBACK_CATEGORY_COLOR.to_string(),
        }
    }
}

/// The compiled-in category set used for first-run seeding and resets
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("Food", "#FF6B6B", "🍔"),
        Category::new("Transport", "#4ECDC4", "🚗"),
        Category::new("Shopping", "#FFE66D", "🛍️"),
        Category::new("Entertainment", "#A8E6CF", "🎬"),
        Category::new("Bills", "#FF8B94", "📄"),
        Category::new("Health", "#C7CEEA", "⚕️"),
        Category::new("Education", "#B4A7D6", "📚"),
        Category::new("Other", "#95E1D3", "📦"),
    ]
}

/// Aggregate figures over a set of expenses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: f64,
    pub average: f64,
    pub count: usize,
    pub by_category: BTreeMap<String, f64>,
    /// Keyed by YYYY-MM
    pub by_month: BTreeMap<String, f64>,
}

/// One row of a category breakdown, largest amount first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    /// Percentage of the overall total (0 when the total is 0)
    pub percentage: f64,
}

/// Comparison of one month's total with the previous recorded month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthComparison {
    pub month: String,
    pub previous_month: String,
    pub current_total: f64,
    pub previous_total: f64,
    pub percent_change: f64,
    pub is_increase: bool,
    pub difference: f64,
}

/// Which persistence target is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Local,
    /// Older preference files stored this value as "supabase"
    #[serde(alias = "supabase")]
    Remote,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Local => write!(f, "local"),
            StorageMode::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Amount,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Inclusive date bounds; either side may be open
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Expense list filters as offered by the history view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFilters {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub search_term: String,
}

/// A downloadable export of the expense collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// e.g. "expenses-2024-03-01.json"
    pub filename: String,
    /// Pretty-printed JSON array of expenses
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    LocalToRemote,
    RemoteToLocal,
}

/// Outcome of a one-shot sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub direction: SyncDirection,
    /// Records read from the source
    pub attempted: usize,
    /// Records written to the destination
    pub succeeded: usize,
    /// Records the destination already held (local to remote only)
    pub skipped: usize,
    pub message: String,
}

/// Session state as seen by a frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: Option<String>,
    pub storage_mode: StorageMode,
    pub remote_available: bool,
    /// Whether the remote backend is the one actually in use
    pub using_remote: bool,
}

/// Request for supplying the authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub user_id: String,
}

/// Request for changing the storage mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetStorageModeRequest {
    pub mode: StorageMode,
}

/// Response after a storage mode change request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageModeResponse {
    pub storage_mode: StorageMode,
    pub remote_available: bool,
    /// False when the requested mode was refused
    pub changed: bool,
}

/// Response containing the expense collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
}

/// Response after a single expense mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseResponse {
    pub expense: Expense,
    pub success_message: String,
}

/// Response after an import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported_count: usize,
    pub success_message: String,
}

/// Response containing the category collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

/// Response after a single category mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub category: Category,
    pub success_message: String,
}

/// Request for reordering categories by id or name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderCategoriesRequest {
    pub order: Vec<String>,
}

/// Generic acknowledgement for operations without a payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success_message: String,
}

/// Statistics for an optionally month-filtered view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub month: Option<String>,
    pub statistics: Statistics,
    pub breakdown: Vec<CategoryShare>,
}

/// Months with recorded expenses, most recent first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthsResponse {
    pub months: Vec<String>,
    pub comparison: Option<MonthComparison>,
}

/// Error body returned by the HTTP surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

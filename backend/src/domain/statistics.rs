//! # Aggregation Engine
//!
//! Pure functions over an expense slice: totals, grouping by category and
//! month, filtering, sorting and month-over-month comparison. Nothing here
//! touches storage.

use chrono::{Local, NaiveDate};
use shared::{
    CategoryShare, DateRange, Expense, ExpenseFilters, MonthComparison, SortKey, SortOrder,
    Statistics,
};
use std::cmp::Ordering;
use std::collections::BTreeSet;

pub fn calculate_statistics(expenses: &[Expense]) -> Statistics {
    let mut statistics = Statistics {
        count: expenses.len(),
        ..Default::default()
    };

    for expense in expenses {
        statistics.total += expense.amount;
        *statistics
            .by_category
            .entry(expense.category.clone())
            .or_insert(0.0) += expense.amount;
        *statistics
            .by_month
            .entry(expense.month_key().to_string())
            .or_insert(0.0) += expense.amount;
    }

    if statistics.count > 0 {
        statistics.average = statistics.total / statistics.count as f64;
    }
    statistics
}

/// Keep expenses whose date starts with `month` (YYYY-MM); all of them for `None`
pub fn filter_by_month(expenses: &[Expense], month: Option<&str>) -> Vec<Expense> {
    match month {
        Some(month) if !month.is_empty() => expenses
            .iter()
            .filter(|e| e.date.starts_with(month))
            .cloned()
            .collect(),
        _ => expenses.to_vec(),
    }
}

/// Distinct months with at least one expense, most recent first
pub fn available_months(expenses: &[Expense]) -> Vec<String> {
    let months: BTreeSet<&str> = expenses.iter().map(|e| e.month_key()).collect();
    months.into_iter().rev().map(str::to_string).collect()
}

/// Stable sort returning a new vector
pub fn sort_expenses(expenses: &[Expense], key: SortKey, order: SortOrder) -> Vec<Expense> {
    let mut sorted = expenses.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}

fn compare(a: &Expense, b: &Expense, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.calendar_date().cmp(&b.calendar_date()),
        SortKey::Amount => a.amount.total_cmp(&b.amount),
        SortKey::Category => a
            .category
            .to_lowercase()
            .cmp(&b.category.to_lowercase())
            .then_with(|| a.category.cmp(&b.category)),
    }
}

/// Percentage change from `previous` to `current`; undefined when there is no previous spend
pub fn month_over_month(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

/// Inclusive calendar range; records with an unreadable date are kept
pub fn filter_by_date_range(expenses: &[Expense], range: &DateRange) -> Vec<Expense> {
    let start = range.start.as_deref().and_then(parse_bound);
    let end = range.end.as_deref().and_then(parse_bound);
    if start.is_none() && end.is_none() {
        return expenses.to_vec();
    }

    expenses
        .iter()
        .filter(|expense| match expense.calendar_date() {
            Some(date) => {
                start.map_or(true, |start| date >= start) && end.map_or(true, |end| date <= end)
            }
            None => true,
        })
        .cloned()
        .collect()
}

fn parse_bound(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.get(0..10).unwrap_or(value), "%Y-%m-%d").ok()
}

/// Exact category name match; all expenses for `None`
pub fn filter_by_category(expenses: &[Expense], category: Option<&str>) -> Vec<Expense> {
    match category {
        Some(category) if !category.is_empty() => expenses
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect(),
        _ => expenses.to_vec(),
    }
}

/// Case-insensitive substring match on description or category
pub fn filter_by_search(expenses: &[Expense], term: &str) -> Vec<Expense> {
    if term.is_empty() {
        return expenses.to_vec();
    }
    let term = term.to_lowercase();
    expenses
        .iter()
        .filter(|e| {
            e.description.to_lowercase().contains(&term)
                || e.category.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}

pub fn apply_filters(expenses: &[Expense], filters: &ExpenseFilters) -> Vec<Expense> {
    let filtered = filter_by_date_range(expenses, &filters.date_range);
    let filtered = filter_by_category(&filtered, filters.category.as_deref());
    filter_by_search(&filtered, &filters.search_term)
}

/// The current month as YYYY-MM in local time
pub fn current_month() -> String {
    Local::now().format("%Y-%m").to_string()
}

/// Compare `month` with the month before it among those that have expenses
pub fn monthly_comparison(expenses: &[Expense], month: &str) -> Option<MonthComparison> {
    let months = available_months(expenses);
    let position = months.iter().position(|m| m == month)?;
    let previous_month = months.get(position + 1)?;

    let totals = calculate_statistics(expenses).by_month;
    let current_total = totals.get(month).copied().unwrap_or(0.0);
    let previous_total = totals.get(previous_month).copied().unwrap_or(0.0);
    let percent_change = month_over_month(current_total, previous_total)?;

    Some(MonthComparison {
        month: month.to_string(),
        previous_month: previous_month.clone(),
        current_total,
        previous_total,
        percent_change,
        is_increase: percent_change > 0.0,
        difference: current_total - previous_total,
    })
}

/// Per-category amounts with their share of the total, largest first
pub fn category_breakdown(statistics: &Statistics) -> Vec<CategoryShare> {
    let mut shares: Vec<CategoryShare> = statistics
        .by_category
        .iter()
        .map(|(category, amount)| CategoryShare {
            category: category.clone(),
            amount: *amount,
            percentage: if statistics.total > 0.0 {
                amount / statistics.total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    shares
}

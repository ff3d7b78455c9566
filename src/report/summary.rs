//! Monthly income and expense summaries.

use std::collections::BTreeMap;

use time::Date;

use crate::transaction::Transaction;

/// The income, expenses and net change of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlySummary {
    /// The first day of the month.
    pub month: Date,
    /// The sum of the positive amounts.
    pub income: f64,
    /// The magnitude of the sum of the negative amounts.
    pub expenses: f64,
    /// `income - expenses`.
    pub net: f64,
}

/// The totals over every summarised month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

/// Group `transactions` by calendar month, newest month first.
///
/// Months without transactions are left out.
pub fn summarise_by_month(transactions: &[Transaction]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<Date, (f64, f64)> = BTreeMap::new();

    for transaction in transactions {
        let month = first_of_month(transaction.date);
        let (income, expenses) = months.entry(month).or_default();

        if transaction.amount >= 0.0 {
            *income += transaction.amount;
        } else {
            *expenses -= transaction.amount;
        }
    }

    months
        .into_iter()
        .rev()
        .map(|(month, (income, expenses))| MonthlySummary {
            month,
            income,
            expenses,
            net: income - expenses,
        })
        .collect()
}

/// Add up the monthly summaries.
pub fn totals(summaries: &[MonthlySummary]) -> Totals {
    summaries.iter().fold(Totals::default(), |totals, summary| Totals {
        income: totals.income + summary.income,
        expenses: totals.expenses + summary.expenses,
        net: totals.net + summary.net,
    })
}

fn first_of_month(date: Date) -> Date {
    // Day one exists in every month.
    date.replace_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{transaction::Transaction, user::UserID};

    use super::{MonthlySummary, Totals, summarise_by_month, totals};

    fn transaction(amount: f64, date: Date) -> Transaction {
        Transaction {
            id: 0,
            owner_id: UserID::new(1),
            amount,
            date,
            description: String::new(),
        }
    }

    #[test]
    fn groups_by_month_newest_first() {
        let transactions = [
            transaction(100.0, date!(2025 - 01 - 05)),
            transaction(-30.0, date!(2025 - 01 - 20)),
            transaction(-10.0, date!(2025 - 03 - 01)),
            transaction(50.0, date!(2025 - 01 - 31)),
        ];

        let summaries = summarise_by_month(&transactions);

        assert_eq!(
            summaries,
            vec![
                MonthlySummary {
                    month: date!(2025 - 03 - 01),
                    income: 0.0,
                    expenses: 10.0,
                    net: -10.0,
                },
                MonthlySummary {
                    month: date!(2025 - 01 - 01),
                    income: 150.0,
                    expenses: 30.0,
                    net: 120.0,
                },
            ]
        );
    }

    #[test]
    fn no_transactions_gives_no_months() {
        assert!(summarise_by_month(&[]).is_empty());
        assert_eq!(totals(&[]), Totals::default());
    }

    #[test]
    fn totals_add_up_months() {
        let transactions = [
            transaction(100.0, date!(2024 - 12 - 05)),
            transaction(-40.0, date!(2025 - 01 - 20)),
        ];

        let summaries = summarise_by_month(&transactions);

        assert_eq!(
            totals(&summaries),
            Totals {
                income: 100.0,
                expenses: 40.0,
                net: 60.0,
            }
        );
    }
}

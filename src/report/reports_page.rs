//! The reports page with a monthly summary of the visible transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Identity,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    report::{MonthlySummary, Totals, summarise_by_month, totals},
    table::{CellValue, Column, ModalKind, TableConfig, TableProps, TableQuery, TableRecord, table_view},
    transaction::{TransactionScope, get_transactions},
};

/// The state needed for the reports page.
#[derive(Debug, Clone)]
pub struct ReportsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A row of the monthly summary table.
#[derive(Debug, Clone, PartialEq)]
struct MonthRow(MonthlySummary);

impl TableRecord for MonthRow {
    fn id(&self) -> Option<i64> {
        None
    }

    fn cells(&self) -> Vec<(&'static str, CellValue)> {
        let MonthlySummary {
            month,
            income,
            expenses,
            net,
        } = self.0;

        vec![
            (
                "month",
                format!("{}-{:02}", month.year(), u8::from(month.month())).into(),
            ),
            ("income", income.into()),
            ("expenses", expenses.into()),
            ("net", net.into()),
        ]
    }

    fn display_cell(&self, key: &str) -> String {
        match self.cell(key) {
            CellValue::Number(amount) => format_currency(amount),
            value => value.to_string(),
        }
    }
}

fn reports_table_config() -> TableConfig {
    TableConfig {
        title: "Monthly Summary",
        path: endpoints::REPORTS_VIEW,
        columns: vec![
            Column::new("month", "Month"),
            Column::new("income", "Income"),
            Column::new("expenses", "Expenses"),
            Column::new("net", "Net"),
        ],
        // Reports are read-only, the modal is never opened.
        add_kind: ModalKind::Income,
    }
}

fn totals_view(totals: &Totals) -> Markup {
    html! {
        dl class="grid grid-cols-3 gap-4 mt-6 text-center"
        {
            @for (label, amount) in [
                ("Total income", totals.income),
                ("Total expenses", totals.expenses),
                ("Net", totals.net),
            ] {
                div class="p-4 bg-white rounded-lg shadow dark:bg-gray-800"
                {
                    dt class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                    dd class="text-lg font-semibold" { (format_currency(amount)) }
                }
            }
        }
    }
}

fn reports_view(identity: &Identity, rows: &[MonthRow], totals: &Totals, query: &TableQuery) -> Markup {
    let config = reports_table_config();
    let state = query.table_state();
    let view = state.derive(rows);

    let table = table_view(TableProps {
        config: &config,
        state: &state,
        view: &view,
        can_edit: false,
        modal: None,
    });

    let content = html! {
        (NavBar::new(endpoints::REPORTS_VIEW, identity.role).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            (table)

            (totals_view(totals))

            a href=(endpoints::REPORT_EXPORT_API) download class={ "mt-4 inline-block " (LINK_STYLE) }
            {
                "Export transactions as CSV"
            }
        }
    };

    base("Reports", &[], &content)
}

/// Display the monthly summary of the transactions visible to the session's user.
pub async fn get_reports_page(
    State(state): State<ReportsPageState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<TableQuery>,
) -> Response {
    let transactions = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_transactions(TransactionScope::from(&identity), &connection));

    match transactions {
        Ok(transactions) => {
            let summaries = summarise_by_month(&transactions);
            let totals = totals(&summaries);
            let rows = summaries.into_iter().map(MonthRow).collect::<Vec<_>>();

            reports_view(&identity, &rows, &totals, &query).into_response()
        }
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
    };
    use time::macros::date;

    use crate::{
        auth::Identity,
        table::TableQuery,
        test_utils::{
            assert_status_ok, assert_valid_html, must_create_seeded_connection,
            parse_html_document, select_text,
        },
        transaction::{NewTransaction, create_transaction},
        user::{Role, UserID},
    };

    use super::{ReportsPageState, get_reports_page};

    fn get_state() -> ReportsPageState {
        let (connection, ann, bob) = must_create_seeded_connection();
        let today = date!(2025 - 06 - 30);

        for (owner, amount, date) in [
            (ann.id, 200.0, date!(2025 - 02 - 10)),
            (bob.id, 80.0, date!(2025 - 01 - 05)),
            (bob.id, -30.0, date!(2025 - 01 - 15)),
            (bob.id, -5.0, date!(2025 - 02 - 01)),
        ] {
            create_transaction(
                NewTransaction::new(owner, amount, date, "test", today).unwrap(),
                &connection,
            )
            .unwrap();
        }

        ReportsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn get_page(user_id: i64, role: Role) -> scraper::Html {
        let identity = Identity {
            user_id: UserID::new(user_id),
            role,
        };

        let response = get_reports_page(
            State(get_state()),
            Extension(identity),
            Query(TableQuery::default()),
        )
        .await;
        assert_status_ok(&response);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        document
    }

    #[tokio::test]
    async fn admin_summary_covers_every_user() {
        let document = get_page(1, Role::Admin).await;

        assert_eq!(
            select_text(&document, "tbody tr td:first-child"),
            vec!["2025-02", "2025-01"]
        );
        assert_eq!(
            select_text(&document, "tbody tr td:nth-child(2)"),
            vec!["$200.00", "$80.00"]
        );
        assert_eq!(
            select_text(&document, "dd"),
            vec!["$280.00", "$35.00", "$245.00"]
        );
    }

    #[tokio::test]
    async fn user_summary_only_covers_own_transactions() {
        let document = get_page(2, Role::User).await;

        assert_eq!(
            select_text(&document, "tbody tr td:nth-child(4)"),
            vec!["-$5.00", "$50.00"]
        );
        assert_eq!(
            select_text(&document, "a[download]"),
            vec!["Export transactions as CSV"]
        );
    }
}

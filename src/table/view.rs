//! Renders a table with its search box, sortable headers, pagination and modal.

use maud::{Markup, html};

use crate::{
    html::{
        BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
    },
    pagination::{MAX_PAGE_LINKS, create_pagination_indicators, pagination_html},
};

use super::{
    column::Column,
    config::TableConfig,
    query::TableQuery,
    record::TableRecord,
    state::{SortDirection, TableState, TableView},
};

/// Everything needed to render a table.
pub struct TableProps<'a, R> {
    pub config: &'a TableConfig,
    pub state: &'a TableState,
    pub view: &'a TableView<'a, R>,
    /// Whether to show the add button and the edit link on each row.
    pub can_edit: bool,
    /// The contents of the open modal, if any.
    pub modal: Option<Markup>,
}

pub fn table_view<R: TableRecord>(props: TableProps<'_, R>) -> Markup {
    let TableProps {
        config,
        state,
        view,
        can_edit,
        modal,
    } = props;

    // Links are built from the clamped page so that sorting from an
    // out-of-range page does not produce another out-of-range link.
    let mut current_state = state.clone();
    current_state.set_page(view.page);
    let current_query = TableQuery::from_state(&current_state);

    let add_url = current_query
        .clone()
        .with_modal(config.add_kind, None)
        .to_url(config.path);
    let indicators =
        create_pagination_indicators(view.page as u64, view.total_pages as u64, MAX_PAGE_LINKS);
    let page_url = |page: u64| {
        let mut state = current_state.clone();
        state.set_page(page as usize);
        TableQuery::from_state(&state).to_url(config.path)
    };

    html! {
        section class="w-full max-w-screen-lg"
        {
            div class="flex flex-wrap items-center justify-between gap-4 mb-4"
            {
                h1 class="text-xl font-bold" { (config.title) }

                @if can_edit {
                    a href=(add_url) class=(LINK_STYLE) { "Add" }
                }
            }

            (search_form(config, &current_state))

            div class="relative overflow-x-auto shadow-md rounded-lg"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            @for column in &config.columns {
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    (column_header(config, &current_state, column))
                                }
                            }

                            @if can_edit {
                                th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                            }
                        }
                    }

                    tbody
                    {
                        @for row in &view.rows {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                @for column in &config.columns {
                                    td class=(TABLE_CELL_STYLE) { (row.display_cell(column.key)) }
                                }

                                @if can_edit {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        @if let Some(id) = row.id() {
                                            a
                                                href=(current_query.clone().with_modal(config.add_kind, Some(id)).to_url(config.path))
                                                class=(LINK_STYLE)
                                            {
                                                "Edit"
                                            }
                                        }
                                    }
                                }
                            }
                        }

                        @if view.rows.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td
                                    colspan=(config.columns.len() + usize::from(can_edit))
                                    class=(TABLE_CELL_STYLE)
                                {
                                    "Nothing here yet."
                                }
                            }
                        }
                    }
                }
            }

            p class="mt-2 text-sm text-gray-500 dark:text-gray-400"
            {
                "Showing " (view.rows.len()) " of " (view.filtered_count) " rows"
            }

            (pagination_html(&indicators, page_url))

            @if let Some(modal) = modal {
                (modal_container(modal, &current_query.to_url(config.path)))
            }
        }
    }
}

fn search_form(config: &TableConfig, state: &TableState) -> Markup {
    let sort = state.sort();

    html! {
        form method="get" action=(config.path) class="flex gap-2 mb-4"
        {
            input
                type="search"
                name="search"
                aria-label="Search"
                placeholder="Search"
                value=(state.search())
                class=(FORM_TEXT_INPUT_STYLE);

            @if let Some(key) = &sort.key {
                input type="hidden" name="sort" value=(key);
                input type="hidden" name="direction" value=(direction_param(sort.direction));
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) style="width: auto" { "Search" }
        }
    }
}

fn column_header(config: &TableConfig, state: &TableState, column: &Column) -> Markup {
    if !column.sortable {
        return html! { (column.label) };
    }

    let mut next_state = state.clone();
    next_state.toggle_sort(column.key);
    let url = TableQuery::from_state(&next_state).to_url(config.path);

    let sort = state.sort();
    let arrow = match (sort.key.as_deref() == Some(column.key), sort.direction) {
        (true, SortDirection::Ascending) => " ▲",
        (true, SortDirection::Descending) => " ▼",
        (false, _) => "",
    };

    html! {
        a href=(url) class="hover:underline" { (column.label) (arrow) }
    }
}

fn direction_param(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "asc",
        SortDirection::Descending => "desc",
    }
}

fn modal_container(content: Markup, close_url: &str) -> Markup {
    html! {
        div
            role="dialog"
            aria-modal="true"
            class="fixed inset-0 z-50 flex items-center justify-center bg-gray-900/50"
        {
            div class="w-full max-w-md p-6 bg-white rounded-lg shadow dark:bg-gray-800"
            {
                (content)

                a href=(close_url) class=(LINK_STYLE) { "Cancel" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::table::{
        CellValue, Column, ModalKind, TableConfig, TableRecord,
        state::{SortDirection, SortState, TableState},
    };

    use super::{TableProps, table_view};

    struct Row {
        id: i64,
        name: &'static str,
    }

    impl TableRecord for Row {
        fn id(&self) -> Option<i64> {
            Some(self.id)
        }

        fn cells(&self) -> Vec<(&'static str, CellValue)> {
            vec![("name", self.name.into()), ("id", self.id.into())]
        }
    }

    fn config() -> TableConfig {
        TableConfig {
            title: "People",
            path: "/people",
            columns: vec![Column::new("name", "Name"), Column::unsortable("id", "ID")],
            add_kind: ModalKind::User,
        }
    }

    fn render(state: &TableState, records: &[Row], can_edit: bool) -> Html {
        let config = config();
        let view = state.derive(records);

        let markup = table_view(TableProps {
            config: &config,
            state,
            view: &view,
            can_edit,
            modal: None,
        });

        Html::parse_fragment(&markup.into_string())
    }

    fn header_links(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("th a").unwrap())
            .filter_map(|a| a.value().attr("href").map(str::to_owned))
            .collect()
    }

    #[test]
    fn only_sortable_columns_have_links() {
        let html = render(&TableState::default(), &[Row { id: 1, name: "Ann" }], false);

        assert_eq!(header_links(&html), ["/people?sort=name&direction=asc"]);
    }

    #[test]
    fn sorted_column_links_to_opposite_direction() {
        let state = TableState::new(
            "",
            SortState {
                key: Some("name".to_owned()),
                direction: SortDirection::Ascending,
            },
            1,
        );

        let html = render(&state, &[Row { id: 1, name: "Ann" }], false);

        assert_eq!(header_links(&html), ["/people?sort=name&direction=desc"]);
    }

    #[test]
    fn edit_links_only_shown_when_editable() {
        let records = [Row { id: 1, name: "Ann" }, Row { id: 2, name: "Bob" }];
        let edit_selector = Selector::parse("td a").unwrap();

        let read_only = render(&TableState::default(), &records, false);
        assert_eq!(read_only.select(&edit_selector).count(), 0);

        let editable = render(&TableState::default(), &records, true);
        let hrefs = editable
            .select(&edit_selector)
            .filter_map(|a| a.value().attr("href"))
            .collect::<Vec<_>>();
        assert_eq!(
            hrefs,
            [
                "/people?modal=user&selected=1",
                "/people?modal=user&selected=2"
            ]
        );
    }

    #[test]
    fn shows_one_row_per_record_on_page() {
        let records = (1..=7)
            .map(|id| Row { id, name: "row" })
            .collect::<Vec<_>>();

        let html = render(&TableState::default(), &records, false);

        let row_count = html.select(&Selector::parse("tbody tr").unwrap()).count();
        assert_eq!(row_count, 5);
    }

    #[test]
    fn empty_table_shows_placeholder() {
        let html = render(&TableState::default(), &[], false);

        let text = html
            .select(&Selector::parse("tbody td").unwrap())
            .map(|td| td.text().collect::<String>())
            .collect::<String>();
        assert_eq!(text, "Nothing here yet.");
    }
}

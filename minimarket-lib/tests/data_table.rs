use std::sync::{Arc, Mutex};

use minimarket_lib::table::{
    Column, DataTable, PageRequest, Row, RowAction, RowId, SelectionMode, SortDirection,
    TableEvent, TableOptions, Value,
};

fn grocery_rows() -> Vec<Row> {
    vec![
        Row::new().set("id", 1).set("name", "Coke").set("price", 5),
        Row::new().set("id", 2).set("name", "Bread").set("price", 2),
        Row::new().set("id", 3).set("name", "Milk").set("price", 5),
    ]
}

fn grocery_table() -> DataTable {
    DataTable::new(vec![
        Column::new("name", "Producto"),
        Column::new("price", "Precio").currency(),
    ])
    .unwrap()
    .with_rows(grocery_rows())
}

fn numbered_table(count: i64) -> DataTable {
    let rows: Vec<Row> = (1..=count)
        .map(|i| {
            Row::new()
                .set("id", i)
                .set("name", format!("Producto {}", i))
                .set("stock", i % 4)
        })
        .collect();
    DataTable::new(vec![Column::new("name", "Producto"), Column::new("stock", "Stock")])
        .unwrap()
        .with_rows(rows)
}

fn names(table: &DataTable) -> Vec<String> {
    table
        .derive_view()
        .rows
        .iter()
        .map(|r| r.row.get("name").map(Value::to_string).unwrap_or_default())
        .collect()
}

fn page_ids(table: &DataTable) -> Vec<RowId> {
    table.derive_view().rows.iter().map(|r| r.id.clone()).collect()
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn test_sort_is_stable_ascending() {
    let mut table = grocery_table();
    table.set_sort("price");
    assert_eq!(names(&table), vec!["Bread", "Coke", "Milk"]);
}

#[test]
fn test_sort_is_stable_descending() {
    let mut table = grocery_table();
    table.set_sort("price");
    table.set_sort("price");
    assert_eq!(table.sort_direction(), SortDirection::Desc);
    // Coke still precedes Milk: desc flips the comparison, not the array.
    assert_eq!(names(&table), vec!["Coke", "Milk", "Bread"]);
}

#[test]
fn test_sort_toggle_three_times() {
    let mut table = grocery_table();
    for expected in [SortDirection::Asc, SortDirection::Desc, SortDirection::Asc] {
        table.set_sort("name");
        assert_eq!(table.sort_column(), Some("name"));
        assert_eq!(table.sort_direction(), expected);
    }
}

#[test]
fn test_missing_values_sort_first_ascending_last_descending() {
    let mut table = grocery_table();
    table.add_row(Row::new().set("id", 4).set("name", "Water"));
    table.set_sort("price");
    assert_eq!(names(&table), vec!["Water", "Bread", "Coke", "Milk"]);
    table.set_sort("price");
    assert_eq!(names(&table), vec!["Coke", "Milk", "Bread", "Water"]);
}

#[test]
fn test_clear_sort_restores_data_order() {
    let mut table = grocery_table();
    table.set_sort("name");
    assert_eq!(names(&table), vec!["Bread", "Coke", "Milk"]);
    table.clear_sort();
    assert_eq!(table.sort_column(), None);
    assert_eq!(names(&table), vec!["Coke", "Bread", "Milk"]);
}

#[test]
fn test_non_sortable_column_ignored() {
    let mut table = DataTable::new(vec![
        Column::new("name", "Producto").sortable(false),
        Column::actions("actions", "Acciones", vec![]),
    ])
    .unwrap()
    .with_rows(grocery_rows());
    table.set_sort("name");
    table.set_sort("actions");
    assert_eq!(table.sort_column(), None);
}

#[test]
fn test_sort_by_nested_path() {
    let rows = vec![
        Row::new().set("id", 1).set("supplier", Row::new().set("name", "Lindley")),
        Row::new().set("id", 2).set("supplier", Row::new().set("name", "Gloria")),
    ];
    let mut table = DataTable::new(vec![Column::new("supplier.name", "Proveedor")])
        .unwrap()
        .with_rows(rows);
    table.set_sort("supplier.name");
    assert_eq!(page_ids(&table), vec![RowId::from(2), RowId::from(1)]);
}

// ============================================================================
// Search & filters
// ============================================================================

#[test]
fn test_search_only_returns_matching_rows() {
    let mut table = grocery_table();
    table.add_row(Row::new().set("id", 4).set("name", "Cocoa").set("price", 9));
    table.set_search_term("CO");

    let view = table.derive_view();
    assert_eq!(view.total_filtered, 2);
    for row in &view.rows {
        let name = row.row.get("name").unwrap().to_string().to_lowercase();
        assert!(name.contains("co"));
    }
}

#[test]
fn test_search_matches_raw_values_not_formatted() {
    let mut table = grocery_table();
    table.set_search_term("S/");
    assert_eq!(table.derive_view().total_filtered, 0);
    table.set_search_term("5");
    assert_eq!(names(&table), vec!["Coke", "Milk"]);
}

#[test]
fn test_search_skips_non_filterable_columns() {
    let mut table = DataTable::new(vec![
        Column::new("name", "Producto"),
        Column::new("code", "Código").filterable(false),
    ])
    .unwrap()
    .with_rows(vec![Row::new().set("name", "Arroz").set("code", "ZX-1")]);
    table.set_search_term("zx");
    assert!(table.derive_view().is_empty());
}

#[test]
fn test_filters_combine_with_and() {
    let mut table = numbered_table(20);
    table.set_filter("name", "producto 1");
    assert_eq!(table.derive_view().total_filtered, 11); // 1, 10..=19
    table.set_filter("stock", "3");
    // stock == i % 4 == 3 among 1 and 10..=19: 11, 15, 19
    assert_eq!(table.derive_view().total_filtered, 3);
    table.set_filter("name", "");
    assert_eq!(table.derive_view().total_filtered, 5); // 3, 7, 11, 15, 19
    assert!(!table.state().filters.contains_key("name"));
}

#[test]
fn test_filter_on_unknown_column_ignored() {
    let mut table = grocery_table();
    table.set_filter("nope", "x");
    assert!(table.state().filters.is_empty());
    assert_eq!(table.derive_view().total_filtered, 3);
}

#[test]
fn test_search_and_filter_reset_page() {
    let mut table = numbered_table(30);
    table.set_page(PageRequest::Number(3));
    table.set_search_term("producto");
    assert_eq!(table.state().current_page, 1);
    table.set_page(PageRequest::Number(2));
    table.set_filter("stock", "1");
    assert_eq!(table.state().current_page, 1);
}

// ============================================================================
// Paging
// ============================================================================

#[test]
fn test_page_bounds() {
    let mut table = numbered_table(25);
    let view = table.derive_view();
    assert_eq!(view.total_pages, 3);
    assert_eq!((view.page_start, view.page_end), (1, 10));

    table.set_page(PageRequest::Number(99));
    assert_eq!(table.state().current_page, 3);
    let view = table.derive_view();
    assert_eq!(view.rows.len(), 5);
    assert_eq!((view.page_start, view.page_end), (21, 25));

    table.set_page(PageRequest::Next);
    assert_eq!(table.state().current_page, 3);
    table.set_page(PageRequest::Number(0));
    assert_eq!(table.state().current_page, 1);
    table.set_page(PageRequest::Prev);
    assert_eq!(table.state().current_page, 1);
}

#[test]
fn test_page_clamped_after_rows_removed() {
    let mut table = numbered_table(25);
    table.set_page(PageRequest::Number(3));
    for i in 21..=25i64 {
        assert!(table.remove_row(&RowId::from(i)));
    }
    assert_eq!(table.state().current_page, 2);
    assert_eq!(table.derive_view().total_pages, 2);
}

#[test]
fn test_empty_data_keeps_page_one() {
    let mut table = numbered_table(25);
    table.set_page(PageRequest::Number(3));
    table.set_data(Vec::new());

    let view = table.derive_view();
    assert_eq!(view.current_page, 1);
    assert_eq!(view.total_pages, 0);
    assert_eq!((view.page_start, view.page_end), (0, 0));

    table.set_page(PageRequest::Next);
    assert_eq!(table.state().current_page, 1);
}

#[test]
fn test_page_size_change() {
    let mut table = numbered_table(25);
    table.set_page(PageRequest::Number(2));
    table.set_page_size(25);
    assert_eq!(table.state().current_page, 1);
    assert_eq!(table.derive_view().total_pages, 1);

    table.set_page_size(0);
    assert_eq!(table.state().page_size, 25);
}

#[test]
fn test_derive_view_is_repeatable() {
    let mut table = numbered_table(25);
    table.set_sort("stock");
    table.set_page(PageRequest::Number(2));
    assert_eq!(page_ids(&table), page_ids(&table));
    assert_eq!(table.state().current_page, 2);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_select_all_only_touches_current_page() {
    let mut table = numbered_table(25);
    table.toggle_select(&RowId::from(15));

    table.toggle_select_all();
    assert_eq!(table.selected_ids().len(), 11);
    assert!(table.is_selected(&RowId::from(15)));

    table.toggle_select_all();
    assert_eq!(table.selected_ids(), vec![RowId::from(15)]);

    table.set_page(PageRequest::Number(2));
    table.toggle_select_all();
    assert_eq!(table.selected_ids().len(), 10);
    assert!(table.derive_view().all_selected());
}

#[test]
fn test_selection_survives_sorting() {
    let mut table = grocery_table();
    table.toggle_select(&RowId::from(3));
    table.set_sort("name");
    let view = table.derive_view();
    let selected: Vec<_> = view.rows.iter().filter(|r| r.selected).map(|r| r.id.clone()).collect();
    assert_eq!(selected, vec![RowId::from(3)]);
    assert_eq!(table.selected_rows()[0].get("name"), Some(&Value::from("Milk")));
}

#[test]
fn test_unknown_id_not_selected() {
    let mut table = grocery_table();
    table.toggle_select(&RowId::from(42));
    assert!(table.selected_ids().is_empty());
}

#[test]
fn test_single_selection_mode() {
    let mut table = grocery_table().with_options(TableOptions {
        selection_mode: SelectionMode::Single,
        ..TableOptions::default()
    });
    table.toggle_select(&RowId::from(1));
    table.toggle_select(&RowId::from(2));
    assert_eq!(table.selected_ids(), vec![RowId::from(2)]);
    table.toggle_select_all();
    assert_eq!(table.selected_ids(), vec![RowId::from(2)]);
    table.toggle_select(&RowId::from(2));
    assert!(table.selected_ids().is_empty());
}

#[test]
fn test_no_selection_mode() {
    let mut table = grocery_table().with_options(TableOptions {
        selection_mode: SelectionMode::None,
        ..TableOptions::default()
    });
    table.toggle_select(&RowId::from(1));
    table.toggle_select_all();
    assert!(table.selected_ids().is_empty());
}

#[test]
fn test_set_data_clears_selection() {
    let mut table = grocery_table();
    table.toggle_select(&RowId::from(1));
    table.set_data(grocery_rows());
    assert!(table.selected_ids().is_empty());
}

#[test]
fn test_positional_ids_shift_on_remove() {
    let rows = ["A", "B", "C", "D"]
        .iter()
        .map(|name| Row::new().set("name", *name))
        .collect::<Vec<_>>();
    let mut table = DataTable::new(vec![Column::new("name", "Nombre")])
        .unwrap()
        .with_rows(rows);

    table.toggle_select(&RowId::Index(1));
    table.toggle_select(&RowId::Index(3));
    assert!(table.remove_row(&RowId::Index(1)));

    assert_eq!(table.selected_ids(), vec![RowId::Index(2)]);
    assert_eq!(table.selected_rows()[0].get("name"), Some(&Value::from("D")));
}

// ============================================================================
// Row mutations, cells & actions
// ============================================================================

#[test]
fn test_update_row_merges_fields() {
    let mut table = grocery_table();
    assert!(table.update_row(&RowId::from(2), &Row::new().set("price", 10)));
    assert!(!table.update_row(&RowId::from(9), &Row::new().set("price", 1)));
    table.set_sort("price");
    assert_eq!(names(&table), vec!["Coke", "Milk", "Bread"]);
}

#[test]
fn test_update_row_id_change_moves_selection() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut table = grocery_table();
    table.toggle_select(&RowId::from(1));
    table.toggle_select(&RowId::from(3));
    let sink = Arc::clone(&events);
    table.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

    assert!(table.update_row(&RowId::from(1), &Row::new().set("id", 99)));

    assert!(table.row(&RowId::from(1)).is_none());
    assert!(table.is_selected(&RowId::from(99)));
    assert_eq!(table.selected_ids(), vec![RowId::from(3), RowId::from(99)]);
    assert_eq!(table.selected_rows().len(), 2);
    assert!(events.lock().unwrap().contains(&TableEvent::SelectionChanged {
        selected: vec![RowId::from(3), RowId::from(99)]
    }));
}

#[test]
fn test_update_row_null_id_falls_back_to_position() {
    let mut table = grocery_table();
    table.toggle_select(&RowId::from(1));

    assert!(table.update_row(&RowId::from(1), &Row::new().set("id", Value::Null)));

    assert_eq!(table.selected_ids(), vec![RowId::Index(0)]);
    assert_eq!(table.selected_rows()[0].get("name"), Some(&Value::from("Coke")));
}

#[test]
fn test_update_row_without_id_change_keeps_selection_quiet() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut table = grocery_table();
    table.toggle_select(&RowId::from(2));
    let sink = Arc::clone(&events);
    table.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

    table.update_row(&RowId::from(2), &Row::new().set("price", 3));

    assert_eq!(table.selected_ids(), vec![RowId::from(2)]);
    assert_eq!(*events.lock().unwrap(), vec![TableEvent::DataChanged { total: 3 }]);
}

#[test]
fn test_caller_rows_are_not_mutated() {
    let rows = Arc::new(grocery_rows());
    let mut table = DataTable::new(vec![Column::new("name", "Producto")])
        .unwrap()
        .with_rows(Arc::clone(&rows));
    table.update_row(&RowId::from(1), &Row::new().set("name", "Pepsi"));
    assert_eq!(rows[0].get("name"), Some(&Value::from("Coke")));
    assert_eq!(table.rows()[0].get("name"), Some(&Value::from("Pepsi")));
}

#[test]
fn test_cells_render_by_kind() {
    let table = DataTable::new(vec![
        Column::new("name", "Producto"),
        Column::new("price", "Precio").currency(),
        Column::new("created", "Creado").date(),
        Column::new("status", "Estado").badge(Some(Arc::new(|v: &Value| {
            if v.as_str() == Some("activo") {
                "success".to_string()
            } else {
                "danger".to_string()
            }
        }))),
        Column::actions(
            "actions",
            "Acciones",
            vec![RowAction::new("edit", "Editar"), RowAction::new("delete", "Eliminar")],
        ),
    ])
    .unwrap();

    let row = Row::new()
        .set("name", "Arroz")
        .set("price", 1234.5)
        .set("created", "2024-01-05")
        .set("status", "activo");
    let cells = table.cells(&row);

    assert_eq!(cells[0].text, "Arroz");
    assert_eq!(cells[1].text, "S/ 1,234.50");
    assert_eq!(cells[2].text, "05/01/2024");
    assert_eq!(cells[3].text, "activo");
    assert_eq!(cells[3].badge.as_deref(), Some("success"));
    assert_eq!(cells[4].text, "Editar Eliminar");
}

#[test]
fn test_invoke_action() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let table = DataTable::new(vec![
        Column::new("name", "Producto"),
        Column::actions(
            "actions",
            "Acciones",
            vec![RowAction::new("edit", "Editar").handler(move |row, id| {
                sink.lock().unwrap().push((id.clone(), row.get("name").cloned()));
            })],
        ),
    ])
    .unwrap()
    .with_rows(grocery_rows());

    assert!(table.invoke_action("edit", &RowId::from(2)));
    assert!(!table.invoke_action("delete", &RowId::from(2)));
    assert!(!table.invoke_action("edit", &RowId::from(7)));
    assert_eq!(
        *calls.lock().unwrap(),
        vec![(RowId::from(2), Some(Value::from("Bread")))]
    );
}

#[test]
fn test_rows_from_json() {
    let rows: Vec<Row> = serde_json::from_str(
        r#"[{"id": "a1", "name": "Azúcar", "price": 4.2},
            {"id": "a2", "name": "Sal", "price": null}]"#,
    )
    .unwrap();
    let mut table = DataTable::new(vec![Column::new("name", "Producto"), Column::new("price", "Precio")])
        .unwrap()
        .with_rows(rows);
    table.set_sort("price");
    assert_eq!(page_ids(&table), vec![RowId::from("a2"), RowId::from("a1")]);
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_events_are_published_to_every_subscriber() {
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(0usize));
    let mut table = grocery_table();

    let sink = Arc::clone(&first);
    table.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
    let counter = Arc::clone(&second);
    let id = table.subscribe(move |_| *counter.lock().unwrap() += 1);

    table.set_sort("price");
    table.set_filter("name", "k");
    table.toggle_select(&RowId::from(1));
    assert!(table.unsubscribe(id));
    table.set_page_size(25);

    assert_eq!(
        *first.lock().unwrap(),
        vec![
            TableEvent::SortChanged {
                column: "price".into(),
                direction: SortDirection::Asc
            },
            TableEvent::FilterChanged {
                column: "name".into(),
                value: Some("k".into())
            },
            TableEvent::SelectionChanged {
                selected: vec![RowId::from(1)]
            },
            TableEvent::PageSizeChanged { page_size: 25 },
        ]
    );
    assert_eq!(*second.lock().unwrap(), 3);
}

#[test]
fn test_duplicate_column_keys_fail_fast() {
    let err = DataTable::new(vec![Column::new("name", "A"), Column::new("name", "B")]).unwrap_err();
    assert_eq!(err.to_string(), "Duplicate column key 'name'");
}

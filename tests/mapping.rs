use sales_insights::{
    Dataset, FieldMapping, SemanticField, detect_mapping,
    mapping::{ColumnMapper, is_date_column},
};

fn headers_only(headers: &[&str]) -> Dataset {
    Dataset::from_rows(headers.iter().copied(), Vec::<Vec<&str>>::new())
}

#[test]
fn english_headers_map_to_their_fields() {
    let dataset = headers_only(&[
        "Order ID",
        "Customer Name",
        "Product Name",
        "Qty",
        "Unit Price",
        "Total",
        "Region",
        "Payment Method",
    ]);
    let mapping = detect_mapping(&dataset);
    assert_eq!(mapping.get(SemanticField::OrderId), Some("Order ID"));
    assert_eq!(mapping.get(SemanticField::CustomerName), Some("Customer Name"));
    assert_eq!(mapping.get(SemanticField::ProductName), Some("Product Name"));
    assert_eq!(mapping.get(SemanticField::Quantity), Some("Qty"));
    assert_eq!(mapping.get(SemanticField::Price), Some("Unit Price"));
    assert_eq!(mapping.get(SemanticField::TotalAmount), Some("Total"));
    assert_eq!(mapping.get(SemanticField::Region), Some("Region"));
    assert_eq!(mapping.get(SemanticField::PaymentMethod), Some("Payment Method"));
    assert_eq!(mapping.get(SemanticField::Profit), None);
}

#[test]
fn arabic_headers_are_recognized() {
    let dataset = headers_only(&["رقم الطلب", "المنطقة", "الكمية", "تاريخ الطلب"]);
    let mapping = detect_mapping(&dataset);
    assert_eq!(mapping.get(SemanticField::OrderId), Some("رقم الطلب"));
    assert_eq!(mapping.get(SemanticField::Region), Some("المنطقة"));
    assert_eq!(mapping.get(SemanticField::Quantity), Some("الكمية"));
    assert_eq!(mapping.get(SemanticField::OrderDate), Some("تاريخ الطلب"));
}

#[test]
fn header_case_and_punctuation_do_not_matter() {
    for header in ["order_id", "ORDER_ID", "Order_Id", "Order-ID", "order.id"] {
        let mapping = detect_mapping(&headers_only(&[header]));
        assert_eq!(mapping.get(SemanticField::OrderId), Some(header), "{header}");
    }
}

#[test]
fn surrounding_punctuation_does_not_change_detection() {
    let cases = [
        ("Sales:", SemanticField::TotalAmount),
        ("Customer.", SemanticField::CustomerName),
        ("Product #", SemanticField::ProductName),
        ("Type:", SemanticField::Category),
        ("(Item)", SemanticField::ProductName),
        ("العميل:", SemanticField::CustomerName),
        ("المنتج.", SemanticField::ProductName),
    ];
    for (header, field) in cases {
        let mapping = detect_mapping(&headers_only(&[header]));
        assert_eq!(mapping.get(field), Some(header), "{header}");
    }
}

#[test]
fn first_matching_column_wins() {
    let dataset = headers_only(&["Total", "Amount"]);
    let mapping = detect_mapping(&dataset);
    assert_eq!(mapping.get(SemanticField::TotalAmount), Some("Total"));
}

#[test]
fn one_column_may_serve_several_fields() {
    let mapping = detect_mapping(&headers_only(&["Discount Amount"]));
    assert_eq!(mapping.get(SemanticField::TotalAmount), Some("Discount Amount"));
    assert_eq!(mapping.get(SemanticField::Discount), Some("Discount Amount"));
}

#[test]
fn unnamed_date_column_is_found_by_sampling() {
    let dataset = Dataset::from_rows(
        ["when", "amount"],
        vec![
            vec!["2024-01-05", "10"],
            vec!["05/02/2024", "20"],
            vec!["2024-03-09 14:30:00", "30"],
        ],
    );
    let mapping = detect_mapping(&dataset);
    assert_eq!(mapping.get(SemanticField::OrderDate), Some("when"));
    assert!(is_date_column(dataset.column("when").unwrap()));
    assert!(!is_date_column(dataset.column("amount").unwrap()));
}

#[test]
fn sampling_needs_most_values_to_parse() {
    let dataset = Dataset::from_rows(
        ["note"],
        vec![
            vec!["2024-01-05"],
            vec!["call back"],
            vec!["n/a later"],
            vec!["urgent"],
        ],
    );
    assert!(!is_date_column(dataset.column("note").unwrap()));
    assert_eq!(detect_mapping(&dataset).get(SemanticField::OrderDate), None);
}

#[test]
fn detection_of_an_empty_table_is_empty() {
    let mapping = ColumnMapper::new().detect(&Dataset::default());
    assert!(mapping.is_empty());
}

#[test]
fn assignments_override_and_clear_fields() {
    let mut mapping = FieldMapping::default().with(SemanticField::Region, "Zone");
    mapping.apply_assignment("amount=Net Sales").unwrap();
    mapping.apply_assignment("region=").unwrap();
    assert_eq!(mapping.get(SemanticField::TotalAmount), Some("Net Sales"));
    assert!(!mapping.contains(SemanticField::Region));
    assert!(mapping.apply_assignment("no_such_field=x").is_err());
    assert!(mapping.apply_assignment("missing separator").is_err());
}

#[test]
fn mapping_serializes_by_field_key() {
    let mapping = FieldMapping::default()
        .with(SemanticField::OrderId, "Order ID")
        .with(SemanticField::Price, "Unit Price");
    let json = serde_json::to_value(&mapping).unwrap();
    assert_eq!(json["order_id"], "Order ID");
    assert_eq!(json["price"], "Unit Price");
    assert!(json.get("region").is_none());

    let legacy: FieldMapping =
        serde_json::from_str(r#"{"unit_price": "Price", "total_amount": "Total"}"#).unwrap();
    assert_eq!(legacy.get(SemanticField::Price), Some("Price"));
    assert_eq!(legacy.get(SemanticField::TotalAmount), Some("Total"));
}

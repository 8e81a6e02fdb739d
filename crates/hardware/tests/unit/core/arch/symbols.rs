use pipesim_core::core::arch::SymbolTable;
use pipesim_core::isa::Target;

fn table() -> SymbolTable {
    let mut table = SymbolTable::new();
    assert!(table.define_text("main", 0));
    assert!(table.define_text("loop", 12));
    assert!(table.define_data("arr", 2));
    table
}

#[test]
fn duplicate_labels_rejected_across_sections() {
    let mut table = table();
    assert!(!table.define_text("loop", 40));
    assert!(!table.define_data("main", 0));
    assert_eq!(table.text_address("loop"), Some(12));
}

#[test]
fn address_of_prefers_data() {
    let table = table();
    assert_eq!(table.address_of("arr"), Some(2));
    assert_eq!(table.address_of("loop"), Some(12));
    assert_eq!(table.address_of("nope"), None);
}

#[test]
fn resolve_labels_and_offsets() {
    let table = table();
    assert_eq!(table.resolve(&Target::Label("loop".into()), 100), Ok(12));
    assert_eq!(table.resolve(&Target::Offset(-2), 16), Ok(8));
    assert_eq!(table.resolve(&Target::Offset(3), 0), Ok(12));
    // Data labels are not branch targets.
    let arr = Target::Label("arr".into());
    assert_eq!(table.resolve(&arr, 0), Err("arr"));
}

#[test]
fn labels_listed_in_name_order() {
    let table = table();
    let text: Vec<_> = table.text_labels().collect();
    assert_eq!(text, vec![("loop", 12), ("main", 0)]);
    let data: Vec<_> = table.data_labels().collect();
    assert_eq!(data, vec![("arr", 2)]);
}

//! Built-in pick lists

pub const PICK_LIST_1: &[&str] = &["biscuits", "soap", "soap2"];

pub const PICK_LIST_2: &[&str] = &["biscuits", "soap", "book", "soap2", "glue"];

pub const PICK_LIST_3: &[&str] = &[
    "sticky_notes",
    "book",
    "snacks",
    "biscuits",
    "eraser",
    "soap2",
    "soap",
    "glue",
];

/// Used for any selector without a dedicated list
pub const GENERAL_LIST: &[&str] = &[
    "beer",
    "bowl",
    "create",
    "disk_part",
    "hammer",
    "plastic_cup",
    "soda_can",
];

/// Models captured for a pick list selector, in capture order
pub fn models_for_list(list: i32) -> &'static [&'static str] {
    match list {
        1 => PICK_LIST_1,
        2 => PICK_LIST_2,
        3 => PICK_LIST_3,
        _ => GENERAL_LIST,
    }
}

/// Human readable name of a pick list selector
pub fn list_name(list: i32) -> String {
    match list {
        1..=3 => format!("pick_list_{}", list),
        _ => "general list".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorstick_sim::ModelCatalog;

    #[test]
    fn test_list_selection() {
        assert_eq!(models_for_list(1).len(), 3);
        assert_eq!(models_for_list(2).len(), 5);
        assert_eq!(models_for_list(3).len(), 8);
        assert_eq!(models_for_list(0), GENERAL_LIST);
        assert_eq!(models_for_list(-4), GENERAL_LIST);
        assert_eq!(models_for_list(42), GENERAL_LIST);
    }

    #[test]
    fn test_list_names() {
        assert_eq!(list_name(2), "pick_list_2");
        assert_eq!(list_name(7), "general list");
    }

    #[test]
    fn test_every_listed_model_is_in_the_catalog() {
        let catalog = ModelCatalog::builtin();
        for list in [1, 2, 3, 4] {
            for model in models_for_list(list) {
                assert!(catalog.contains(model), "{} missing from catalog", model);
            }
        }
    }
}

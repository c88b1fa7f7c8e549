//! Lookup is case- and whitespace-insensitive and never fails.

use medassist_catalog::{Catalog, DiseaseRecord};
use proptest::prelude::*;

fn case_variant(name: &str, mask: &[bool]) -> String {
    name.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| {
            if *upper {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_known_names_resolve_in_any_case(
        index in 0usize..4,
        mask in proptest::collection::vec(any::<bool>(), 1..16),
        lead in 0usize..3,
        trail in 0usize..3,
    ) {
        let catalog = Catalog::builtin();
        let name = catalog.names()[index].to_string();
        let query = format!("{}{}{}", " ".repeat(lead), case_variant(&name, &mask), " ".repeat(trail));

        let record = catalog.lookup(&query);
        prop_assert_eq!(&record.name, &name);
        prop_assert!(!record.is_not_found());
    }

    #[test]
    fn prop_unknown_names_give_sentinel(query in "[a-z]{1,12}") {
        let catalog = Catalog::builtin();
        prop_assume!(catalog.get(&query).is_none());

        prop_assert_eq!(catalog.lookup(&query), &DiseaseRecord::not_found());
    }
}

use client_book::db::filter::{lookup_query, Column};
use client_book::ClientFilter;
use proptest::prelude::*;

// Patterns start with '~', which the lookup SQL never contains on its own
fn arb_pattern() -> impl Strategy<Value = Option<String>> {
    prop::option::of("~[a-zа-я0-9%_' ;-]{0,12}")
}

fn build(
    first: &Option<String>,
    last: &Option<String>,
    phone: &Option<String>,
    email: &Option<String>,
) -> ClientFilter {
    let mut filter = ClientFilter::new();
    if let Some(v) = first {
        filter = filter.first_name(v);
    }
    if let Some(v) = last {
        filter = filter.last_name(v);
    }
    if let Some(v) = phone {
        filter = filter.phone(v);
    }
    if let Some(v) = email {
        filter = filter.email(v);
    }
    filter
}

proptest! {
    /// Property: every supplied filter becomes exactly one bound parameter
    #[test]
    fn prop_one_bind_per_filter(
        first in arb_pattern(),
        last in arb_pattern(),
        phone in arb_pattern(),
        email in arb_pattern(),
    ) {
        let supplied = [&first, &last, &phone, &email].iter().filter(|v| v.is_some()).count();
        let predicates = build(&first, &last, &phone, &email).predicates();
        prop_assert_eq!(predicates.len(), supplied);

        let builder = lookup_query(&predicates);
        let sql = builder.sql();

        for n in 1..=supplied {
            let placeholder = format!("${n}");
            prop_assert!(sql.contains(&placeholder));
        }
        let past_end = format!("${}", supplied + 1);
        prop_assert!(!sql.contains(&past_end));
        prop_assert_eq!(sql.matches(" ILIKE ").count(), supplied);
        prop_assert_eq!(sql.contains(" WHERE "), supplied > 0);
    }

    /// Property: filter text is bound, never spliced into the statement
    #[test]
    fn prop_values_never_reach_sql_text(
        first in arb_pattern(),
        last in arb_pattern(),
        phone in arb_pattern(),
        email in arb_pattern(),
    ) {
        let predicates = build(&first, &last, &phone, &email).predicates();
        let builder = lookup_query(&predicates);

        prop_assert!(!builder.sql().contains('~'));
    }

    /// Property: predicates keep first name, last name, phone, email order
    #[test]
    fn prop_predicates_in_column_order(
        first in arb_pattern(),
        last in arb_pattern(),
        phone in arb_pattern(),
        email in arb_pattern(),
    ) {
        let order = |c: Column| match c {
            Column::FirstName => 0,
            Column::LastName => 1,
            Column::Phone => 2,
            Column::Email => 3,
        };
        let ranks: Vec<u8> = build(&first, &last, &phone, &email)
            .predicates()
            .iter()
            .map(|p| order(p.column))
            .collect();

        prop_assert!(ranks.windows(2).all(|w| w[0] < w[1]));
    }
}

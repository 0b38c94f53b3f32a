//! Request side: field names and order follow the WSDL declaration.

use super::FieldRecord;

/// Key used for fuzzy name comparison: lower-cased, underscores removed.
pub fn match_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// For each name, the index of the first declared name it fuzzy-matches.
pub fn fuzzy_matches<S: AsRef<str>>(names: &[&str], declared_names: &[S]) -> Vec<Option<usize>> {
    let matcher: Vec<String> = declared_names
        .iter()
        .map(|name| match_key(name.as_ref()))
        .collect();

    names
        .iter()
        .map(|name| {
            let key = match_key(name);
            matcher.iter().position(|candidate| *candidate == key)
        })
        .collect()
}

/// Renames every record to its declared element name and sorts the records
/// in declaration order.
///
/// Records whose name matches no declaration keep their name and move after
/// all matched records, in their original relative order.
pub fn normalize_request<S: AsRef<str>>(records: &mut [FieldRecord], declared_names: &[S]) {
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let renames = fuzzy_matches(&names, declared_names);

    for (record, found_at) in records.iter_mut().zip(renames) {
        if let Some(index) = found_at {
            record.name = declared_names[index].as_ref().to_string();
        }
    }

    records.sort_by_key(|record| {
        declared_names
            .iter()
            .position(|name| name.as_ref() == record.name)
            .unwrap_or(usize::MAX)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn records(names: &[&str]) -> Vec<FieldRecord> {
        names
            .iter()
            .map(|name| FieldRecord::new(*name, Vec::new()))
            .collect()
    }

    fn names(records: &[FieldRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn fuzzy_names_map_to_declared_names() {
        let mut input = records(&["camel_case", "with_underscore", "one_word"]);
        normalize_request(&mut input, &["CamelCase", "With_Underscore", "Oneword"]);
        assert_eq!(names(&input), ["CamelCase", "With_Underscore", "Oneword"]);
    }

    #[test]
    fn records_follow_declaration_order() {
        let mut input = records(&["third", "first", "second"]);
        normalize_request(&mut input, &["First", "Second", "Third"]);
        assert_eq!(names(&input), ["First", "Second", "Third"]);
    }

    #[test]
    fn unmatched_records_go_last_in_original_order() {
        let mut input = records(&["zeta", "second", "alpha", "first"]);
        normalize_request(&mut input, &["First", "Second"]);
        assert_eq!(names(&input), ["First", "Second", "zeta", "alpha"]);
    }

    #[test]
    fn empty_declaration_keeps_everything() {
        let mut input = records(&["b_name", "a_name"]);
        normalize_request::<&str>(&mut input, &[]);
        assert_eq!(names(&input), ["b_name", "a_name"]);
    }

    #[test]
    fn duplicates_keep_their_relative_order() {
        let mut input = vec![
            FieldRecord::new("second", vec![json!(1)]),
            FieldRecord::new("Second", vec![json!(2)]),
            FieldRecord::new("first", vec![json!(3)]),
        ];
        normalize_request(&mut input, &["First", "Second"]);
        assert_eq!(names(&input), ["First", "Second", "Second"]);
        let args: Vec<&Value> = input.iter().map(|r| &r.args[0]).collect();
        assert_eq!(args, [&json!(3), &json!(1), &json!(2)]);
    }

    #[test]
    fn args_travel_with_their_record() {
        let mut input = vec![
            FieldRecord::new("account_id", vec![json!(42)]),
            FieldRecord::new("campaign_type", vec![json!("Search")]),
        ];
        normalize_request(&mut input, &["CampaignType", "AccountId"]);
        assert_eq!(input[0], FieldRecord::new("CampaignType", vec![json!("Search")]));
        assert_eq!(input[1], FieldRecord::new("AccountId", vec![json!(42)]));
    }

    #[test]
    fn first_declared_match_wins() {
        let matches = fuzzy_matches(&["ab", "nope"], &["A_B", "Ab"]);
        assert_eq!(matches, vec![Some(0), None]);
    }
}

use std::collections::HashSet;

/// Separator between members of `PATH`-like variables.
pub const SEPARATOR: char = ':';

/// Build a search path with `new_entries` at the front.
///
/// Each new entry appears once, in the given order. Members of
/// `current_path` equal to any new entry are dropped; the rest keep their
/// relative order after the new entries.
#[must_use]
pub fn insert_front<I, S>(current_path: &str, new_entries: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut members: Vec<String> = Vec::new();

    for entry in new_entries {
        let entry = entry.as_ref();
        if seen.insert(entry.to_string()) {
            members.push(entry.to_string());
        }
    }

    if !current_path.is_empty() {
        members.extend(
            current_path
                .split(SEPARATOR)
                .filter(|member| !seen.contains(*member))
                .map(str::to_string),
        );
    }

    members.join(&SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::insert_front;

    #[test]
    fn moves_existing_entries_to_the_front() {
        assert_eq!(insert_front("/a:/b:/c", ["/b", "/d"]), "/b:/d:/a:/c");
    }

    #[test]
    fn empty_current_path_yields_new_entries() {
        assert_eq!(insert_front("", ["/x", "/y"]), "/x:/y");
    }

    #[test]
    fn duplicate_new_entries_collapse() {
        assert_eq!(insert_front("/a", ["/x", "/y", "/x"]), "/x:/y:/a");
    }

    #[test]
    fn no_new_entries_returns_current_path() {
        let none: [&str; 0] = [];
        assert_eq!(insert_front("/a:/b", none), "/a:/b");
    }

    #[test]
    fn repeated_members_in_current_path_are_all_removed() {
        assert_eq!(insert_front("/b:/a:/b:/c:/b", ["/b"]), "/b:/a:/c");
    }

    #[test]
    fn unrelated_duplicates_in_current_path_are_kept() {
        assert_eq!(insert_front("/a:/c:/a", ["/b"]), "/b:/a:/c:/a");
    }

    #[test]
    fn applying_twice_is_stable() {
        let once = insert_front("/usr/bin:/bin", ["/ws/bin", "/go/bin"]);
        let twice = insert_front(&once, ["/ws/bin", "/go/bin"]);
        assert_eq!(once, twice);
    }
}

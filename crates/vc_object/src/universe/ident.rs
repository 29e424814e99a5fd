use alloc::format;
use alloc::string::String;

slotmap::new_key_type! {
    /// Handle of an object inside a [`Universe`](crate::universe::Universe).
    ///
    /// Handles are never reused: once an object is destroyed its handle
    /// stays dead.
    pub struct ObjectId;
}

/// Splits a two-digit counter suffix off `id`.
fn split_counter(id: &str) -> Option<(&str, u32)> {
    let bytes = id.as_bytes();
    let [.., tens, ones] = bytes else {
        return None;
    };
    if !tens.is_ascii_digit() || !ones.is_ascii_digit() {
        return None;
    }
    let counter = u32::from(tens - b'0') * 10 + u32::from(ones - b'0');
    Some((&id[..bytes.len() - 2], counter))
}

/// Derives a free identity from a requested one.
///
/// Requests shorter than two characters fall back to `type_name`. A
/// trailing two-digit counter is incremented, anything else gets `01`
/// appended; counters keep growing until `taken` reports a free name.
pub(crate) fn unique_name(requested: &str, type_name: &str, taken: impl Fn(&str) -> bool) -> String {
    let (base, mut counter) = if requested.chars().count() < 2 {
        (type_name, 1)
    } else {
        match split_counter(requested) {
            Some((base, counter)) => (base, counter + 1),
            None => (requested, 1),
        }
    };
    loop {
        let name = format!("{base}{counter:02}");
        if !taken(&name) {
            return name;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::unique_name;

    #[test]
    fn counters() {
        let free = |_: &str| false;
        assert_eq!(unique_name("Foo", "T", free), "Foo01");
        assert_eq!(unique_name("Foo01", "T", free), "Foo02");
        assert_eq!(unique_name("Foo99", "T", free), "Foo100");
        assert_eq!(unique_name("x", "Thing", free), "Thing01");
        assert_eq!(unique_name("", "Thing", free), "Thing01");
        assert_eq!(unique_name("7", "Thing", free), "Thing01");
        assert_eq!(unique_name("42", "Thing", free), "43");
    }

    #[test]
    fn skips_taken_names() {
        let taken = |name: &str| matches!(name, "Foo01" | "Foo02");
        assert_eq!(unique_name("Foo", "T", taken), "Foo03");
    }
}

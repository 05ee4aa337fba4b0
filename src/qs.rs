//! Query-string encoding.
//!
//! Keys are emitted as is so that `$select` and `$$exclude_system_fields`
//! keep their dollar signs. Values are percent-encoded like
//! `encodeURIComponent`, which leaves `!*'()` alone, and spaces come out
//! as `+`.

const UNRESERVED_MARKS: [(&str, &str); 5] =
    [("%21", "!"), ("%2A", "*"), ("%27", "'"), ("%28", "("), ("%29", ")")];

fn encode_component(value: &str) -> String {
    UNRESERVED_MARKS
        .iter()
        .fold(urlencoding::encode(value).into_owned(), |acc, (from, to)| acc.replace(from, to))
}

/// Encode ordered key/value pairs as `k=v&k2=v2`.
pub fn to_query_string<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k.as_ref(), encode_component(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&")
        .replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty() {
        let pairs: [(&str, &str); 0] = [];
        assert_eq!(to_query_string(&pairs), "");
    }

    #[test]
    fn test_keys_verbatim() {
        assert_eq!(
            to_query_string(&[("test", "1"), ("$$exclude_system_fields", "false")]),
            "test=1&$$exclude_system_fields=false"
        );
    }

    #[test]
    fn test_value_encoding() {
        assert_eq!(
            to_query_string(&[("$where", "(`a` = 'b c')")]),
            "$where=(%60a%60+%3D+'b+c')"
        );
        assert_eq!(to_query_string(&[("q", "a&b=c")]), "q=a%26b%3Dc");
        assert_eq!(to_query_string(&[("$select", "count(*),a")]), "$select=count(*)%2Ca");
        assert_eq!(to_query_string(&[("q", "100%*")]), "q=100%25*");
    }
}

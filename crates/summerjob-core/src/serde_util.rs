use serde::{Deserialize, Deserializer};

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        area_id: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.area_id, None);
        let null: Patch = serde_json::from_str(r#"{"area_id":null}"#).unwrap();
        assert_eq!(null.area_id, Some(None));
        let set: Patch = serde_json::from_str(r#"{"area_id":"a1"}"#).unwrap();
        assert_eq!(set.area_id, Some(Some("a1".into())));
    }
}

use relface_core::{BlobCodec, BoolCodec, Field, FieldType, JsonCodec, ParseCodec, StringCodec};

pub fn string() -> Field<String> {
    Field::new("String", StringCodec)
}

pub fn integer() -> Field<i64> {
    Field::new("Integer", ParseCodec::<i64>::new())
}

pub fn float() -> Field<f64> {
    Field::new("Float", ParseCodec::<f64>::new())
}

/// Stored as `"1"` or `"0"`.
pub fn boolean() -> Field<bool> {
    Field::new("Boolean", BoolCodec)
}

/// Raw bytes, stored base64-encoded.
pub fn blob() -> Field<Vec<u8>> {
    Field::new("Blob", BlobCodec)
}

/// Any serde type, stored as JSON text.
pub fn json<T: FieldType>() -> Field<T> {
    Field::new("Json", JsonCodec::<T>::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relface_core::{Interface, OneOf, Schema, SharedStore};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Limits {
        nodes: u32,
        partitions: Vec<String>,
    }

    #[test]
    fn scalars_store_their_wire_forms() {
        let name = string();
        let count = integer();
        let ratio = float();
        let enabled = boolean();
        let key = blob();
        let limits = json::<Limits>();
        let schema = Schema::builder("Scalars")
            .field("name", &name)
            .field("count", &count)
            .field("ratio", &ratio)
            .field("enabled", &enabled)
            .field("key", &key)
            .field("limits", &limits)
            .build()
            .unwrap();

        let store = SharedStore::new();
        let iface = Interface::with_store(&schema, Box::new(store.clone()));
        name.set(&iface, "osd".to_string()).unwrap();
        count.set(&iface, -3).unwrap();
        ratio.set(&iface, 0.5).unwrap();
        enabled.set(&iface, true).unwrap();
        key.set(&iface, vec![0, 159, 146, 150]).unwrap();
        let value = Limits {
            nodes: 4,
            partitions: vec!["batch".to_string()],
        };
        limits.set(&iface, value.clone()).unwrap();

        let data = store.snapshot();
        assert_eq!(data["name"], "osd");
        assert_eq!(data["count"], "-3");
        assert_eq!(data["ratio"], "0.5");
        assert_eq!(data["enabled"], "1");
        assert_eq!(data["key"], "AJ+Slg==");
        assert_eq!(data["limits"], r#"{"nodes":4,"partitions":["batch"]}"#);

        assert_eq!(limits.read(&iface).unwrap(), Some(value));
        assert_eq!(enabled.read(&iface).unwrap(), Some(true));
    }

    #[test]
    fn constructors_accept_builder_adjustments() {
        let level = string()
            .with_default("info".to_string())
            .with_checker(OneOf::new(["debug", "info", "warn"].map(String::from)));
        let schema = Schema::builder("Logging").field("level", &level).build().unwrap();
        let iface = Interface::new(&schema);

        assert_eq!(level.read(&iface).unwrap().as_deref(), Some("info"));
        assert!(level.set(&iface, "loud".to_string()).unwrap_err().is_check());
        assert_eq!(level.kind(), "String");
    }
}

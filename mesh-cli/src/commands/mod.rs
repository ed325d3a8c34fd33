//! CLI command implementations

pub mod edge;
pub mod lineage;
pub mod node;
pub mod summary;

use anyhow::{bail, Result};
use mesh_core::{AttributeValue, Attributes};

/// Parse repeated `key=value` arguments into an attribute bag
pub fn parse_attributes(raw: &[String]) -> Result<Attributes> {
    let mut attributes = Attributes::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid attribute {:?}, expected KEY=VALUE", pair);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid attribute {:?}, key must not be empty", pair);
        }
        attributes.insert(key.to_string(), AttributeValue::infer(value));
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes_infers_types() {
        let raw = vec![
            "owner=sales".to_string(),
            "pii=true".to_string(),
            "rows=42".to_string(),
            "ratio=0.5".to_string(),
            "query=a=b".to_string(),
        ];
        let attrs = parse_attributes(&raw).unwrap();

        assert_eq!(attrs["owner"], AttributeValue::String("sales".to_string()));
        assert_eq!(attrs["pii"], AttributeValue::Bool(true));
        assert_eq!(attrs["rows"], AttributeValue::Integer(42));
        assert_eq!(attrs["ratio"], AttributeValue::Float(0.5));
        assert_eq!(attrs["query"], AttributeValue::String("a=b".to_string()));
    }

    #[test]
    fn test_parse_attributes_rejects_malformed() {
        assert!(parse_attributes(&["novalue".to_string()]).is_err());
        assert!(parse_attributes(&["=x".to_string()]).is_err());
    }
}

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Garment size of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    S,
    M,
    L,
    #[serde(rename = "XL")]
    Xl,
    #[serde(rename = "XXL")]
    Xxl,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::Xl => "XL",
            Size::Xxl => "XXL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(Size::S),
            "M" => Ok(Size::M),
            "L" => Ok(Size::L),
            "XL" => Ok(Size::Xl),
            "XXL" => Ok(Size::Xxl),
            _ => Err(format!("Invalid size: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[serde(rename = "sizeproduct")]
    pub size: Option<Size>,
    pub image_content_type: Option<String>,
    /// Base64-encoded image bytes
    pub image: Option<String>,
    pub product_category_id: Option<i64>,
}

super::impl_identity_eq!(ProductCategory, Product);

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("S", Size::S)]
    #[case("M", Size::M)]
    #[case("L", Size::L)]
    #[case("XL", Size::Xl)]
    #[case("XXL", Size::Xxl)]
    fn test_size_parse(#[case] input: &str, #[case] expected: Size) {
        assert_eq!(input.parse::<Size>().unwrap(), expected);
        assert_eq!(
            serde_json::to_string(&expected).unwrap(),
            format!("\"{}\"", input)
        );
    }

    #[test]
    fn test_product_size_field_name() {
        let product: Product =
            serde_json::from_str(r#"{"id":1,"name":"Shirt","sizeproduct":"XL"}"#).unwrap();
        assert_eq!(product.size, Some(Size::Xl));
    }
}

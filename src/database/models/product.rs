use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::validator::Validator;

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub average_rating: f32,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl Resource for Product {
    type Create = NewProduct;
    type Patch = ProductPatch;

    const TABLE: &'static str = "products";
    const SINGULAR: &'static str = "product";
    const PLURAL: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "category",
        "image_url",
        "average_rating",
        "created_at",
        "version",
    ];
    const WRITABLE: &'static [&'static str] =
        &["name", "description", "category", "image_url", "average_rating"];
    const SORT_SAFE_LIST: &'static [&'static str] =
        &["id", "name", "category", "-id", "-name", "-category"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "category"];

    fn from_input(input: NewProduct) -> Self {
        Self {
            name: input.name,
            description: input.description,
            category: input.category,
            image_url: input.image_url,
            ..Self::default()
        }
    }

    fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
    }

    fn validate(&self, v: &mut Validator) {
        v.check(!self.name.is_empty(), "name", "must be provided");
        v.check(!self.category.is_empty(), "category", "must be provided");
        v.check(!self.image_url.is_empty(), "image_url", "must be provided");
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn writable_values(&self) -> Vec<Value> {
        vec![
            json!(self.name),
            json!(self.description),
            json!(self.category),
            json!(self.image_url),
            json!(f64::from(self.average_rating)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_optional() {
        let product = Product::from_input(NewProduct {
            name: "Lamp".into(),
            description: String::new(),
            category: "Home".into(),
            image_url: "https://img.example/lamp.png".into(),
        });
        let mut v = Validator::new();
        product.validate(&mut v);
        assert!(v.is_empty());
    }

    #[test]
    fn missing_image_url_is_reported() {
        let mut product = Product { name: "Lamp".into(), category: "Home".into(), image_url: "x".into(), ..Product::default() };
        product.apply_patch(ProductPatch { image_url: Some(String::new()), ..ProductPatch::default() });
        let mut v = Validator::new();
        product.validate(&mut v);
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()["image_url"], "must be provided");
    }
}

/// Shopping list model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::resource::{HouseholdResource, ResourceFamily};

/// One product on a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "ProductID")]
    pub product_id: String,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Purchased", default)]
    pub purchased: bool,
}

/// Household shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ShoppingList {
    #[serde(rename = "ListID", default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,

    #[serde(rename = "HouseholdID", default)]
    pub household_id: String,

    #[serde(rename = "Title")]
    #[validate(length(min = 1, message = "List title is required."))]
    pub title: String,

    #[serde(rename = "Products", default)]
    pub products: Vec<Product>,

    #[serde(rename = "CreatedBy", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl ShoppingList {
    /// Creates a new, empty list
    pub fn new(household_id: impl Into<String>, title: impl Into<String>) -> Self {
        ShoppingList {
            list_id: None,
            household_id: household_id.into(),
            title: title.into(),
            products: Vec::new(),
            created_by: None,
        }
    }

    /// Full replacement object with `product_id` marked purchased or not
    pub fn with_purchased(&self, product_id: &str, purchased: bool) -> Self {
        let mut updated = self.clone();
        for product in updated
            .products
            .iter_mut()
            .filter(|p| p.product_id == product_id)
        {
            product.purchased = purchased;
        }
        updated
    }

    /// Products still to buy
    pub fn remaining(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| !p.purchased)
    }
}

impl HouseholdResource for ShoppingList {
    const FAMILY: ResourceFamily = ResourceFamily::ShoppingList;

    fn id(&self) -> Option<&str> {
        self.list_id.as_deref()
    }

    fn household_id(&self) -> &str {
        &self.household_id
    }

    fn set_household_id(&mut self, household_id: &str) {
        self.household_id = household_id.to_string();
    }

    fn owner_id(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_purchased() {
        let mut list = ShoppingList::new("h1", "Weekly shop");
        list.products = vec![
            Product { product_id: "p1".into(), name: "Milk".into(), purchased: false },
            Product { product_id: "p2".into(), name: "Bread".into(), purchased: false },
        ];

        let updated = list.with_purchased("p1", true);
        assert!(updated.products[0].purchased);
        assert_eq!(updated.remaining().count(), 1);
        assert_eq!(list.remaining().count(), 2);
    }

    #[test]
    fn test_shopping_list_deserialization() {
        let json = serde_json::json!({
            "ListID": "l1",
            "HouseholdID": "h1",
            "Title": "Party"
        });

        let list: ShoppingList = serde_json::from_value(json).unwrap();
        assert_eq!(list.id(), Some("l1"));
        assert!(list.products.is_empty());
    }
}

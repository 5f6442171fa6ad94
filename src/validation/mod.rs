use std::collections::HashSet;
use std::fmt;

pub const MAX_ITEMS_PER_ORDER: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_customer_id(customer_id: i64) -> ValidationResult {
    if customer_id <= 0 {
        return Err(ValidationError::new("customer_id", "must be positive"));
    }

    Ok(())
}

pub fn validate_product_id(product_id: i64) -> ValidationResult {
    if product_id <= 0 {
        return Err(ValidationError::new("product_id", "must be positive"));
    }

    Ok(())
}

pub fn validate_quantity(quantity: i32) -> ValidationResult {
    if quantity <= 0 {
        return Err(ValidationError::new("quantity", "must be positive"));
    }

    Ok(())
}

/// Checks the shape of a whole line-item list: non-empty, bounded, each entry
/// well-formed, and no product requested twice.
pub fn validate_line_items(items: &[(i64, i32)]) -> ValidationResult {
    if items.is_empty() {
        return Err(ValidationError::new("items", "must not be empty"));
    }

    if items.len() > MAX_ITEMS_PER_ORDER {
        return Err(ValidationError::new(
            "items",
            format!("must contain at most {} entries", MAX_ITEMS_PER_ORDER),
        ));
    }

    let mut seen = HashSet::new();
    for (product_id, quantity) in items {
        validate_product_id(*product_id)?;
        validate_quantity(*quantity)?;

        if !seen.insert(*product_id) {
            return Err(ValidationError::new(
                "items",
                format!("duplicate entry for product {}", product_id),
            ));
        }
    }

    Ok(())
}

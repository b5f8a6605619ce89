use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stable catalog identifier for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One purchasable catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub category: String,
    pub description: String,
    pub badge: String,
}

/// One product held in the cart: a display snapshot taken at add-time plus a
/// quantity. The snapshot is flattened so each persisted line is a single
/// flat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Ordered sequence of cart lines. Insertion order is display order, and a
/// product id appears at most once; adding an existing product bumps its
/// quantity instead of appending a second line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine {
                product: product.clone(),
                quantity: 1,
            });
        }
    }

    pub fn remove(&mut self, id: ProductId) {
        self.lines.retain(|l| l.product.id != id);
    }

    pub fn set_quantity(&mut self, id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == id) {
            line.quantity = quantity;
        }
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Formats a decimal amount as a display price, e.g. `$19.99`.
pub fn format_price(amount: Decimal) -> String {
    format!("${amount:.2}")
}
